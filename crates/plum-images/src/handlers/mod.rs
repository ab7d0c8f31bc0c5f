//! HTTP handlers for the images data path

pub mod handler;
pub mod types;

pub use handler::{configure_routes, ImagesApiDoc};
pub use types::*;
