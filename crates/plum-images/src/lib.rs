//! plum-images: the upload/download/list data path
//!
//! Validates file types against a fixed registry, names stored objects with
//! short random identifiers, and streams bytes between HTTP bodies and the
//! blob store without full buffering.

pub mod error;
pub mod filetype;
pub mod handlers;
pub mod id;

pub use error::ImageError;
pub use handlers::{configure_routes, ImagesApiDoc, ImagesState};
