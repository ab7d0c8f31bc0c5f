//! Core utilities and types shared across all Plum crates

pub mod limits;
pub mod response;

pub use limits::{exceeds_upload_limit, MAX_UPLOAD_BYTES};
pub use response::{status_message, Message};
