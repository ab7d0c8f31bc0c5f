//! plum-auth: shared-secret authorization for mutating requests
//!
//! There are no user accounts. Write access is gated by a single
//! process-wide secret presented verbatim in the `Authorization` header.

mod extract;
mod secret;

pub use extract::RequireUploadKey;
pub use secret::{SecretError, UploadSecret};
