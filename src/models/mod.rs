//! Domain models and request/response DTOs

pub mod account;
pub mod auth;
pub mod comment;
pub mod post;

pub use account::*;
pub use auth::*;
pub use comment::*;
pub use post::*;

use validator::ValidationError;

/// Rejects empty or whitespace-only strings
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
