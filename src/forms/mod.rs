//! Form definitions backing the console screens.

use thiserror::Error;
use validator::ValidationErrors;

pub mod draft;
pub mod login;
#[cfg(feature = "server")]
pub mod multipart;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0} is required")]
    MissingField(String),

    #[error("{0} must be a number")]
    InvalidNumber(String),

    #[error("{0} must be a date (YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("{0} must be an email address")]
    InvalidEmail(String),

    #[error("{0} must be a URL")]
    InvalidUrl(String),

    #[error("upload of {0} failed, select the file again")]
    UploadFailed(String),

    #[error("malformed form data: {0}")]
    Malformed(String),
}
