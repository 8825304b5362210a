//! Use cases driven by the routes: resource screens, login and mock test
//! questions.

use thiserror::Error;

pub mod auth;
pub mod controller;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The session is missing or was rejected by the API.
    #[error("Unauthorized")]
    Unauthorized,

    /// Submitted data failed validation; the form stays open.
    #[error("{0}")]
    Form(String),

    /// A file could not be uploaded; the operator must pick it again.
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("API error: {0}")]
    Gateway(String),

    #[error("Not found")]
    NotFound,

    #[error("Invalid value: {0}")]
    TypeConstraint(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
