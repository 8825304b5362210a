//! Error conversion glue between layers.
//!
//! The domain, gateway and form layers do not know about service errors;
//! these impls let services propagate them with `?`.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::gateway::errors::GatewayError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<GatewayError> for ServiceError {
    fn from(val: GatewayError) -> Self {
        match val {
            GatewayError::Unauthorized => ServiceError::Unauthorized,
            GatewayError::Upload(message) => ServiceError::Upload(message),
            other => ServiceError::Gateway(other.to_string()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        match val {
            FormError::UploadFailed(field) => {
                ServiceError::Upload(format!("{field} must be selected again"))
            }
            other => ServiceError::Form(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_stay_auth_failures() {
        assert!(matches!(
            ServiceError::from(GatewayError::Unauthorized),
            ServiceError::Unauthorized
        ));
        assert!(matches!(
            ServiceError::from(GatewayError::Timeout),
            ServiceError::Gateway(_)
        ));
        assert!(matches!(
            ServiceError::from(FormError::MissingField("Title".into())),
            ServiceError::Form(message) if message == "Title is required"
        ));
    }
}
