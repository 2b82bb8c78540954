//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! the conversions live here and are only compiled with the `client` feature.

use crate::domain::types::TypeConstraintError;
use crate::forms::products::{AddProductFormError, FormError};
use crate::repository::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::Validation(val.to_string())
    }
}

impl From<AddProductFormError> for ServiceError {
    fn from(val: AddProductFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::Unauthorized => ServiceError::Unauthorized,
            RepositoryError::Server(message) => ServiceError::Backend(message),
            RepositoryError::Timeout => ServiceError::Backend(val.to_string()),
            other => {
                log::error!("Backend request failed: {other}");
                ServiceError::Internal
            }
        }
    }
}
