//! Request payload checks shared by handlers

use crate::error::ApiError;
use auth_identity::FieldErrors;

/// Implemented by request bodies that carry more than a domain call can check
pub trait RequestValidation {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Records a "required" error for every blank field
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    for (name, value) in fields {
        if value.trim().is_empty() {
            errors.add(name, format!("{} is required", name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation {
            message: "Validation failed".to_string(),
            field_errors: Some(errors),
        })
    }
}
