pub mod contact;
pub mod session;

use std::fmt;

pub use contact::{CheckoutForm, ContactDetails};
pub use session::{
    Flash, FlashCategory, MemorySessionStore, SessionContext, SessionRecord, SessionStore,
};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
    #[error("Session references missing order {0}")]
    StaleSession(i64),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(what: impl fmt::Display) -> Self {
        CoreError::NotFound(what.to_string())
    }

    pub fn persistence(cause: impl fmt::Display) -> Self {
        CoreError::Persistence(cause.to_string())
    }
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::default();
        errors.push("email", "Invalid email address");
        errors.push("phone", "This field is required");

        let err = CoreError::Validation(errors);
        assert_eq!(
            err.to_string(),
            "Validation failed: email: Invalid email address; phone: This field is required"
        );
    }
}
