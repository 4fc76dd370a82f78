//! Validation error types

/// Error information for a specific field that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Human-readable validation error message.
    pub message: String,
}

impl FieldValidationError {
    /// Creates a new field validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Client-side checks that run before a request is issued.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// One or more form fields are blank or malformed.
    #[error("Invalid form: {}", join_fields(.0))]
    Fields(Vec<FieldValidationError>),

    /// Entity kinds must be non-empty and path-safe.
    #[error("Invalid entity kind '{0}'")]
    EntityKind(String),

    /// The field is not part of the column set.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// A form operation was attempted while no form is open.
    #[error("No form is open")]
    FormClosed,
}

impl ValidationError {
    /// Returns the per-field errors, if any.
    pub fn field_errors(&self) -> &[FieldValidationError] {
        match self {
            Self::Fields(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[FieldValidationError]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
