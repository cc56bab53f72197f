use std::collections::BTreeMap;
use std::fmt;
use serde::Serialize;
use thiserror::Error;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Document not found: {0} with ID {1}")]
    NotFound(String, String),

    #[error("Failed to decode {collection} document {id}: {reason}")]
    Decode {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Failed to encode document: {0}")]
    Encode(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document store error: {0}")]
    Other(String),
}

impl StoreError {
    pub fn decode(collection: &str, id: &str, reason: impl fmt::Display) -> Self {
        Self::Decode {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Encode(err.to_string())
    }
}

impl serde::Serialize for StoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let kind = match self {
            StoreError::Sqlx(_) => "Sqlx",
            StoreError::NotFound(_, _) => "NotFound",
            StoreError::Decode { .. } => "Decode",
            StoreError::Encode(_) => "Encode",
            StoreError::Migration(_) => "Migration",
            StoreError::Unavailable(_) => "Unavailable",
            StoreError::Other(_) => "Other",
        };
        let mut state = serializer.serialize_struct("StoreError", 2)?;
        state.serialize_field("type", kind)?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Manual Clone implementation for StoreError
impl Clone for StoreError {
    fn clone(&self) -> Self {
        match self {
            StoreError::Sqlx(err) => StoreError::Other(format!("SQLx error: {}", err)),
            StoreError::NotFound(c, id) => StoreError::NotFound(c.clone(), id.clone()),
            StoreError::Decode { collection, id, reason } => StoreError::Decode {
                collection: collection.clone(),
                id: id.clone(),
                reason: reason.clone(),
            },
            StoreError::Encode(s) => StoreError::Encode(s.clone()),
            StoreError::Migration(s) => StoreError::Migration(s.clone()),
            StoreError::Unavailable(s) => StoreError::Unavailable(s.clone()),
            StoreError::Other(s) => StoreError::Other(s.clone()),
        }
    }
}

/// Field-keyed messages collected from a form before any remote call.
/// Keys follow the form field names (`name`, `email`, `step_2`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the first message for a field; later messages for the same field are ignored.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Domain-level errors
#[derive(Debug, Error, Clone, Serialize)]
pub enum DomainError {
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Entity not found: {0} with ID {1}")]
    EntityNotFound(String, String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid form: {0}")]
    Form(FormErrors),

    #[error("Invalid transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: String,
        from: String,
        to: String,
    },
}

impl DomainError {
    /// True for errors raised locally before any remote call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_) | DomainError::Form(_))
    }

    /// Field errors to show inline next to form inputs.
    pub fn form_errors(&self) -> Option<FormErrors> {
        match self {
            DomainError::Form(errors) => Some(errors.clone()),
            DomainError::Validation(err) => {
                let mut errors = FormErrors::new();
                errors.insert(err.field(), err.to_string());
                Some(errors)
            }
            _ => None,
        }
    }
}

impl From<FormErrors> for DomainError {
    fn from(errors: FormErrors) -> Self {
        DomainError::Form(errors)
    }
}

/// Service-level errors (application specific)
#[derive(Debug, Error, Clone, Serialize)]
pub enum ServiceError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Operation requires explicit confirmation: {0}")]
    ConfirmationRequired(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Workflow '{workflow}' failed at step '{failed_step}' after completing [{}]: {reason}", .completed.join(", "))]
    PartialFailure {
        workflow: String,
        completed: Vec<String>,
        failed_step: String,
        reason: String,
    },
}

impl ServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Domain(e) if e.is_validation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::Domain(DomainError::EntityNotFound(_, _))
                | ServiceError::Domain(DomainError::Store(StoreError::NotFound(_, _)))
        )
    }

    /// Message for the form or page banner. Remote failures collapse into a
    /// generic message; validation keeps its specific text.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            ServiceError::Domain(DomainError::Validation(e)) => e.to_string(),
            ServiceError::Domain(DomainError::Form(errors)) => errors.to_string(),
            ServiceError::Domain(DomainError::EntityNotFound(entity, _)) => {
                format!("{} not found", entity)
            }
            ServiceError::Domain(DomainError::InvalidTransition { .. }) => self.to_string(),
            ServiceError::PermissionDenied(msg) => msg.clone(),
            ServiceError::ConfirmationRequired(msg) => msg.clone(),
            ServiceError::Authentication(msg) => msg.clone(),
            ServiceError::SessionExpired => "Your session has expired, please sign in again".to_string(),
            _ => format!("Could not {}. Please try again.", action),
        }
    }
}

/// Validation errors
#[derive(Debug, Error, Clone, Serialize)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required {
        field: String,
    },

    #[error("Field '{field}' cannot exceed {max} characters")]
    MaxLength {
        field: String,
        max: usize,
    },

    #[error("Field '{field}' must be between {min} and {max}")]
    Range {
        field: String,
        min: String,
        max: String,
    },

    #[error("Field '{field}' contains invalid format: {reason}")]
    Format {
        field: String,
        reason: String,
    },

    #[error("Field '{field}' contains an invalid value: {reason}")]
    InvalidValue {
        field: String,
        reason: String,
    },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    pub fn max_length(field: &str, max: usize) -> Self {
        Self::MaxLength {
            field: field.to_string(),
            max,
        }
    }

    pub fn range<T: fmt::Display>(field: &str, min: T, max: T) -> Self {
        Self::Range {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn format(field: &str, reason: &str) -> Self {
        Self::Format {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The form field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MaxLength { field, .. }
            | ValidationError::Range { field, .. }
            | ValidationError::Format { field, .. }
            | ValidationError::InvalidValue { field, .. } => field,
        }
    }
}
