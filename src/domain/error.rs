use thiserror::Error;

/// Core domain errors
///
/// Every failure the key lifecycle can produce maps to exactly one variant.
/// Collaborator errors are wrapped with [`DomainError::context`], which keeps
/// the variant and only prefixes the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Invalid key name '{name}': it must match {pattern}")]
    InvalidKeyPattern { name: String, pattern: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Unknown key type: {key_type}")]
    UnknownKeyType { key_type: String },

    #[error("Key generation error: {message}")]
    Generation { message: String },

    #[error("Key {name} not found on application {application}")]
    KeyNotFound { name: String, application: String },

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Deadline exceeded: {message}")]
    DeadlineExceeded { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn invalid_key_pattern(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::InvalidKeyPattern {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unknown_key_type(key_type: impl Into<String>) -> Self {
        Self::UnknownKeyType {
            key_type: key_type.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn key_not_found(name: impl Into<String>, application: impl Into<String>) -> Self {
        Self::KeyNotFound {
            name: name.into(),
            application: application.into(),
        }
    }

    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::DeadlineExceeded {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Prefix the message with operation context, keeping the error kind.
    ///
    /// Variants whose payload is structured (key names, types, patterns) are
    /// returned unchanged.
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        let wrap = |message: String| format!("{}: {}", context, message);

        match self {
            Self::BadRequest { message } => Self::BadRequest {
                message: wrap(message),
            },
            Self::NotFound { message } => Self::NotFound {
                message: wrap(message),
            },
            Self::Forbidden { message } => Self::Forbidden {
                message: wrap(message),
            },
            Self::Generation { message } => Self::Generation {
                message: wrap(message),
            },
            Self::ConstraintViolation { message } => Self::ConstraintViolation {
                message: wrap(message),
            },
            Self::Storage { message } => Self::Storage {
                message: wrap(message),
            },
            Self::DeadlineExceeded { message } => Self::DeadlineExceeded {
                message: wrap(message),
            },
            Self::Configuration { message } => Self::Configuration {
                message: wrap(message),
            },
            other => other,
        }
    }

    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::InvalidKeyPattern { .. } => "invalid_key_pattern",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::UnknownKeyType { .. } => "unknown_key_type",
            Self::Generation { .. } => "generation_error",
            Self::KeyNotFound { .. } => "key_not_found",
            Self::ConstraintViolation { .. } => "constraint_violation",
            Self::Storage { .. } => "storage_error",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Configuration { .. } => "configuration_error",
        }
    }

    /// Caller-facing status, expressed as an HTTP status number
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::InvalidKeyPattern { .. } => 400,
            Self::UnknownKeyType { .. } => 400,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::KeyNotFound { .. } => 404,
            Self::ConstraintViolation { .. } => 409,
            Self::Generation { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Storage { .. } => 503,
            Self::DeadlineExceeded { .. } => 504,
        }
    }

    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::DeadlineExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("application myproj/myapp");
        assert_eq!(error.to_string(), "Not found: application myproj/myapp");
        assert_eq!(error.status_code(), 404);
    }

    #[test]
    fn test_key_not_found_error() {
        let error = DomainError::key_not_found("app-deploy", "myapp");
        assert_eq!(
            error.to_string(),
            "Key app-deploy not found on application myapp"
        );
        assert_eq!(error.code(), "key_not_found");
    }

    #[test]
    fn test_invalid_key_pattern_error() {
        let error = DomainError::invalid_key_pattern("bad name", "^[a-z]+$");
        assert_eq!(
            error.to_string(),
            "Invalid key name 'bad name': it must match ^[a-z]+$"
        );
    }

    #[test]
    fn test_context_keeps_kind() {
        let error = DomainError::storage("connection reset").context("cannot delete key app-a");

        assert_eq!(
            error,
            DomainError::storage("cannot delete key app-a: connection reset")
        );
        assert!(error.is_retryable());
    }

    #[test]
    fn test_context_leaves_structured_variants() {
        let error = DomainError::unknown_key_type("rsa").context("add key");
        assert_eq!(error, DomainError::unknown_key_type("rsa"));
    }

    #[test]
    fn test_forbidden_and_key_not_found_are_not_retryable() {
        assert!(!DomainError::forbidden("repository-linked").is_retryable());
        assert!(!DomainError::key_not_found("app-a", "myapp").is_retryable());
        assert_ne!(
            DomainError::forbidden("x").status_code(),
            DomainError::storage("x").status_code()
        );
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            DomainError::bad_request("x"),
            DomainError::invalid_key_pattern("x", "y"),
            DomainError::not_found("x"),
            DomainError::forbidden("x"),
            DomainError::unknown_key_type("x"),
            DomainError::generation("x"),
            DomainError::key_not_found("x", "y"),
            DomainError::constraint_violation("x"),
            DomainError::storage("x"),
            DomainError::deadline_exceeded("x"),
            DomainError::configuration("x"),
        ];

        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }
}
