//! Domain error types.

use thiserror::Error;

/// Errors raised by table editors.
///
/// Every variant is user-correctable and leaves the edited table untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| match &err.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, err.code),
                })
            })
            .collect();
        messages.sort();
        DomainError::Validation(messages.join(", "))
    }
}

/// Lookup failures at the join points of a correlation tick.
///
/// Unknown vessel Macs are not errors; they are dropped and counted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("batch contains no gateway sighting")]
    NoGateway,

    #[error("gateway mac {mac} does not match any beacon reader")]
    UnknownReader { mac: String },

    #[error("reader {reader_id} references unknown location {location_id}")]
    UnknownLocation { reader_id: i64, location_id: i64 },
}

impl CorrelationError {
    /// Short label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoGateway => "no_gateway",
            Self::UnknownReader { .. } => "unknown_reader",
            Self::UnknownLocation { .. } => "unknown_location",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_domain_error_display() {
        assert_eq!(
            DomainError::Validation("bad".to_string()).to_string(),
            "Validation error: bad"
        );
        assert_eq!(
            DomainError::ReferentialIntegrity("in use".to_string()).to_string(),
            "Referential integrity violation: in use"
        );
        assert_eq!(
            DomainError::NotFound("vessel 4".to_string()).to_string(),
            "Not found: vessel 4"
        );
    }

    #[test]
    fn test_from_validation_errors() {
        let probe = Probe {
            name: String::new(),
        };
        let err: DomainError = probe.validate().unwrap_err().into();
        assert_eq!(err, DomainError::Validation("name: Name is required".into()));
    }

    #[test]
    fn test_correlation_error_display() {
        assert_eq!(
            CorrelationError::NoGateway.to_string(),
            "batch contains no gateway sighting"
        );
        assert_eq!(
            CorrelationError::UnknownReader {
                mac: "AA:BB".to_string()
            }
            .to_string(),
            "gateway mac AA:BB does not match any beacon reader"
        );
        assert_eq!(
            CorrelationError::UnknownLocation {
                reader_id: 2,
                location_id: 9
            }
            .to_string(),
            "reader 2 references unknown location 9"
        );
    }

    #[test]
    fn test_correlation_error_reason() {
        assert_eq!(CorrelationError::NoGateway.reason(), "no_gateway");
        assert_eq!(
            CorrelationError::UnknownReader { mac: String::new() }.reason(),
            "unknown_reader"
        );
        assert_eq!(
            CorrelationError::UnknownLocation {
                reader_id: 1,
                location_id: 1
            }
            .reason(),
            "unknown_location"
        );
    }
}
