// src/application/error_handling.rs
//
// Error responses for commands
//
// ARCHITECTURE:
// - Maps internal errors to structured responses
// - Consistent format for the CLI (printed as JSON)
// - Never exposes SQL or connection details; those go to the log

use serde::{Deserialize, Serialize};

use super::dto::HarvestReportDto;
use crate::error::AppError;
use crate::integrations::FetchError;
use crate::services::HarvestError;

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
    /// Counts accumulated by a harvest before it stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<HarvestReportDto>,
}

/// Error categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Resource not found
    NotFound,

    /// Invalid input/validation error
    Validation,

    /// Domain invariant violation
    DomainError,

    /// Database/persistence error
    Database,

    /// Listing site or TMDB error
    ExternalService,

    /// File system error
    FileSystem,

    /// Missing or invalid configuration
    Configuration,

    /// Run cancelled by the user
    Cancelled,

    /// Other/unknown error
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
            report: None,
        }
    }

    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::new(ErrorType::NotFound, "Resource not found", None),

            AppError::Domain(domain_error) => Self::new(
                ErrorType::DomainError,
                "Domain validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => Self::new(
                ErrorType::Validation,
                "Invalid JSON data",
                Some(serde_error.to_string()),
            ),

            AppError::Io(io_error) => Self::new(
                ErrorType::FileSystem,
                "File system operation failed",
                Some(io_error.to_string()),
            ),

            AppError::Config(message) => {
                Self::new(ErrorType::Configuration, "Invalid configuration", Some(message))
            }

            AppError::Http(http_error) => Self::new(
                ErrorType::ExternalService,
                "External service error",
                Some(http_error.to_string()),
            ),

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    pub fn from_harvest_error(error: HarvestError) -> Self {
        let report = Some(HarvestReportDto::from(error.report()));

        let response = match error {
            HarvestError::Fetch { source, .. } => {
                let message = match &source {
                    FetchError::UnexpectedLayout { .. } => "Listing layout not recognized",
                    _ => "Listing could not be fetched",
                };
                Self::new(ErrorType::ExternalService, message, Some(source.to_string()))
            }
            HarvestError::Filter { source, .. } | HarvestError::Persistence { source, .. } => {
                Self::from_app_error(source)
            }
            HarvestError::Cancelled { stage, .. } => Self::new(
                ErrorType::Cancelled,
                format!("Harvest cancelled during {}", stage),
                None,
            ),
        };

        Self { report, ..response }
    }

    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}

impl From<HarvestError> for ErrorResponse {
    fn from(error: HarvestError) -> Self {
        Self::from_harvest_error(error)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_not_found_error() {
        let error = ErrorResponse::from_app_error(AppError::NotFound);
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Resource not found");
        assert!(!error.success);
    }

    #[test]
    fn test_domain_error_keeps_details() {
        let error = ErrorResponse::from(AppError::Domain(DomainError::InvariantViolation(
            "title cannot be empty".to_string(),
        )));
        assert_eq!(error.error_type, ErrorType::DomainError);
        assert!(error.details.unwrap().contains("title cannot be empty"));
    }

    #[test]
    fn test_config_error_category() {
        let error = ErrorResponse::from(AppError::Config("tmdb.api_key is not set".to_string()));
        assert_eq!(error.error_type, ErrorType::Configuration);
        assert_eq!(error.to_string(), "Invalid configuration: tmdb.api_key is not set");
    }

    #[test]
    fn test_serialization_omits_missing_report() {
        let error = ErrorResponse::not_found("Catalog record");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("not_found"));
        assert!(json.contains("Catalog record not found"));
        assert!(!json.contains("report"));
    }
}
