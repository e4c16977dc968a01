use thiserror::Error;

use crate::models::SecretFinding;

/// Raised when script text cannot be lifted into a playbook structure.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("script is not valid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),
    #[error("unexpected playbook shape: {0}")]
    Structure(String),
}

/// A failed inspection. Secret detection does not depend on parsing, so the
/// secrets found in the unparseable text still travel with the error.
#[derive(Debug, Error)]
#[error("{format}")]
pub struct InspectionError {
    #[source]
    pub format: FormatError,
    pub secrets: Vec<SecretFinding>,
}
