use thiserror::Error;

/// Rule-table and caller configuration problems.
///
/// These are never swallowed: an unknown form type or a bad pattern is a bug
/// in the caller or the deployment, not a property of the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unknown form type '{0}'")]
    UnknownFormType(String),

    #[error("Invalid pattern '{pattern}' in step '{step}': {reason}")]
    InvalidPattern {
        step: String,
        pattern: String,
        reason: String,
    },

    #[error("Form type '{0}' may only contain a-z, 0-9, '-' and '_'")]
    InvalidFormType(String),

    #[error("Form type '{0}' is defined more than once")]
    DuplicateFormType(String),

    #[error("Standard '{0}' defines no steps")]
    EmptyStandard(String),

    #[error("Failed to load rule file: {0}")]
    RuleFile(String),
}

impl ConfigurationError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigurationError::UnknownFormType(_) => "unknown-form-type",
            ConfigurationError::InvalidPattern { .. } => "invalid-pattern",
            ConfigurationError::InvalidFormType(_) => "invalid-form-type",
            ConfigurationError::DuplicateFormType(_) => "duplicate-form-type",
            ConfigurationError::EmptyStandard(_) => "empty-standard",
            ConfigurationError::RuleFile(_) => "rule-file",
        }
    }
}
