//! Rule Engine Error Types

use thiserror::Error;

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, RuleError>;

/// Rule engine errors
#[derive(Debug, Error)]
pub enum RuleError {
    /// Invalid argument passed to a constructor or registry
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Rule definition rejected at construction time
    #[error("Invalid rule definition: {0}")]
    InvalidDefinition(String),

    /// A condition referenced a fact that is not present
    #[error("No fact named '{0}' found in known facts")]
    MissingFact(String),

    /// A fact is present but does not have the expected type
    #[error("Fact '{name}' does not match the expected type: {reason}")]
    FactType { name: String, reason: String },

    /// Condition evaluation error
    #[error("Condition evaluation error: {0}")]
    Evaluation(String),

    /// Action execution error
    #[error("Action execution error: {0}")]
    Execution(String),

    /// Listener hook failure, aborts the session
    #[error("Listener error: {0}")]
    Listener(String),

    /// Engine configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error raised by user code through `anyhow`
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RuleError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    pub fn missing_fact(name: impl Into<String>) -> Self {
        Self::MissingFact(name.into())
    }

    pub fn fact_type(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FactType {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn listener(msg: impl Into<String>) -> Self {
        Self::Listener(msg.into())
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Serialization(err.to_string())
    }
}

impl From<figment::Error> for RuleError {
    fn from(err: figment::Error) -> Self {
        RuleError::Config(err.to_string())
    }
}
