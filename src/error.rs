use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WellnessError {
    #[error("{0} not found in environment")]
    CredentialMissing(String),
    #[error("{source_name} failed: {message}")]
    Provider {
        source_name: String,
        message: String,
    },
    #[error("invalid input: {0}")]
    Validation(String),
}

impl WellnessError {
    pub fn provider(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Stable short code used in structured log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CredentialMissing(_) => "credential_missing",
            Self::Provider { .. } => "provider_error",
            Self::Validation(_) => "validation_error",
        }
    }
}
