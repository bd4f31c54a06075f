use thiserror::Error;

/// Outcome of a failed event submission.
///
/// Every failure path of [`crate::EventSubmitter::submit`] ends in one of these variants, so the caller can
/// tell a bad configuration apart from a network hiccup or a rejection by the Graph API.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConversionsError {
    #[error("ConfigurationError: [{message}]")]
    Configuration { message: String },
    #[error("InvalidInputError: [{message}]")]
    InvalidInput { message: String },
    #[error("TransportError: [{message}]")]
    Transport { message: String },
    #[error("RejectedError: status {status}, body: [{body}]")]
    Rejected { status: u16, body: String },
    #[error("DecodeError: [{message}]")]
    Decode { message: String },
}

impl ConversionsError {
    /// Short stable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionsError::Configuration { .. } => "configuration",
            ConversionsError::InvalidInput { .. } => "invalid_input",
            ConversionsError::Transport { .. } => "transport",
            ConversionsError::Rejected { .. } => "rejected",
            ConversionsError::Decode { .. } => "decode",
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        ConversionsError::Configuration { message: message.into() }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        ConversionsError::InvalidInput { message: message.into() }
    }
}
