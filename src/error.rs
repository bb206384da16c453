//! error.rs — typed failures of the analysis pipeline.
//!
//! Every failure is recoverable: the controller turns it into `Failed(..)` with a
//! human-readable message and a stable `kind()` string for programmatic handling.

use thiserror::Error;

/// Input rejected before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a news text to analyze.")]
    EmptyInput,
    #[error("Please enter a longer text (at least {min} words, got {words}).")]
    TooShort { words: usize, min: usize },
}

/// The provider's output could not be turned into an `AnalysisResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("biasScore must be an integer in 0..=100, got {0}")]
    OutOfRange(String),
    #[error("response is not a valid analysis object: {0}")]
    Malformed(String),
}

/// Failure of the outbound call itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Network failure or a body that does not decode into the provider envelope.
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered, but its own status says the request failed.
    #[error("{0}")]
    Service(String),
}

/// Everything that can end a request in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Service(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<ClientError> for AnalysisError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Transport(m) => AnalysisError::Transport(m),
            ClientError::Service(m) => AnalysisError::Service(m),
        }
    }
}

impl AnalysisError {
    /// Stable identifier, safe to match on in clients and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Validation(ValidationError::EmptyInput) => "empty_input",
            AnalysisError::Validation(ValidationError::TooShort { .. }) => "too_short",
            AnalysisError::Transport(_) => "transport",
            AnalysisError::Service(_) => "service",
            AnalysisError::Parse(ParseError::MissingField(_)) => "missing_field",
            AnalysisError::Parse(ParseError::OutOfRange(_)) => "out_of_range",
            AnalysisError::Parse(ParseError::Malformed(_)) => "malformed",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AnalysisError::Validation(_))
    }

    /// Message shown to the user. Validation messages stand alone; anything
    /// that went wrong after the request was issued gets a common prefix.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Validation(v) => v.to_string(),
            other => format!("An error occurred: {other}"),
        }
    }
}
