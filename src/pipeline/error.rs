//! Tagged error type for per-message and per-connection failures

use thiserror::Error;

/// Everything that can go wrong between a raw frame and a delivered reply.
///
/// All variants except [`PipelineError::Transport`] are reported back to the
/// client that sent the message; the connection stays open.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Malformed message: {0}")]
    Decode(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Discriminant of [`PipelineError`] for callers that branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineErrorKind {
    Decode,
    MissingField,
    Validation,
    Analysis,
    Transport,
}

impl PipelineError {
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            Self::Decode(_) => PipelineErrorKind::Decode,
            Self::MissingField(_) => PipelineErrorKind::MissingField,
            Self::Validation(_) => PipelineErrorKind::Validation,
            Self::Analysis(_) => PipelineErrorKind::Analysis,
            Self::Transport(_) => PipelineErrorKind::Transport,
        }
    }

    /// True for errors caused by the content of a single message.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}

impl std::fmt::Display for PipelineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode => write!(f, "DecodeError"),
            Self::MissingField => write!(f, "MissingFieldError"),
            Self::Validation => write!(f, "ValidationError"),
            Self::Analysis => write!(f, "AnalysisError"),
            Self::Transport => write!(f, "TransportError"),
        }
    }
}
