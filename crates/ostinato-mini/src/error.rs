use crate::span::Span;
use thiserror::Error;

/// Errors from parsing or compiling a pattern statement. Every variant
/// carries a [`Span`] pointing back into the source text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected token '{found}' at {span}, expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("unrecognized character '{text}' at {span}")]
    InvalidToken { text: String, span: Span },

    #[error("invalid note '{text}' at {span}")]
    InvalidNote { text: String, span: Span },

    #[error("voice {value} out of range at {span}, voices are numbered 1 to 12")]
    VoiceOutOfRange { value: i64, span: Span },

    #[error("note number {value} out of range at {span}, expected 0 to 127")]
    NoteOutOfRange { value: i64, span: Span },

    #[error("{message} at {span}")]
    Invalid { message: String, span: Span },
}

impl ParseError {
    pub fn unexpected_token(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_end(expected: impl Into<String>) -> Self {
        ParseError::UnexpectedEnd {
            expected: expected.into(),
        }
    }

    pub fn invalid(message: impl Into<String>, span: Span) -> Self {
        ParseError::Invalid {
            message: message.into(),
            span,
        }
    }

    /// The source span the error points at, when it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidToken { span, .. }
            | ParseError::InvalidNote { span, .. }
            | ParseError::VoiceOutOfRange { span, .. }
            | ParseError::NoteOutOfRange { span, .. }
            | ParseError::Invalid { span, .. } => Some(*span),
            ParseError::UnexpectedEnd { .. } => None,
        }
    }
}
