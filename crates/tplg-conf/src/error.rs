use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfError {
    #[error("line {line}: {message}")]
    Syntax { line: u32, message: String },

    #[error("line {line}: unterminated {what}")]
    Unterminated { line: u32, what: &'static str },

    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: &'static str },
}

impl ConfError {
    pub(crate) fn syntax(line: u32, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

pub type ConfResult<T> = Result<T, ConfError>;
