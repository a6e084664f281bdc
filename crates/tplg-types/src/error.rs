use thiserror::Error;

/// Errors produced while interpreting symbolic names and literal values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown {what} '{name}'")]
    UnknownName { what: &'static str, name: String },

    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),

    #[error("value {value} out of range for {what}")]
    OutOfRange { what: &'static str, value: i64 },

    #[error("too many {what}: {count} (max {max})")]
    TooMany {
        what: &'static str,
        count: usize,
        max: usize,
    },
}

pub type TypeResult<T> = Result<T, TypeError>;
