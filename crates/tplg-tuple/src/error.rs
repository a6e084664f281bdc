use thiserror::Error;
use tplg_types::TypeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TupleError {
    #[error("token '{token}' not found in token table '{table}'")]
    UnknownToken { token: String, table: String },

    #[error("invalid {tuple_type} value '{value}' for token '{token}'")]
    InvalidValue {
        tuple_type: &'static str,
        token: String,
        value: String,
    },

    #[error("serialized tuples are {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error(transparent)]
    Type(#[from] TypeError),
}

pub type TupleResult<T> = Result<T, TupleError>;
