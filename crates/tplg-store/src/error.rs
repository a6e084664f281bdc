use thiserror::Error;
use tplg_types::ElementType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: ElementType, id: String },

    #[error("topology already has manifest '{existing}'")]
    ManifestExists { existing: String },

    #[error("{kind} '{id}' has no private data area")]
    NoPrivateArea { kind: ElementType, id: String },

    #[error("widget '{id}': private data must be merged before its controls")]
    DataAfterControls { id: String },

    #[error("{kind} '{id}': offset {at} is past the end of {len} bytes of private data")]
    OutOfBounds {
        kind: ElementType,
        id: String,
        at: usize,
        len: usize,
    },

    #[error("{kind} '{id}' cannot absorb controls")]
    NotAWidget { kind: ElementType, id: String },

    #[error("cannot grow {kind} '{id}' by {len} bytes")]
    AllocationFailure {
        kind: ElementType,
        id: String,
        len: usize,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
