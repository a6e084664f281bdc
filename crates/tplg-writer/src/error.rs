use thiserror::Error;
use tplg_types::BlockType;

#[derive(Debug, Error)]
pub enum WriteError {
    /// The image drifted from the offsets its headers promise.
    #[error("{block} block: expected offset {expected}, found {actual}")]
    OffsetMismatch {
        block: BlockType,
        expected: usize,
        actual: usize,
    },

    #[error("{block} block mixes vendor types {first} and {other} (element '{id}')")]
    VendorTypeMismatch {
        block: BlockType,
        first: u32,
        other: u32,
        id: String,
    },

    #[error("{block} block payload of {size} bytes exceeds the format limit")]
    BlockTooLarge { block: BlockType, size: usize },

    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("invalid topology magic at offset {offset}: {actual:#010x}")]
    InvalidMagic { offset: usize, actual: u32 },

    #[error("unsupported ABI version {abi} at offset {offset}")]
    UnsupportedAbi { offset: usize, abi: u32 },

    #[error("corrupt block at offset {offset}: {reason}")]
    CorruptBlock { offset: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WriteResult<T> = Result<T, WriteError>;
