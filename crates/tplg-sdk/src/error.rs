use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tplg_build::BuildError;
use tplg_conf::ConfError;
use tplg_store::StoreError;
use tplg_tuple::TupleError;
use tplg_writer::WriteError;

#[derive(Debug, Error)]
pub enum TplgError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("write error: {0}")]
    Write(#[from] WriteError),

    #[error("configuration syntax error: {0}")]
    Conf(#[from] ConfError),

    #[error("tuple error: {0}")]
    Tuple(#[from] TupleError),

    #[error("invalid value '{value}' for {section} '{id}' field '{field}': {reason}")]
    InvalidValue {
        section: String,
        id: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("unknown field '{field}' in {section} '{id}'")]
    UnknownField {
        section: String,
        id: String,
        field: String,
    },

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("malformed private data in '{id}': {reason}")]
    MalformedPrivateData { id: String, reason: String },

    #[error("invalid compiler configuration: {0}")]
    Config(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type TplgResult<T> = Result<T, TplgError>;

/// Coarse classification of a [`TplgError`], stable across the crates it
/// wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AllocationFailure,
    UnresolvedReference,
    MalformedPrivateData,
    OffsetMismatch,
    ShortWrite,
    DuplicateElement,
    ManifestDataExists,
    VendorTypeMismatch,
    InvalidValue,
    UnknownSection,
    CorruptImage,
    Config,
    Io,
    Conf,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AllocationFailure => "allocation failure",
            Self::UnresolvedReference => "unresolved reference",
            Self::MalformedPrivateData => "malformed private data",
            Self::OffsetMismatch => "offset mismatch",
            Self::ShortWrite => "short write",
            Self::DuplicateElement => "duplicate element",
            Self::ManifestDataExists => "manifest data exists",
            Self::VendorTypeMismatch => "vendor type mismatch",
            Self::InvalidValue => "invalid value",
            Self::UnknownSection => "unknown section",
            Self::CorruptImage => "corrupt image",
            Self::Config => "config",
            Self::Io => "i/o",
            Self::Conf => "syntax",
        };
        f.write_str(name)
    }
}

fn store_kind(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::Duplicate { .. } | StoreError::ManifestExists { .. } => {
            ErrorKind::DuplicateElement
        }
        StoreError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
        StoreError::NoPrivateArea { .. }
        | StoreError::DataAfterControls { .. }
        | StoreError::OutOfBounds { .. }
        | StoreError::NotAWidget { .. } => ErrorKind::MalformedPrivateData,
    }
}

impl TplgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(err) => store_kind(err),
            Self::Build(err) => match err {
                BuildError::UnresolvedReference { .. } | BuildError::UnsupportedReference { .. } => {
                    ErrorKind::UnresolvedReference
                }
                BuildError::MalformedPrivateData { .. } | BuildError::Tuple { .. } => {
                    ErrorKind::MalformedPrivateData
                }
                BuildError::ManifestDataExists { .. } => ErrorKind::ManifestDataExists,
                BuildError::TooMany { .. } => ErrorKind::InvalidValue,
                BuildError::Store(err) => store_kind(err),
            },
            Self::Write(err) => match err {
                WriteError::OffsetMismatch { .. } | WriteError::BlockTooLarge { .. } => {
                    ErrorKind::OffsetMismatch
                }
                WriteError::VendorTypeMismatch { .. } => ErrorKind::VendorTypeMismatch,
                WriteError::ShortWrite { .. } => ErrorKind::ShortWrite,
                WriteError::InvalidMagic { .. }
                | WriteError::UnsupportedAbi { .. }
                | WriteError::CorruptBlock { .. } => ErrorKind::CorruptImage,
                WriteError::Io(_) => ErrorKind::Io,
            },
            Self::Conf(_) => ErrorKind::Conf,
            Self::Tuple(_) | Self::MalformedPrivateData { .. } => ErrorKind::MalformedPrivateData,
            Self::InvalidValue { .. } | Self::UnknownField { .. } => ErrorKind::InvalidValue,
            Self::UnknownSection(_) => ErrorKind::UnknownSection,
            Self::Config(_) => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}
