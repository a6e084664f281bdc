use thiserror::Error;
use tplg_store::StoreError;
use tplg_tuple::TupleError;
use tplg_types::ElementType;

/// Errors that stop the build pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A named reference has no matching element of the expected kind.
    #[error("{kind} '{id}': {target_kind} '{target}' not found")]
    UnresolvedReference {
        kind: ElementType,
        id: String,
        target_kind: ElementType,
        target: String,
    },

    /// An element names a kind it cannot take data from.
    #[error("{kind} '{id}' cannot reference {target_kind} '{target}'")]
    UnsupportedReference {
        kind: ElementType,
        id: String,
        target_kind: ElementType,
        target: String,
    },

    /// Private data could not be built or exceeds the size cap.
    #[error("data '{id}': {reason}")]
    MalformedPrivateData { id: String, reason: String },

    /// Tuple serialization failed for a data element.
    #[error("data '{id}': {source}")]
    Tuple {
        id: String,
        #[source]
        source: TupleError,
    },

    /// The manifest pass found private data already merged.
    #[error("manifest '{id}' already has manifest data")]
    ManifestDataExists { id: String },

    /// A fixed-size array in the record would overflow.
    #[error("{kind} '{id}': more than {max} {what}")]
    TooMany {
        kind: ElementType,
        id: String,
        what: &'static str,
        max: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type BuildResult<T> = Result<T, BuildError>;
