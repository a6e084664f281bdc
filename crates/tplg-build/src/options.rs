use serde::{Deserialize, Serialize};
use tplg_types::abi::MAX_PRIV_SIZE;

/// Knobs for the build pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Largest private data block a data element may grow to, in bytes.
    /// Values above the ABI cap are clamped to it.
    pub max_private_size: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_private_size: MAX_PRIV_SIZE,
        }
    }
}

impl BuildOptions {
    /// The effective private data cap.
    pub fn private_cap(&self) -> usize {
        self.max_private_size.min(MAX_PRIV_SIZE)
    }
}
