use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tplg_store::{ElementKey, ElementStore, Growth, Reference};
use tplg_types::ElementType;

use crate::error::{BuildError, BuildResult};
use crate::options::BuildOptions;

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A non-fatal problem found while building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Pass that reported it.
    pub pass: String,
    pub kind: ElementType,
    pub id: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': {}", self.kind, self.id, self.message)
    }
}

// ---------------------------------------------------------------------------
// PassStats / PassResult
// ---------------------------------------------------------------------------

/// What a pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    /// Elements the pass looked at.
    pub elements: usize,
    /// References it resolved in this run.
    pub resolved: usize,
}

/// Recorded result from a completed pass.
#[derive(Clone, Debug)]
pub struct PassResult {
    pub pass_name: String,
    pub stats: PassStats,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// BuildContext
// ---------------------------------------------------------------------------

/// State shared by every pass of one build.
pub struct BuildContext<'a> {
    pub store: &'a mut ElementStore,
    pub options: &'a BuildOptions,
    /// Warnings collected so far.
    pub diagnostics: Vec<Diagnostic>,
    /// Results from passes that have already run in this build.
    pub previous_passes: Vec<PassResult>,
}

impl<'a> BuildContext<'a> {
    pub fn new(store: &'a mut ElementStore, options: &'a BuildOptions) -> Self {
        Self {
            store,
            options,
            diagnostics: Vec::new(),
            previous_passes: Vec::new(),
        }
    }

    /// Unresolved references of `key`, with their positions.
    pub fn pending(&self, key: ElementKey) -> Vec<(usize, Reference)> {
        self.store
            .get(key)
            .references()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_resolved())
            .map(|(i, r)| (i, r.clone()))
            .collect()
    }

    /// Look up the target of `reference`, failing if it does not exist.
    pub fn require(&self, key: ElementKey, reference: &Reference) -> BuildResult<ElementKey> {
        self.store
            .lookup(reference.kind, &reference.target)
            .ok_or_else(|| self.unresolved(key, reference))
    }

    pub fn unresolved(&self, key: ElementKey, reference: &Reference) -> BuildError {
        BuildError::UnresolvedReference {
            kind: key.kind(),
            id: self.store.get(key).id().to_string(),
            target_kind: reference.kind,
            target: reference.target.clone(),
        }
    }

    pub fn unsupported(&self, key: ElementKey, reference: &Reference) -> BuildError {
        BuildError::UnsupportedReference {
            kind: key.kind(),
            id: self.store.get(key).id().to_string(),
            target_kind: reference.kind,
            target: reference.target.clone(),
        }
    }

    /// Mark reference `index` of `key` as bound to `target`.
    pub fn mark_resolved(&mut self, key: ElementKey, index: usize, target: ElementKey) {
        if let Some(reference) = self.store.get_mut(key).references_mut().get_mut(index) {
            reference.resolve(target);
        }
    }

    /// Append the private data of `source` to the private area of `target`.
    pub fn merge_data(&mut self, target: ElementKey, source: ElementKey) -> BuildResult<usize> {
        match self.store.get_pair_mut(target, source) {
            Some((target, source)) => {
                let data = source.private_data();
                target.grow_and_append(data, Growth::PrivateData)?;
                Ok(data.len())
            }
            None => Err(BuildError::MalformedPrivateData {
                id: self.store.get(source).id().to_string(),
                reason: "element references its own data".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// BuildPass trait
// ---------------------------------------------------------------------------

/// A single step of the build pipeline.
///
/// Passes run in a fixed order and each handles one family of element
/// kinds. A pass must only act on unresolved references so that running it
/// again is a no-op.
pub trait BuildPass: Send + Sync {
    /// Human-readable name of this pass (used in reports and logs).
    fn name(&self) -> &str;

    /// Run the pass over the store.
    fn run(&self, context: &mut BuildContext<'_>) -> BuildResult<PassStats>;
}
