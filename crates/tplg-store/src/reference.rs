use serde::{Deserialize, Serialize};
use tplg_types::ElementType;

/// Stable handle to an element inside an [`ElementStore`](crate::ElementStore).
///
/// Elements are never removed while a project is alive, so a key stays
/// valid for the lifetime of the store that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementKey {
    kind: ElementType,
    slot: usize,
}

impl ElementKey {
    pub(crate) fn new(kind: ElementType, slot: usize) -> Self {
        Self { kind, slot }
    }

    /// Kind of the referenced element.
    pub fn kind(self) -> ElementType {
        self.kind
    }

    /// Position within its kind's collection (insertion order).
    pub fn slot(self) -> usize {
        self.slot
    }
}

/// A by-name link from one element to another.
///
/// `slot` is a position in the referencing record where the link applies:
/// 0 for playback and 1 for capture on PCM capabilities, the private data
/// offset the tables are inlined at for tuple references, otherwise the
/// order in which the reference was declared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ElementType,
    pub target: String,
    pub slot: usize,
    resolved: Option<ElementKey>,
}

impl Reference {
    /// An unresolved reference to `target` of kind `kind`.
    pub fn new(kind: ElementType, target: impl Into<String>, slot: usize) -> Self {
        Self {
            kind,
            target: target.into(),
            slot,
            resolved: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn resolved(&self) -> Option<ElementKey> {
        self.resolved
    }

    /// Record the element this reference was bound to.
    pub fn resolve(&mut self, key: ElementKey) {
        self.resolved = Some(key);
    }
}
