use tplg_types::ElementType;
use tracing::debug;

use crate::element::Element;
use crate::error::{StoreError, StoreResult};
use crate::reference::ElementKey;

/// Per-kind ordered collections of elements.
///
/// Insertion order is preserved within each kind and determines the order
/// blocks are written in. Ids are unique per kind; at most one manifest
/// exists.
#[derive(Clone, Debug)]
pub struct ElementStore {
    collections: Vec<Vec<Element>>,
}

impl ElementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            collections: vec![Vec::new(); ElementType::COUNT],
        }
    }

    /// Create a default element of `kind` named `id` and insert it.
    pub fn create(&mut self, kind: ElementType, id: &str) -> StoreResult<ElementKey> {
        self.insert(Element::new(kind, id))
    }

    /// Insert a fully built element.
    pub fn insert(&mut self, element: Element) -> StoreResult<ElementKey> {
        let kind = element.kind();
        if kind == ElementType::Manifest {
            if let Some(existing) = self.collections[kind.slot()].first() {
                return Err(StoreError::ManifestExists {
                    existing: existing.id().to_string(),
                });
            }
        }
        if self.lookup(kind, element.id()).is_some() {
            return Err(StoreError::Duplicate {
                kind,
                id: element.id().to_string(),
            });
        }

        let collection = &mut self.collections[kind.slot()];
        let key = ElementKey::new(kind, collection.len());
        debug!(kind = %kind, id = element.id(), size = element.size(), "element added");
        collection.push(element);
        Ok(key)
    }

    /// Find an element by kind and id.
    pub fn lookup(&self, kind: ElementType, id: &str) -> Option<ElementKey> {
        self.collections[kind.slot()]
            .iter()
            .position(|e| e.id() == id)
            .map(|slot| ElementKey::new(kind, slot))
    }

    /// The element behind `key`.
    ///
    /// # Panics
    ///
    /// If `key` was issued by a different store.
    pub fn get(&self, key: ElementKey) -> &Element {
        &self.collections[key.kind().slot()][key.slot()]
    }

    /// Mutable access to the element behind `key`.
    pub fn get_mut(&mut self, key: ElementKey) -> &mut Element {
        &mut self.collections[key.kind().slot()][key.slot()]
    }

    /// Borrow two distinct elements at once: the first mutably.
    ///
    /// Returns `None` if both keys name the same element.
    pub fn get_pair_mut(&mut self, target: ElementKey, source: ElementKey) -> Option<(&mut Element, &Element)> {
        if target == source {
            return None;
        }
        if target.kind() == source.kind() {
            let collection = &mut self.collections[target.kind().slot()];
            let (a, b) = (target.slot(), source.slot());
            return Some(if a < b {
                let (left, right) = collection.split_at_mut(b);
                (&mut left[a], &right[0])
            } else {
                let (left, right) = collection.split_at_mut(a);
                (&mut right[0], &left[b])
            });
        }
        let (t, s) = (target.kind().slot(), source.kind().slot());
        let (target_list, source_list) = if t < s {
            let (left, right) = self.collections.split_at_mut(s);
            (&mut left[t], &right[0])
        } else {
            let (left, right) = self.collections.split_at_mut(t);
            (&mut right[0], &left[s])
        };
        Some((&mut target_list[target.slot()], &source_list[source.slot()]))
    }

    /// Elements of one kind in insertion order.
    pub fn elements(&self, kind: ElementType) -> &[Element] {
        &self.collections[kind.slot()]
    }

    /// Keys of one kind in insertion order.
    pub fn keys(&self, kind: ElementType) -> impl Iterator<Item = ElementKey> {
        (0..self.collections[kind.slot()].len()).map(move |slot| ElementKey::new(kind, slot))
    }

    /// The manifest, if one was declared.
    pub fn manifest(&self) -> Option<ElementKey> {
        self.keys(ElementType::Manifest).next()
    }

    /// Number of elements of `kind`.
    pub fn len(&self, kind: ElementType) -> usize {
        self.collections[kind.slot()].len()
    }

    /// Total number of elements across all kinds.
    pub fn total_len(&self) -> usize {
        self.collections.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the store holds no element at all.
    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(Vec::is_empty)
    }
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Growth;

    #[test]
    fn create_and_lookup() {
        let mut store = ElementStore::new();
        let a = store.create(ElementType::Mixer, "a").unwrap();
        let b = store.create(ElementType::Mixer, "b").unwrap();
        assert_eq!(store.lookup(ElementType::Mixer, "b"), Some(b));
        assert_eq!(store.get(a).id(), "a");
        assert_eq!(store.lookup(ElementType::Enum, "a"), None);
        assert_eq!(store.len(ElementType::Mixer), 2);
        assert_eq!(store.total_len(), 2);
    }

    #[test]
    fn same_id_allowed_across_kinds() {
        let mut store = ElementStore::new();
        store.create(ElementType::Mixer, "x").unwrap();
        store.create(ElementType::Widget, "x").unwrap();
        let err = store.create(ElementType::Mixer, "x").unwrap_err();
        assert_eq!(
            err,
            StoreError::Duplicate {
                kind: ElementType::Mixer,
                id: "x".into()
            }
        );
    }

    #[test]
    fn manifest_is_singleton() {
        let mut store = ElementStore::new();
        store.create(ElementType::Manifest, "m1").unwrap();
        let err = store.create(ElementType::Manifest, "m2").unwrap_err();
        assert_eq!(err, StoreError::ManifestExists { existing: "m1".into() });
        assert!(store.manifest().is_some());
    }

    #[test]
    fn insertion_order_preserved() {
        let mut store = ElementStore::new();
        for id in ["c", "a", "b"] {
            store.create(ElementType::Widget, id).unwrap();
        }
        let ids: Vec<&str> = store.elements(ElementType::Widget).iter().map(Element::id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn pair_borrow_copies_between_elements() {
        let mut store = ElementStore::new();
        let data = store.create(ElementType::Data, "blob").unwrap();
        store
            .get_mut(data)
            .grow_and_append(&[9, 9, 9], Growth::PrivateData)
            .unwrap();
        let w1 = store.create(ElementType::Widget, "w1").unwrap();
        let w2 = store.create(ElementType::Widget, "w2").unwrap();

        let (widget, blob) = store.get_pair_mut(w2, data).unwrap();
        widget
            .grow_and_append(blob.private_data(), Growth::PrivateData)
            .unwrap();
        assert_eq!(store.get(w2).private_data(), &[9, 9, 9]);

        let (first, second) = store.get_pair_mut(w1, w2).unwrap();
        assert_eq!(first.id(), "w1");
        assert_eq!(second.id(), "w2");
        let (second, first) = store.get_pair_mut(w2, w1).unwrap();
        assert_eq!(second.id(), "w2");
        assert_eq!(first.id(), "w1");
        assert!(store.get_pair_mut(w1, w1).is_none());
    }
}
