use tplg_types::ElementType;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::payload::Payload;
use crate::reference::Reference;

/// What an appended chunk of bytes counts as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Growth {
    /// Private data: the record's `priv_size` grows by the chunk length.
    PrivateData,
    /// A whole encoded kcontrol absorbed by a widget: `num_kcontrols`
    /// grows by one.
    Control,
}

/// One named, typed node of a topology.
///
/// An element is a fixed record ([`Payload`]) followed by a variable
/// trailer. The trailer holds the private data and, for widgets, the
/// controls absorbed after it. `size` always equals the record size plus
/// the trailer length; the only ways to extend the trailer are
/// [`Element::grow_and_append`] and [`Element::grow_and_insert`], which
/// update the size and the embedded counter together.
#[derive(Clone, Debug)]
pub struct Element {
    id: String,
    kind: ElementType,
    /// Group index written into the block header.
    pub index: u32,
    /// Vendor type written into the block header.
    pub vendor_type: u32,
    size: u32,
    compound: bool,
    payload: Payload,
    trailer: Vec<u8>,
    references: Vec<Reference>,
}

impl Element {
    /// A new element with a default record named after `id`.
    pub fn new(kind: ElementType, id: impl Into<String>) -> Self {
        let id = id.into();
        let payload = Payload::default_for(kind, &id);
        Self::with_payload(id, payload)
    }

    /// A new element around an existing record.
    pub fn with_payload(id: impl Into<String>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            kind: payload.element_type(),
            index: 0,
            vendor_type: 0,
            size: payload.wire_size() as u32,
            compound: false,
            payload,
            trailer: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ElementType {
        self.kind
    }

    /// Total encoded size: record plus trailer.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns `true` once the element has been absorbed into another one.
    /// Compound elements are not written as blocks of their own.
    pub fn is_compound(&self) -> bool {
        self.compound
    }

    pub fn mark_compound(&mut self) {
        self.compound = true;
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Edit the record in place.
    ///
    /// `priv_size` and `num_kcontrols` are restored after `edit` returns;
    /// they only change through [`Element::grow_and_append`]. The edit must
    /// keep the payload variant.
    pub fn update<R>(&mut self, edit: impl FnOnce(&mut Payload) -> R) -> R {
        let counters = self.payload.counters();
        let out = edit(&mut self.payload);
        debug_assert_eq!(self.payload.element_type(), self.kind);
        self.payload.restore_counters(counters);
        out
    }

    /// The private data bytes (excluding absorbed controls).
    pub fn private_data(&self) -> &[u8] {
        let len = self
            .payload
            .priv_size()
            .map_or(0, |size| size as usize)
            .min(self.trailer.len());
        &self.trailer[..len]
    }

    /// Everything after the fixed record.
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn references_mut(&mut self) -> &mut [Reference] {
        &mut self.references
    }

    /// Declare a by-name reference; `slot` defaults to declaration order.
    pub fn add_reference(&mut self, kind: ElementType, target: impl Into<String>) {
        let slot = self.references.len();
        self.references.push(Reference::new(kind, target, slot));
    }

    /// Declare a reference bound to an explicit record slot.
    pub fn add_reference_at(&mut self, kind: ElementType, target: impl Into<String>, slot: usize) {
        self.references.push(Reference::new(kind, target, slot));
    }

    /// Append `bytes` to the trailer and account for them.
    ///
    /// On success `size` has grown by `bytes.len()` and the embedded
    /// counter selected by `growth` has been updated. On error nothing
    /// has changed.
    pub fn grow_and_append(&mut self, bytes: &[u8], growth: Growth) -> StoreResult<()> {
        self.grow(None, bytes, growth)
    }

    /// Insert `bytes` into the private data at offset `at`, with the same
    /// accounting as [`Element::grow_and_append`].
    pub fn grow_and_insert(&mut self, at: usize, bytes: &[u8]) -> StoreResult<()> {
        self.grow(Some(at), bytes, Growth::PrivateData)
    }

    fn grow(&mut self, at: Option<usize>, bytes: &[u8], growth: Growth) -> StoreResult<()> {
        let len = bytes.len();
        let alloc_failure = || StoreError::AllocationFailure {
            kind: self.kind,
            id: self.id.clone(),
            len,
        };

        let new_size = (self.size as usize)
            .checked_add(len)
            .and_then(|size| u32::try_from(size).ok())
            .ok_or_else(alloc_failure)?;

        match growth {
            Growth::PrivateData => {
                let priv_size = self.payload.priv_size().ok_or_else(|| StoreError::NoPrivateArea {
                    kind: self.kind,
                    id: self.id.clone(),
                })?;
                if self.payload.num_kcontrols().is_some_and(|n| n > 0) {
                    return Err(StoreError::DataAfterControls {
                        id: self.id.clone(),
                    });
                }
                u32::try_from(len)
                    .ok()
                    .and_then(|len| priv_size.checked_add(len))
                    .ok_or_else(alloc_failure)?;
                if let Some(at) = at.filter(|&at| at > self.trailer.len()) {
                    return Err(StoreError::OutOfBounds {
                        kind: self.kind,
                        id: self.id.clone(),
                        at,
                        len: self.trailer.len(),
                    });
                }
            }
            Growth::Control => {
                if !matches!(self.payload, Payload::Widget(_)) {
                    return Err(StoreError::NotAWidget {
                        kind: self.kind,
                        id: self.id.clone(),
                    });
                }
            }
        }

        self.trailer.try_reserve(len).map_err(|_| alloc_failure())?;

        // Checks are done; nothing below can fail.
        match at {
            Some(at) => {
                let tail = self.trailer.split_off(at);
                self.trailer.extend_from_slice(bytes);
                self.trailer.extend_from_slice(&tail);
            }
            None => self.trailer.extend_from_slice(bytes),
        }
        self.size = new_size;
        match (growth, &mut self.payload) {
            (Growth::Control, Payload::Widget(widget)) => widget.num_kcontrols += 1,
            (Growth::PrivateData, payload) => {
                if let Some(priv_size) = payload.priv_size_mut() {
                    *priv_size += len as u32;
                }
            }
            (Growth::Control, _) => {}
        }
        debug!(kind = %self.kind, id = %self.id, len, size = self.size, ?growth, "element grown");
        Ok(())
    }

    /// Force the recorded size, bypassing accounting. Only useful for
    /// exercising the writer's consistency checks.
    pub fn override_size(&mut self, size: u32) {
        self.size = size;
    }

    /// Returns `true` if `size` matches the encoded length and the private
    /// data counter fits inside the trailer.
    pub fn is_consistent(&self) -> bool {
        let encoded = self.payload.wire_size() + self.trailer.len();
        let private_ok = match (self.payload.priv_size(), self.payload.num_kcontrols()) {
            (Some(priv_size), Some(_)) => priv_size as usize <= self.trailer.len(),
            (Some(priv_size), None) => priv_size as usize == self.trailer.len(),
            (None, _) => self.trailer.is_empty(),
        };
        self.size as usize == encoded && private_ok
    }

    /// Append the encoded record and trailer to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        self.payload.encode(buf);
        buf.extend_from_slice(&self.trailer);
    }

    /// The encoded record and trailer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.payload.wire_size() + self.trailer.len());
        self.encode_into(&mut buf);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tplg_types::wire::{DapmWidget, MixerControl, WireRecord};

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn new_element_size_is_record_size() {
        let mixer = Element::new(ElementType::Mixer, "Master");
        assert_eq!(mixer.size() as usize, MixerControl::WIRE_SIZE);
        assert!(mixer.is_consistent());
        assert_eq!(mixer.to_bytes().len(), mixer.size() as usize);
    }

    #[test]
    fn private_data_updates_size_and_counter() {
        let mut mixer = Element::new(ElementType::Mixer, "Master");
        mixer.grow_and_append(&[1, 2, 3, 4, 5], Growth::PrivateData).unwrap();

        assert_eq!(mixer.size() as usize, MixerControl::WIRE_SIZE + 5);
        assert_eq!(mixer.payload().priv_size(), Some(5));
        assert_eq!(mixer.private_data(), &[1, 2, 3, 4, 5]);

        let bytes = mixer.to_bytes();
        assert_eq!(read_u32(&bytes, 356), 5);
        assert_eq!(&bytes[360..], &[1, 2, 3, 4, 5]);
        assert!(mixer.is_consistent());
    }

    #[test]
    fn widget_absorbs_controls_after_data() {
        let mut widget = Element::new(ElementType::Widget, "PGA1");
        widget.grow_and_append(&[0xaa; 8], Growth::PrivateData).unwrap();
        let control = Element::new(ElementType::Mixer, "Gain").to_bytes();
        widget.grow_and_append(&control, Growth::Control).unwrap();

        let record = DapmWidget::WIRE_SIZE;
        assert_eq!(widget.size() as usize, record + 8 + control.len());
        assert_eq!(widget.payload().num_kcontrols(), Some(1));
        assert_eq!(widget.payload().priv_size(), Some(8));
        assert_eq!(widget.private_data().len(), 8);

        let bytes = widget.to_bytes();
        assert_eq!(read_u32(&bytes, 124), 1);
        assert_eq!(read_u32(&bytes, 128), 8);
        assert!(widget.is_consistent());
    }

    #[test]
    fn data_after_controls_rejected() {
        let mut widget = Element::new(ElementType::Widget, "PGA1");
        widget.grow_and_append(&[0; 16], Growth::Control).unwrap();
        let before = widget.size();

        let err = widget.grow_and_append(&[1], Growth::PrivateData).unwrap_err();
        assert_eq!(err, StoreError::DataAfterControls { id: "PGA1".into() });
        assert_eq!(widget.size(), before);
        assert_eq!(widget.payload().priv_size(), Some(0));
    }

    #[test]
    fn insert_splices_private_data() {
        let mut data = Element::new(ElementType::Data, "d");
        data.grow_and_append(&[1, 4], Growth::PrivateData).unwrap();
        data.grow_and_insert(1, &[2, 3]).unwrap();
        data.grow_and_insert(0, &[0]).unwrap();
        assert_eq!(data.private_data(), &[0, 1, 2, 3, 4]);
        assert_eq!(data.payload().priv_size(), Some(5));
        assert!(data.is_consistent());

        let err = data.grow_and_insert(6, &[9]).unwrap_err();
        assert!(matches!(err, StoreError::OutOfBounds { at: 6, len: 5, .. }));
        assert_eq!(data.private_data().len(), 5);
    }

    #[test]
    fn kinds_without_private_area_rejected() {
        let mut graph = Element::new(ElementType::Graph, "g");
        let err = graph.grow_and_append(&[1], Growth::PrivateData).unwrap_err();
        assert!(matches!(err, StoreError::NoPrivateArea { .. }));

        let mut mixer = Element::new(ElementType::Mixer, "m");
        let err = mixer.grow_and_append(&[1], Growth::Control).unwrap_err();
        assert!(matches!(err, StoreError::NotAWidget { .. }));
        assert!(mixer.is_consistent());
    }

    #[test]
    fn update_cannot_touch_counters() {
        let mut mixer = Element::new(ElementType::Mixer, "m");
        mixer.update(|payload| {
            if let Payload::Mixer(m) = payload {
                m.max = 10;
                m.priv_size = 1000;
            }
        });
        let Payload::Mixer(m) = mixer.payload() else {
            panic!("expected mixer");
        };
        assert_eq!(m.max, 10);
        assert_eq!(m.priv_size, 0);
        assert!(mixer.is_consistent());
    }

    #[test]
    fn override_size_breaks_consistency() {
        let mut pcm = Element::new(ElementType::Pcm, "pcm0");
        pcm.override_size(pcm.size() + 4);
        assert!(!pcm.is_consistent());
    }

    #[test]
    fn references_keep_declaration_slots() {
        let mut widget = Element::new(ElementType::Widget, "w");
        widget.add_reference(ElementType::Mixer, "a");
        widget.add_reference(ElementType::Mixer, "b");
        widget.add_reference_at(ElementType::StreamCaps, "caps", 1);
        let slots: Vec<usize> = widget.references().iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![0, 1, 1]);
        assert!(widget.references().iter().all(|r| !r.is_resolved()));
    }

    proptest! {
        #[test]
        fn size_tracks_every_growth(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..12)) {
            let mut element = Element::new(ElementType::BackendLink, "be");
            let mut total = 0usize;
            for chunk in &chunks {
                element.grow_and_append(chunk, Growth::PrivateData).unwrap();
                total += chunk.len();
            }
            prop_assert!(element.is_consistent());
            prop_assert_eq!(element.payload().priv_size(), Some(total as u32));
            prop_assert_eq!(element.to_bytes().len(), element.size() as usize);
        }
    }
}
