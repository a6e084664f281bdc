use serde::{Deserialize, Serialize};
use tplg_tuple::{TokenTable, TupleTable};
use tplg_types::abi::access;
use tplg_types::wire::{
    BytesControl, CtlHdr, CtlTlv, DapmWidget, GraphElem, HwConfig, LinkConfig, Manifest,
    MixerControl, Pcm, PrivateHeader, Stream, StreamCaps, EnumControl, WireRecord,
};
use tplg_types::{BlockType, ElementType};

/// Ordered list of enum item names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTable {
    pub values: Vec<String>,
}

/// The typed record carried by an element.
///
/// Exactly one variant per [`ElementType`]. Variants that wrap a wire
/// record encode to that record; the rest (text, tokens, tuples) are only
/// ever merged into other elements and encode to nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Tlv(CtlTlv),
    Mixer(MixerControl),
    Enum(EnumControl),
    Text(TextTable),
    Data(PrivateHeader),
    Bytes(BytesControl),
    StreamConfig(Stream),
    StreamCaps(StreamCaps),
    Pcm(Pcm),
    Widget(DapmWidget),
    Graph(GraphElem),
    BackendLink(LinkConfig),
    CodecLink(LinkConfig),
    HwConfig(HwConfig),
    Token(TokenTable),
    Tuple(TupleTable),
    Manifest(Manifest),
}

/// Embedded counters that only the growth primitive may change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Counters {
    pub priv_size: Option<u32>,
    pub num_kcontrols: Option<u32>,
}

fn control_hdr(block: BlockType, name: &str) -> CtlHdr {
    CtlHdr {
        ctl_type: block.tag(),
        name: name.to_string(),
        access: access::READWRITE,
        ..Default::default()
    }
}

impl Payload {
    /// The freshly initialised record for `kind`, named `name`.
    pub fn default_for(kind: ElementType, name: &str) -> Self {
        match kind {
            ElementType::Tlv => Self::Tlv(CtlTlv::default()),
            ElementType::Mixer => Self::Mixer(MixerControl {
                hdr: control_hdr(BlockType::Mixer, name),
                ..Default::default()
            }),
            ElementType::Enum => Self::Enum(EnumControl {
                hdr: control_hdr(BlockType::Enum, name),
                ..Default::default()
            }),
            ElementType::Bytes => Self::Bytes(BytesControl {
                hdr: control_hdr(BlockType::Bytes, name),
                ..Default::default()
            }),
            ElementType::Text => Self::Text(TextTable::default()),
            ElementType::Data => Self::Data(PrivateHeader::default()),
            ElementType::StreamConfig => Self::StreamConfig(Stream {
                name: name.to_string(),
                ..Default::default()
            }),
            ElementType::StreamCaps => Self::StreamCaps(StreamCaps {
                name: name.to_string(),
                ..Default::default()
            }),
            ElementType::Pcm => Self::Pcm(Pcm {
                pcm_name: name.to_string(),
                ..Default::default()
            }),
            ElementType::Widget => Self::Widget(DapmWidget {
                name: name.to_string(),
                ..Default::default()
            }),
            ElementType::Graph => Self::Graph(GraphElem::default()),
            ElementType::BackendLink => Self::BackendLink(LinkConfig {
                name: name.to_string(),
                ..Default::default()
            }),
            ElementType::CodecLink => Self::CodecLink(LinkConfig {
                name: name.to_string(),
                ..Default::default()
            }),
            ElementType::HwConfig => Self::HwConfig(HwConfig::default()),
            ElementType::Token => Self::Token(TokenTable::default()),
            ElementType::Tuple => Self::Tuple(TupleTable::default()),
            ElementType::Manifest => Self::Manifest(Manifest::default()),
        }
    }

    /// The kind this payload belongs to.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Tlv(_) => ElementType::Tlv,
            Self::Mixer(_) => ElementType::Mixer,
            Self::Enum(_) => ElementType::Enum,
            Self::Text(_) => ElementType::Text,
            Self::Data(_) => ElementType::Data,
            Self::Bytes(_) => ElementType::Bytes,
            Self::StreamConfig(_) => ElementType::StreamConfig,
            Self::StreamCaps(_) => ElementType::StreamCaps,
            Self::Pcm(_) => ElementType::Pcm,
            Self::Widget(_) => ElementType::Widget,
            Self::Graph(_) => ElementType::Graph,
            Self::BackendLink(_) => ElementType::BackendLink,
            Self::CodecLink(_) => ElementType::CodecLink,
            Self::HwConfig(_) => ElementType::HwConfig,
            Self::Token(_) => ElementType::Token,
            Self::Tuple(_) => ElementType::Tuple,
            Self::Manifest(_) => ElementType::Manifest,
        }
    }

    /// Encoded size of the fixed record.
    pub fn wire_size(&self) -> usize {
        match self {
            Self::Tlv(_) => CtlTlv::WIRE_SIZE,
            Self::Mixer(_) => MixerControl::WIRE_SIZE,
            Self::Enum(_) => EnumControl::WIRE_SIZE,
            Self::Data(_) => PrivateHeader::WIRE_SIZE,
            Self::Bytes(_) => BytesControl::WIRE_SIZE,
            Self::StreamConfig(_) => Stream::WIRE_SIZE,
            Self::StreamCaps(_) => StreamCaps::WIRE_SIZE,
            Self::Pcm(_) => Pcm::WIRE_SIZE,
            Self::Widget(_) => DapmWidget::WIRE_SIZE,
            Self::Graph(_) => GraphElem::WIRE_SIZE,
            Self::BackendLink(_) | Self::CodecLink(_) => LinkConfig::WIRE_SIZE,
            Self::HwConfig(_) => HwConfig::WIRE_SIZE,
            Self::Manifest(_) => Manifest::WIRE_SIZE,
            Self::Text(_) | Self::Token(_) | Self::Tuple(_) => 0,
        }
    }

    /// Append the fixed record to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Tlv(r) => r.encode(buf),
            Self::Mixer(r) => r.encode(buf),
            Self::Enum(r) => r.encode(buf),
            Self::Data(r) => r.encode(buf),
            Self::Bytes(r) => r.encode(buf),
            Self::StreamConfig(r) => r.encode(buf),
            Self::StreamCaps(r) => r.encode(buf),
            Self::Pcm(r) => r.encode(buf),
            Self::Widget(r) => r.encode(buf),
            Self::Graph(r) => r.encode(buf),
            Self::BackendLink(r) | Self::CodecLink(r) => r.encode(buf),
            Self::HwConfig(r) => r.encode(buf),
            Self::Manifest(r) => r.encode(buf),
            Self::Text(_) | Self::Token(_) | Self::Tuple(_) => {}
        }
    }

    /// Embedded private data length, for records that carry one.
    pub fn priv_size(&self) -> Option<u32> {
        match self {
            Self::Mixer(r) => Some(r.priv_size),
            Self::Enum(r) => Some(r.priv_size),
            Self::Bytes(r) => Some(r.priv_size),
            Self::Widget(r) => Some(r.priv_size),
            Self::Pcm(r) => Some(r.priv_size),
            Self::BackendLink(r) | Self::CodecLink(r) => Some(r.priv_size),
            Self::Manifest(r) => Some(r.priv_size),
            Self::Data(r) => Some(r.size),
            _ => None,
        }
    }

    pub(crate) fn priv_size_mut(&mut self) -> Option<&mut u32> {
        match self {
            Self::Mixer(r) => Some(&mut r.priv_size),
            Self::Enum(r) => Some(&mut r.priv_size),
            Self::Bytes(r) => Some(&mut r.priv_size),
            Self::Widget(r) => Some(&mut r.priv_size),
            Self::Pcm(r) => Some(&mut r.priv_size),
            Self::BackendLink(r) | Self::CodecLink(r) => Some(&mut r.priv_size),
            Self::Manifest(r) => Some(&mut r.priv_size),
            Self::Data(r) => Some(&mut r.size),
            _ => None,
        }
    }

    /// Number of controls absorbed by a widget.
    pub fn num_kcontrols(&self) -> Option<u32> {
        match self {
            Self::Widget(w) => Some(w.num_kcontrols),
            _ => None,
        }
    }

    pub(crate) fn counters(&self) -> Counters {
        Counters {
            priv_size: self.priv_size(),
            num_kcontrols: self.num_kcontrols(),
        }
    }

    pub(crate) fn restore_counters(&mut self, counters: Counters) {
        if let (Some(slot), Some(value)) = (self.priv_size_mut(), counters.priv_size) {
            *slot = value;
        }
        if let (Self::Widget(w), Some(value)) = (self, counters.num_kcontrols) {
            w.num_kcontrols = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_kind() {
        for kind in ElementType::ALL {
            assert_eq!(Payload::default_for(kind, "x").element_type(), kind);
        }
    }

    #[test]
    fn encoded_length_matches_wire_size() {
        for kind in ElementType::ALL {
            let payload = Payload::default_for(kind, "name");
            let mut buf = Vec::new();
            payload.encode(&mut buf);
            assert_eq!(buf.len(), payload.wire_size(), "{kind}");
        }
    }

    #[test]
    fn controls_start_read_write() {
        let Payload::Mixer(mixer) = Payload::default_for(ElementType::Mixer, "Master") else {
            panic!("expected mixer");
        };
        assert_eq!(mixer.hdr.name, "Master");
        assert_eq!(mixer.hdr.ctl_type, 1);
        assert_eq!(mixer.hdr.access, access::READWRITE);
    }

    #[test]
    fn restore_counters_undoes_edits() {
        let mut payload = Payload::default_for(ElementType::Widget, "w");
        let saved = payload.counters();
        if let Payload::Widget(w) = &mut payload {
            w.priv_size = 99;
            w.num_kcontrols = 3;
        }
        payload.restore_counters(saved);
        assert_eq!(payload.priv_size(), Some(0));
        assert_eq!(payload.num_kcontrols(), Some(0));
    }
}
