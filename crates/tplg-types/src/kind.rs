use std::fmt;

use serde::{Deserialize, Serialize};

/// Every kind of element a topology project can hold.
///
/// Each kind owns one ordered collection in the element store. Only the
/// kinds that map to a [`BlockType`] are ever written to the output file;
/// the others (TLV, text, tokens, tuples, stream descriptors) exist to be
/// referenced and merged into the written ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Tlv,
    Mixer,
    Enum,
    Text,
    Data,
    Bytes,
    StreamConfig,
    StreamCaps,
    Pcm,
    Widget,
    Graph,
    BackendLink,
    CodecLink,
    HwConfig,
    Token,
    Tuple,
    Manifest,
}

impl ElementType {
    /// Number of element kinds.
    pub const COUNT: usize = 17;

    /// All kinds, in declaration order.
    pub const ALL: [ElementType; Self::COUNT] = [
        Self::Tlv,
        Self::Mixer,
        Self::Enum,
        Self::Text,
        Self::Data,
        Self::Bytes,
        Self::StreamConfig,
        Self::StreamCaps,
        Self::Pcm,
        Self::Widget,
        Self::Graph,
        Self::BackendLink,
        Self::CodecLink,
        Self::HwConfig,
        Self::Token,
        Self::Tuple,
        Self::Manifest,
    ];

    /// Dense index of this kind, usable as a collection slot.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Short lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tlv => "tlv",
            Self::Mixer => "mixer",
            Self::Enum => "enum",
            Self::Text => "text",
            Self::Data => "data",
            Self::Bytes => "bytes",
            Self::StreamConfig => "stream config",
            Self::StreamCaps => "stream caps",
            Self::Pcm => "pcm",
            Self::Widget => "widget",
            Self::Graph => "graph",
            Self::BackendLink => "backend link",
            Self::CodecLink => "codec link",
            Self::HwConfig => "hw config",
            Self::Token => "token",
            Self::Tuple => "tuple",
            Self::Manifest => "manifest",
        }
    }

    /// The output block this kind is written into, if any.
    pub fn block(self) -> Option<BlockType> {
        match self {
            Self::Manifest => Some(BlockType::Manifest),
            Self::Mixer => Some(BlockType::Mixer),
            Self::Enum => Some(BlockType::Enum),
            Self::Bytes => Some(BlockType::Bytes),
            Self::Widget => Some(BlockType::Widget),
            Self::Pcm => Some(BlockType::Pcm),
            Self::BackendLink => Some(BlockType::BackendLink),
            Self::CodecLink => Some(BlockType::CodecLink),
            Self::Graph => Some(BlockType::Graph),
            Self::Data => Some(BlockType::Data),
            _ => None,
        }
    }

    /// Returns `true` for the three kcontrol kinds.
    pub fn is_control(self) -> bool {
        matches!(self, Self::Mixer | Self::Enum | Self::Bytes)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Block type tags as they appear in the block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Mixer,
    Bytes,
    Enum,
    Graph,
    Widget,
    Pcm,
    Manifest,
    CodecLink,
    BackendLink,
    Data,
}

impl BlockType {
    /// Blocks in the order the writer emits them.
    pub const WRITE_ORDER: [BlockType; 10] = [
        Self::Manifest,
        Self::Mixer,
        Self::Enum,
        Self::Bytes,
        Self::Widget,
        Self::Pcm,
        Self::BackendLink,
        Self::CodecLink,
        Self::Graph,
        Self::Data,
    ];

    /// The on-disk type tag.
    pub fn tag(self) -> u32 {
        match self {
            Self::Mixer => 1,
            Self::Bytes => 2,
            Self::Enum => 3,
            Self::Graph => 4,
            Self::Widget => 5,
            Self::Pcm => 7,
            Self::Manifest => 8,
            Self::CodecLink => 9,
            Self::BackendLink => 10,
            Self::Data => 11,
        }
    }

    /// Parse an on-disk type tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Mixer),
            2 => Some(Self::Bytes),
            3 => Some(Self::Enum),
            4 => Some(Self::Graph),
            5 => Some(Self::Widget),
            7 => Some(Self::Pcm),
            8 => Some(Self::Manifest),
            9 => Some(Self::CodecLink),
            10 => Some(Self::BackendLink),
            11 => Some(Self::Data),
            _ => None,
        }
    }

    /// The element kind stored in this block.
    pub fn element_type(self) -> ElementType {
        match self {
            Self::Mixer => ElementType::Mixer,
            Self::Bytes => ElementType::Bytes,
            Self::Enum => ElementType::Enum,
            Self::Graph => ElementType::Graph,
            Self::Widget => ElementType::Widget,
            Self::Pcm => ElementType::Pcm,
            Self::Manifest => ElementType::Manifest,
            Self::CodecLink => ElementType::CodecLink,
            Self::BackendLink => ElementType::BackendLink,
            Self::Data => ElementType::Data,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_type().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_dense() {
        for (i, kind) in ElementType::ALL.iter().enumerate() {
            assert_eq!(kind.slot(), i);
        }
    }

    #[test]
    fn block_tags_roundtrip() {
        for block in BlockType::WRITE_ORDER {
            assert_eq!(BlockType::from_tag(block.tag()), Some(block));
            assert_eq!(block.element_type().block(), Some(block));
        }
    }

    #[test]
    fn unknown_tags() {
        assert!(BlockType::from_tag(0).is_none());
        assert!(BlockType::from_tag(6).is_none());
        assert!(BlockType::from_tag(12).is_none());
    }

    #[test]
    fn referenced_only_kinds_have_no_block() {
        for kind in [
            ElementType::Tlv,
            ElementType::Text,
            ElementType::StreamConfig,
            ElementType::StreamCaps,
            ElementType::HwConfig,
            ElementType::Token,
            ElementType::Tuple,
        ] {
            assert!(kind.block().is_none(), "{kind} should not be written");
        }
    }
}
