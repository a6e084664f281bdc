use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tplg_store::{Element, ElementStore};
use tplg_types::abi::ABI_VERSION;
use tplg_types::wire::{BlockHeader, WireRecord};
use tplg_types::{BlockType, ElementType};
use tracing::{debug, info};

use crate::error::{WriteError, WriteResult};

/// Values stamped into every block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterOptions {
    pub abi_version: u32,
    pub version: u32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            abi_version: ABI_VERSION,
            version: 0,
        }
    }
}

/// Summary of one written (or read back) block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub block_type: BlockType,
    /// Offset of the block header from the start of the image.
    pub offset: usize,
    pub version: u32,
    pub vendor_type: u32,
    pub index: u32,
    pub count: u32,
    pub payload_size: u32,
}

/// A fully assembled and verified topology image.
#[derive(Clone, Debug)]
pub struct TopologyImage {
    pub bytes: Vec<u8>,
    pub blocks: Vec<BlockInfo>,
}

impl TopologyImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Serializes an element store into the binary topology format.
///
/// Blocks are emitted in [`BlockType::WRITE_ORDER`]. Before each header the
/// writer checks that the image length equals `next_header_offset`, and
/// after each block that the bytes emitted match the payload size declared
/// in the header. Nothing reaches a sink until the whole image is verified.
pub struct TopologyWriter {
    options: WriterOptions,
    image: Vec<u8>,
    next_header_offset: usize,
    blocks: Vec<BlockInfo>,
}

impl TopologyWriter {
    pub fn new(options: WriterOptions) -> Self {
        Self {
            options,
            image: Vec::new(),
            next_header_offset: 0,
            blocks: Vec::new(),
        }
    }

    /// Build the image in memory (no I/O).
    pub fn finish_to_bytes(mut self, store: &ElementStore) -> WriteResult<TopologyImage> {
        for block in BlockType::WRITE_ORDER {
            if block == BlockType::Manifest {
                self.write_manifest(store)?;
                continue;
            }
            let elements: Vec<&Element> = store
                .elements(block.element_type())
                .iter()
                .filter(|e| !e.is_compound())
                .collect();
            self.write_block(block, &elements)?;
        }
        info!(
            size = self.image.len(),
            blocks = self.blocks.len(),
            "topology image assembled"
        );
        Ok(TopologyImage {
            bytes: self.image,
            blocks: self.blocks,
        })
    }

    /// Build the image and hand it to `sink` in a single write.
    ///
    /// A short write is reported as [`WriteError::ShortWrite`] and is not
    /// retried.
    pub fn finish<W: Write>(self, store: &ElementStore, sink: &mut W) -> WriteResult<TopologyImage> {
        let image = self.finish_to_bytes(store)?;
        let written = sink.write(&image.bytes)?;
        if written != image.bytes.len() {
            return Err(WriteError::ShortWrite {
                written,
                expected: image.bytes.len(),
            });
        }
        sink.flush()?;
        Ok(image)
    }

    /// Build the image and write it to `path`. No file is created if the
    /// image fails verification.
    pub fn finish_to_file(self, store: &ElementStore, path: &Path) -> WriteResult<TopologyImage> {
        let image = self.finish_to_bytes(store)?;
        std::fs::write(path, &image.bytes)?;
        Ok(image)
    }

    fn write_manifest(&mut self, store: &ElementStore) -> WriteResult<()> {
        match store.manifest() {
            Some(key) => self.write_block(BlockType::Manifest, &[store.get(key)]),
            None => {
                let manifest = Element::new(ElementType::Manifest, "manifest");
                self.write_block(BlockType::Manifest, &[&manifest])
            }
        }
    }

    fn write_block(&mut self, block: BlockType, elements: &[&Element]) -> WriteResult<()> {
        let Some(first) = elements.first() else {
            return Ok(());
        };

        if self.image.len() != self.next_header_offset {
            return Err(WriteError::OffsetMismatch {
                block,
                expected: self.next_header_offset,
                actual: self.image.len(),
            });
        }

        let vendor_type = first.vendor_type;
        if let Some(other) = elements.iter().find(|e| e.vendor_type != vendor_type) {
            return Err(WriteError::VendorTypeMismatch {
                block,
                first: vendor_type,
                other: other.vendor_type,
                id: other.id().to_string(),
            });
        }

        let declared: usize = elements.iter().map(|e| e.size() as usize).sum();
        let payload_size = u32::try_from(declared)
            .map_err(|_| WriteError::BlockTooLarge { block, size: declared })?;

        let offset = self.image.len();
        let header = BlockHeader {
            abi: self.options.abi_version,
            version: self.options.version,
            block_type: block.tag(),
            vendor_type,
            payload_size,
            index: 0,
            count: elements.len() as u32,
        };
        header.encode(&mut self.image);

        let payload_start = self.image.len();
        for element in elements {
            element.encode_into(&mut self.image);
        }
        let written = self.image.len() - payload_start;
        if written != declared {
            return Err(WriteError::OffsetMismatch {
                block,
                expected: payload_start + declared,
                actual: self.image.len(),
            });
        }

        self.next_header_offset += BlockHeader::WIRE_SIZE + declared;
        debug!(
            block = %block,
            count = header.count,
            payload_size,
            offset,
            "block written"
        );
        self.blocks.push(BlockInfo {
            block_type: block,
            offset,
            version: header.version,
            vendor_type,
            index: header.index,
            count: header.count,
            payload_size,
        });
        Ok(())
    }
}

impl Default for TopologyWriter {
    fn default() -> Self {
        Self::new(WriterOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_blocks;
    use std::io;
    use tplg_store::Growth;
    use tplg_types::abi::MAGIC;
    use tplg_types::wire::{Manifest, MixerControl};

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn empty_store_writes_default_manifest() {
        let store = ElementStore::new();
        let image = TopologyWriter::default().finish_to_bytes(&store).unwrap();
        assert_eq!(image.len(), BlockHeader::WIRE_SIZE + Manifest::WIRE_SIZE);
        assert_eq!(read_u32(&image.bytes, 0), MAGIC);
        assert_eq!(read_u32(&image.bytes, 4), 5);
        assert_eq!(read_u32(&image.bytes, 12), 8);
        assert_eq!(read_u32(&image.bytes, 16), 36);
        assert_eq!(read_u32(&image.bytes, 24), 112);
        assert_eq!(read_u32(&image.bytes, 32), 1);
    }

    #[test]
    fn blocks_follow_write_order() {
        let mut store = ElementStore::new();
        store.create(ElementType::Graph, "route.0").unwrap();
        store.create(ElementType::Widget, "PGA1").unwrap();
        store.create(ElementType::Mixer, "Gain").unwrap();
        store.create(ElementType::Mixer, "Volume").unwrap();

        let image = TopologyWriter::default().finish_to_bytes(&store).unwrap();
        let order: Vec<BlockType> = image.blocks.iter().map(|b| b.block_type).collect();
        assert_eq!(
            order,
            vec![
                BlockType::Manifest,
                BlockType::Mixer,
                BlockType::Widget,
                BlockType::Graph
            ]
        );
        let mixers = &image.blocks[1];
        assert_eq!(mixers.count, 2);
        assert_eq!(mixers.payload_size as usize, 2 * MixerControl::WIRE_SIZE);
        assert_eq!(read_blocks(&image.bytes).unwrap(), image.blocks);
    }

    #[test]
    fn compound_elements_skipped() {
        let mut store = ElementStore::new();
        let mixer = store.create(ElementType::Mixer, "Gain").unwrap();
        store.get_mut(mixer).mark_compound();
        let image = TopologyWriter::default().finish_to_bytes(&store).unwrap();
        assert_eq!(image.blocks.len(), 1);
    }

    #[test]
    fn one_block_per_collection_at_index_zero() {
        let mut store = ElementStore::new();
        for (id, index) in [("a", 0), ("b", 1), ("c", 0)] {
            let key = store.create(ElementType::Widget, id).unwrap();
            store.get_mut(key).index = index;
        }
        let image = TopologyWriter::default().finish_to_bytes(&store).unwrap();
        let widgets: Vec<(u32, u32)> = image
            .blocks
            .iter()
            .filter(|b| b.block_type == BlockType::Widget)
            .map(|b| (b.index, b.count))
            .collect();
        assert_eq!(widgets, vec![(0, 3)]);
    }

    #[test]
    fn size_override_is_offset_mismatch() {
        let mut store = ElementStore::new();
        let mixer = store.create(ElementType::Mixer, "Gain").unwrap();
        store
            .get_mut(mixer)
            .grow_and_append(&[1, 2, 3, 4], Growth::PrivateData)
            .unwrap();
        let size = store.get(mixer).size();
        store.get_mut(mixer).override_size(size + 8);

        let mut sink = Vec::new();
        let err = TopologyWriter::default()
            .finish(&store, &mut sink)
            .unwrap_err();
        assert!(matches!(
            err,
            WriteError::OffsetMismatch {
                block: BlockType::Mixer,
                ..
            }
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn vendor_types_must_agree() {
        let mut store = ElementStore::new();
        let a = store.create(ElementType::Data, "a").unwrap();
        let b = store.create(ElementType::Data, "b").unwrap();
        store.get_mut(a).vendor_type = 1;
        store.get_mut(b).vendor_type = 2;
        let err = TopologyWriter::default().finish_to_bytes(&store).unwrap_err();
        assert!(matches!(err, WriteError::VendorTypeMismatch { first: 1, other: 2, .. }));
    }

    #[test]
    fn header_stamps_options() {
        let store = ElementStore::new();
        let writer = TopologyWriter::new(WriterOptions {
            abi_version: 5,
            version: 3,
        });
        let image = writer.finish_to_bytes(&store).unwrap();
        assert_eq!(read_u32(&image.bytes, 8), 3);
        assert_eq!(image.blocks[0].version, 3);
    }

    struct HalfSink;

    impl io::Write for HalfSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len() / 2)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_write_reported() {
        let store = ElementStore::new();
        let err = TopologyWriter::default()
            .finish(&store, &mut HalfSink)
            .unwrap_err();
        assert!(matches!(
            err,
            WriteError::ShortWrite {
                written: 74,
                expected: 148
            }
        ));
    }

    #[test]
    fn file_not_created_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tplg");
        let mut store = ElementStore::new();
        let widget = store.create(ElementType::Widget, "w").unwrap();
        store.get_mut(widget).override_size(1);
        assert!(TopologyWriter::default()
            .finish_to_file(&store, &path)
            .is_err());
        assert!(!path.exists());

        let store = ElementStore::new();
        let image = TopologyWriter::default()
            .finish_to_file(&store, &path)
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), image.bytes);
    }
}
