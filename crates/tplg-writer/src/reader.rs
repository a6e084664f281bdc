use tplg_types::abi::{ABI_VERSION, MAGIC};
use tplg_types::wire::{BlockHeader, WireRecord};
use tplg_types::BlockType;

use crate::error::{WriteError, WriteResult};
use crate::writer::BlockInfo;

/// Walk the block headers of a topology image.
///
/// Checks the magic, ABI version, header size and that every payload lies
/// within the image. Payloads themselves are not decoded.
pub fn read_blocks(data: &[u8]) -> WriteResult<Vec<BlockInfo>> {
    let mut blocks = Vec::new();
    let mut offset = 0usize;

    while offset < data.len() {
        let corrupt = |reason: String| WriteError::CorruptBlock { offset, reason };

        let (magic, size, header) = BlockHeader::decode(&data[offset..]).ok_or_else(|| {
            corrupt(format!(
                "{} trailing bytes, too short for a block header",
                data.len() - offset
            ))
        })?;
        if magic != MAGIC {
            return Err(WriteError::InvalidMagic {
                offset,
                actual: magic,
            });
        }
        if header.abi != ABI_VERSION {
            return Err(WriteError::UnsupportedAbi {
                offset,
                abi: header.abi,
            });
        }
        if size as usize != BlockHeader::WIRE_SIZE {
            return Err(corrupt(format!("header size {size}")));
        }
        let block_type = BlockType::from_tag(header.block_type)
            .ok_or_else(|| corrupt(format!("unknown block type {}", header.block_type)))?;

        let end = offset
            .checked_add(BlockHeader::WIRE_SIZE)
            .and_then(|start| start.checked_add(header.payload_size as usize))
            .filter(|end| *end <= data.len())
            .ok_or_else(|| {
                corrupt(format!(
                    "payload of {} bytes runs past the end of the image",
                    header.payload_size
                ))
            })?;

        blocks.push(BlockInfo {
            block_type,
            offset,
            version: header.version,
            vendor_type: header.vendor_type,
            index: header.index,
            count: header.count,
            payload_size: header.payload_size,
        });
        offset = end;
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(block_type: u32, payload_size: u32) -> Vec<u8> {
        BlockHeader {
            abi: ABI_VERSION,
            block_type,
            payload_size,
            count: 1,
            ..Default::default()
        }
        .to_bytes()
    }

    #[test]
    fn walks_consecutive_blocks() {
        let mut image = header(8, 4);
        image.extend_from_slice(&[0; 4]);
        image.extend_from_slice(&header(5, 0));

        let blocks = read_blocks(&image).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block_type, BlockType::Manifest);
        assert_eq!(blocks[1].offset, 40);
        assert_eq!(blocks[1].block_type, BlockType::Widget);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut image = header(8, 0);
        image[0] = 0;
        assert!(matches!(
            read_blocks(&image),
            Err(WriteError::InvalidMagic { offset: 0, .. })
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let image = header(1, 100);
        assert!(matches!(
            read_blocks(&image),
            Err(WriteError::CorruptBlock { offset: 0, .. })
        ));
    }

    #[test]
    fn rejects_other_abi() {
        let mut image = header(8, 0);
        image[4] = 4;
        assert!(matches!(
            read_blocks(&image),
            Err(WriteError::UnsupportedAbi { abi: 4, .. })
        ));
    }

    #[test]
    fn empty_image_has_no_blocks() {
        assert!(read_blocks(&[]).unwrap().is_empty());
    }
}
