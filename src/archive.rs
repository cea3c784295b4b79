//! Archive wire format and writer.
//!
//! Layout (§6.1): opening magic, compressed block payloads in ascending
//! `id`, JSON footer, big-endian footer length, closing magic. Both
//! magics are the same six bytes — unlike the single trailing magic this
//! writer's ancestor used, GXD brackets the payload region on both
//! sides so a reader can sanity-check the file without first locating
//! the footer.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const MAGIC: &[u8; 6] = b"GXDINC";
pub const WRITER_VERSION: &str = "gxd-1";

/// One block's entry in the footer index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub id: u64,
    pub start: u64,
    pub size: u64,
    pub orig_size: u64,
    pub hash: String,
}

/// The footer JSON, written once at the end of the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Footer {
    pub version: String,
    pub algo: String,
    pub global_hash: String,
    pub blocks: Vec<BlockDescriptor>,
}

/// Appends compressed block payloads to `out` in ascending `id` order and
/// finalizes the archive with a footer. Produced records must already be
/// ordered by `id` — the writer does not reorder.
pub struct ArchiveWriter<W: Write> {
    out: W,
    current_offset: u64,
    blocks: Vec<BlockDescriptor>,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(MAGIC)?;
        Ok(Self { out, current_offset: MAGIC.len() as u64, blocks: Vec::new() })
    }

    /// Appends one block's compressed bytes, recording its archive-relative
    /// `start`/`size` in the footer index under construction.
    pub fn write_block(
        &mut self,
        id: u64,
        compressed: &[u8],
        orig_size: u64,
        hash: String,
    ) -> Result<()> {
        let start = self.current_offset;
        self.out.write_all(compressed)?;
        self.current_offset += compressed.len() as u64;
        self.blocks.push(BlockDescriptor {
            id,
            start,
            size: compressed.len() as u64,
            orig_size,
            hash,
        });
        Ok(())
    }

    /// Writes the JSON footer, its length, and the closing magic, then
    /// flushes. Consumes the writer — an archive is finalized exactly once.
    pub fn finalize(mut self, algo: &str, global_hash: String) -> Result<W> {
        let footer = Footer {
            version: WRITER_VERSION.to_string(),
            algo: algo.to_string(),
            global_hash,
            blocks: self.blocks,
        };
        let footer_bytes = serde_json::to_vec(&footer)?;
        self.out.write_all(&footer_bytes)?;
        self.out.write_all(&(footer_bytes.len() as u64).to_be_bytes())?;
        self.out.write_all(MAGIC)?;
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_archive_is_well_formed() {
        let writer = ArchiveWriter::new(Cursor::new(Vec::new())).unwrap();
        let cursor = writer.finalize("none", crate::digest::GlobalHasher::new().finalize_hex()).unwrap();
        let bytes = cursor.into_inner();

        assert!(bytes.len() > 14);
        assert_eq!(&bytes[0..6], MAGIC);
        assert_eq!(&bytes[bytes.len() - 6..], MAGIC);

        let len_bytes = &bytes[bytes.len() - 14..bytes.len() - 6];
        let footer_len = u64::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
        let footer_start = bytes.len() - 14 - footer_len;
        let footer: Footer = serde_json::from_slice(&bytes[footer_start..bytes.len() - 14]).unwrap();
        assert!(footer.blocks.is_empty());
        assert_eq!(footer.algo, "none");
    }

    #[test]
    fn one_block_records_adjacent_start_size() {
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new())).unwrap();
        writer.write_block(0, b"compressed-bytes", 17, "deadbeef".into()).unwrap();
        let cursor = writer.finalize("none", "deadbeef".into()).unwrap();
        let bytes = cursor.into_inner();

        let len_bytes = &bytes[bytes.len() - 14..bytes.len() - 6];
        let footer_len = u64::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
        let footer_start = bytes.len() - 14 - footer_len;
        let footer: Footer = serde_json::from_slice(&bytes[footer_start..bytes.len() - 14]).unwrap();

        assert_eq!(footer.blocks.len(), 1);
        assert_eq!(footer.blocks[0].start, 6);
        assert_eq!(footer.blocks[0].size, "compressed-bytes".len() as u64);
    }
}
