//! Reader / footer parser (§4.5).
//!
//! Opens an archive file, validates both magics, parses the footer JSON,
//! and checks block adjacency — then exposes a random-access block
//! index for the seek planner and decode plane to use. Block payload
//! reads go through a memory-mapped view of the file, the same
//! random-access mechanism this codebase's seekable-archive reader
//! uses, so concurrent workers can slice out their block without each
//! opening and seeking an independent file handle.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::archive::{BlockDescriptor, Footer, MAGIC};
use crate::codec::Algo;
use crate::error::{GxdError, Result};

const LENGTH_FIELD_SIZE: u64 = 8;
const TRAILER_SIZE: u64 = LENGTH_FIELD_SIZE + MAGIC.len() as u64; // 14

pub struct ArchiveReader {
    mmap: Arc<Mmap>,
    algo: Algo,
    global_hash: String,
    blocks: Vec<BlockDescriptor>,
}

impl ArchiveReader {
    /// Opens `path`, validates the wire format, and parses the footer.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.seek(SeekFrom::End(0))?;
        if file_size < MAGIC.len() as u64 + TRAILER_SIZE {
            return Err(GxdError::CorruptFooter("file too short for a footer".into()));
        }

        let mut closing = [0u8; 6];
        file.seek(SeekFrom::End(-(MAGIC.len() as i64)))?;
        file.read_exact(&mut closing)?;
        if &closing != MAGIC {
            return Err(GxdError::BadMagic);
        }

        let mut len_bytes = [0u8; 8];
        file.seek(SeekFrom::End(-(TRAILER_SIZE as i64)))?;
        file.read_exact(&mut len_bytes)?;
        let footer_len = u64::from_be_bytes(len_bytes);

        if footer_len == 0 || footer_len > file_size - TRAILER_SIZE {
            return Err(GxdError::CorruptFooter("impossible footer length".into()));
        }

        let footer_start = file_size - TRAILER_SIZE - footer_len;
        let mut footer_bytes = vec![0u8; footer_len as usize];
        file.seek(SeekFrom::Start(footer_start))?;
        file.read_exact(&mut footer_bytes)?;
        let footer: Footer = serde_json::from_slice(&footer_bytes)
            .map_err(|e| GxdError::CorruptFooter(e.to_string()))?;

        let algo = Algo::from_name(&footer.algo)?;

        let mut opening = [0u8; 6];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut opening)?;
        if &opening != MAGIC {
            return Err(GxdError::BadMagic);
        }

        validate_adjacency(&footer.blocks, footer_start)?;

        // Safety contract of `memmap2::Mmap::map`: the file must not be
        // truncated or otherwise mutated for the mapping's lifetime.
        // Archives are immutable once written (§1 non-goals), so this
        // holds for any well-behaved caller.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            mmap: Arc::new(mmap),
            algo,
            global_hash: footer.global_hash,
            blocks: footer.blocks,
        })
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, i: usize) -> &BlockDescriptor {
        &self.blocks[i]
    }

    pub fn blocks(&self) -> &[BlockDescriptor] {
        &self.blocks
    }

    pub fn algo(&self) -> Algo {
        self.algo
    }

    pub fn global_hash(&self) -> &str {
        &self.global_hash
    }

    /// Total length of the original (decoded) input, i.e. `C[N]`.
    pub fn total_orig_size(&self) -> u64 {
        self.blocks.iter().map(|b| b.orig_size).sum()
    }

    /// Returns block `i`'s compressed bytes as a slice of the archive's
    /// memory-mapped view. Cheap to call from multiple worker threads
    /// concurrently since `Mmap` is shared, read-only, and `Sync`.
    pub fn read_block_bytes(&self, i: usize) -> Result<Vec<u8>> {
        let desc = &self.blocks[i];
        let start = desc.start as usize;
        let end = start + desc.size as usize;
        self.mmap
            .get(start..end)
            .map(|slice| slice.to_vec())
            .ok_or_else(|| GxdError::CorruptFooter(format!("block {i} out of bounds")))
    }
}

fn validate_adjacency(blocks: &[BlockDescriptor], payload_end: u64) -> Result<()> {
    let mut expected_start = MAGIC.len() as u64;
    for (i, block) in blocks.iter().enumerate() {
        if block.id != i as u64 {
            return Err(GxdError::CorruptFooter(format!(
                "block id {} out of order at index {i}",
                block.id
            )));
        }
        if block.start != expected_start {
            return Err(GxdError::CorruptFooter(format!(
                "block {} start {} does not follow previous block",
                block.id, block.start
            )));
        }
        expected_start = block.start + block.size;
    }
    if expected_start != payload_end {
        return Err(GxdError::CorruptFooter(
            "final block does not end at the footer boundary".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveWriter;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn write_sample_archive() -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        let mut writer = ArchiveWriter::new(Vec::new()).unwrap();
        writer.write_block(0, b"aaaa", 4, crate::digest::block_hash(b"aaaa")).unwrap();
        writer.write_block(1, b"bb", 2, crate::digest::block_hash(b"bb")).unwrap();
        let mut global = crate::digest::GlobalHasher::new();
        global.update(b"aaaa");
        global.update(b"bb");
        let bytes = writer.finalize("none", global.finalize_hex()).unwrap();
        tmp.write_all(&bytes).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn opens_and_parses_footer() {
        let tmp = write_sample_archive();
        let reader = ArchiveReader::open(tmp.path()).unwrap();
        assert_eq!(reader.block_count(), 2);
        assert_eq!(reader.algo(), Algo::None);
        assert_eq!(reader.total_orig_size(), 6);
    }

    #[test]
    fn corrupted_closing_magic_is_bad_magic() {
        let tmp = write_sample_archive();
        let mut bytes = std::fs::read(tmp.path()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(tmp.path(), &bytes).unwrap();
        assert!(matches!(ArchiveReader::open(tmp.path()), Err(GxdError::BadMagic)));
    }

    #[test]
    fn truncation_is_rejected() {
        let tmp = write_sample_archive();
        let bytes = std::fs::read(tmp.path()).unwrap();
        let truncated = &bytes[..bytes.len() - 20];
        std::fs::write(tmp.path(), truncated).unwrap();
        let result = ArchiveReader::open(tmp.path());
        assert!(matches!(
            result,
            Err(GxdError::BadMagic) | Err(GxdError::CorruptFooter(_))
        ));
    }
}
