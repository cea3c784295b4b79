//! Parallel block processor (write path, §4.3) and the `compress` engine
//! entry point (§6.2).
//!
//! Workers are dispatched on a dedicated `rayon` thread pool sized to the
//! caller's `threads` option (clamped `[1, 128]`), each opening its own
//! read handle on the source file — the same "every worker owns its
//! handle" resource model this codebase's extraction path uses. Finished
//! records are tagged with their block id and sent over an unbounded
//! `crossbeam_channel`; the coordinator drains them into an
//! index-sized slot buffer and flattens it in ascending `id` order
//! before handing anything to the archive writer.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crossbeam_channel::unbounded;

use crate::archive::ArchiveWriter;
use crate::codec::{self, Algo};
use crate::digest::{self, GlobalHasher};
use crate::error::{GxdError, Result};
use crate::layout::plan_blocks;
use crate::progress::ProgressSink;

const MIN_THREADS: usize = 1;
const MAX_THREADS: usize = 128;

/// Options accepted by [`compress`]. Mirrors §6.2's `compress` signature.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub algo: Algo,
    /// Honored only by `zstd`, range `[1, 22]`.
    pub level: i32,
    pub block_size: u64,
    /// `0` means "auto-detect": the host's logical core count.
    pub threads: usize,
    /// Per §6.2, this is a no-op at write time: the format requires a
    /// `hash` per block, so digests are always computed regardless of
    /// this flag. Kept for API symmetry with `decompress`/`seek`.
    pub verify: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            algo: Algo::Zstd,
            level: 3,
            block_size: 4 * 1024 * 1024,
            threads: 0,
            verify: true,
        }
    }
}

struct CompressedBlock {
    id: u64,
    compressed: Vec<u8>,
    orig_size: u64,
    hash: String,
}

fn resolve_threads(threads: usize) -> Result<usize> {
    if threads == 0 {
        return Ok(num_cpus::get().clamp(MIN_THREADS, MAX_THREADS));
    }
    if !(MIN_THREADS..=MAX_THREADS).contains(&threads) {
        return Err(GxdError::InvalidArgument(format!(
            "threads must be in [1, 128], got {threads}"
        )));
    }
    Ok(threads)
}

/// Reads the source in fixed-size blocks, compresses and digests each one
/// in parallel, and writes a complete archive to `archive_path`.
pub fn compress(
    source_path: &Path,
    archive_path: &Path,
    opts: &CompressOptions,
    progress: Option<&dyn ProgressSink>,
) -> Result<()> {
    if opts.block_size == 0 {
        return Err(GxdError::InvalidArgument("block_size must be >= 1".into()));
    }
    let threads = resolve_threads(opts.threads)?;

    let total_size = std::fs::metadata(source_path)?.len();
    let spans = plan_blocks(total_size, opts.block_size)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| GxdError::InvalidArgument(e.to_string()))?;

    let mut slots: Vec<Option<CompressedBlock>> = (0..spans.len()).map(|_| None).collect();
    let (tx, rx) = unbounded::<Result<CompressedBlock>>();

    pool.scope(|s| {
        for span in &spans {
            let tx = tx.clone();
            let source_path = source_path.to_path_buf();
            let algo = opts.algo;
            let level = opts.level;
            s.spawn(move |_| {
                let record = (|| -> Result<CompressedBlock> {
                    let mut file = File::open(&source_path)?;
                    file.seek(SeekFrom::Start(span.src_off))?;
                    let mut buf = vec![0u8; span.src_len as usize];
                    file.read_exact(&mut buf)?;
                    let hash = digest::block_hash(&buf);
                    let compressed = codec::encode(algo, level, &buf)?;
                    Ok(CompressedBlock { id: span.id, compressed, orig_size: span.src_len, hash })
                })();
                let _ = tx.send(record);
            });
        }
    });
    drop(tx);

    let mut first_error = None;
    for record in rx {
        match record {
            Ok(block) => {
                let id = block.id as usize;
                slots[id] = Some(block);
            }
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(_) => {}
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    let out = File::create(archive_path)?;
    let mut writer = ArchiveWriter::new(out)?;
    for (done, slot) in slots.into_iter().enumerate() {
        let block = slot.expect("every span produced exactly one record");
        writer.write_block(block.id, &block.compressed, block.orig_size, block.hash)?;
        if let Some(p) = progress {
            p.on_block_done(done as u64 + 1, spans.len() as u64, block.orig_size);
        }
    }

    let global_hash = hash_source_sequentially(source_path)?;
    let out = writer.finalize(opts.algo.name(), global_hash)?;
    out.sync_all()?;
    Ok(())
}

/// Recomputes the global SHA-256 by streaming the source file once,
/// sequentially — simpler and more memory-bounded than threading
/// per-block plaintext back through the reorder buffer just to
/// concatenate it (§4.4 permits either approach).
fn hash_source_sequentially(source_path: &Path) -> Result<String> {
    let mut file = File::open(source_path)?;
    let mut hasher = GlobalHasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn s1_round_trip_small_produces_expected_blocks() {
        let mut source = NamedTempFile::new().unwrap();
        source.write_all(b"ABCDEFGHIJ").unwrap();
        source.flush().unwrap();

        let archive = NamedTempFile::new().unwrap();
        let opts = CompressOptions {
            algo: Algo::None,
            level: 0,
            block_size: 4,
            threads: 1,
            verify: true,
        };
        compress(source.path(), archive.path(), &opts, None).unwrap();

        let reader = crate::reader::ArchiveReader::open(archive.path()).unwrap();
        assert_eq!(reader.block_count(), 3);
        assert_eq!(reader.block(0).orig_size, 4);
        assert_eq!(reader.block(1).orig_size, 4);
        assert_eq!(reader.block(2).orig_size, 2);
    }

    #[test]
    fn empty_input_produces_valid_archive() {
        let source = NamedTempFile::new().unwrap();
        let archive = NamedTempFile::new().unwrap();
        let opts = CompressOptions { block_size: 4, threads: 1, ..Default::default() };
        compress(source.path(), archive.path(), &opts, None).unwrap();

        let reader = crate::reader::ArchiveReader::open(archive.path()).unwrap();
        assert_eq!(reader.block_count(), 0);
        assert_eq!(
            reader.global_hash(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn out_of_range_thread_count_is_invalid_argument() {
        let source = NamedTempFile::new().unwrap();
        let archive = NamedTempFile::new().unwrap();
        let opts = CompressOptions { block_size: 4, threads: 999, ..Default::default() };
        assert!(matches!(
            compress(source.path(), archive.path(), &opts, None),
            Err(GxdError::InvalidArgument(_))
        ));
    }
}
