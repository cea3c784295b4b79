//! Command-line surface. Argument parsing, help text and exit codes
//! sit outside the engine's own contract, but a concrete binary still
//! needs one, so this mirrors the `clap`-derive shape used throughout
//! this codebase's own CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Block-based archival container", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a source file into a GXD archive.
    Compress {
        source: PathBuf,
        archive: PathBuf,

        /// `zstd`, `lz4`, `brotli`, or `none`.
        #[arg(long, default_value = "zstd")]
        algo: String,

        /// Zstd compression level, 1-22. Ignored by other algorithms.
        #[arg(long, default_value_t = 3)]
        level: i32,

        /// Accepts the grammar INT("" | "kb" | "mb" | "gb"), case-insensitive.
        #[arg(long, default_value = "4mb")]
        block_size: String,

        /// 0 = auto-detect from the host's logical core count.
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Soft-warns and is ignored unless `--algo zstd` is also given.
        #[arg(long)]
        zstd_ratio: Option<f64>,
    },

    /// Fully decompress a GXD archive.
    Decompress {
        archive: PathBuf,
        /// Written to this path; omit to write to stdout.
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Disable per-block and global digest verification (enabled by default).
        #[arg(long = "no-verify-blocks", action = clap::ArgAction::SetFalse, default_value_t = true)]
        verify_blocks: bool,

        /// Decode the output as UTF-8 text on the way out.
        #[arg(long)]
        text: bool,
    },

    /// Extract an arbitrary byte range from a GXD archive.
    Seek {
        archive: PathBuf,
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Defaults to end-of-payload when omitted.
        #[arg(long)]
        length: Option<u64>,

        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Disable per-block digest verification (enabled by default).
        #[arg(long = "no-verify-blocks", action = clap::ArgAction::SetFalse, default_value_t = true)]
        verify_blocks: bool,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
