//! GXD — a block-based archival container for a single input byte
//! stream.
//!
//! Splits an input into fixed-size blocks, compresses each one
//! independently with a selectable codec, records per-block and
//! whole-archive SHA-256 digests, and produces a footer-indexed archive
//! supporting full decompression, verified integrity checking, and
//! random-access extraction of an arbitrary byte range without decoding
//! unrelated blocks.
//!
//! The engine API is [`compress::compress`], [`decode::decompress`] and
//! [`decode::seek`]. Everything else in this crate is a supporting
//! module for those three entry points.

pub mod archive;
pub mod cli;
pub mod codec;
pub mod compress;
pub mod decode;
pub mod digest;
pub mod error;
pub mod layout;
pub mod progress;
pub mod reader;
pub mod seek;
pub mod sizes;

pub use archive::{BlockDescriptor, Footer};
pub use codec::Algo;
pub use compress::{compress, CompressOptions};
pub use decode::{decompress, seek, DecompressOptions, SeekOptions};
pub use error::{GxdError, Result};
pub use reader::ArchiveReader;
