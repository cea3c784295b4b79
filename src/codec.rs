//! Codec registry: maps an algorithm tag to a stateless `(encode, decode)`
//! pair.
//!
//! Four tags are recognized: `zstd` (takes a level), `lz4` and `brotli`
//! (stateless), and `none` (identity). Each concrete codec implements the
//! [`Codec`] trait; [`encode`] and [`decode`] are the free-function entry
//! points the rest of the engine calls, dispatching through
//! [`get_codec`].

use crate::error::{GxdError, Result};

/// Algorithm tag stored in the footer and accepted by the engine API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algo {
    None,
    Zstd,
    Lz4,
    Brotli,
}

impl Algo {
    pub fn name(self) -> &'static str {
        match self {
            Algo::None => "none",
            Algo::Zstd => "zstd",
            Algo::Lz4 => "lz4",
            Algo::Brotli => "brotli",
        }
    }

    pub fn from_name(name: &str) -> Result<Algo> {
        match name {
            "none" => Ok(Algo::None),
            "zstd" => Ok(Algo::Zstd),
            "lz4" => Ok(Algo::Lz4),
            "brotli" => Ok(Algo::Brotli),
            other => Err(GxdError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// A registered compression algorithm.
trait Codec {
    fn compress(&self, data: &[u8], level: i32) -> Result<Vec<u8>>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

struct NoneCodec;

impl Codec for NoneCodec {
    fn compress(&self, data: &[u8], _level: i32) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

struct ZstdCodec;

impl Codec for ZstdCodec {
    fn compress(&self, data: &[u8], level: i32) -> Result<Vec<u8>> {
        zstd::encode_all(data, level).map_err(|e| GxdError::Codec(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        zstd::decode_all(data).map_err(|e| GxdError::Codec(e.to_string()))
    }
}

struct Lz4Codec;

impl Codec for Lz4Codec {
    fn compress(&self, data: &[u8], _level: i32) -> Result<Vec<u8>> {
        Ok(lz4_flex::compress_prepend_size(data))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lz4_flex::decompress_size_prepended(data).map_err(|e| GxdError::Codec(e.to_string()))
    }
}

struct BrotliCodec;

impl Codec for BrotliCodec {
    fn compress(&self, data: &[u8], _level: i32) -> Result<Vec<u8>> {
        const QUALITY: u32 = 11;
        let mut out = Vec::new();
        {
            let mut writer =
                brotli::CompressorWriter::new(&mut out, 4096, QUALITY, 22);
            std::io::Write::write_all(&mut writer, data)
                .map_err(|e| GxdError::Codec(e.to_string()))?;
        }
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut reader = brotli::Decompressor::new(data, 4096);
        std::io::Read::read_to_end(&mut reader, &mut out)
            .map_err(|e| GxdError::Codec(e.to_string()))?;
        Ok(out)
    }
}

fn get_codec(algo: Algo) -> Box<dyn Codec> {
    match algo {
        Algo::None => Box::new(NoneCodec),
        Algo::Zstd => Box::new(ZstdCodec),
        Algo::Lz4 => Box::new(Lz4Codec),
        Algo::Brotli => Box::new(BrotliCodec),
    }
}

/// Compress `bytes` with `algo`. `level` is honored only by `zstd`
/// (range `[1, 22]`); other codecs ignore it.
pub fn encode(algo: Algo, level: i32, bytes: &[u8]) -> Result<Vec<u8>> {
    get_codec(algo).compress(bytes, level)
}

/// Decompress `bytes`, previously produced by [`encode`] with the same
/// `algo`.
pub fn decode(algo: Algo, bytes: &[u8]) -> Result<Vec<u8>> {
    get_codec(algo).decompress(bytes)
}
