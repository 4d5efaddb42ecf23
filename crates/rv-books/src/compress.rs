//! Book compression: opaque `bytes -> bytes` step before publishing

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{self, Write};

use rv_math::{Codec, MathError};

use crate::error::Result;

/// Compression step applied to a finished event book
pub trait Compressor: Send + Sync {
    /// Extension appended to the book file name (e.g. `.zst`)
    fn extension(&self) -> &'static str;

    /// Compress a complete book
    fn compress(&self, bytes: &[u8]) -> io::Result<Vec<u8>>;
}

/// Zstandard compressor
#[derive(Debug, Clone, Copy)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Result<Self> {
        check_level(Codec::Zstd, level)?;
        Ok(Self { level })
    }
}

impl Compressor for ZstdCompressor {
    fn extension(&self) -> &'static str {
        ".zst"
    }

    fn compress(&self, bytes: &[u8]) -> io::Result<Vec<u8>> {
        zstd::bulk::compress(bytes, self.level)
    }
}

/// Gzip compressor (header carries no timestamp, output is reproducible)
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: u32,
}

impl GzipCompressor {
    pub fn new(level: u32) -> Result<Self> {
        check_level(Codec::Gzip, i32::try_from(level).unwrap_or(i32::MAX))?;
        Ok(Self { level })
    }
}

impl Compressor for GzipCompressor {
    fn extension(&self) -> &'static str {
        ".gz"
    }

    fn compress(&self, bytes: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 4), Compression::new(self.level));
        encoder.write_all(bytes)?;
        encoder.finish()
    }
}

fn check_level(codec: Codec, level: i32) -> Result<()> {
    let levels = codec.level_range();
    if !levels.contains(&level) {
        return Err(MathError::validation(
            "compression_level",
            level,
            format!("{}..={} for {:?}", levels.start(), levels.end(), codec),
        )
        .into());
    }
    Ok(())
}

/// Compressor for a configured codec
pub fn compressor_for(codec: Codec, level: i32) -> Result<Box<dyn Compressor>> {
    check_level(codec, level)?;
    let compressor: Box<dyn Compressor> = match codec {
        Codec::Zstd => Box::new(ZstdCompressor::new(level)?),
        Codec::Gzip => Box::new(GzipCompressor::new(level as u32)?),
    };
    Ok(compressor)
}
