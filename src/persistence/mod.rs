//! Binary persistence
//!
//! Three little-endian formats live here:
//! - Level packs: every level's grid, counters and pending explosions
//! - Completion records: per-level best results, three format versions
//! - Input recordings: bit-packed per-frame inputs for replay
//!
//! Readers fail fast on anything they do not understand; it is up to the
//! host to fall back to another source.

pub mod completion;
pub mod levels;
pub mod recording;

use std::io::{self, Read, Write};

use thiserror::Error;

pub use completion::{load_progress, read_completions, save_completions, write_completions};
pub use levels::{load_levels, read_levels, save_levels, write_levels};
pub use recording::{Recording, load_recording, save_recording};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported file version {0}")]
    UnsupportedVersion(u64),
    #[error("file ends unexpectedly")]
    Truncated,
    #[error("invalid cell type {0}")]
    InvalidCellType(i32),
    #[error("invalid explosion kind {0}")]
    InvalidExplosionKind(i32),
    #[error("invalid level dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("not a recording file")]
    BadMagic,
    #[error("invalid impulse code {0}")]
    InvalidImpulse(u8),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => PersistenceError::Truncated,
        _ => PersistenceError::Io(e),
    })?;
    Ok(buf)
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    read_array(reader).map(u32::from_le_bytes)
}

pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    read_array(reader).map(i32::from_le_bytes)
}

pub(crate) fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    read_array(reader).map(u64::from_le_bytes)
}

pub(crate) fn write_u32<W: Write>(writer: &mut W, v: u32) -> io::Result<()> {
    writer.write_all(&v.to_le_bytes())
}

pub(crate) fn write_i32<W: Write>(writer: &mut W, v: i32) -> io::Result<()> {
    writer.write_all(&v.to_le_bytes())
}

pub(crate) fn write_u64<W: Write>(writer: &mut W, v: u64) -> io::Result<()> {
    writer.write_all(&v.to_le_bytes())
}
