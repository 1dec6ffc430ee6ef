//! Completion record files
//!
//! Each record is a `u32` state, four padding bytes, then `u64` stats in
//! this order: frames, extra items, extra bombs, cleared space, attenuated
//! space, entropy, rewind count. Three versions exist:
//! - v1: no header, the first five stats (48-byte records)
//! - v2: `u64` version 2, then the first six stats (56-byte records)
//! - v3: `u64` version 3, then all seven stats (64-byte records)
//!
//! Only v3 is written. Older files load with "no record" defaults for the
//! stats they lack. A missing file or an unknown version reads as empty;
//! a trailing partial record is ignored.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use super::{PersistenceError, Result, write_u32, write_u64};
use crate::progress::{CompletionState, LevelCompletion, Progress};

pub const CURRENT_VERSION: u64 = 3;

/// Stats stored by each format version
const V1_FIELDS: usize = 5;
const V2_FIELDS: usize = 6;
const V3_FIELDS: usize = 7;

const fn record_size(fields: usize) -> usize {
    8 + fields * 8
}

/// Decode headerless v1 records
pub fn read_completions_v1<R: Read>(reader: &mut R) -> Result<Vec<LevelCompletion>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(decode_records(&data, V1_FIELDS))
}

/// Decode a versioned (v2 or v3) completion file
pub fn read_completions<R: Read>(reader: &mut R) -> Result<Vec<LevelCompletion>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let Some((version, body)) = data.split_first_chunk::<8>() else {
        return Err(PersistenceError::Truncated);
    };
    let records = match u64::from_le_bytes(*version) {
        2 => decode_records(body, V2_FIELDS),
        3 => decode_records(body, V3_FIELDS),
        other => {
            log::warn!("Completion records are in an unknown format (version {other})");
            return Ok(Vec::new());
        }
    };
    log::info!("Loaded {} completion records", records.len());
    Ok(records)
}

/// Encode records in the current format
pub fn write_completions<W: Write>(writer: &mut W, records: &[LevelCompletion]) -> Result<()> {
    write_u64(writer, CURRENT_VERSION)?;
    for record in records {
        write_u32(writer, record.state as u32)?;
        write_u32(writer, 0)?;
        for stat in stats(record) {
            write_u64(writer, stat)?;
        }
    }
    Ok(())
}

/// Load a versioned completion file; a missing file yields no records
pub fn load_completions(path: impl AsRef<Path>) -> Result<Vec<LevelCompletion>> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(mut file) => read_completions(&mut file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Completion file {} is missing", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Load a legacy v1 completion file; a missing file yields no records
pub fn load_completions_v1(path: impl AsRef<Path>) -> Result<Vec<LevelCompletion>> {
    match File::open(path.as_ref()) {
        Ok(mut file) => read_completions_v1(&mut file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_completions(path: impl AsRef<Path>, records: &[LevelCompletion]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_completions(&mut writer, records)?;
    writer.flush()?;
    log::debug!("Saved {} completion records to {}", records.len(), path.display());
    Ok(())
}

/// Load progress for a pack of `num_levels` levels, falling back to the
/// legacy file when the primary one holds nothing
pub fn load_progress(primary: impl AsRef<Path>, legacy: Option<&Path>, num_levels: usize) -> Result<Progress> {
    let mut levels = load_completions(primary)?;
    if levels.is_empty() {
        if let Some(legacy) = legacy {
            levels = load_completions_v1(legacy)?;
            if !levels.is_empty() {
                log::info!("Using {} legacy completion records", levels.len());
            }
        }
    }
    let mut progress = Progress { levels };
    progress.resize(num_levels);
    Ok(progress)
}

fn stats(record: &LevelCompletion) -> [u64; V3_FIELDS] {
    [
        record.frames,
        record.extra_items,
        record.extra_bombs,
        record.cleared_space,
        record.attenuated_space,
        record.entropy,
        record.rewind_count,
    ]
}

fn decode_records(body: &[u8], fields: usize) -> Vec<LevelCompletion> {
    body.chunks_exact(record_size(fields))
        .map(|chunk| decode_record(chunk, fields))
        .collect()
}

fn decode_record(chunk: &[u8], fields: usize) -> LevelCompletion {
    let word = |i: usize| {
        let start = 8 + i * 8;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&chunk[start..start + 8]);
        u64::from_le_bytes(bytes)
    };
    let mut state_bytes = [0u8; 4];
    state_bytes.copy_from_slice(&chunk[..4]);
    let state_code = u32::from_le_bytes(state_bytes);

    let mut record = LevelCompletion {
        state: CompletionState::from_code(state_code).unwrap_or_default(),
        ..Default::default()
    };
    let slots: [&mut u64; V3_FIELDS] = [
        &mut record.frames,
        &mut record.extra_items,
        &mut record.extra_bombs,
        &mut record.cleared_space,
        &mut record.attenuated_space,
        &mut record.entropy,
        &mut record.rewind_count,
    ];
    for (i, slot) in slots.into_iter().take(fields).enumerate() {
        *slot = word(i);
    }
    record
}
