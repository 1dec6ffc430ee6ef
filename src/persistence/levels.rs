//! Level pack files
//!
//! Layout (little-endian):
//! - `u64` version (always 0), `u64` level count
//! - per level: `u32` width, `u32` height, `i32` player x/y, `i32` items
//!   remaining, `i32` red bombs, `u64` frames executed
//! - `width * height` cells, each an `i32` type code and an `i32` param
//! - `u64` pending explosion count, then per explosion `u64` frame and
//!   `i32` x, y, radius, kind
//!
//! The `moved` flag, the undo log and the losing fade are never stored.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::{PersistenceError, Result, read_i32, read_u32, read_u64, write_i32, write_u32, write_u64};
use crate::sim::{Cell, CellKind, ExplosionKind, ExplosionQueue, LevelState, PendingExplosion};

pub const LEVELS_VERSION: u64 = 0;

/// Upper bound on entries reserved up front, whatever a header claims
const MAX_PREALLOC: usize = 1 << 16;

pub fn read_levels<R: Read>(reader: &mut R) -> Result<Vec<LevelState>> {
    let version = read_u64(reader)?;
    if version != LEVELS_VERSION {
        return Err(PersistenceError::UnsupportedVersion(version));
    }

    let count = read_u64(reader)?;
    let mut levels = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
    for _ in 0..count {
        levels.push(read_level(reader)?);
    }
    Ok(levels)
}

pub fn write_levels<W: Write>(writer: &mut W, levels: &[LevelState]) -> Result<()> {
    write_u64(writer, LEVELS_VERSION)?;
    write_u64(writer, levels.len() as u64)?;
    for level in levels {
        write_level(writer, level)?;
    }
    Ok(())
}

pub fn load_levels(path: impl AsRef<Path>) -> Result<Vec<LevelState>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let levels = read_levels(&mut reader)?;
    log::info!("Loaded {} levels from {}", levels.len(), path.display());
    Ok(levels)
}

pub fn save_levels(path: impl AsRef<Path>, levels: &[LevelState]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_levels(&mut writer, levels)?;
    writer.flush()?;
    log::info!("Saved {} levels to {}", levels.len(), path.display());
    Ok(())
}

fn read_level<R: Read>(reader: &mut R) -> Result<LevelState> {
    let width = read_u32(reader)?;
    let height = read_u32(reader)?;
    let player_x = read_i32(reader)?;
    let player_y = read_i32(reader)?;
    let items_remaining = read_i32(reader)?;
    let red_bombs = read_i32(reader)?;
    let frames_executed = read_u64(reader)?;

    let cell_count = (width as usize).checked_mul(height as usize);
    let cell_count = match cell_count {
        Some(n) if n > 0 => n,
        _ => return Err(PersistenceError::InvalidDimensions { width, height }),
    };

    let mut cells = Vec::with_capacity(cell_count.min(MAX_PREALLOC));
    for _ in 0..cell_count {
        let code = read_i32(reader)?;
        let param = read_i32(reader)?;
        let kind = CellKind::from_raw(code, param).ok_or(PersistenceError::InvalidCellType(code))?;
        cells.push(Cell::new(kind));
    }

    let explosion_count = read_u64(reader)?;
    let mut explosions = Vec::with_capacity((explosion_count as usize).min(MAX_PREALLOC));
    for _ in 0..explosion_count {
        let frame = read_u64(reader)?;
        let x = read_i32(reader)?;
        let y = read_i32(reader)?;
        let radius = read_i32(reader)?;
        let code = read_i32(reader)?;
        let kind = ExplosionKind::from_code(code).ok_or(PersistenceError::InvalidExplosionKind(code))?;
        explosions.push(PendingExplosion { frame, x, y, radius, kind });
    }

    let mut level = LevelState::from_cells(width, height, cells);
    level.player_x = player_x;
    level.player_y = player_y;
    level.items_remaining = items_remaining;
    level.red_bombs = red_bombs;
    level.frames_executed = frames_executed;
    level.explosions = explosions.into_iter().collect::<ExplosionQueue>();
    level.reset_history();
    Ok(level)
}

fn write_level<W: Write>(writer: &mut W, level: &LevelState) -> Result<()> {
    write_u32(writer, level.width)?;
    write_u32(writer, level.height)?;
    write_i32(writer, level.player_x)?;
    write_i32(writer, level.player_y)?;
    write_i32(writer, level.items_remaining)?;
    write_i32(writer, level.red_bombs)?;
    write_u64(writer, level.frames_executed)?;

    for cell in &level.cells {
        let (code, param) = cell.kind.to_raw();
        write_i32(writer, code)?;
        write_i32(writer, param)?;
    }

    write_u64(writer, level.explosions.len() as u64)?;
    for e in level.explosions.iter() {
        write_u64(writer, e.frame)?;
        write_i32(writer, e.x)?;
        write_i32(writer, e.y)?;
        write_i32(writer, e.radius)?;
        write_i32(writer, e.kind as i32)?;
    }
    Ok(())
}
