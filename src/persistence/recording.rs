//! Input recordings
//!
//! Layout: magic bytes `45 43 45 43`, a `u32` LE frame count, then four
//! bits per frame packed most-significant bit first: the drop-bomb flag
//! followed by the impulse code's bits 2, 1 and 0. The last byte is padded
//! with zero bits.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use super::{PersistenceError, Result, read_u32, write_u32};
use crate::sim::{Impulse, TickInput};

pub const MAGIC: [u8; 4] = [0x45, 0x43, 0x45, 0x43];

/// A sequence of per-frame inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recording {
    pub inputs: Vec<TickInput>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: TickInput) {
        self.inputs.push(input);
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickInput> {
        self.inputs.iter()
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        match reader.read_exact(&mut magic) {
            Ok(()) if magic == MAGIC => {}
            Ok(()) => return Err(PersistenceError::BadMagic),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(PersistenceError::BadMagic);
            }
            Err(e) => return Err(e.into()),
        }

        let count = read_u32(reader)? as usize;
        let mut packed = Vec::new();
        reader.read_to_end(&mut packed)?;
        if packed.len() < count.div_ceil(2) {
            return Err(PersistenceError::Truncated);
        }

        let mut inputs = Vec::with_capacity(count);
        for i in 0..count {
            let byte = packed[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            let code = nibble & 0x07;
            let impulse = Impulse::from_code(code).ok_or(PersistenceError::InvalidImpulse(code))?;
            inputs.push(TickInput { impulse, drop_bomb: nibble & 0x08 != 0 });
        }
        Ok(Self { inputs })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        write_u32(writer, self.inputs.len() as u32)?;

        let packed: Vec<u8> = self
            .inputs
            .chunks(2)
            .map(|pair| {
                let hi = nibble(&pair[0]) << 4;
                let lo = pair.get(1).map_or(0, nibble);
                hi | lo
            })
            .collect();
        writer.write_all(&packed)?;
        Ok(())
    }
}

impl FromIterator<TickInput> for Recording {
    fn from_iter<I: IntoIterator<Item = TickInput>>(iter: I) -> Self {
        Self { inputs: iter.into_iter().collect() }
    }
}

fn nibble(input: &TickInput) -> u8 {
    (u8::from(input.drop_bomb) << 3) | (input.impulse.code() & 0x07)
}

pub fn load_recording(path: impl AsRef<Path>) -> Result<Recording> {
    let data = fs::read(path.as_ref())?;
    let recording = Recording::read_from(&mut data.as_slice())?;
    log::info!("Loaded recording of {} frames", recording.len());
    Ok(recording)
}

pub fn save_recording(path: impl AsRef<Path>, recording: &Recording) -> Result<()> {
    let mut data = Vec::new();
    recording.write_to(&mut data)?;
    fs::write(path.as_ref(), data)?;
    log::info!("Saved recording of {} frames", recording.len());
    Ok(())
}
