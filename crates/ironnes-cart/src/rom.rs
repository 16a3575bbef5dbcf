//! iNES container parsing.
//!
//! The iNES layout: a 16-byte header, an optional 512-byte trainer, PRG-ROM
//! in 16 KiB units, then CHR-ROM in 8 KiB units. A CHR unit count of zero
//! means the cartridge carries 8 KiB of CHR-RAM instead. Bytes past the
//! promised blocks are ignored.

use crate::mapper::Mirroring;

/// Size of one PRG-ROM unit (16 KiB).
pub(crate) const PRG_UNIT: usize = 16 * 1024;
/// Size of one CHR-ROM unit (8 KiB).
pub(crate) const CHR_UNIT: usize = 8 * 1024;
/// Trainer block size.
const TRAINER_LEN: usize = 512;
/// Header size.
const HEADER_LEN: usize = 16;

/// Reasons an iNES image fails to load. On any error, no cartridge is
/// produced.
#[derive(Debug, thiserror::Error)]
pub enum RomError {
    /// The four magic bytes are not `NES\x1A`.
    #[error("not an iNES image: magic bytes {0:02X?}")]
    InvalidFormat([u8; 4]),

    /// The header promises zero PRG-ROM units.
    #[error("invalid iNES image: PRG-ROM size is zero")]
    InvalidSize,

    /// The stream ended before all promised bytes arrived.
    #[error("truncated iNES image: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the header promised.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// The underlying reader failed.
    #[error("failed to read ROM image")]
    Io(#[from] std::io::Error),
}

/// A parsed iNES image: the raw blocks plus the header facts the mapper
/// factory needs.
#[derive(Debug, Clone)]
pub struct Rom {
    /// PRG-ROM contents (a multiple of 16 KiB, at least one unit).
    pub prg_rom: Vec<u8>,
    /// CHR-ROM contents; empty when the cartridge uses CHR-RAM.
    pub chr_rom: Vec<u8>,
    /// Mapper id from the header flag nibbles.
    pub mapper_id: u8,
    /// Nametable arrangement declared by the header.
    pub mirroring: Mirroring,
    /// Battery-backed SRAM flag.
    pub has_battery: bool,
}

impl Rom {
    /// iNES magic: `NES` followed by MS-DOS EOF.
    const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

    /// Parse a complete iNES image from memory.
    ///
    /// # Errors
    ///
    /// [`RomError::InvalidFormat`] on a bad magic tag,
    /// [`RomError::InvalidSize`] when the header promises zero PRG units,
    /// and [`RomError::Truncated`] when the data ends before the promised
    /// trainer/PRG/CHR blocks.
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < HEADER_LEN {
            return Err(RomError::Truncated { expected: HEADER_LEN, actual: data.len() });
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != Self::MAGIC {
            return Err(RomError::InvalidFormat(magic));
        }

        let prg_units = data[4] as usize;
        if prg_units == 0 {
            return Err(RomError::InvalidSize);
        }
        let chr_units = data[5] as usize;

        let flags6 = data[6];
        let flags7 = data[7];
        let mapper_id = (flags7 & 0xF0) | (flags6 >> 4);
        let has_battery = flags6 & 0x02 != 0;
        let has_trainer = flags6 & 0x04 != 0;
        let mirroring = if flags6 & 0x08 != 0 {
            // Four-screen overrides the horizontal/vertical bit.
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mut offset = HEADER_LEN;

        if has_trainer {
            // Trainers are a relic of copier hardware; skip the block.
            let _ = take_block(data, &mut offset, TRAINER_LEN)?;
        }

        let prg_rom = take_block(data, &mut offset, prg_units * PRG_UNIT)?.to_vec();
        let chr_rom = if chr_units > 0 {
            take_block(data, &mut offset, chr_units * CHR_UNIT)?.to_vec()
        } else {
            Vec::new()
        };

        log::debug!(
            "loaded iNES image: mapper {mapper_id}, {} KiB PRG, {} KiB CHR{}, {mirroring:?}",
            prg_rom.len() / 1024,
            chr_rom.len() / 1024,
            if chr_rom.is_empty() { " (CHR-RAM)" } else { "" },
        );

        Ok(Self { prg_rom, chr_rom, mapper_id, mirroring, has_battery })
    }

    /// Read a complete iNES image from a reader.
    ///
    /// # Errors
    ///
    /// [`RomError::Io`] when the reader fails, otherwise as [`Rom::load`].
    pub fn from_reader(mut reader: impl std::io::Read) -> Result<Self, RomError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load(&data)
    }

    /// Read an iNES image from a file.
    ///
    /// # Errors
    ///
    /// [`RomError::Io`] when the file cannot be read, otherwise as
    /// [`Rom::load`].
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, RomError> {
        Self::load(&std::fs::read(path)?)
    }

    /// True when the cartridge carries CHR-RAM instead of CHR-ROM.
    #[must_use]
    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}

/// Slice the next `len` bytes out of `data`, or report how far the stream
/// fell short.
fn take_block<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8], RomError> {
    let end = *offset + len;
    if data.len() < end {
        return Err(RomError::Truncated { expected: end, actual: data.len() });
    }
    let block = &data[*offset..end];
    *offset = end;
    Ok(block)
}
