//! Mapper 0: NROM.
//!
//! No banking hardware at all: 16 KiB or 32 KiB of PRG-ROM (the 16 KiB
//! variant is mirrored across the full `$8000-$FFFF` window), 8 KiB of
//! CHR-ROM or CHR-RAM, and 8 KiB of work RAM at `$6000-$7FFF`. Mirroring
//! is fixed by a solder pad and comes from the iNES header.

use crate::mapper::{Mapper, Mirroring};
use crate::rom::Rom;

/// Work RAM size at `$6000-$7FFF`.
const SRAM_LEN: usize = 8 * 1024;
/// CHR-RAM size when the header declares no CHR-ROM.
const CHR_RAM_LEN: usize = 8 * 1024;

/// The NROM board (and the behavioral fallback for unknown mappers).
pub struct Nrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_writable: bool,
    sram: Vec<u8>,
    mirroring: Mirroring,
}

impl Nrom {
    /// Build an NROM board from a parsed image. CHR-RAM is allocated
    /// zero-filled when the image carries no CHR-ROM.
    #[must_use]
    pub fn new(rom: &Rom) -> Self {
        let chr_writable = rom.chr_rom.is_empty();
        let chr = if chr_writable {
            vec![0; CHR_RAM_LEN]
        } else {
            rom.chr_rom.clone()
        };

        Self {
            prg_rom: rom.prg_rom.clone(),
            chr,
            chr_writable,
            sram: vec![0; SRAM_LEN],
            mirroring: rom.mirroring,
        }
    }

    /// An NROM board with no ROM at all: every read is 0. Used for the
    /// powered-on machine before a cartridge is inserted.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            prg_rom: Vec::new(),
            chr: vec![0; CHR_RAM_LEN],
            chr_writable: true,
            sram: vec![0; SRAM_LEN],
            mirroring: Mirroring::Horizontal,
        }
    }

    /// True when pattern memory is CHR-RAM.
    #[must_use]
    pub fn has_chr_ram(&self) -> bool {
        self.chr_writable
    }
}

impl Mapper for Nrom {
    fn read_prg(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.sram[(addr - 0x6000) as usize],
            0x8000..=0xFFFF => {
                let mut offset = (addr - 0x8000) as usize;
                if self.prg_rom.len() == 16 * 1024 {
                    // NROM-128 mirrors its single bank across the window.
                    offset &= 0x3FFF;
                }
                if offset < self.prg_rom.len() {
                    self.prg_rom[offset]
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8) {
        if let 0x6000..=0x7FFF = addr {
            self.sram[(addr - 0x6000) as usize] = value;
        }
        // PRG-ROM is read-only and NROM has no registers.
    }

    fn read_chr(&self, addr: u16) -> u8 {
        let addr = addr as usize;
        if addr < 0x2000 && addr < self.chr.len() {
            self.chr[addr]
        } else {
            0
        }
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        let addr = addr as usize;
        if addr < 0x2000 && addr < self.chr.len() && self.chr_writable {
            self.chr[addr] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn mapper_number(&self) -> u8 {
        0
    }

    fn mapper_name(&self) -> &'static str {
        "NROM"
    }

    fn sram(&self) -> Option<&[u8]> {
        Some(&self.sram)
    }

    fn load_sram(&mut self, data: &[u8]) {
        let len = data.len().min(self.sram.len());
        self.sram[..len].copy_from_slice(&data[..len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_prg(prg: Vec<u8>, chr: Vec<u8>) -> Rom {
        Rom {
            prg_rom: prg,
            chr_rom: chr,
            mapper_id: 0,
            mirroring: Mirroring::Vertical,
            has_battery: false,
        }
    }

    #[test]
    fn nrom_128_mirrors_prg() {
        let prg: Vec<u8> = (0..16 * 1024).map(|i| (i & 0xFF) as u8).collect();
        let mapper = Nrom::new(&rom_with_prg(prg, vec![0; 8192]));

        assert_eq!(mapper.read_prg(0x8000), mapper.read_prg(0xC000));
        assert_eq!(mapper.read_prg(0xBFFF), mapper.read_prg(0xFFFF));
        assert_eq!(mapper.read_prg(0x8001), 0x01);
    }

    #[test]
    fn nrom_256_is_flat() {
        let prg: Vec<u8> = (0..32 * 1024).map(|i| ((i >> 8) & 0xFF) as u8).collect();
        let mapper = Nrom::new(&rom_with_prg(prg, vec![0; 8192]));

        assert_eq!(mapper.read_prg(0x8000), 0x00);
        assert_eq!(mapper.read_prg(0xC000), 0x40);
        assert_eq!(mapper.read_prg(0xFFFF), 0x7F);
    }

    #[test]
    fn prg_rom_is_write_protected() {
        let mut prg = vec![0; 32 * 1024];
        prg[0] = 0xAA;
        let mut mapper = Nrom::new(&rom_with_prg(prg, vec![0; 8192]));

        mapper.write_prg(0x8000, 0x55);
        assert_eq!(mapper.read_prg(0x8000), 0xAA);
    }

    #[test]
    fn sram_round_trips() {
        let mut mapper = Nrom::new(&rom_with_prg(vec![0; 16 * 1024], vec![0; 8192]));

        mapper.write_prg(0x6000, 0x11);
        mapper.write_prg(0x7FFF, 0x22);
        assert_eq!(mapper.read_prg(0x6000), 0x11);
        assert_eq!(mapper.read_prg(0x7FFF), 0x22);
    }

    #[test]
    fn below_sram_reads_zero() {
        let mapper = Nrom::new(&rom_with_prg(vec![0xFF; 16 * 1024], vec![0; 8192]));
        assert_eq!(mapper.read_prg(0x4020), 0);
        assert_eq!(mapper.read_prg(0x5FFF), 0);
    }

    #[test]
    fn chr_rom_rejects_writes() {
        let mut chr = vec![0; 8192];
        chr[0x1000] = 0x77;
        let mut mapper = Nrom::new(&rom_with_prg(vec![0; 16 * 1024], chr));

        mapper.write_chr(0x1000, 0x99);
        assert_eq!(mapper.read_chr(0x1000), 0x77);
        assert!(!mapper.has_chr_ram());
    }

    #[test]
    fn chr_ram_accepts_writes() {
        let mut mapper = Nrom::new(&rom_with_prg(vec![0; 16 * 1024], Vec::new()));
        assert!(mapper.has_chr_ram());

        mapper.write_chr(0x0000, 0x12);
        mapper.write_chr(0x1FFF, 0x34);
        assert_eq!(mapper.read_chr(0x0000), 0x12);
        assert_eq!(mapper.read_chr(0x1FFF), 0x34);

        // Past the pattern tables nothing is stored.
        mapper.write_chr(0x2000, 0x56);
        assert_eq!(mapper.read_chr(0x2000), 0);
    }

    #[test]
    fn empty_board_reads_zero() {
        let mapper = Nrom::empty();
        assert_eq!(mapper.read_prg(0x8000), 0);
        assert_eq!(mapper.read_prg(0xFFFC), 0);
        assert_eq!(mapper.read_chr(0x0000), 0);
    }

    #[test]
    fn sram_restore() {
        let mut mapper = Nrom::empty();
        mapper.load_sram(&[0xAB; 100]);
        assert_eq!(mapper.read_prg(0x6000), 0xAB);
        assert_eq!(mapper.read_prg(0x6063), 0xAB);
        assert_eq!(mapper.read_prg(0x6064), 0);
    }
}
