//! The cartridge facade handed to the system buses.

use crate::mapper::{Mapper, Mirroring};
use crate::nrom::Nrom;
use crate::rom::{Rom, RomError};

/// A loaded cartridge: the mapper plus the load-time facts the machine
/// asks about.
///
/// The mapper factory is total. Mapper id 0 selects NROM; any other id
/// also gets NROM behavior (a compatibility shim, not authentic hardware),
/// with the original id kept for introspection.
pub struct Cartridge {
    mapper: Box<dyn Mapper>,
    mapper_id: u8,
    has_battery: bool,
    has_chr_ram: bool,
}

impl Cartridge {
    /// Build a cartridge from a parsed image.
    #[must_use]
    pub fn from_rom(rom: &Rom) -> Self {
        if rom.mapper_id != 0 {
            log::warn!(
                "mapper {} is not implemented; substituting NROM behavior",
                rom.mapper_id
            );
        }
        let has_chr_ram = rom.has_chr_ram();
        Self {
            mapper: Box::new(Nrom::new(rom)),
            mapper_id: rom.mapper_id,
            has_battery: rom.has_battery,
            has_chr_ram,
        }
    }

    /// Parse an iNES image and build the cartridge.
    ///
    /// # Errors
    ///
    /// Propagates [`RomError`] from the loader; on any error no cartridge
    /// is produced.
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        Ok(Self::from_rom(&Rom::load(data)?))
    }

    /// The empty cartridge slot: every read is 0, writes only reach the
    /// (volatile) work RAM.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            mapper: Box::new(Nrom::empty()),
            mapper_id: 0,
            has_battery: false,
            has_chr_ram: true,
        }
    }

    /// Read CPU-visible cartridge space (`$4020-$FFFF`).
    #[must_use]
    pub fn read_prg(&self, addr: u16) -> u8 {
        self.mapper.read_prg(addr)
    }

    /// Write CPU-visible cartridge space.
    pub fn write_prg(&mut self, addr: u16, value: u8) {
        self.mapper.write_prg(addr, value);
    }

    /// Read pattern-table memory (`$0000-$1FFF`).
    #[must_use]
    pub fn read_chr(&self, addr: u16) -> u8 {
        self.mapper.read_chr(addr)
    }

    /// Write pattern-table memory.
    pub fn write_chr(&mut self, addr: u16, value: u8) {
        self.mapper.write_chr(addr, value);
    }

    /// Nametable arrangement the cartridge selects.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    /// Mapper id from the ROM header (preserved across the NROM fallback).
    #[must_use]
    pub fn mapper_id(&self) -> u8 {
        self.mapper_id
    }

    /// Name of the mapper family actually in use.
    #[must_use]
    pub fn mapper_name(&self) -> &'static str {
        self.mapper.mapper_name()
    }

    /// Battery-backed SRAM flag from the header.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    /// True when pattern memory is CHR-RAM.
    #[must_use]
    pub fn has_chr_ram(&self) -> bool {
        self.has_chr_ram
    }

    /// Work RAM contents, for battery saves.
    #[must_use]
    pub fn sram(&self) -> Option<&[u8]> {
        self.mapper.sram()
    }

    /// Restore work RAM from a battery save.
    pub fn load_sram(&mut self, data: &[u8]) {
        self.mapper.load_sram(data);
    }

    /// Reset mapper-internal state.
    pub fn reset(&mut self) {
        self.mapper.reset();
    }
}

impl Default for Cartridge {
    fn default() -> Self {
        Self::blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::{CHR_UNIT, PRG_UNIT};

    fn build_image(prg_units: u8, chr_units: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut data = vec![0x4E, 0x45, 0x53, 0x1A, prg_units, chr_units, flags6, flags7];
        data.resize(16, 0);
        data.extend(std::iter::repeat(0).take(prg_units as usize * PRG_UNIT));
        data.extend(std::iter::repeat(0).take(chr_units as usize * CHR_UNIT));
        data
    }

    #[test]
    fn mapper_zero_selects_nrom() {
        let cart = Cartridge::load(&build_image(1, 1, 0, 0)).unwrap();
        assert_eq!(cart.mapper_id(), 0);
        assert_eq!(cart.mapper_name(), "NROM");
    }

    #[test]
    fn unknown_mapper_falls_back_to_nrom() {
        // Mapper 66 in the flag nibbles.
        let cart = Cartridge::load(&build_image(1, 1, 0x20, 0x40)).unwrap();
        assert_eq!(cart.mapper_id(), 66);
        assert_eq!(cart.mapper_name(), "NROM");
        assert_eq!(cart.read_prg(0x8000), 0);
    }

    #[test]
    fn battery_flag_survives() {
        let cart = Cartridge::load(&build_image(1, 1, 0x02, 0)).unwrap();
        assert!(cart.has_battery());
    }

    #[test]
    fn blank_cartridge_is_silent() {
        let cart = Cartridge::blank();
        assert_eq!(cart.read_prg(0x8000), 0);
        assert_eq!(cart.read_prg(0xFFFD), 0);
        assert_eq!(cart.read_chr(0x1FFF), 0);
        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn sram_persists_across_other_traffic() {
        let mut cart = Cartridge::load(&build_image(1, 0, 0x02, 0)).unwrap();
        cart.write_prg(0x6123, 0x5A);

        for addr in (0x8000..0x9000).step_by(7) {
            let _ = cart.read_prg(addr);
            cart.write_prg(addr, 0xFF);
        }
        cart.write_chr(0x0000, 0x33);
        let _ = cart.read_chr(0x0000);

        assert_eq!(cart.read_prg(0x6123), 0x5A);
        assert_eq!(cart.sram().unwrap()[0x123], 0x5A);
    }
}
