//! Shared helpers for the integration suites: iNES image builders and
//! pre-wired machines.

use ironnes_core::Nes;

/// One PRG unit (16 KiB).
pub const PRG_UNIT: usize = 16 * 1024;
/// One CHR unit (8 KiB).
pub const CHR_UNIT: usize = 8 * 1024;

/// Assemble an iNES image from raw blocks.
#[must_use]
pub fn ines_image(prg: &[u8], chr: &[u8], flags6: u8, flags7: u8) -> Vec<u8> {
    assert!(prg.len() % PRG_UNIT == 0 && !prg.is_empty());
    assert!(chr.len() % CHR_UNIT == 0);

    let mut image = vec![
        0x4E,
        0x45,
        0x53,
        0x1A,
        (prg.len() / PRG_UNIT) as u8,
        (chr.len() / CHR_UNIT) as u8,
        flags6,
        flags7,
    ];
    image.resize(16, 0);
    image.extend_from_slice(prg);
    image.extend_from_slice(chr);
    image
}

/// A 16 KiB NROM image with `program` at `$8000`, NOP filler, the reset
/// vector pointing at `$8000`, and the NMI vector at `$8010`.
#[must_use]
pub fn program_image(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; PRG_UNIT];
    prg[..program.len()].copy_from_slice(program);
    // NMI vector -> $8010 (callers park a handler there when they need one).
    prg[0x3FFA] = 0x10;
    prg[0x3FFB] = 0x80;
    // Reset vector -> $8000.
    prg[0x3FFC] = 0x00;
    prg[0x3FFD] = 0x80;
    ines_image(&prg, &[0; CHR_UNIT], 0, 0)
}

/// A booted machine running `program` from `$8000`.
#[must_use]
pub fn machine_with_program(program: &[u8]) -> Nes {
    let mut nes = Nes::new();
    nes.load_rom(&program_image(program)).expect("test image must load");
    nes
}
