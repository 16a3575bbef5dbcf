//! End-to-end machine scenarios: timing, DMA, ROM shapes, controllers,
//! and NMI delivery.

mod common;

use common::{ines_image, machine_with_program, CHR_UNIT, PRG_UNIT};
use ironnes_core::{Bus, Cartridge, RomError};

#[test]
fn single_nop_timing() {
    // NOP; JMP $8000
    let mut nes = machine_with_program(&[0xEA, 0x4C, 0x00, 0x80]);

    nes.step();
    assert_eq!(nes.cycle_count(), 2);
    assert_eq!(nes.ppu_cycle_count(), 6);
}

#[test]
fn page_crossing_load_timing() {
    // LDX #$10; LDA $20F0,X -> $2100 crosses a page.
    let mut nes = machine_with_program(&[0xA2, 0x10, 0xBD, 0xF0, 0x20]);

    nes.step();
    nes.step();
    assert_eq!(nes.cycle_count(), 7);
    assert_eq!(nes.ppu_cycle_count(), 21);
}

#[test]
fn oam_dma_stall() {
    // LDA #$02; STA $4014
    let mut nes = machine_with_program(&[0xA9, 0x02, 0x8D, 0x14, 0x40]);

    for i in 0..=255u16 {
        nes.bus_mut().write(0x0200 + i, i as u8);
    }

    nes.step(); // LDA, cycle count now 2 (even)
    assert_eq!(nes.cycle_count() % 2, 0);

    nes.step(); // STA triggers the DMA
    assert!(nes.is_dma_in_progress());

    // OAM already holds the page; the batch copy happened at trigger time.
    for i in 0..=255u8 {
        assert_eq!(nes.bus().ppu.oam()[i as usize], i);
    }

    // The stall costs exactly 513 cycles from an even trigger point, with
    // the PPU held at three dots per stall cycle throughout.
    let stall_start = nes.cycle_count();
    while nes.is_dma_in_progress() {
        nes.step();
        assert_eq!(nes.ppu_cycle_count(), 3 * nes.cycle_count());
    }
    assert_eq!(nes.cycle_count() - stall_start, 513);
}

#[test]
fn prg_16k_mirrors() {
    let prg: Vec<u8> = (0..PRG_UNIT).map(|i| (i & 0xFF) as u8).collect();
    let cart = Cartridge::load(&ines_image(&prg, &[0; CHR_UNIT], 0, 0)).unwrap();

    assert_eq!(cart.read_prg(0x8000), cart.read_prg(0xC000));
    assert_eq!(cart.read_prg(0xBFFF), cart.read_prg(0xFFFF));
}

#[test]
fn prg_32k_is_flat() {
    let prg: Vec<u8> = (0..2 * PRG_UNIT).map(|i| ((i >> 8) & 0xFF) as u8).collect();
    let cart = Cartridge::load(&ines_image(&prg, &[0; CHR_UNIT], 0, 0)).unwrap();

    assert_eq!(cart.read_prg(0x8000), 0x00);
    assert_eq!(cart.read_prg(0xC000), 0x40);
    assert_eq!(cart.read_prg(0xFFFF), 0x7F);
}

#[test]
fn ines_rejection_modes() {
    // Wrong magic.
    let mut bad_magic = ines_image(&vec![0; PRG_UNIT], &[0; CHR_UNIT], 0, 0);
    bad_magic[0] = b'R';
    bad_magic[1] = b'O';
    bad_magic[2] = b'M';
    assert!(matches!(Cartridge::load(&bad_magic), Err(RomError::InvalidFormat(_))));

    // Valid magic, zero PRG units.
    let zero_prg = [0x4E, 0x45, 0x53, 0x1A, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    assert!(matches!(Cartridge::load(&zero_prg), Err(RomError::InvalidSize)));

    // Header only, nothing behind it.
    let header_only = [0x4E, 0x45, 0x53, 0x1A, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    assert!(matches!(Cartridge::load(&header_only), Err(RomError::Truncated { .. })));
}

#[test]
fn controller_shift_out() {
    let mut nes = machine_with_program(&[0xEA, 0x4C, 0x00, 0x80]);
    // A + Up pressed.
    nes.set_controller_buttons(0, [true, false, false, false, true, false, false, false]);

    nes.bus_mut().write(0x4016, 1);
    nes.bus_mut().write(0x4016, 0);

    let bits: Vec<u8> = (0..8).map(|_| nes.bus_mut().read(0x4016) & 1).collect();
    assert_eq!(bits, [1, 0, 0, 0, 1, 0, 0, 0]);
}

#[test]
fn nmi_latch_delivers_once_per_assertion() {
    // LDA #$80; STA $2000 (enable NMI); JMP $8005.
    // NMI handler at $8010 is a bare RTI.
    let mut program = [0xEA; 0x11];
    program[..8].copy_from_slice(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
    program[0x10] = 0x40; // RTI
    let mut nes = machine_with_program(&program);

    nes.enable_execution_logging(true);
    nes.run_frame();
    nes.run_frame();

    // Exactly one NMI entry per vblank: the handler PC shows up once per
    // frame, and never twice in a row without a fresh PPU assertion.
    let handler_entries = nes
        .execution_log()
        .iter()
        .filter(|entry| entry.pc == 0x8010)
        .count();
    assert_eq!(handler_entries, 2);
}

#[test]
fn nmi_not_delivered_when_disabled() {
    let mut nes = machine_with_program(&[0x4C, 0x00, 0x80]); // JMP $8000
    nes.enable_execution_logging(true);
    nes.run_frame();

    assert!(nes.execution_log().iter().all(|entry| entry.pc != 0x8010));
}

#[test]
fn frame_length_in_ppu_dots() {
    let mut nes = machine_with_program(&[0xEA, 0x4C, 0x00, 0x80]);
    nes.run_frame();

    // Rendering is off, so the frame is the full 89342 dots; instruction
    // granularity overshoots by less than one instruction's worth.
    assert!(nes.ppu_cycle_count() >= 89_342);
    assert!(nes.ppu_cycle_count() < 89_342 + 21);
}

#[test]
fn dma_can_source_from_cartridge_space() {
    // LDA #$81; STA $4014 pulls page $8100, which sits in the NOP filler.
    let mut nes = machine_with_program(&[0xA9, 0x81, 0x8D, 0x14, 0x40]);
    nes.step();
    nes.step();

    assert!(nes.is_dma_in_progress());
    assert!(nes.bus().ppu.oam().iter().all(|&b| b == 0xEA));
}

#[test]
fn program_writes_to_sram_read_back() {
    // LDA #$C7; STA $6234; LDA $6234 (into A via absolute read)
    let mut nes = machine_with_program(&[0xA9, 0xC7, 0x8D, 0x34, 0x62, 0xAD, 0x34, 0x62]);
    nes.step();
    nes.step();
    nes.step();

    assert_eq!(nes.cpu_state().a, 0xC7);
    assert_eq!(nes.peek_memory(0x6234), 0xC7);
}

#[test]
fn chr_ram_image_accepts_ppudata_writes() {
    // CHR units = 0 -> 8 KiB CHR-RAM behind the pattern tables.
    let mut prg = vec![0xEA; PRG_UNIT];
    prg[0x3FFC] = 0x00;
    prg[0x3FFD] = 0x80;
    let mut nes = ironnes_core::Nes::new();
    nes.load_rom(&ines_image(&prg, &[], 0, 0)).unwrap();

    let bus = nes.bus_mut();
    bus.write(0x2006, 0x10);
    bus.write(0x2006, 0x00);
    bus.write(0x2007, 0xAB);

    assert_eq!(nes.bus().cartridge().read_chr(0x1000), 0xAB);
}
