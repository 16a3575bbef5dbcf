//! Timing-accurate front end of the NES 2C02 PPU.
//!
//! This crate models the parts of the PPU the rest of the machine can
//! observe from the CPU side: the `$2000-$2007` register file, OAM and its
//! DMA port, the 341x262 dot grid with the vblank window, the NMI edge, and
//! frame accounting. Pixel generation is deliberately absent; the frame
//! buffer is owned here and exposed as a read-only snapshot.
//!
//! Pattern tables, nametables, and palette RAM live behind the [`PpuBus`]
//! trait, which the system bus implements with cartridge CHR, mirrored
//! VRAM, and aliased palette storage.
//!
//! # Example
//!
//! ```
//! use ironnes_ppu::{Ppu, PpuBus};
//!
//! struct FlatVram([u8; 0x4000]);
//!
//! impl PpuBus for FlatVram {
//!     fn read(&mut self, addr: u16) -> u8 {
//!         self.0[addr as usize & 0x3FFF]
//!     }
//!     fn write(&mut self, addr: u16, value: u8) {
//!         self.0[addr as usize & 0x3FFF] = value;
//!     }
//! }
//!
//! let mut ppu = Ppu::new();
//! let mut vram = FlatVram([0; 0x4000]);
//!
//! // Enable NMI and run one frame's worth of dots.
//! ppu.write_register(0x2000, 0x80, &mut vram);
//! let mut saw_nmi = false;
//! for _ in 0..ironnes_ppu::DOTS_PER_FRAME {
//!     saw_nmi |= ppu.step();
//! }
//! assert!(saw_nmi);
//! assert_eq!(ppu.frame(), 1);
//! ```

mod ppu;
mod registers;

pub use ppu::{
    Ppu, PpuBus, PpuState, DOTS_PER_FRAME, DOTS_PER_SCANLINE, FRAME_HEIGHT, FRAME_WIDTH,
    PRE_RENDER_SCANLINE, SCANLINES_PER_FRAME, VBLANK_SCANLINE,
};
pub use registers::{Ctrl, Mask, Status};
