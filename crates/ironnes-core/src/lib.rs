//! ironNES core - the system bus, memory decoding, and scheduling layer.
//!
//! This crate assembles the CPU, PPU, APU, cartridge, and controllers into
//! a machine and owns everything that sits between them:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                        Nes                            │
//! │   ┌───────────────────────────────────────────────┐   │
//! │   │                   CpuBus                      │   │
//! │   │  ┌─────┐ ┌─────┐ ┌─────┐ ┌──────────┐ ┌────┐  │   │
//! │   │  │ RAM │ │ PPU │ │ APU │ │Cartridge │ │Pads│  │   │
//! │   │  │ 2KB │ │     │ │     │ │  (NROM)  │ │ x2 │  │   │
//! │   │  └─────┘ └──┬──┘ └─────┘ └────┬─────┘ └────┘  │   │
//! │   │            └───PpuMemoryView──┘               │   │
//! │   └───────────────────────▲───────────────────────┘   │
//! │                      ┌────┴────┐                      │
//! │                      │ 6502 CPU│                      │
//! │                      └─────────┘                      │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler guarantee: for every CPU cycle charged — including the
//! 513/514-cycle OAM DMA stalls — the PPU advances exactly three dots and
//! the APU exactly one cycle. NMI is a latched edge delivered at the next
//! instruction boundary.
//!
//! # Usage
//!
//! ```no_run
//! use ironnes_core::Nes;
//!
//! let rom = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut nes = Nes::new();
//! nes.load_rom(&rom).expect("failed to load ROM");
//!
//! loop {
//!     nes.set_controller_buttons(0, [false; 8]);
//!     nes.run_frame();
//!     let _frame = nes.frame_buffer();
//!     let _audio = nes.take_audio_samples();
//! }
//! ```

mod bus;
mod input;
mod nes;
mod trace;

pub use bus::{CpuBus, PpuMemory, PpuMemoryView};
pub use input::{Button, Controller};
pub use nes::{timing, Nes};
pub use trace::{AccessKind, TraceEntry, WatchpointHit};

// Re-export commonly used types from the component crates.
pub use ironnes_apu::Apu;
pub use ironnes_cart::{Cartridge, Mapper, Mirroring, Nrom, Rom, RomError};
pub use ironnes_cpu::{Bus, Cpu, CpuState, Status};
pub use ironnes_ppu::{Ppu, PpuBus, PpuState};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NES screen dimensions.
pub mod screen {
    /// Screen width in pixels.
    pub const WIDTH: usize = 256;
    /// Screen height in pixels.
    pub const HEIGHT: usize = 240;
    /// Pixels per frame.
    pub const PIXELS: usize = WIDTH * HEIGHT;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_constants() {
        assert_eq!(screen::WIDTH, 256);
        assert_eq!(screen::HEIGHT, 240);
        assert_eq!(screen::PIXELS, 61_440);
    }

    #[test]
    fn timing_constants() {
        assert_eq!(timing::CPU_CLOCK_NTSC, 1_789_772);
        assert_eq!(timing::PPU_CLOCK_NTSC, 5_369_318);
        assert_eq!(timing::PPU_DOTS_PER_FRAME, 89_342);
    }

    #[test]
    fn fresh_machine_is_quiet() {
        let nes = Nes::new();
        assert_eq!(nes.cycle_count(), 0);
        assert_eq!(nes.frame_count(), 0);
        assert!(!nes.is_dma_in_progress());
        assert!(nes.execution_log().is_empty());
    }
}
