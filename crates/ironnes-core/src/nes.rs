//! The machine scheduler: lockstep CPU/PPU/APU timing, DMA stalls, NMI
//! delivery, and the host-facing API.

use ironnes_cart::{Cartridge, RomError};
use ironnes_cpu::{Cpu, CpuState};
use ironnes_ppu::PpuState;

use crate::bus::CpuBus;
use crate::input::Button;
use crate::trace::{TraceEntry, WatchpointHit};

/// NTSC timing constants.
pub mod timing {
    /// Master clock frequency (NTSC).
    pub const MASTER_CLOCK_NTSC: u32 = 21_477_272;
    /// CPU clock frequency (NTSC): master / 12.
    pub const CPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 12;
    /// PPU clock frequency (NTSC): master / 4, three dots per CPU cycle.
    pub const PPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 4;
    /// PPU dots per frame (NTSC, even frames).
    pub const PPU_DOTS_PER_FRAME: u32 = 89_342;
    /// Approximate CPU cycles per frame.
    pub const CPU_CYCLES_PER_FRAME: u32 = 29_780;
}

/// The assembled machine.
///
/// Owns the CPU and the system bus (which in turn owns the PPU, APU,
/// cartridge, and controllers) and enforces the global timing contract:
/// for every CPU cycle charged — instruction or DMA stall — the PPU
/// advances exactly three dots and the APU exactly one cycle.
///
/// [`Nes::step`] is the unit of progress. One call executes either a
/// single CPU instruction (delivering a latched NMI first), or a single
/// DMA stall cycle while an OAM transfer has the CPU off the bus.
pub struct Nes {
    cpu: Cpu,
    bus: CpuBus,

    cpu_cycles: u64,
    ppu_cycles: u64,
    frame_count: u64,
    /// Remaining DMA stall cycles; the CPU is suspended while nonzero.
    dma_remaining: u16,

    trace_enabled: bool,
    trace: Vec<TraceEntry>,
}

impl Nes {
    /// A powered-on machine with an empty cartridge slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: CpuBus::new(Cartridge::blank()),
            cpu_cycles: 0,
            ppu_cycles: 0,
            frame_count: 0,
            dma_remaining: 0,
            trace_enabled: false,
            trace: Vec::new(),
        }
    }

    /// Parse an iNES image and insert the resulting cartridge.
    ///
    /// # Errors
    ///
    /// Returns the loader's [`RomError`]; the machine keeps its previous
    /// cartridge when loading fails.
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), RomError> {
        self.load_cartridge(Cartridge::load(data)?);
        Ok(())
    }

    /// Insert a cartridge and cold-boot the machine: the PPU memory is
    /// rebuilt with the cartridge's mirror arrangement, a fresh CPU reads
    /// the new reset vector, and all counters restart at zero.
    pub fn load_cartridge(&mut self, cart: Cartridge) {
        log::debug!(
            "inserting cartridge: {} (header mapper {}), {:?} mirroring",
            cart.mapper_name(),
            cart.mapper_id(),
            cart.mirroring(),
        );
        self.bus.insert_cartridge(cart);
        self.cpu = Cpu::new();
        self.reset();
    }

    /// Reset the machine: counters and latches to zero, reset delegated
    /// to CPU, PPU, APU, and controllers, PPU frame counter re-seeded.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.cpu_cycles = 0;
        self.ppu_cycles = 0;
        self.frame_count = 0;
        self.dma_remaining = 0;
        self.trace.clear();
    }

    /// Execute one unit of progress: a DMA stall cycle when a transfer is
    /// in flight, otherwise one CPU instruction (after delivering any
    /// latched NMI). Companion components keep lockstep either way.
    pub fn step(&mut self) {
        if self.dma_remaining > 0 {
            self.dma_remaining -= 1;
            self.advance(1);
            return;
        }

        if self.bus.take_nmi() {
            self.cpu.trigger_nmi();
        }

        if self.trace_enabled {
            self.capture_trace();
        }

        let cycles = self.cpu.step(&mut self.bus);
        self.advance(u16::from(cycles));

        // A $4014 write during the instruction latches the stall cost; it
        // starts being paid on the next step.
        if let Some(stall) = self.bus.take_dma_stall() {
            self.dma_remaining = stall;
        }
    }

    /// Run until the frame counter advances past its current value.
    pub fn run_frame(&mut self) {
        let start = self.frame_count;
        while self.frame_count <= start {
            self.step();
        }
    }

    /// Run until at least `cycles` more CPU cycles have been charged.
    pub fn run_cycles(&mut self, cycles: u64) {
        let target = self.cpu_cycles + cycles;
        while self.cpu_cycles < target {
            self.step();
        }
    }

    /// Charge `cycles` CPU cycles: three PPU dots and one APU cycle each,
    /// then sync the frame counter from the PPU.
    fn advance(&mut self, cycles: u16) {
        for _ in 0..cycles {
            self.bus.step_ppu();
            self.bus.step_apu();
        }
        self.cpu_cycles += u64::from(cycles);
        self.ppu_cycles += 3 * u64::from(cycles);
        self.bus.add_cpu_cycles(cycles);
        self.frame_count = self.bus.ppu.frame();
    }

    fn capture_trace(&mut self) {
        let state = self.cpu.state();
        let entry = TraceEntry {
            pc: state.pc,
            opcode: self.bus.peek(state.pc),
            a: state.a,
            x: state.x,
            y: state.y,
            sp: state.sp,
            p: state.status,
            cpu_cycles: self.cpu_cycles,
            ppu_cycles: self.ppu_cycles,
            frame: self.frame_count,
        };
        self.trace.push(entry);
    }

    // ----- Observers -----

    /// CPU cycles charged since the last reset, DMA stalls included.
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cpu_cycles
    }

    /// PPU dots charged since the last reset. Always exactly three times
    /// [`Nes::cycle_count`].
    #[must_use]
    pub fn ppu_cycle_count(&self) -> u64 {
        self.ppu_cycles
    }

    /// Completed frames since the last reset.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// True while the current frame is odd-numbered.
    #[must_use]
    pub fn odd_frame(&self) -> bool {
        self.frame_count & 1 == 1
    }

    /// True while an OAM DMA transfer has the CPU suspended.
    #[must_use]
    pub fn is_dma_in_progress(&self) -> bool {
        self.dma_remaining > 0
    }

    /// CPU register snapshot.
    #[must_use]
    pub fn cpu_state(&self) -> CpuState {
        self.cpu.state()
    }

    /// PPU timing/register snapshot.
    #[must_use]
    pub fn ppu_state(&self) -> PpuState {
        self.bus.ppu.state()
    }

    /// The 256x240 frame snapshot. Read-only; valid until the next step.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u32] {
        self.bus.ppu.frame_buffer()
    }

    /// Drain the accumulated audio samples.
    pub fn take_audio_samples(&mut self) -> Vec<f32> {
        self.bus.apu.take_samples()
    }

    /// Peek at the accumulated audio samples.
    #[must_use]
    pub fn audio_samples(&self) -> &[f32] {
        self.bus.apu.samples()
    }

    /// Configure the APU sample rate.
    pub fn set_audio_sample_rate(&mut self, rate: u32) {
        self.bus.apu.set_sample_rate(rate);
    }

    /// Read memory without side effects (debug/tests).
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Borrow the system bus (debug/tests).
    #[must_use]
    pub fn bus(&self) -> &CpuBus {
        &self.bus
    }

    /// Mutably borrow the system bus (debug/tests).
    pub fn bus_mut(&mut self) -> &mut CpuBus {
        &mut self.bus
    }

    // ----- Controllers -----

    /// Set all eight buttons of one controller from an array in bit
    /// order: A, B, Select, Start, Up, Down, Left, Right.
    pub fn set_controller_buttons(&mut self, index: usize, buttons: [bool; 8]) {
        let mut state = 0u8;
        for (bit, &pressed) in buttons.iter().enumerate() {
            if pressed {
                state |= 1 << bit;
            }
        }
        self.bus.controller_mut(index).set_buttons(state);
    }

    /// Press or release one button of one controller.
    pub fn set_controller_button(&mut self, index: usize, button: Button, pressed: bool) {
        self.bus.controller_mut(index).set_button(button, pressed);
    }

    // ----- Debugging -----

    /// Turn per-instruction execution logging on or off.
    pub fn enable_execution_logging(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    /// The captured execution log.
    #[must_use]
    pub fn execution_log(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Drop the captured execution log.
    pub fn clear_execution_log(&mut self) {
        self.trace.clear();
    }

    /// Watch an address for CPU reads and writes.
    pub fn add_memory_watchpoint(&mut self, addr: u16) {
        self.bus.add_watchpoint(addr);
    }

    /// Turn watchpoint hit recording on or off.
    pub fn enable_watchpoint_logging(&mut self, enabled: bool) {
        self.bus.set_watch_logging(enabled);
    }

    /// Recorded watchpoint hits.
    #[must_use]
    pub fn watchpoint_hits(&self) -> &[WatchpointHit] {
        self.bus.watch_hits()
    }

    /// Drop all recorded watchpoint hits.
    pub fn clear_watchpoint_hits(&mut self) {
        self.bus.clear_watch_hits();
    }
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}
