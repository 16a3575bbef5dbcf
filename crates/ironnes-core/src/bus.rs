//! CPU and PPU memory decoding.
//!
//! [`CpuBus`] decodes the 16-bit CPU address space:
//!
//! ```text
//! $0000-$1FFF  2 KiB internal RAM, mirrored every $0800
//! $2000-$3FFF  PPU registers, mirrored every 8 bytes
//! $4000-$4013  APU channel registers
//! $4014        OAM DMA trigger (write), reads as 0
//! $4015        APU status
//! $4016        Controller 1 data / strobe for both pads
//! $4017        Controller 2 data (reads OR in bit 6) / APU frame counter
//! $4018-$401F  Reserved, reads 0, writes dropped
//! $4020-$FFFF  Cartridge space
//! ```
//!
//! [`PpuMemory`] holds the PPU-side storage the cartridge does not:
//! nametable VRAM with the configured mirror arrangement and the 32-byte
//! palette with its `$3F10/$3F14/$3F18/$3F1C` aliases. [`PpuMemoryView`]
//! stitches that together with cartridge CHR into the 14-bit PPU address
//! space the PPU crate expects.

use ironnes_apu::Apu;
use ironnes_cart::{Cartridge, Mirroring};
use ironnes_cpu::Bus;
use ironnes_ppu::{Ppu, PpuBus};

use crate::input::Controller;
use crate::trace::{AccessKind, WatchpointHit};

/// Simulated open-bus bit forced into controller 2 reads.
const CONTROLLER_2_OPEN_BUS: u8 = 0x40;

/// Nametable VRAM, palette RAM, and the active mirror arrangement.
pub struct PpuMemory {
    vram: Vec<u8>,
    palette: [u8; 32],
    mirroring: Mirroring,
}

impl PpuMemory {
    /// Allocate VRAM for the given arrangement: 2 KiB normally, 4 KiB when
    /// the cartridge declares four-screen.
    #[must_use]
    pub fn new(mirroring: Mirroring) -> Self {
        let vram_len = match mirroring {
            Mirroring::FourScreen => 4096,
            _ => 2048,
        };
        Self { vram: vec![0; vram_len], palette: [0; 32], mirroring }
    }

    /// Active mirror arrangement.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// Map a nametable address (`$2000-$3EFF`, pre-masked to 14 bits) to a
    /// physical VRAM index.
    fn vram_index(&self, addr: u16) -> usize {
        // $3000-$3EFF mirrors $2000-$2EFF, which the 12-bit fold handles.
        let rel = addr & 0x0FFF;
        let quadrant = (rel >> 10) as usize;
        let offset = (rel & 0x03FF) as usize;

        let page = match self.mirroring {
            Mirroring::Horizontal => quadrant >> 1,
            Mirroring::Vertical => quadrant & 1,
            Mirroring::SingleScreen0 => 0,
            Mirroring::SingleScreen1 => 1,
            Mirroring::FourScreen => quadrant,
        };

        page * 0x400 + offset
    }

    /// Map a palette address (`$3F00-$3FFF`) to its storage index,
    /// collapsing the four sprite-backdrop aliases onto the background
    /// entries.
    fn palette_index(addr: u16) -> usize {
        let index = (addr & 0x1F) as usize;
        match index {
            0x10 | 0x14 | 0x18 | 0x1C => index - 0x10,
            _ => index,
        }
    }

    fn clear(&mut self) {
        self.vram.fill(0);
        self.palette.fill(0);
    }
}

/// The 14-bit PPU address space: cartridge CHR below `$2000`, mirrored
/// nametable VRAM up to `$3EFF`, palette RAM above.
pub struct PpuMemoryView<'a> {
    cart: &'a mut Cartridge,
    mem: &'a mut PpuMemory,
}

impl<'a> PpuMemoryView<'a> {
    /// Borrow the cartridge and PPU-side storage into one address space.
    pub fn new(cart: &'a mut Cartridge, mem: &'a mut PpuMemory) -> Self {
        Self { cart, mem }
    }
}

impl PpuBus for PpuMemoryView<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.cart.read_chr(addr),
            0x2000..=0x3EFF => self.mem.vram[self.mem.vram_index(addr)],
            _ => self.mem.palette[PpuMemory::palette_index(addr)],
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.cart.write_chr(addr, value),
            0x2000..=0x3EFF => {
                let index = self.mem.vram_index(addr);
                self.mem.vram[index] = value;
            }
            _ => self.mem.palette[PpuMemory::palette_index(addr)] = value,
        }
    }
}

/// The CPU-visible system bus.
///
/// Owns everything the CPU can reach: internal RAM, the PPU (and its
/// memory), the APU, the cartridge, and both controller ports. The
/// scheduler drives it and collects the NMI and DMA latches between
/// instructions.
pub struct CpuBus {
    ram: [u8; 0x0800],
    /// Picture processing unit.
    pub ppu: Ppu,
    /// Audio processing unit.
    pub apu: Apu,
    cart: Cartridge,
    ppu_mem: PpuMemory,
    controllers: [Controller; 2],

    nmi_pending: bool,
    /// Stall cycles from an OAM DMA triggered during the current
    /// instruction, waiting for the scheduler to pick them up.
    dma_stall: Option<u16>,
    /// CPU cycle counter used for DMA parity; kept in step by the
    /// scheduler.
    cpu_cycles: u64,

    watchpoints: Vec<u16>,
    watch_logging: bool,
    watch_hits: Vec<WatchpointHit>,
}

impl CpuBus {
    /// Build a bus around a cartridge.
    #[must_use]
    pub fn new(cart: Cartridge) -> Self {
        let ppu_mem = PpuMemory::new(cart.mirroring());
        Self {
            ram: [0; 0x0800],
            ppu: Ppu::new(),
            apu: Apu::new(),
            cart,
            ppu_mem,
            controllers: [Controller::new(), Controller::new()],
            nmi_pending: false,
            dma_stall: None,
            cpu_cycles: 0,
            watchpoints: Vec::new(),
            watch_logging: false,
            watch_hits: Vec::new(),
        }
    }

    /// Swap in a new cartridge and rebuild the PPU-side memory with the
    /// arrangement it declares.
    pub fn insert_cartridge(&mut self, cart: Cartridge) {
        self.ppu_mem = PpuMemory::new(cart.mirroring());
        self.cart = cart;
    }

    /// The loaded cartridge.
    #[must_use]
    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    /// Mutable access to the loaded cartridge.
    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cart
    }

    /// One controller port (0 or 1).
    pub fn controller_mut(&mut self, index: usize) -> &mut Controller {
        &mut self.controllers[index]
    }

    /// Reset RAM, components, controllers, and every latch. The cartridge
    /// (and its SRAM) survives.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.ppu.reset();
        self.apu.reset();
        self.cart.reset();
        self.ppu_mem.clear();
        for pad in &mut self.controllers {
            pad.reset();
        }
        self.nmi_pending = false;
        self.dma_stall = None;
        self.cpu_cycles = 0;
        self.watch_hits.clear();
    }

    /// Advance the PPU three dots (one CPU cycle worth), latching any NMI
    /// edge it raises.
    pub fn step_ppu(&mut self) {
        for _ in 0..3 {
            if self.ppu.step() {
                self.nmi_pending = true;
            }
        }
    }

    /// Advance the APU one CPU cycle.
    pub fn step_apu(&mut self) {
        self.apu.clock();
    }

    /// Take the latched NMI edge, if any.
    pub fn take_nmi(&mut self) -> bool {
        core::mem::take(&mut self.nmi_pending)
    }

    /// Take the stall cost of an OAM DMA triggered during the last
    /// instruction, if one fired.
    pub fn take_dma_stall(&mut self) -> Option<u16> {
        self.dma_stall.take()
    }

    /// Account CPU cycles on the bus (drives DMA parity).
    pub fn add_cpu_cycles(&mut self, cycles: u16) {
        self.cpu_cycles += u64::from(cycles);
    }

    /// Bus CPU-cycle counter.
    #[must_use]
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    /// Watch an address for CPU reads and writes.
    pub fn add_watchpoint(&mut self, addr: u16) {
        if !self.watchpoints.contains(&addr) {
            self.watchpoints.push(addr);
        }
    }

    /// Turn watchpoint hit recording on or off.
    pub fn set_watch_logging(&mut self, enabled: bool) {
        self.watch_logging = enabled;
    }

    /// Recorded watchpoint hits.
    #[must_use]
    pub fn watch_hits(&self) -> &[WatchpointHit] {
        &self.watch_hits
    }

    /// Drop all recorded watchpoint hits.
    pub fn clear_watch_hits(&mut self) {
        self.watch_hits.clear();
    }

    fn record_access(&mut self, addr: u16, value: u8, kind: AccessKind) {
        if self.watch_logging && self.watchpoints.contains(&addr) {
            self.watch_hits.push(WatchpointHit { addr, value, kind, cpu_cycle: self.cpu_cycles });
        }
    }

    /// OAM DMA: copy one CPU page into OAM and report the stall cost.
    ///
    /// The copy is a single atomic pass; source reads go through the
    /// side-effect-free path so the transfer cannot perturb PPU or APU
    /// state. The stall is 513 cycles, plus one when the bus cycle
    /// counter is odd at trigger time.
    fn begin_oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        for i in 0..=255u8 {
            let value = self.peek(base | u16::from(i));
            self.ppu.write_oam(i, value);
        }
        self.dma_stall = Some(513 + (self.cpu_cycles & 1) as u16);
    }

    /// Read without side effects: PPU/APU/controller windows return 0
    /// instead of disturbing register state. Used by OAM DMA and debug
    /// inspection.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x401F => 0,
            0x4020..=0xFFFF => self.cart.read_prg(addr),
        }
    }
}

impl Bus for CpuBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            // Internal RAM, mirrored every 2 KiB.
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers, mirrored every 8 bytes.
            0x2000..=0x3FFF => {
                let mut view = PpuMemoryView::new(&mut self.cart, &mut self.ppu_mem);
                self.ppu.read_register(addr, &mut view)
            }

            0x4015 => self.apu.read_status(),
            0x4016 => self.controllers[0].read(),
            0x4017 => self.controllers[1].read() | CONTROLLER_2_OPEN_BUS,

            // $4014 and the write-only APU registers read as open-bus 0.
            0x4000..=0x401F => 0,

            // Cartridge space, expansion area included.
            0x4020..=0xFFFF => self.cart.read_prg(addr),
        };

        self.record_access(addr, value, AccessKind::Read);
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.record_access(addr, value, AccessKind::Write);

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,

            0x2000..=0x3FFF => {
                let mut view = PpuMemoryView::new(&mut self.cart, &mut self.ppu_mem);
                self.ppu.write_register(addr, value, &mut view);
            }

            0x4014 => self.begin_oam_dma(value),
            0x4016 => {
                // One strobe line feeds both pads.
                self.controllers[0].write_strobe(value);
                self.controllers[1].write_strobe(value);
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, value),

            // Reserved I/O test window.
            0x4018..=0x401F => {}

            0x4020..=0xFFFF => self.cart.write_prg(addr, value),
        }
    }
}
