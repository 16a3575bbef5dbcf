//! Register front end of the NES 2A03 APU.
//!
//! The system bus needs the APU's CPU-visible surface: the `$4000-$4013`
//! channel registers, the `$4015` enable/status register, the `$4017` frame
//! counter mode, and a steady stream of output samples clocked at the CPU
//! rate. That surface is what this crate provides. Waveform synthesis is
//! not modeled; the sample queue carries silence at the configured sample
//! rate, and the caller owns draining it.

use bitflags::bitflags;

/// NTSC CPU clock in Hz, which is also the APU clock.
pub const CPU_CLOCK_NTSC: u32 = 1_789_773;

bitflags! {
    /// Channel enable bits of `$4015`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Channels: u8 {
        /// Pulse channel 1.
        const PULSE_1 = 1 << 0;
        /// Pulse channel 2.
        const PULSE_2 = 1 << 1;
        /// Triangle channel.
        const TRIANGLE = 1 << 2;
        /// Noise channel.
        const NOISE = 1 << 3;
        /// Delta modulation channel.
        const DMC = 1 << 4;
    }
}

/// The 2A03 APU register file and sample pacer.
pub struct Apu {
    /// Raw `$4000-$4013` register values.
    registers: [u8; 0x14],
    enabled: Channels,
    /// Frame counter mode: false = 4-step, true = 5-step.
    five_step_mode: bool,
    irq_inhibit: bool,

    cycles: u64,
    sample_rate: u32,
    sample_interval: u32,
    sample_countdown: u32,
    samples: Vec<f32>,
}

impl Apu {
    /// Default host sample rate.
    pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

    /// Create an APU with the default sample rate.
    #[must_use]
    pub fn new() -> Self {
        let mut apu = Self {
            registers: [0; 0x14],
            enabled: Channels::empty(),
            five_step_mode: false,
            irq_inhibit: false,
            cycles: 0,
            sample_rate: 0,
            sample_interval: 0,
            sample_countdown: 0,
            samples: Vec::with_capacity(2048),
        };
        apu.set_sample_rate(Self::DEFAULT_SAMPLE_RATE);
        apu
    }

    /// Return to power-on state. The sample rate survives reset.
    pub fn reset(&mut self) {
        self.registers = [0; 0x14];
        self.enabled = Channels::empty();
        self.five_step_mode = false;
        self.irq_inhibit = false;
        self.cycles = 0;
        self.sample_countdown = self.sample_interval;
        self.samples.clear();
    }

    /// Advance one CPU cycle, emitting a sample when the pacer rolls over.
    pub fn clock(&mut self) {
        self.cycles += 1;
        self.sample_countdown -= 1;
        if self.sample_countdown == 0 {
            self.sample_countdown = self.sample_interval;
            self.samples.push(0.0);
        }
    }

    /// Write an APU register (`$4000-$4013`, `$4015`, `$4017`).
    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000..=0x4013 => self.registers[(addr - 0x4000) as usize] = value,
            0x4015 => self.enabled = Channels::from_bits_truncate(value),
            0x4017 => {
                self.five_step_mode = value & 0x80 != 0;
                self.irq_inhibit = value & 0x40 != 0;
            }
            _ => {}
        }
    }

    /// Read `$4015`: the channel activity bits.
    #[must_use]
    pub fn read_status(&self) -> u8 {
        self.enabled.bits()
    }

    /// Configure the host sample rate. Rates of 0 are clamped to the
    /// default.
    pub fn set_sample_rate(&mut self, rate: u32) {
        let rate = if rate == 0 { Self::DEFAULT_SAMPLE_RATE } else { rate };
        self.sample_rate = rate;
        self.sample_interval = (CPU_CLOCK_NTSC / rate).max(1);
        self.sample_countdown = self.sample_interval;
    }

    /// Configured sample rate in Hz.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Drain the accumulated samples.
    pub fn take_samples(&mut self) -> Vec<f32> {
        core::mem::take(&mut self.samples)
    }

    /// Peek at the accumulated samples without draining.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Total cycles clocked.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}
