//! CPU execution core.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::{Mnemonic, OPCODES};
use crate::status::Status;
use crate::vectors;

/// Register snapshot taken at an instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    /// Program counter.
    pub pc: u16,
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer.
    pub sp: u8,
    /// Status flags as a raw byte.
    pub status: u8,
    /// Total cycles executed so far.
    pub cycles: u64,
}

/// Where an instruction's operand lives after address resolution.
enum Operand {
    None,
    Accumulator,
    Memory(u16),
    Branch(i8),
}

/// MOS 6502 CPU.
///
/// One [`Cpu::step`] executes one whole instruction (or one interrupt entry
/// sequence) and reports its cycle cost. Interrupt lines are sampled at the
/// instruction boundary: a latched NMI always wins over a pending IRQ, and
/// IRQ is ignored while the I flag is set.
#[derive(Debug)]
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer into $0100-$01FF.
    pub sp: u8,
    /// Status flags.
    pub status: Status,
    /// Total cycles executed.
    pub cycles: u64,
    nmi_pending: bool,
    irq_line: bool,
    jammed: bool,
}

impl Cpu {
    /// Create a CPU in power-on state. `reset` must run before stepping so
    /// that PC is loaded from the reset vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: Status::POWER_ON,
            cycles: 0,
            nmi_pending: false,
            irq_line: false,
            jammed: false,
        }
    }

    /// Run the RESET sequence: SP drops by 3 with no writes, I is set, and
    /// PC is loaded from $FFFC/$FFFD. Costs 7 cycles.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.sp = self.sp.wrapping_sub(3);
        self.status.insert(Status::I);
        self.pc = bus.read_u16(vectors::RESET);
        self.cycles += 7;
        self.nmi_pending = false;
        self.irq_line = false;
        self.jammed = false;
    }

    /// Latch an NMI edge. Consumed by the next `step`.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drive the level-triggered IRQ line.
    pub fn set_irq(&mut self, active: bool) {
        self.irq_line = active;
    }

    /// True once a JAM opcode has halted execution.
    #[must_use]
    pub fn is_jammed(&self) -> bool {
        self.jammed
    }

    /// Snapshot registers and flags.
    #[must_use]
    pub fn state(&self) -> CpuState {
        CpuState {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            status: self.status.bits(),
            cycles: self.cycles,
        }
    }

    /// Execute one instruction and return the cycles it consumed.
    ///
    /// A latched NMI (or an un-masked IRQ) is taken instead of an
    /// instruction and costs the 7-cycle interrupt entry. A jammed CPU
    /// burns one cycle per call.
    pub fn step(&mut self, bus: &mut impl Bus) -> u8 {
        if self.jammed {
            self.cycles += 1;
            return 1;
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            return self.interrupt(bus, vectors::NMI);
        }

        if self.irq_line && !self.status.contains(Status::I) {
            return self.interrupt(bus, vectors::IRQ);
        }

        let opcode = self.fetch(bus);
        let info = &OPCODES[opcode as usize];
        let (operand, page_crossed) = self.resolve(bus, info.mode);
        let extra = self.execute(bus, info.mnemonic, operand);

        let mut total = info.cycles + extra;
        if info.page_penalty && page_crossed {
            total += 1;
        }
        self.cycles += u64::from(total);
        total
    }

    /// Interrupt entry: push PC and status, set I, load the vector.
    fn interrupt(&mut self, bus: &mut impl Bus, vector: u16) -> u8 {
        self.push_u16(bus, self.pc);
        self.push(bus, self.status.pushed(false));
        self.status.insert(Status::I);
        self.pc = bus.read_u16(vector);
        self.cycles += 7;
        7
    }

    fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = u16::from(self.fetch(bus));
        let hi = u16::from(self.fetch(bus));
        hi << 8 | lo
    }

    /// Resolve the operand location, consuming operand bytes. The second
    /// return value reports whether an indexed address crossed a page.
    fn resolve(&mut self, bus: &mut impl Bus, mode: AddrMode) -> (Operand, bool) {
        match mode {
            AddrMode::Implied => (Operand::None, false),
            AddrMode::Accumulator => (Operand::Accumulator, false),
            AddrMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (Operand::Memory(addr), false)
            }
            AddrMode::ZeroPage => {
                let addr = u16::from(self.fetch(bus));
                (Operand::Memory(addr), false)
            }
            AddrMode::ZeroPageX => {
                let addr = u16::from(self.fetch(bus).wrapping_add(self.x));
                (Operand::Memory(addr), false)
            }
            AddrMode::ZeroPageY => {
                let addr = u16::from(self.fetch(bus).wrapping_add(self.y));
                (Operand::Memory(addr), false)
            }
            AddrMode::Absolute => {
                let addr = self.fetch_u16(bus);
                (Operand::Memory(addr), false)
            }
            AddrMode::AbsoluteX => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.x));
                (Operand::Memory(addr), crossed(base, addr))
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.y));
                (Operand::Memory(addr), crossed(base, addr))
            }
            AddrMode::Indirect => {
                // JMP ($xxFF) wraps the pointer high byte read inside the page.
                let ptr = self.fetch_u16(bus);
                let lo = u16::from(bus.read(ptr));
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = u16::from(bus.read(hi_addr));
                (Operand::Memory(hi << 8 | lo), false)
            }
            AddrMode::IndirectX => {
                let zp = self.fetch(bus).wrapping_add(self.x);
                let lo = u16::from(bus.read(u16::from(zp)));
                let hi = u16::from(bus.read(u16::from(zp.wrapping_add(1))));
                (Operand::Memory(hi << 8 | lo), false)
            }
            AddrMode::IndirectY => {
                let zp = self.fetch(bus);
                let lo = u16::from(bus.read(u16::from(zp)));
                let hi = u16::from(bus.read(u16::from(zp.wrapping_add(1))));
                let base = hi << 8 | lo;
                let addr = base.wrapping_add(u16::from(self.y));
                (Operand::Memory(addr), crossed(base, addr))
            }
            AddrMode::Relative => {
                let offset = self.fetch(bus) as i8;
                (Operand::Branch(offset), false)
            }
        }
    }

    /// Execute a resolved instruction. Returns the branch penalty cycles
    /// (0 for everything that is not a taken branch).
    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, bus: &mut impl Bus, mnemonic: Mnemonic, operand: Operand) -> u8 {
        use Mnemonic::*;

        match mnemonic {
            // Loads and stores
            Lda => {
                self.a = self.load(bus, &operand);
                self.status.update_zn(self.a);
            }
            Ldx => {
                self.x = self.load(bus, &operand);
                self.status.update_zn(self.x);
            }
            Ldy => {
                self.y = self.load(bus, &operand);
                self.status.update_zn(self.y);
            }
            Sta => self.store(bus, &operand, self.a),
            Stx => self.store(bus, &operand, self.x),
            Sty => self.store(bus, &operand, self.y),

            // Transfers
            Tax => {
                self.x = self.a;
                self.status.update_zn(self.x);
            }
            Tay => {
                self.y = self.a;
                self.status.update_zn(self.y);
            }
            Txa => {
                self.a = self.x;
                self.status.update_zn(self.a);
            }
            Tya => {
                self.a = self.y;
                self.status.update_zn(self.a);
            }
            Tsx => {
                self.x = self.sp;
                self.status.update_zn(self.x);
            }
            Txs => self.sp = self.x,

            // Arithmetic
            Adc => {
                let value = self.load(bus, &operand);
                self.add_with_carry(value);
            }
            Sbc => {
                let value = self.load(bus, &operand);
                self.add_with_carry(!value);
            }
            Cmp => {
                let value = self.load(bus, &operand);
                self.compare(self.a, value);
            }
            Cpx => {
                let value = self.load(bus, &operand);
                self.compare(self.x, value);
            }
            Cpy => {
                let value = self.load(bus, &operand);
                self.compare(self.y, value);
            }

            // Logic
            And => {
                self.a &= self.load(bus, &operand);
                self.status.update_zn(self.a);
            }
            Ora => {
                self.a |= self.load(bus, &operand);
                self.status.update_zn(self.a);
            }
            Eor => {
                self.a ^= self.load(bus, &operand);
                self.status.update_zn(self.a);
            }
            Bit => {
                let value = self.load(bus, &operand);
                self.status.assign(Status::Z, self.a & value == 0);
                self.status.assign(Status::N, value & 0x80 != 0);
                self.status.assign(Status::V, value & 0x40 != 0);
            }

            // Shifts and rotates
            Asl => self.modify(bus, &operand, |status, v| {
                status.assign(Status::C, v & 0x80 != 0);
                v << 1
            }),
            Lsr => self.modify(bus, &operand, |status, v| {
                status.assign(Status::C, v & 0x01 != 0);
                v >> 1
            }),
            Rol => self.modify(bus, &operand, |status, v| {
                let carry_in = u8::from(status.contains(Status::C));
                status.assign(Status::C, v & 0x80 != 0);
                v << 1 | carry_in
            }),
            Ror => self.modify(bus, &operand, |status, v| {
                let carry_in = u8::from(status.contains(Status::C));
                status.assign(Status::C, v & 0x01 != 0);
                v >> 1 | carry_in << 7
            }),

            // Increments and decrements
            Inc => self.modify(bus, &operand, |_, v| v.wrapping_add(1)),
            Dec => self.modify(bus, &operand, |_, v| v.wrapping_sub(1)),
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.update_zn(self.x);
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.update_zn(self.y);
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.update_zn(self.x);
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.update_zn(self.y);
            }

            // Control flow
            Jmp => {
                if let Operand::Memory(addr) = operand {
                    self.pc = addr;
                }
            }
            Jsr => {
                if let Operand::Memory(addr) = operand {
                    self.push_u16(bus, self.pc.wrapping_sub(1));
                    self.pc = addr;
                }
            }
            Rts => {
                self.pc = self.pull_u16(bus).wrapping_add(1);
            }
            Brk => {
                // BRK skips a padding byte before pushing the return address.
                self.push_u16(bus, self.pc.wrapping_add(1));
                self.push(bus, self.status.pushed(true));
                self.status.insert(Status::I);
                self.pc = bus.read_u16(vectors::IRQ);
            }
            Rti => {
                let flags = self.pull(bus);
                self.status = Status::pulled(flags);
                self.pc = self.pull_u16(bus);
            }

            // Branches
            Bcc => return self.branch(&operand, !self.status.contains(Status::C)),
            Bcs => return self.branch(&operand, self.status.contains(Status::C)),
            Bne => return self.branch(&operand, !self.status.contains(Status::Z)),
            Beq => return self.branch(&operand, self.status.contains(Status::Z)),
            Bpl => return self.branch(&operand, !self.status.contains(Status::N)),
            Bmi => return self.branch(&operand, self.status.contains(Status::N)),
            Bvc => return self.branch(&operand, !self.status.contains(Status::V)),
            Bvs => return self.branch(&operand, self.status.contains(Status::V)),

            // Stack
            Pha => self.push(bus, self.a),
            Php => self.push(bus, self.status.pushed(true)),
            Pla => {
                self.a = self.pull(bus);
                self.status.update_zn(self.a);
            }
            Plp => {
                let flags = self.pull(bus);
                self.status = Status::pulled(flags);
            }

            // Flag manipulation
            Clc => self.status.remove(Status::C),
            Sec => self.status.insert(Status::C),
            Cli => self.status.remove(Status::I),
            Sei => self.status.insert(Status::I),
            Clv => self.status.remove(Status::V),
            Cld => self.status.remove(Status::D),
            Sed => self.status.insert(Status::D),

            Nop => {}
            Jam => {
                self.jammed = true;
                log::warn!("CPU halted by JAM opcode at ${:04X}", self.pc.wrapping_sub(1));
            }
        }

        0
    }

    fn load(&mut self, bus: &mut impl Bus, operand: &Operand) -> u8 {
        match operand {
            Operand::Memory(addr) => bus.read(*addr),
            Operand::Accumulator => self.a,
            _ => 0,
        }
    }

    fn store(&mut self, bus: &mut impl Bus, operand: &Operand, value: u8) {
        if let Operand::Memory(addr) = operand {
            bus.write(*addr, value);
        }
    }

    /// Read-modify-write on memory or the accumulator. Z and N come from
    /// the result; C is up to the closure.
    fn modify(&mut self, bus: &mut impl Bus, operand: &Operand, f: impl FnOnce(&mut Status, u8) -> u8) {
        match operand {
            Operand::Accumulator => {
                self.a = f(&mut self.status, self.a);
                self.status.update_zn(self.a);
            }
            Operand::Memory(addr) => {
                let value = bus.read(*addr);
                let result = f(&mut self.status, value);
                bus.write(*addr, result);
                self.status.update_zn(result);
            }
            _ => {}
        }
    }

    fn add_with_carry(&mut self, value: u8) {
        let carry_in = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry_in;
        let result = sum as u8;
        self.status.assign(Status::C, sum > 0xFF);
        self.status
            .assign(Status::V, (self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.a = result;
        self.status.update_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.assign(Status::C, register >= value);
        self.status.update_zn(register.wrapping_sub(value));
    }

    /// Take (or skip) a branch. Taken branches cost 1 extra cycle, plus 1
    /// more when the target lands in a different page.
    fn branch(&mut self, operand: &Operand, condition: bool) -> u8 {
        let Operand::Branch(offset) = operand else {
            return 0;
        };
        if !condition {
            return 0;
        }
        let target = self.pc.wrapping_add(*offset as u16);
        let penalty = 1 + u8::from(crossed(self.pc, target));
        self.pc = target;
        penalty
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | u16::from(self.sp))
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = u16::from(self.pull(bus));
        let hi = u16::from(self.pull(bus));
        hi << 8 | lo
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

/// True when two addresses live in different 256-byte pages.
#[inline]
fn crossed(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}
