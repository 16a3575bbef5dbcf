//! Opcode decode table.
//!
//! One entry per opcode byte: mnemonic, addressing mode, base cycle count,
//! and whether an indexed read crossing a page boundary costs an extra
//! cycle. Branch penalties (taken / taken-across-page) are handled by the
//! executor, not the table.
//!
//! Undocumented opcodes decode as follows: the NOP family keeps its real
//! operand width and timing, JAM halts the CPU, and the remaining
//! read-modify-write combinations decode as NOPs of the same shape so that
//! the program counter and the cycle accounting stay aligned even when a
//! ROM strays into them.

use crate::addressing::AddrMode;

/// Instruction mnemonic used for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)] // The variants are the 6502 mnemonics themselves.
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx,
    Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay,
    Tsx, Txa, Txs, Tya,
    /// Undocumented halt opcode. The CPU stops until reset.
    Jam,
}

impl Mnemonic {
    /// Three-letter assembler name (JAM for the halt opcodes).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC", Self::And => "AND", Self::Asl => "ASL",
            Self::Bcc => "BCC", Self::Bcs => "BCS", Self::Beq => "BEQ",
            Self::Bit => "BIT", Self::Bmi => "BMI", Self::Bne => "BNE",
            Self::Bpl => "BPL", Self::Brk => "BRK", Self::Bvc => "BVC",
            Self::Bvs => "BVS", Self::Clc => "CLC", Self::Cld => "CLD",
            Self::Cli => "CLI", Self::Clv => "CLV", Self::Cmp => "CMP",
            Self::Cpx => "CPX", Self::Cpy => "CPY", Self::Dec => "DEC",
            Self::Dex => "DEX", Self::Dey => "DEY", Self::Eor => "EOR",
            Self::Inc => "INC", Self::Inx => "INX", Self::Iny => "INY",
            Self::Jmp => "JMP", Self::Jsr => "JSR", Self::Lda => "LDA",
            Self::Ldx => "LDX", Self::Ldy => "LDY", Self::Lsr => "LSR",
            Self::Nop => "NOP", Self::Ora => "ORA", Self::Pha => "PHA",
            Self::Php => "PHP", Self::Pla => "PLA", Self::Plp => "PLP",
            Self::Rol => "ROL", Self::Ror => "ROR", Self::Rti => "RTI",
            Self::Rts => "RTS", Self::Sbc => "SBC", Self::Sec => "SEC",
            Self::Sed => "SED", Self::Sei => "SEI", Self::Sta => "STA",
            Self::Stx => "STX", Self::Sty => "STY", Self::Tax => "TAX",
            Self::Tay => "TAY", Self::Tsx => "TSX", Self::Txa => "TXA",
            Self::Txs => "TXS", Self::Tya => "TYA", Self::Jam => "JAM",
        }
    }
}

/// Decoded opcode attributes.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    /// Instruction to execute.
    pub mnemonic: Mnemonic,
    /// How the operand is located.
    pub mode: AddrMode,
    /// Base cycle count.
    pub cycles: u8,
    /// Extra cycle when an indexed read crosses a page.
    pub page_penalty: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, cycles: u8) -> Opcode {
    Opcode { mnemonic, mode, cycles, page_penalty: false }
}

const fn pg(mnemonic: Mnemonic, mode: AddrMode, cycles: u8) -> Opcode {
    Opcode { mnemonic, mode, cycles, page_penalty: true }
}

/// The full 256-entry decode table, indexed by opcode byte.
#[rustfmt::skip]
pub const OPCODES: [Opcode; 256] = {
    use AddrMode::{
        Absolute as Abs, AbsoluteX as Abx, AbsoluteY as Aby, Accumulator as Acc,
        Immediate as Imm, Implied as Imp, Indirect as Ind, IndirectX as Izx,
        IndirectY as Izy, Relative as Rel, ZeroPage as Zpg, ZeroPageX as Zpx,
        ZeroPageY as Zpy,
    };
    use Mnemonic::*;
    [
        // 0x00
        op(Brk, Imp, 7), op(Ora, Izx, 6), op(Jam, Imp, 2), op(Nop, Izx, 8),
        op(Nop, Zpg, 3), op(Ora, Zpg, 3), op(Asl, Zpg, 5), op(Nop, Zpg, 5),
        op(Php, Imp, 3), op(Ora, Imm, 2), op(Asl, Acc, 2), op(Nop, Imm, 2),
        op(Nop, Abs, 4), op(Ora, Abs, 4), op(Asl, Abs, 6), op(Nop, Abs, 6),
        // 0x10
        op(Bpl, Rel, 2), pg(Ora, Izy, 5), op(Jam, Imp, 2), op(Nop, Izy, 8),
        op(Nop, Zpx, 4), op(Ora, Zpx, 4), op(Asl, Zpx, 6), op(Nop, Zpx, 6),
        op(Clc, Imp, 2), pg(Ora, Aby, 4), op(Nop, Imp, 2), op(Nop, Aby, 7),
        pg(Nop, Abx, 4), pg(Ora, Abx, 4), op(Asl, Abx, 7), op(Nop, Abx, 7),
        // 0x20
        op(Jsr, Abs, 6), op(And, Izx, 6), op(Jam, Imp, 2), op(Nop, Izx, 8),
        op(Bit, Zpg, 3), op(And, Zpg, 3), op(Rol, Zpg, 5), op(Nop, Zpg, 5),
        op(Plp, Imp, 4), op(And, Imm, 2), op(Rol, Acc, 2), op(Nop, Imm, 2),
        op(Bit, Abs, 4), op(And, Abs, 4), op(Rol, Abs, 6), op(Nop, Abs, 6),
        // 0x30
        op(Bmi, Rel, 2), pg(And, Izy, 5), op(Jam, Imp, 2), op(Nop, Izy, 8),
        op(Nop, Zpx, 4), op(And, Zpx, 4), op(Rol, Zpx, 6), op(Nop, Zpx, 6),
        op(Sec, Imp, 2), pg(And, Aby, 4), op(Nop, Imp, 2), op(Nop, Aby, 7),
        pg(Nop, Abx, 4), pg(And, Abx, 4), op(Rol, Abx, 7), op(Nop, Abx, 7),
        // 0x40
        op(Rti, Imp, 6), op(Eor, Izx, 6), op(Jam, Imp, 2), op(Nop, Izx, 8),
        op(Nop, Zpg, 3), op(Eor, Zpg, 3), op(Lsr, Zpg, 5), op(Nop, Zpg, 5),
        op(Pha, Imp, 3), op(Eor, Imm, 2), op(Lsr, Acc, 2), op(Nop, Imm, 2),
        op(Jmp, Abs, 3), op(Eor, Abs, 4), op(Lsr, Abs, 6), op(Nop, Abs, 6),
        // 0x50
        op(Bvc, Rel, 2), pg(Eor, Izy, 5), op(Jam, Imp, 2), op(Nop, Izy, 8),
        op(Nop, Zpx, 4), op(Eor, Zpx, 4), op(Lsr, Zpx, 6), op(Nop, Zpx, 6),
        op(Cli, Imp, 2), pg(Eor, Aby, 4), op(Nop, Imp, 2), op(Nop, Aby, 7),
        pg(Nop, Abx, 4), pg(Eor, Abx, 4), op(Lsr, Abx, 7), op(Nop, Abx, 7),
        // 0x60
        op(Rts, Imp, 6), op(Adc, Izx, 6), op(Jam, Imp, 2), op(Nop, Izx, 8),
        op(Nop, Zpg, 3), op(Adc, Zpg, 3), op(Ror, Zpg, 5), op(Nop, Zpg, 5),
        op(Pla, Imp, 4), op(Adc, Imm, 2), op(Ror, Acc, 2), op(Nop, Imm, 2),
        op(Jmp, Ind, 5), op(Adc, Abs, 4), op(Ror, Abs, 6), op(Nop, Abs, 6),
        // 0x70
        op(Bvs, Rel, 2), pg(Adc, Izy, 5), op(Jam, Imp, 2), op(Nop, Izy, 8),
        op(Nop, Zpx, 4), op(Adc, Zpx, 4), op(Ror, Zpx, 6), op(Nop, Zpx, 6),
        op(Sei, Imp, 2), pg(Adc, Aby, 4), op(Nop, Imp, 2), op(Nop, Aby, 7),
        pg(Nop, Abx, 4), pg(Adc, Abx, 4), op(Ror, Abx, 7), op(Nop, Abx, 7),
        // 0x80
        op(Nop, Imm, 2), op(Sta, Izx, 6), op(Nop, Imm, 2), op(Nop, Izx, 6),
        op(Sty, Zpg, 3), op(Sta, Zpg, 3), op(Stx, Zpg, 3), op(Nop, Zpg, 3),
        op(Dey, Imp, 2), op(Nop, Imm, 2), op(Txa, Imp, 2), op(Nop, Imm, 2),
        op(Sty, Abs, 4), op(Sta, Abs, 4), op(Stx, Abs, 4), op(Nop, Abs, 4),
        // 0x90
        op(Bcc, Rel, 2), op(Sta, Izy, 6), op(Jam, Imp, 2), op(Nop, Izy, 6),
        op(Sty, Zpx, 4), op(Sta, Zpx, 4), op(Stx, Zpy, 4), op(Nop, Zpy, 4),
        op(Tya, Imp, 2), op(Sta, Aby, 5), op(Txs, Imp, 2), op(Nop, Aby, 5),
        op(Nop, Abx, 5), op(Sta, Abx, 5), op(Nop, Aby, 5), op(Nop, Aby, 5),
        // 0xA0
        op(Ldy, Imm, 2), op(Lda, Izx, 6), op(Ldx, Imm, 2), op(Nop, Izx, 6),
        op(Ldy, Zpg, 3), op(Lda, Zpg, 3), op(Ldx, Zpg, 3), op(Nop, Zpg, 3),
        op(Tay, Imp, 2), op(Lda, Imm, 2), op(Tax, Imp, 2), op(Nop, Imm, 2),
        op(Ldy, Abs, 4), op(Lda, Abs, 4), op(Ldx, Abs, 4), op(Nop, Abs, 4),
        // 0xB0
        op(Bcs, Rel, 2), pg(Lda, Izy, 5), op(Jam, Imp, 2), pg(Nop, Izy, 5),
        op(Ldy, Zpx, 4), op(Lda, Zpx, 4), op(Ldx, Zpy, 4), op(Nop, Zpy, 4),
        op(Clv, Imp, 2), pg(Lda, Aby, 4), op(Tsx, Imp, 2), pg(Nop, Aby, 4),
        pg(Ldy, Abx, 4), pg(Lda, Abx, 4), pg(Ldx, Aby, 4), pg(Nop, Aby, 4),
        // 0xC0
        op(Cpy, Imm, 2), op(Cmp, Izx, 6), op(Nop, Imm, 2), op(Nop, Izx, 8),
        op(Cpy, Zpg, 3), op(Cmp, Zpg, 3), op(Dec, Zpg, 5), op(Nop, Zpg, 5),
        op(Iny, Imp, 2), op(Cmp, Imm, 2), op(Dex, Imp, 2), op(Nop, Imm, 2),
        op(Cpy, Abs, 4), op(Cmp, Abs, 4), op(Dec, Abs, 6), op(Nop, Abs, 6),
        // 0xD0
        op(Bne, Rel, 2), pg(Cmp, Izy, 5), op(Jam, Imp, 2), op(Nop, Izy, 8),
        op(Nop, Zpx, 4), op(Cmp, Zpx, 4), op(Dec, Zpx, 6), op(Nop, Zpx, 6),
        op(Cld, Imp, 2), pg(Cmp, Aby, 4), op(Nop, Imp, 2), op(Nop, Aby, 7),
        pg(Nop, Abx, 4), pg(Cmp, Abx, 4), op(Dec, Abx, 7), op(Nop, Abx, 7),
        // 0xE0
        op(Cpx, Imm, 2), op(Sbc, Izx, 6), op(Nop, Imm, 2), op(Nop, Izx, 8),
        op(Cpx, Zpg, 3), op(Sbc, Zpg, 3), op(Inc, Zpg, 5), op(Nop, Zpg, 5),
        op(Inx, Imp, 2), op(Sbc, Imm, 2), op(Nop, Imp, 2), op(Sbc, Imm, 2),
        op(Cpx, Abs, 4), op(Sbc, Abs, 4), op(Inc, Abs, 6), op(Nop, Abs, 6),
        // 0xF0
        op(Beq, Rel, 2), pg(Sbc, Izy, 5), op(Jam, Imp, 2), op(Nop, Izy, 8),
        op(Nop, Zpx, 4), op(Sbc, Zpx, 4), op(Inc, Zpx, 6), op(Nop, Zpx, 6),
        op(Sed, Imp, 2), pg(Sbc, Aby, 4), op(Nop, Imp, 2), op(Nop, Aby, 7),
        pg(Nop, Abx, 4), pg(Sbc, Abx, 4), op(Inc, Abx, 7), op(Nop, Abx, 7),
    ]
};
