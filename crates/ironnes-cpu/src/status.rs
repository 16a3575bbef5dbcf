//! Processor status register (P).

use bitflags::bitflags;

bitflags! {
    /// 6502 status flags.
    ///
    /// ```text
    /// 7  6  5  4  3  2  1  0
    /// N  V  U  B  D  I  Z  C
    /// ```
    ///
    /// B and U are not real flip-flops: they only exist in the byte pushed
    /// to the stack (B distinguishes BRK/PHP pushes from interrupt pushes,
    /// U always reads as 1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable (IRQ only; NMI is unaffected).
        const I = 1 << 2;
        /// Decimal mode. Latched but ignored by the NES ALU.
        const D = 1 << 3;
        /// Break marker, only meaningful in stack copies.
        const B = 1 << 4;
        /// Unused, always 1 in stack copies.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative.
        const N = 1 << 7;
    }
}

impl Status {
    /// Flags at power-on: interrupts disabled, U set.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Set or clear a single flag.
    #[inline]
    pub fn assign(&mut self, flag: Self, on: bool) {
        if on {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }

    /// Update Z and N from a result byte.
    #[inline]
    pub fn update_zn(&mut self, value: u8) {
        self.assign(Self::Z, value == 0);
        self.assign(Self::N, value & 0x80 != 0);
    }

    /// The byte pushed to the stack. U is always set; B is set for BRK and
    /// PHP pushes, clear for NMI/IRQ pushes.
    #[inline]
    #[must_use]
    pub const fn pushed(self, software: bool) -> u8 {
        let bits = self.bits() | Self::U.bits();
        if software { bits | Self::B.bits() } else { bits }
    }

    /// Rebuild flags from a byte pulled off the stack. B is discarded, U
    /// forced on.
    #[inline]
    #[must_use]
    pub fn pulled(value: u8) -> Self {
        Self::from_bits_truncate(value & !Self::B.bits()) | Self::U
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_flags() {
        let status = Status::POWER_ON;
        assert!(status.contains(Status::I));
        assert!(status.contains(Status::U));
        assert!(!status.contains(Status::C));
        assert!(!status.contains(Status::N));
    }

    #[test]
    fn update_zn() {
        let mut status = Status::empty();
        status.update_zn(0);
        assert!(status.contains(Status::Z));
        assert!(!status.contains(Status::N));

        status.update_zn(0x90);
        assert!(!status.contains(Status::Z));
        assert!(status.contains(Status::N));
    }

    #[test]
    fn pushed_byte_marks_software_pushes() {
        let status = Status::C | Status::Z;
        assert_eq!(status.pushed(true) & 0x30, 0x30);
        assert_eq!(status.pushed(false) & 0x30, 0x20);
    }

    #[test]
    fn pulled_discards_break_bit() {
        let status = Status::pulled(0xFF);
        assert!(!status.contains(Status::B));
        assert!(status.contains(Status::U));
        assert!(status.contains(Status::N));
        assert!(status.contains(Status::C));
    }
}
