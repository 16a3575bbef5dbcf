//! PPU control, mask, and status registers.

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Ctrl: u8 {
        /// Base nametable select, low bit.
        const NAMETABLE_LO = 1 << 0;
        /// Base nametable select, high bit.
        const NAMETABLE_HI = 1 << 1;
        /// VRAM address increment: 0 adds 1 (across), 1 adds 32 (down).
        const VRAM_INCREMENT = 1 << 2;
        /// Sprite pattern table select (8x8 sprites).
        const SPRITE_TABLE = 1 << 3;
        /// Background pattern table select.
        const BACKGROUND_TABLE = 1 << 4;
        /// 0: 8x8 sprites, 1: 8x16 sprites.
        const SPRITE_HEIGHT = 1 << 5;
        /// EXT pin direction (unused on a stock NES).
        const MASTER_SLAVE = 1 << 6;
        /// Generate an NMI at the start of vblank.
        const NMI_ENABLE = 1 << 7;
    }
}

impl Ctrl {
    /// Amount PPUDATA accesses add to the VRAM address.
    #[must_use]
    pub const fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) { 32 } else { 1 }
    }

    /// Whether vblank raises NMI.
    #[must_use]
    pub const fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

bitflags! {
    /// PPUMASK ($2001).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mask: u8 {
        /// Grayscale output.
        const GRAYSCALE = 1 << 0;
        /// Show background in the leftmost 8 pixels.
        const BACKGROUND_LEFT = 1 << 1;
        /// Show sprites in the leftmost 8 pixels.
        const SPRITE_LEFT = 1 << 2;
        /// Background rendering enable.
        const SHOW_BACKGROUND = 1 << 3;
        /// Sprite rendering enable.
        const SHOW_SPRITES = 1 << 4;
        /// Red emphasis.
        const EMPHASIZE_RED = 1 << 5;
        /// Green emphasis.
        const EMPHASIZE_GREEN = 1 << 6;
        /// Blue emphasis.
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

impl Mask {
    /// Rendering is on when either layer is enabled. Gates the odd-frame
    /// dot skip.
    #[must_use]
    pub const fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BACKGROUND.union(Self::SHOW_SPRITES))
    }
}

bitflags! {
    /// PPUSTATUS ($2002). Only the top three bits are driven.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// More than eight sprites were found on a scanline.
        const SPRITE_OVERFLOW = 1 << 5;
        /// Sprite 0 overlapped the background.
        const SPRITE_ZERO_HIT = 1 << 6;
        /// Currently inside vertical blank. Cleared by reading $2002.
        const VBLANK = 1 << 7;
    }
}
