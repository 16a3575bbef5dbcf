//! Cartridge abstraction and iNES ROM loading for the ironNES core.
//!
//! A [`Cartridge`] owns a boxed [`Mapper`] plus the load-time facts the
//! rest of the machine asks about (original mapper id, battery flag,
//! CHR-RAM discriminant, mirror mode). The [`Rom`] loader parses the iNES
//! container and fails with a tagged [`RomError`]; the mapper factory
//! itself is total — unknown mapper ids fall back to NROM behavior with
//! the original id preserved for introspection.
//!
//! # Example
//!
//! ```
//! use ironnes_cart::Cartridge;
//!
//! let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 1, 1, 0x01, 0x00];
//! image.resize(16, 0);
//! image.extend(std::iter::repeat(0xEA).take(16 * 1024)); // PRG
//! image.extend(std::iter::repeat(0x00).take(8 * 1024)); // CHR
//!
//! let cart = Cartridge::load(&image).unwrap();
//! assert_eq!(cart.mapper_id(), 0);
//! assert_eq!(cart.read_prg(0x8000), 0xEA);
//! ```

mod cartridge;
mod mapper;
mod nrom;
mod rom;

pub use cartridge::Cartridge;
pub use mapper::{Mapper, Mirroring};
pub use nrom::Nrom;
pub use rom::{Rom, RomError};
