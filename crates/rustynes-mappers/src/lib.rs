//! NES Cartridge Mapper Implementations.
//!
//! This crate parses NES cartridge images and provides mapper
//! implementations that translate CPU/PPU addresses into PRG/CHR bank
//! reads and writes.
//!
//! # Supported Mappers
//!
//! | Mapper | Name | Description |
//! |--------|------|-------------|
//! | 0 | NROM | No banking, simplest mapper |
//!
//! Every other mapper id is rejected by [`create_mapper`] with
//! [`CartridgeError::UnsupportedMapper`]. The [`Mapper`] trait is kept
//! deliberately narrow so additional mappers can be added later without
//! touching the bus that consumes them.
//!
//! # Example
//!
//! ```no_run
//! use rustynes_mappers::{Cartridge, create_mapper};
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let cartridge = Cartridge::load(&rom_data).expect("failed to parse cartridge");
//! let mut mapper = create_mapper(&cartridge).expect("unsupported mapper");
//!
//! let opcode = mapper.read_prg(0x8000);
//! let tile = mapper.read_chr(0x0000);
//! ```
//!
//! # no_std Support
//!
//! This crate supports `no_std` environments with the `alloc` feature.
//! Disable the default `std` feature for embedded use.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

pub mod cartridge;
pub mod mapper;

mod nrom;

pub use cartridge::{Cartridge, CartridgeError, CartridgeHeader};
pub use mapper::{Mapper, Mirroring};
pub use nrom::Nrom;

/// Create a mapper instance from a parsed cartridge.
///
/// Returns the appropriate mapper implementation based on the header's
/// mapper id. Only mapper 0 (NROM) is implemented; every other id is
/// rejected explicitly rather than silently falling back to NROM.
///
/// # Errors
///
/// Returns [`CartridgeError::UnsupportedMapper`] if the mapper id is not
/// implemented in this crate.
pub fn create_mapper(cartridge: &Cartridge) -> Result<Box<dyn Mapper>, CartridgeError> {
    match cartridge.header.mapper_id {
        0 => Ok(Box::new(Nrom::new(cartridge))),
        n => {
            log::warn!("rejecting unsupported mapper id {n}");
            Err(CartridgeError::UnsupportedMapper(n))
        }
    }
}

/// List of mapper ids this crate can construct.
#[must_use]
pub fn supported_mappers() -> &'static [u8] {
    &[0]
}

/// Check whether a mapper id is supported.
#[must_use]
pub fn is_mapper_supported(mapper_id: u8) -> bool {
    supported_mappers().contains(&mapper_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::CartridgeHeader;

    fn test_cartridge(mapper_id: u8) -> Cartridge {
        let prg_rom: Vec<u8> = (0..32768).map(|i| (i & 0xFF) as u8).collect();
        let chr_rom: Vec<u8> = (0..8192).map(|i| (i & 0xFF) as u8).collect();

        Cartridge {
            header: CartridgeHeader {
                prg_rom_size: 32768,
                chr_rom_size: 8192,
                mapper_id,
                submapper: 0,
                mirroring: Mirroring::Vertical,
                has_battery: false,
                has_trainer: false,
                nes2_format: false,
                prg_ram_size: 8192,
                chr_ram_size: 0,
            },
            prg_rom,
            chr_rom,
            trainer: None,
        }
    }

    #[test]
    fn creates_nrom_for_mapper_zero() {
        let cart = test_cartridge(0);
        let mapper = create_mapper(&cart).unwrap();
        assert_eq!(mapper.mapper_number(), 0);
        assert_eq!(mapper.mapper_name(), "NROM");
    }

    #[test]
    fn rejects_every_other_mapper_id() {
        for id in [1u8, 2, 3, 4, 100, 255] {
            let cart = test_cartridge(id);
            let result = create_mapper(&cart);
            assert!(matches!(result, Err(CartridgeError::UnsupportedMapper(n)) if n == id));
        }
    }

    #[test]
    fn supported_mappers_is_nrom_only() {
        assert_eq!(supported_mappers(), &[0]);
        assert!(is_mapper_supported(0));
        assert!(!is_mapper_supported(1));
    }

    #[test]
    fn mapper_reads_and_rejects_writes() {
        let cart = test_cartridge(0);
        let mut mapper = create_mapper(&cart).unwrap();

        assert_eq!(mapper.read_prg(0x8000), 0);
        mapper.write_prg(0x8000, 0xFF);
        assert_eq!(mapper.read_prg(0x8000), 0);
    }
}
