//! Mapper 0: NROM
//!
//! NROM is the simplest NES mapper: no bank switching, fixed PRG and CHR
//! banks, with the sole wrinkle that a 16 KiB PRG-ROM is mirrored across the
//! whole `$8000-$FFFF` window.
//!
//! # Memory Map
//!
//! ```text
//! CPU:
//! $8000-$BFFF: First 16KB of PRG-ROM (or mirrored in NROM-128)
//! $C000-$FFFF: Last 16KB of PRG-ROM (or mirrored in NROM-128)
//!
//! PPU:
//! $0000-$1FFF: 8KB CHR-ROM/RAM (no banking)
//! ```

use crate::{Cartridge, Mapper, Mirroring};

/// NROM mapper implementation (Mapper 0).
pub struct Nrom {
    /// PRG-ROM data (16KB or 32KB).
    prg_rom: Vec<u8>,
    /// CHR-ROM data, or empty if CHR-RAM.
    chr_rom: Vec<u8>,
    /// CHR-RAM (8KB if `chr_rom` is empty).
    chr_ram: Vec<u8>,
    /// Nametable mirroring mode.
    mirroring: Mirroring,
    /// True if using CHR-RAM instead of CHR-ROM.
    has_chr_ram: bool,
}

impl Nrom {
    /// Create a new NROM mapper from a parsed cartridge.
    ///
    /// # Panics
    ///
    /// Panics if PRG-ROM is not 16KB or 32KB, or CHR is not 8KB/empty.
    #[must_use]
    pub fn new(cartridge: &Cartridge) -> Self {
        assert!(
            cartridge.prg_rom.len() == 16384 || cartridge.prg_rom.len() == 32768,
            "NROM requires 16KB or 32KB PRG-ROM, got {} bytes",
            cartridge.prg_rom.len()
        );

        let has_chr_ram = cartridge.chr_rom.is_empty();
        let chr_ram = if has_chr_ram { vec![0; 8192] } else { Vec::new() };

        if !has_chr_ram {
            assert_eq!(
                cartridge.chr_rom.len(),
                8192,
                "NROM requires 8KB CHR-ROM, got {} bytes",
                cartridge.chr_rom.len()
            );
        }

        Self {
            prg_rom: cartridge.prg_rom.clone(),
            chr_rom: cartridge.chr_rom.clone(),
            chr_ram,
            mirroring: cartridge.header.mirroring,
            has_chr_ram,
        }
    }

    /// PRG-ROM size in bytes (16384 or 32768).
    #[must_use]
    pub fn prg_size(&self) -> usize {
        self.prg_rom.len()
    }

    /// True when this cartridge uses CHR-RAM instead of CHR-ROM.
    #[must_use]
    pub fn has_chr_ram(&self) -> bool {
        self.has_chr_ram
    }
}

impl Mapper for Nrom {
    fn read_prg(&self, addr: u16) -> u8 {
        debug_assert!(addr >= 0x8000, "invalid PRG address: ${addr:04X}");
        let offset = (addr - 0x8000) as usize;
        let masked_offset = if self.prg_rom.len() == 16384 {
            offset & 0x3FFF
        } else {
            offset
        };
        self.prg_rom[masked_offset]
    }

    fn write_prg(&mut self, _addr: u16, _value: u8) {
        // NROM has no writable registers; writes are ignored.
    }

    fn read_chr(&self, addr: u16) -> u8 {
        debug_assert!(addr <= 0x1FFF, "invalid CHR address: ${addr:04X}");
        if self.has_chr_ram {
            self.chr_ram[addr as usize]
        } else {
            self.chr_rom[addr as usize]
        }
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        debug_assert!(addr <= 0x1FFF, "invalid CHR address: ${addr:04X}");
        if self.has_chr_ram {
            self.chr_ram[addr as usize] = value;
        }
        // CHR-ROM writes are ignored by the mapper; the bus reports
        // `CartridgeWriteProtected` to the caller when it cares to.
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn mapper_number(&self) -> u16 {
        0
    }

    fn mapper_name(&self) -> &'static str {
        "NROM"
    }
}
