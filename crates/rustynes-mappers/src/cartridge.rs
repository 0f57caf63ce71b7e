//! NES cartridge file format parsing (iNES and NES 2.0).
//!
//! This module handles parsing NES ROM images already held in memory: a
//! 16-byte header, optional 512-byte trainer, PRG-ROM banks and CHR-ROM
//! banks. Reading the bytes off disk is the caller's responsibility.

use crate::Mirroring;

/// Errors that can occur when parsing or mapping a cartridge image.
#[derive(Debug, thiserror::Error)]
pub enum CartridgeError {
    /// ROM data is too small to contain a valid header.
    #[error("cartridge data too small: expected at least 16 bytes, got {0}")]
    FileTooSmall(usize),

    /// Invalid iNES magic number in header.
    #[error("invalid iNES magic number: expected [4E 45 53 1A], got {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// Invalid PRG-ROM size.
    #[error("invalid PRG-ROM size: {0}")]
    InvalidPrgSize(String),

    /// ROM data size doesn't match header specifications.
    #[error("cartridge data size mismatch: expected {expected} bytes, got {actual} bytes")]
    SizeMismatch {
        /// Expected data size in bytes.
        expected: usize,
        /// Actual data size in bytes.
        actual: usize,
    },

    /// Mapper id not implemented by this core.
    #[error("unsupported mapper: {0}")]
    UnsupportedMapper(u8),

    /// Write fell on CHR-ROM with no CHR-RAM backing it.
    #[error("write to CHR-ROM at ${0:04X} with no CHR-RAM present")]
    CartridgeWriteProtected(u16),
}

/// iNES/NES 2.0 cartridge header.
///
/// # Format
///
/// ```text
/// Byte 0-3:   Magic number "NES" followed by MS-DOS EOF (0x4E 0x45 0x53 0x1A)
/// Byte 4:     PRG-ROM size in 16KB units (or LSB in NES 2.0)
/// Byte 5:     CHR-ROM size in 8KB units (or LSB in NES 2.0)
/// Byte 6:     Flags 6 (mirroring, battery, trainer, four-screen, mapper low nibble)
/// Byte 7:     Flags 7 (VS System, PlayChoice-10, NES 2.0 identifier, mapper high nibble)
/// Byte 8:     Flags 8 (mapper MSB and submapper in NES 2.0, or PRG-RAM size in iNES)
/// Byte 9:     Flags 9 (PRG-ROM MSB and CHR-ROM MSB in NES 2.0)
/// Byte 10:    Flags 10 (PRG-RAM and PRG-NVRAM size in NES 2.0)
/// Byte 11:    Flags 11 (CHR-RAM and CHR-NVRAM size in NES 2.0)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    /// PRG-ROM size in bytes.
    pub prg_rom_size: usize,
    /// CHR-ROM size in bytes (0 indicates CHR-RAM).
    pub chr_rom_size: usize,
    /// Mapper number, `(hdr[7] & 0xF0) | (hdr[6] >> 4)` for iNES, extended for NES 2.0.
    pub mapper_id: u8,
    /// Submapper number (NES 2.0 only); unused since only mapper 0 is supported.
    pub submapper: u8,
    /// Nametable mirroring mode.
    pub mirroring: Mirroring,
    /// Battery-backed PRG-RAM present.
    pub has_battery: bool,
    /// 512-byte trainer present before PRG-ROM.
    pub has_trainer: bool,
    /// True if this is NES 2.0 format.
    pub nes2_format: bool,
    /// PRG-RAM size in bytes.
    pub prg_ram_size: usize,
    /// CHR-RAM size in bytes (when `chr_rom_size` is 0).
    pub chr_ram_size: usize,
}

impl CartridgeHeader {
    const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

    /// Parse a cartridge header from the first bytes of a ROM image.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is too short, the magic number doesn't
    /// match, or the declared PRG-ROM size is zero.
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < 16 {
            return Err(CartridgeError::FileTooSmall(data.len()));
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != Self::MAGIC {
            return Err(CartridgeError::InvalidMagic(magic));
        }

        let nes2_format = (data[7] & 0x0C) == 0x08;
        let low = (data[6] & 0xF0) >> 4;
        let high = data[7] & 0xF0;
        let mapper_id = high | low;
        let submapper = if nes2_format { (data[8] & 0xF0) >> 4 } else { 0 };

        let (prg_rom_size, chr_rom_size) = Self::parse_sizes(data, nes2_format)?;
        let mirroring = Self::parse_mirroring(data);
        let has_battery = (data[6] & 0x02) != 0;
        let has_trainer = (data[6] & 0x04) != 0;

        let (prg_ram_size, chr_ram_size) = if nes2_format {
            (
                Self::parse_ram_size(data[10] & 0x0F),
                Self::parse_ram_size(data[11] & 0x0F),
            )
        } else {
            let prg_ram = if data[8] == 0 { 8192 } else { data[8] as usize * 8192 };
            (prg_ram, if chr_rom_size == 0 { 8192 } else { 0 })
        };

        Ok(Self {
            prg_rom_size,
            chr_rom_size,
            mapper_id,
            submapper,
            mirroring,
            has_battery,
            has_trainer,
            nes2_format,
            prg_ram_size,
            chr_ram_size,
        })
    }

    fn parse_sizes(data: &[u8], nes2_format: bool) -> Result<(usize, usize), CartridgeError> {
        let (prg_size, chr_size) = if nes2_format {
            let prg_lsb = data[4] as usize;
            let chr_lsb = data[5] as usize;
            let prg_msb = (data[9] & 0x0F) as usize;
            let chr_msb = ((data[9] & 0xF0) >> 4) as usize;

            let prg = if prg_msb == 0x0F {
                let exponent = (prg_lsb & 0xFC) >> 2;
                let multiplier = (prg_lsb & 0x03) * 2 + 1;
                multiplier * (1 << exponent)
            } else {
                (prg_msb << 8 | prg_lsb) * 16384
            };
            let chr = if chr_msb == 0x0F {
                let exponent = (chr_lsb & 0xFC) >> 2;
                let multiplier = (chr_lsb & 0x03) * 2 + 1;
                multiplier * (1 << exponent)
            } else {
                (chr_msb << 8 | chr_lsb) * 8192
            };
            (prg, chr)
        } else {
            (data[4] as usize * 16384, data[5] as usize * 8192)
        };

        if prg_size == 0 {
            return Err(CartridgeError::InvalidPrgSize(
                "PRG-ROM size cannot be 0".to_string(),
            ));
        }
        Ok((prg_size, chr_size))
    }

    fn parse_mirroring(data: &[u8]) -> Mirroring {
        if (data[6] & 0x08) != 0 {
            Mirroring::FourScreen
        } else if (data[6] & 0x01) != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    fn parse_ram_size(field: u8) -> usize {
        if field == 0 { 0 } else { 64 << field }
    }
}

/// A parsed NES cartridge image: header plus PRG/CHR banks.
#[derive(Debug, Clone)]
pub struct Cartridge {
    /// Cartridge header.
    pub header: CartridgeHeader,
    /// 512-byte trainer data, if present. Not consulted by this core.
    pub trainer: Option<Vec<u8>>,
    /// PRG-ROM data (program code).
    pub prg_rom: Vec<u8>,
    /// CHR-ROM data (graphics), or empty if CHR-RAM.
    pub chr_rom: Vec<u8>,
}

impl Cartridge {
    /// Parse a complete cartridge image from raw bytes already read from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CartridgeError`] if the header is malformed or the buffer
    /// is shorter than the header declares.
    pub fn load(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = CartridgeHeader::parse(data)?;
        let mut offset = 16;

        let trainer = if header.has_trainer {
            if data.len() < offset + 512 {
                return Err(CartridgeError::FileTooSmall(data.len()));
            }
            let trainer_data = data[offset..offset + 512].to_vec();
            offset += 512;
            Some(trainer_data)
        } else {
            None
        };

        if data.len() < offset + header.prg_rom_size {
            return Err(CartridgeError::SizeMismatch {
                expected: offset + header.prg_rom_size,
                actual: data.len(),
            });
        }
        let prg_rom = data[offset..offset + header.prg_rom_size].to_vec();
        offset += header.prg_rom_size;

        let chr_rom = if header.chr_rom_size > 0 {
            if data.len() < offset + header.chr_rom_size {
                return Err(CartridgeError::SizeMismatch {
                    expected: offset + header.chr_rom_size,
                    actual: data.len(),
                });
            }
            data[offset..offset + header.chr_rom_size].to_vec()
        } else {
            Vec::new()
        };

        log::debug!(
            "loaded cartridge: mapper={} prg={}K chr={}K mirroring={:?}",
            header.mapper_id,
            prg_rom.len() / 1024,
            chr_rom.len() / 1024,
            header.mirroring
        );

        Ok(Self {
            header,
            trainer,
            prg_rom,
            chr_rom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(prg_size: u8, chr_size: u8, mapper: u8, mirroring: u8, battery: bool) -> Vec<u8> {
        let mut header = vec![0x4E, 0x45, 0x53, 0x1A];
        header.push(prg_size);
        header.push(chr_size);
        header.push(((mapper & 0x0F) << 4) | mirroring | if battery { 0x02 } else { 0x00 });
        header.push(mapper & 0xF0);
        header.extend_from_slice(&[0; 8]);
        header
    }

    #[test]
    fn valid_header_parses() {
        let header = header_bytes(2, 1, 0, 0, false);
        let parsed = CartridgeHeader::parse(&header).unwrap();
        assert_eq!(parsed.prg_rom_size, 32768);
        assert_eq!(parsed.chr_rom_size, 8192);
        assert_eq!(parsed.mapper_id, 0);
        assert_eq!(parsed.mirroring, Mirroring::Horizontal);
        assert!(!parsed.has_battery);
        assert!(!parsed.nes2_format);
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut header = header_bytes(1, 1, 0, 0, false);
        header[0] = 0x00;
        assert!(matches!(
            CartridgeHeader::parse(&header),
            Err(CartridgeError::InvalidMagic(_))
        ));
    }

    #[test]
    fn short_buffer_rejected() {
        let result = CartridgeHeader::parse(&[0x4E, 0x45, 0x53]);
        assert!(matches!(result, Err(CartridgeError::FileTooSmall(3))));
    }

    #[test]
    fn mapper_id_matches_documented_formula() {
        // mapper 0x42 split across the low/high nibbles of bytes 6/7.
        let header = header_bytes(1, 1, 0x42, 0, false);
        let parsed = CartridgeHeader::parse(&header).unwrap();
        assert_eq!(parsed.mapper_id, 0x42);
    }

    #[test]
    fn mirroring_modes_decode() {
        assert_eq!(
            CartridgeHeader::parse(&header_bytes(1, 1, 0, 0x00, false)).unwrap().mirroring,
            Mirroring::Horizontal
        );
        assert_eq!(
            CartridgeHeader::parse(&header_bytes(1, 1, 0, 0x01, false)).unwrap().mirroring,
            Mirroring::Vertical
        );
        assert_eq!(
            CartridgeHeader::parse(&header_bytes(1, 1, 0, 0x08, false)).unwrap().mirroring,
            Mirroring::FourScreen
        );
    }

    #[test]
    fn battery_flag_decodes() {
        let header = header_bytes(1, 1, 0, 0, true);
        assert!(CartridgeHeader::parse(&header).unwrap().has_battery);
    }

    #[test]
    fn full_rom_loads() {
        let mut data = header_bytes(1, 1, 0, 0, false);
        data.extend_from_slice(&[0x42; 16384]);
        data.extend_from_slice(&[0x55; 8192]);

        let cart = Cartridge::load(&data).unwrap();
        assert_eq!(cart.prg_rom.len(), 16384);
        assert_eq!(cart.chr_rom.len(), 8192);
        assert_eq!(cart.prg_rom[0], 0x42);
        assert_eq!(cart.chr_rom[0], 0x55);
    }

    #[test]
    fn trainer_is_parsed_and_skipped_from_prg() {
        let mut header = header_bytes(1, 0, 0, 0, false);
        header[6] |= 0x04;

        let mut data = header;
        data.extend_from_slice(&[0xFF; 512]);
        data.extend_from_slice(&[0x42; 16384]);

        let cart = Cartridge::load(&data).unwrap();
        assert!(cart.header.has_trainer);
        assert_eq!(cart.trainer.unwrap().len(), 512);
        assert_eq!(cart.prg_rom[0], 0x42);
    }

    #[test]
    fn size_mismatch_rejected() {
        let mut data = header_bytes(2, 1, 0, 0, false);
        data.extend_from_slice(&[0x42; 1024]);
        assert!(matches!(Cartridge::load(&data), Err(CartridgeError::SizeMismatch { .. })));
    }
}
