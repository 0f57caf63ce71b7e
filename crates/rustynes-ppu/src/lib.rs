//! Cycle-accurate Ricoh 2C02 PPU (Picture Processing Unit) emulator for NES.
//!
//! This crate implements the NES's video output hardware: background tile
//! rendering via shift registers, sprite evaluation and rendering, nametable
//! mirroring, palette RAM, and the $2000-$2007 CPU-visible register file
//! including the VBlank/NMI and open-bus-decay quirks software relies on.
//!
//! # Architecture
//!
//! [`Ppu::step_with_chr`] advances the PPU by one PPU dot (there are 3 PPU
//! dots per CPU cycle on NTSC). Pattern table access goes through a caller
//! supplied closure so this crate has no dependency on cartridge mapper
//! types; a consuming crate wires `Ppu` to its mapper this way.
//!
//! # Example
//!
//! ```
//! use rustynes_ppu::{Mirroring, Ppu};
//!
//! let mut ppu = Ppu::new(Mirroring::Horizontal);
//! ppu.write_register(0x2000, 0x80, |_, _| {}); // enable NMI generation
//! let (_frame_complete, _nmi) = ppu.step_with_chr(|_addr| 0);
//! ```

#![warn(missing_docs)]

mod background;
mod oam;
mod ppu;
mod registers;
mod scroll;
mod sprites;
mod timing;
mod vram;

pub use oam::{Oam, SecondaryOam, Sprite, SpriteAttributes};
pub use ppu::{FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH, Ppu};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use scroll::ScrollRegisters;
pub use sprites::{SpriteEvaluator, SpriteRenderer};
pub use timing::Timing;
pub use vram::{Mirroring, Vram};
