//! RustyNES Core - NES emulation integration layer.
//!
//! This crate provides the high-level NES emulation API, wiring the CPU,
//! PPU, cartridge mapper and controllers into a complete console emulator.
//!
//! # Architecture
//!
//! The core crate connects all NES components through a central bus:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Console                              │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │                      NesBus                          │   │
//! │  │  ┌─────┐  ┌─────┐  ┌────────┐  ┌──────────────────┐ │   │
//! │  │  │ RAM │  │ PPU │  │ Mapper │  │ Controllers 1 & 2 │ │   │
//! │  │  │ 2KB │  │     │  │        │  │                   │ │   │
//! │  │  └─────┘  └─────┘  └────────┘  └──────────────────┘ │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! │                          ▲                                  │
//! │                          │                                  │
//! │                     ┌────┴────┐                             │
//! │                     │   CPU   │                             │
//! │                     │  6502   │                             │
//! │                     └─────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! APU registers at `$4000-$4017` are addressable but produce no sound —
//! audio synthesis is outside this crate's scope, so they're wired to the
//! bus as an inert stub rather than omitted.
//!
//! # Usage
//!
//! ```no_run
//! use rustynes_core::{Button, Console, Port};
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut console = Console::new(&rom_data).expect("failed to create console");
//!
//! loop {
//!     console.set_button(Port::One, Button::A, true);
//!     console.step_frame();
//!     let _framebuffer = console.framebuffer();
//! }
//! ```
//!
//! # Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` on the CPU status byte, PPU
//!   scroll registers and mapper state, for downstream save-state support.

mod bus;
mod console;
pub mod input;
pub mod palette;

pub use bus::NesBus;
pub use console::{Console, ConsoleError, Port, timing};
pub use input::{Button, Controller};

pub use rustynes_cpu::Cpu;
pub use rustynes_mappers::{
    Cartridge, CartridgeError, CartridgeHeader, Mapper, Mirroring, create_mapper,
};
pub use rustynes_ppu::Ppu;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NES screen dimensions.
pub mod screen {
    /// Screen width in pixels.
    pub const WIDTH: u32 = 256;
    /// Screen height in pixels.
    pub const HEIGHT: u32 = 240;
    /// Total pixels per frame.
    pub const PIXELS: u32 = WIDTH * HEIGHT;
    /// Bytes per frame in the palette-index frame buffer (one byte/pixel).
    pub const FRAMEBUFFER_SIZE: usize = PIXELS as usize;
}
