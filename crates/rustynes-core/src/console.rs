//! High-level console composition and frame stepping.
//!
//! [`Console`] owns the CPU, the bus (which in turn owns the PPU, mapper and
//! controllers) and drives the interleaved CPU/PPU schedule: one CPU
//! instruction, then the PPU ticking three dots per cycle consumed.

use crate::bus::NesBus;
use crate::input::{Button, Controller};
use rustynes_cpu::{Cpu, Status};
use rustynes_mappers::{Cartridge, CartridgeError, Mapper, create_mapper};

/// NES emulation timing constants (NTSC).
pub mod timing {
    /// Master clock frequency.
    pub const MASTER_CLOCK_NTSC: u32 = 21_477_272;
    /// CPU clock frequency (`master / 12`).
    pub const CPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 12;
    /// PPU clock frequency (`master / 4`).
    pub const PPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 4;
    /// CPU cycles in one rendered frame.
    pub const CPU_CYCLES_PER_FRAME: u32 = 29_780;
    /// PPU dots per scanline.
    pub const PPU_DOTS_PER_SCANLINE: u16 = 341;
    /// Scanlines per frame, including VBlank.
    pub const PPU_SCANLINES: u16 = 262;
    /// Target frame rate.
    pub const FRAME_RATE_NTSC: f64 = 60.0988;
}

/// Errors that can occur while constructing or driving a [`Console`].
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The ROM image could not be parsed or uses an unsupported mapper.
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
}

/// Which of the two controller ports a button state applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// Controller port 1.
    One,
    /// Controller port 2.
    Two,
}

/// NES console emulator: CPU + bus (PPU, mapper, controllers).
pub struct Console {
    cpu: Cpu,
    bus: NesBus,
    total_cycles: u64,
    frame_count: u64,
    running: bool,
}

impl Console {
    /// Parse `rom_bytes` as an iNES/NES 2.0 image, build its mapper, and
    /// power on a console around it.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Cartridge`] if the header is malformed or the
    /// mapper id isn't supported.
    pub fn new(rom_bytes: &[u8]) -> Result<Self, ConsoleError> {
        let cartridge = Cartridge::load(rom_bytes)?;
        let mapper = create_mapper(&cartridge)?;
        Ok(Self::with_mapper(mapper))
    }

    /// Build a console around an already-constructed mapper, bypassing ROM
    /// parsing entirely. Useful for tests and synthetic ROMs.
    #[must_use]
    pub fn with_mapper(mapper: Box<dyn Mapper>) -> Self {
        let mut console = Self {
            cpu: Cpu::new(),
            bus: NesBus::new(mapper),
            total_cycles: 0,
            frame_count: 0,
            running: true,
        };
        console.power_on();
        console
    }

    /// Cold boot: clears transient counters then performs the same reset
    /// sequence as [`Console::reset`]. RAM contents are whatever the bus's
    /// construction left them at (zeroed), matching `reset()`'s behavior of
    /// leaving RAM untouched — real hardware doesn't guarantee RAM state on
    /// either path, but this core zeroes it once at construction either way.
    pub fn power_on(&mut self) {
        self.total_cycles = 0;
        self.frame_count = 0;
        self.reset();
    }

    /// Reset the console: reloads the CPU from the reset vector and resets
    /// the bus's components. RAM contents are left untouched.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.bus.reset();
        self.total_cycles = self.cpu.cycles();
        self.running = true;
    }

    /// Execute one CPU instruction, ticking the PPU and mapper alongside it.
    /// Returns the number of CPU cycles the instruction (or DMA stall) consumed.
    pub fn step_instruction(&mut self) -> u8 {
        if !self.running {
            return 0;
        }

        if self.bus.oam_dma_pending() {
            let dma_cycles = self.bus.execute_oam_dma();
            self.tick_ppu_for(dma_cycles);
            return (dma_cycles & 0xFF) as u8;
        }

        if self.bus.nmi_pending() {
            self.bus.acknowledge_nmi();
            self.cpu.trigger_nmi();
        } else if self.bus.irq_pending() && !self.cpu.status().contains(Status::I) {
            self.cpu.set_irq(true);
            self.bus.acknowledge_mapper_irq();
        }

        let cycles = match self.cpu.step(&mut self.bus) {
            Ok(cycles) => cycles,
            Err(err) => {
                log::warn!("CPU halted: {err}");
                self.running = false;
                return 0;
            }
        };

        self.tick_ppu_for(u16::from(cycles));
        self.bus.add_cpu_cycles(cycles);
        self.total_cycles += u64::from(cycles);
        cycles
    }

    /// Step the PPU three dots per CPU cycle consumed.
    fn tick_ppu_for(&mut self, cpu_cycles: u16) {
        for _ in 0..cpu_cycles {
            self.bus.step_ppu();
        }
    }

    /// Run until one full frame (≈29,780 CPU cycles) has been produced.
    /// Returns the actual number of CPU cycles executed.
    pub fn step_frame(&mut self) -> u64 {
        let start = self.total_cycles;
        let target = start + u64::from(timing::CPU_CYCLES_PER_FRAME);

        while self.total_cycles < target && self.running {
            self.step_instruction();
        }

        self.frame_count += 1;
        log::trace!("frame {} complete at cycle {}", self.frame_count, self.total_cycles);
        self.total_cycles - start
    }

    /// Run until at least `seconds` of emulated time has elapsed, measured
    /// in CPU cycles at the NTSC clock rate.
    pub fn step_seconds(&mut self, seconds: f64) -> u64 {
        let start = self.total_cycles;
        let target_cycles = (seconds * f64::from(timing::CPU_CLOCK_NTSC)) as u64;

        while self.running && (self.total_cycles - start) < target_cycles {
            self.step_instruction();
        }

        self.total_cycles - start
    }

    /// Current frame buffer: 256×240 palette indices (0-63), one byte per pixel.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.ppu.frame_buffer()
    }

    /// Convenience conversion of [`Console::framebuffer`] to interleaved RGB
    /// bytes via the fixed NES palette table.
    #[must_use]
    pub fn framebuffer_rgb(&self) -> Vec<u8> {
        crate::palette::framebuffer_to_rgb(self.framebuffer())
    }

    /// Set a button's pressed state on the given controller port.
    pub fn set_button(&mut self, port: Port, button: Button, pressed: bool) {
        self.controller_mut(port).set_button(button, pressed);
    }

    /// Overwrite an entire controller's button field in one call.
    pub fn set_buttons(&mut self, port: Port, buttons: u8) {
        self.controller_mut(port).set_buttons(buttons);
    }

    fn controller_mut(&mut self, port: Port) -> &mut Controller {
        match port {
            Port::One => &mut self.bus.controller1,
            Port::Two => &mut self.bus.controller2,
        }
    }

    /// Total CPU cycles executed since the last reset.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Frames completed since the last reset.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// False once the CPU has halted on an unknown opcode in strict mode.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Read memory without side effects, for debuggers/disassemblers.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Access the CPU for inspection.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Access the PPU for inspection.
    #[must_use]
    pub fn ppu(&self) -> &rustynes_ppu::Ppu {
        &self.bus.ppu
    }

    /// Access the bus for inspection.
    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    /// The mapper's iNES mapper id.
    #[must_use]
    pub fn mapper_number(&self) -> u16 {
        self.bus.mapper.mapper_number()
    }

    /// The mapper's human-readable name (e.g. `"NROM"`).
    #[must_use]
    pub fn mapper_name(&self) -> &'static str {
        self.bus.mapper.mapper_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustynes_mappers::{Cartridge, CartridgeHeader, Mirroring, Nrom};

    fn create_test_console() -> Console {
        let header = CartridgeHeader {
            prg_rom_size: 32768,
            chr_rom_size: 8192,
            mapper_id: 0,
            submapper: 0,
            mirroring: Mirroring::Vertical,
            has_battery: false,
            has_trainer: false,
            nes2_format: false,
            prg_ram_size: 0,
            chr_ram_size: 0,
        };
        let mut prg_rom = vec![0xEAu8; 32768]; // NOP sled
        prg_rom[0x7FFC] = 0x00; // reset vector -> $8000
        prg_rom[0x7FFD] = 0x80;
        let cartridge = Cartridge {
            header,
            trainer: None,
            prg_rom,
            chr_rom: vec![0; 8192],
        };
        Console::with_mapper(Box::new(Nrom::new(&cartridge)))
    }

    #[test]
    fn reset_loads_vector_and_charges_seven_cycles() {
        let console = create_test_console();
        assert_eq!(console.cpu().pc(), 0x8000);
        assert_eq!(console.cpu().sp(), 0xFD);
        assert_eq!(console.cpu().cycles(), 7);
    }

    #[test]
    fn mapper_identity_is_exposed() {
        let console = create_test_console();
        assert_eq!(console.mapper_number(), 0);
        assert_eq!(console.mapper_name(), "NROM");
    }

    #[test]
    fn step_instruction_advances_total_cycles() {
        let mut console = create_test_console();
        let mut total = 0u64;
        for _ in 0..10 {
            total += u64::from(console.step_instruction());
        }
        assert!(total > 0);
        assert_eq!(console.total_cycles(), total);
    }

    #[test]
    fn framebuffer_is_256x240_palette_indices() {
        let console = create_test_console();
        assert_eq!(console.framebuffer().len(), 256 * 240);
    }

    #[test]
    fn framebuffer_rgb_is_three_bytes_per_pixel() {
        let console = create_test_console();
        assert_eq!(console.framebuffer_rgb().len(), 256 * 240 * 3);
    }

    #[test]
    fn button_state_round_trips() {
        let mut console = create_test_console();
        console.set_button(Port::One, Button::A, true);
        console.set_button(Port::One, Button::Start, true);
        assert_eq!(console.bus().controller1.buttons(), 0x09);
    }

    #[test]
    fn reset_zeroes_total_cycles() {
        let mut console = create_test_console();
        for _ in 0..50 {
            console.step_instruction();
        }
        assert!(console.total_cycles() > 0);
        console.reset();
        assert_eq!(console.total_cycles(), 7);
    }

    #[test]
    fn step_frame_runs_at_least_one_frame_worth_of_cycles() {
        let mut console = create_test_console();
        let cycles = console.step_frame();
        assert!(cycles >= u64::from(timing::CPU_CYCLES_PER_FRAME));
        assert_eq!(console.frame_count(), 1);
    }
}
