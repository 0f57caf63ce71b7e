//! NES system bus.
//!
//! Connects the CPU to everything else it can address:
//! - Internal RAM (`$0000-$1FFF`, mirrored every `$0800`)
//! - PPU registers (`$2000-$3FFF`, mirrored every 8 bytes)
//! - APU/IO registers (`$4000-$4017`) — the APU itself is a stub; see module docs
//! - Cartridge space (`$4020-$FFFF`)
//!
//! The PPU owns its own VRAM and palette RAM internally; this bus only
//! supplies it CHR reads/writes through a mapper callback, so there is no
//! separate `PpuBus` adapter type to thread through.

use crate::input::Controller;
use rustynes_cpu::Bus;
use rustynes_mappers::Mapper;
use rustynes_ppu::{Mirroring as PpuMirroring, Ppu};

fn to_ppu_mirroring(mirroring: rustynes_mappers::Mirroring) -> PpuMirroring {
    match mirroring {
        rustynes_mappers::Mirroring::Horizontal => PpuMirroring::Horizontal,
        rustynes_mappers::Mirroring::Vertical => PpuMirroring::Vertical,
        rustynes_mappers::Mirroring::SingleScreenLower => PpuMirroring::SingleScreenLower,
        rustynes_mappers::Mirroring::SingleScreenUpper => PpuMirroring::SingleScreenUpper,
        rustynes_mappers::Mirroring::FourScreen => PpuMirroring::FourScreen,
    }
}

/// NES system bus connecting the CPU, PPU, cartridge mapper and controllers.
pub struct NesBus {
    /// Internal RAM (2KB, mirrored four times across `$0000-$1FFF`).
    ram: [u8; 2048],
    /// PPU (Picture Processing Unit).
    pub ppu: Ppu,
    /// Cartridge mapper.
    pub mapper: Box<dyn Mapper>,
    /// Controller 1.
    pub controller1: Controller,
    /// Controller 2.
    pub controller2: Controller,
    /// Pending OAM DMA source page, if a write to `$4014` is unresolved.
    oam_dma_page: Option<u8>,
    /// CPU cycle counter, used for DMA parity and mapper clocking.
    cpu_cycles: u64,
    /// Last value that crossed the bus, for write-only/open-bus register reads.
    last_bus_value: u8,
    /// NMI request latched by the PPU, consumed by `Console::step`.
    nmi_pending: bool,
}

impl NesBus {
    /// Construct a bus around the given mapper. PPU mirroring is taken from
    /// the mapper's cartridge header.
    #[must_use]
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        let mirroring = to_ppu_mirroring(mapper.mirroring());
        Self {
            ram: [0; 2048],
            ppu: Ppu::new(mirroring),
            mapper,
            controller1: Controller::new(),
            controller2: Controller::new(),
            oam_dma_page: None,
            cpu_cycles: 0,
            last_bus_value: 0,
            nmi_pending: false,
        }
    }

    /// Reset the bus and every component it owns.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.mapper.reset();
        self.controller1.reset();
        self.controller2.reset();
        self.oam_dma_page = None;
        self.cpu_cycles = 0;
        self.last_bus_value = 0;
        self.nmi_pending = false;
    }

    /// True when a `$4014` write is waiting to be executed.
    #[must_use]
    pub fn oam_dma_pending(&self) -> bool {
        self.oam_dma_page.is_some()
    }

    /// Run the pending OAM DMA transfer, returning the CPU cycles it consumes
    /// (513, or 514 if the current CPU cycle count is odd).
    pub fn execute_oam_dma(&mut self) -> u16 {
        let Some(page) = self.oam_dma_page.take() else {
            return 0;
        };

        let base = u16::from(page) << 8;
        let mut data = [0u8; 256];
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = self.cpu_read_for_dma(base.wrapping_add(i as u16));
        }
        self.ppu.oam_dma(&data);

        let cycles = if self.cpu_cycles % 2 == 1 { 514 } else { 513 };
        self.cpu_cycles += u64::from(cycles);
        cycles
    }

    /// Read a byte for OAM DMA purposes without refreshing the open-bus latch.
    fn cpu_read_for_dma(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
            _ => self.last_bus_value,
        }
    }

    /// Advance the PPU by 3 dots (one CPU cycle's worth) and clock the mapper.
    ///
    /// Returns true if this stepped edge triggered NMI.
    pub fn step_ppu(&mut self) -> bool {
        let mut nmi = false;
        for _ in 0..3 {
            let mapper = &self.mapper;
            let (_frame_complete, fired) = self.ppu.step_with_chr(|addr| mapper.read_chr(addr));
            nmi |= fired;
        }
        self.mapper.clock(1);
        if nmi {
            self.nmi_pending = true;
        }
        nmi
    }

    /// Check whether the PPU has an NMI waiting for the CPU.
    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Clear the pending NMI after the CPU has serviced it.
    pub fn acknowledge_nmi(&mut self) {
        self.nmi_pending = false;
    }

    /// Check whether the mapper has an IRQ waiting for the CPU.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    /// Acknowledge the mapper's IRQ.
    pub fn acknowledge_mapper_irq(&mut self) {
        self.mapper.irq_acknowledge();
    }

    /// Total CPU cycles the bus has observed since the last reset.
    #[must_use]
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    /// Advance the CPU cycle counter.
    pub fn add_cpu_cycles(&mut self, cycles: u8) {
        self.cpu_cycles += u64::from(cycles);
    }

    /// Read memory without side effects, for debuggers/disassemblers.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF | 0x4000..=0x401F => self.last_bus_value,
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
        }
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => {
                let mapper = &mut self.mapper;
                self.ppu.read_register(addr, |a| mapper.read_chr(a))
            }
            0x4015 => {
                // APU stub: no channels, so status reads back as silent.
                0
            }
            0x4016 => self.controller1.read(),
            0x4017 => self.controller2.read(),
            0x4000..=0x4014 | 0x4018..=0x401F => self.last_bus_value,
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
        };
        self.last_bus_value = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.last_bus_value = value;

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => {
                let mapper = &mut self.mapper;
                self.ppu.write_register(addr, value, |a, v| mapper.write_chr(a, v));
            }
            0x4014 => self.oam_dma_page = Some(value),
            0x4016 => {
                self.controller1.write_strobe(value);
                self.controller2.write_strobe(value);
            }
            0x4000..=0x4013 | 0x4015 | 0x4017..=0x401F => {
                // APU stub: writes are accepted but produce no sound.
            }
            0x4020..=0xFFFF => self.mapper.write_prg(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustynes_mappers::{Cartridge, CartridgeHeader, Mirroring, Nrom};

    fn create_test_bus() -> NesBus {
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
        let cartridge = Cartridge {
            header,
            trainer: None,
            prg_rom: vec![0; 32768],
            chr_rom: vec![0; 8192],
        };
        NesBus::new(Box::new(Nrom::new(&cartridge)))
    }

    #[test]
    fn ram_mirrors_every_0x800() {
        let mut bus = create_test_bus();

        Bus::write(&mut bus, 0x0000, 0x42);
        assert_eq!(Bus::read(&mut bus, 0x0800), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1000), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1800), 0x42);

        Bus::write(&mut bus, 0x1234, 0xAB);
        assert_eq!(Bus::read(&mut bus, 0x0234), 0xAB);
    }

    #[test]
    fn controller_strobe_and_serial_read() {
        let mut bus = create_test_bus();
        bus.controller1.set_buttons(0b1010_0101);

        Bus::write(&mut bus, 0x4016, 1);
        Bus::write(&mut bus, 0x4016, 0);

        let bits: Vec<u8> = (0..8).map(|_| Bus::read(&mut bus, 0x4016) & 1).collect();
        assert_eq!(bits, [1, 0, 1, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn oam_dma_copies_256_bytes_and_stalls() {
        let mut bus = create_test_bus();
        for i in 0..256u16 {
            Bus::write(&mut bus, 0x0200 + i, i as u8);
        }

        Bus::write(&mut bus, 0x4014, 0x02);
        assert!(bus.oam_dma_pending());

        let cycles = bus.execute_oam_dma();
        assert!(!bus.oam_dma_pending());
        assert!(cycles == 513 || cycles == 514);
    }

    #[test]
    fn apu_register_reads_are_silent() {
        let mut bus = create_test_bus();
        assert_eq!(Bus::read(&mut bus, 0x4015), 0);
    }

    #[test]
    fn peek_does_not_trigger_ppu_side_effects() {
        let mut bus = create_test_bus();
        Bus::write(&mut bus, 0x0100, 0x42);
        assert_eq!(bus.peek(0x0100), 0x42);
        assert_eq!(bus.peek(0x0900), 0x42);
    }

    #[test]
    fn reset_clears_cycle_count_and_nmi() {
        let mut bus = create_test_bus();
        bus.nmi_pending = true;
        bus.reset();
        assert_eq!(bus.cpu_cycles, 0);
        assert!(!bus.nmi_pending());
    }
}
