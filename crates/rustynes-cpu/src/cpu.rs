//! MOS 6502 interpreter.
//!
//! [`Cpu::step`] decodes one instruction at a time (not one cycle at a time):
//! it resolves the addressing mode, dispatches to a per-category executor,
//! and returns the number of cycles the instruction consumed so the caller
//! can advance the rest of the system (PPU, APU stub) by the same amount.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::{Mnemonic, OpcodeInfo, OPCODE_TABLE};
use crate::status::Status;
use crate::vectors;
use crate::CpuError;

/// Stack page base address. The stack always lives at `$0100-$01FF`.
const STACK_BASE: u16 = 0x0100;

/// MOS 6502 CPU state and interpreter.
#[derive(Debug, Clone)]
pub struct Cpu {
    pc: u16,
    sp: u8,
    a: u8,
    x: u8,
    y: u8,
    status: Status,
    cycles: u64,
    stall: u16,
    nmi_pending: bool,
    irq_line: bool,
    strict: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Creates a CPU in its power-on state. Call [`Cpu::reset`] before
    /// stepping to load the reset vector the way real hardware does.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pc: 0,
            sp: 0xFD,
            a: 0,
            x: 0,
            y: 0,
            status: Status::POWER_ON,
            cycles: 0,
            stall: 0,
            nmi_pending: false,
            irq_line: false,
            strict: false,
        }
    }

    /// Enables strict mode: unknown opcodes become [`CpuError::UnknownOpcode`]
    /// instead of being treated as a 2-cycle NOP.
    #[must_use]
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Performs a reset: loads `pc` from the reset vector, sets `sp = $FD`,
    /// restores the power-on flag byte, and charges 7 cycles.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.pc = bus.read_u16(vectors::RESET);
        self.sp = 0xFD;
        self.status = Status::POWER_ON;
        self.cycles = 7;
        self.stall = 0;
        self.nmi_pending = false;
        self.irq_line = false;
    }

    /// Program counter.
    #[must_use]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Stack pointer.
    #[must_use]
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Accumulator.
    #[must_use]
    pub fn a(&self) -> u8 {
        self.a
    }

    /// X index register.
    #[must_use]
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Y index register.
    #[must_use]
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Status (flags) register.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Total cycles executed since the last reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles remaining in an in-progress DMA stall.
    #[must_use]
    pub fn stall(&self) -> u16 {
        self.stall
    }

    /// Adds cycles of DMA stall (OAM DMA: 513 or 514 depending on parity).
    pub fn add_stall(&mut self, cycles: u16) {
        self.stall = self.stall.saturating_add(cycles);
    }

    /// Requests service of the non-maskable interrupt at the next instruction
    /// boundary. NMI cannot be masked by the `I` flag.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Sets or clears the IRQ line level. A mapper or APU stub holding this
    /// high keeps requesting service until it is lowered.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Executes one instruction, servicing a pending interrupt first if one
    /// is due. Returns the number of cycles consumed.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`CpuError::UnknownOpcode`] for any opcode
    /// absent from the dispatch table. In the default lenient mode, unknown
    /// opcodes are logged and treated as a 2-cycle NOP.
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<u8, CpuError> {
        if self.stall > 0 {
            self.stall -= 1;
            self.cycles += 1;
            return Ok(1);
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            let cycles = self.service_interrupt(bus, vectors::NMI, false);
            self.cycles += cycles as u64;
            return Ok(cycles);
        }

        if self.irq_line && !self.status.contains(Status::I) {
            let cycles = self.service_interrupt(bus, vectors::IRQ, false);
            self.cycles += cycles as u64;
            return Ok(cycles);
        }

        let opcode_pc = self.pc;
        let opcode = self.fetch_u8(bus);

        match OPCODE_TABLE[opcode as usize] {
            Some(info) => {
                let cycles = self.execute(bus, info);
                self.cycles += cycles as u64;
                Ok(cycles)
            }
            None if self.strict => Err(CpuError::UnknownOpcode(opcode, opcode_pc)),
            None => {
                log::debug!("unknown opcode ${opcode:02X} at ${opcode_pc:04X}, treating as NOP");
                self.cycles += 2;
                Ok(2)
            }
        }
    }

    fn fetch_u8(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let value = bus.read_u16(self.pc);
        self.pc = self.pc.wrapping_add(2);
        value
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(STACK_BASE + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_BASE + self.sp as u16)
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        (hi << 8) | lo
    }

    /// Pushes `pc`/status and loads `pc` from `vector`. Used for NMI, IRQ,
    /// and (with `brk = true`) the `BRK` instruction.
    fn service_interrupt(&mut self, bus: &mut impl Bus, vector: u16, brk: bool) -> u8 {
        self.push_u16(bus, self.pc);
        let byte = self.status.to_stack_byte(brk);
        self.push(bus, byte);
        self.status.set_flag(Status::I, true);
        self.pc = bus.read_u16(vector);
        7
    }

    /// Resolves the operand address for `mode`, advancing `pc` past the
    /// operand bytes. Returns `(address, page_crossed)`; `address` is
    /// meaningless for [`AddrMode::Imp`]/[`AddrMode::Acc`].
    fn effective_address(&mut self, bus: &mut impl Bus, mode: AddrMode) -> (u16, bool) {
        match mode {
            AddrMode::Imp | AddrMode::Acc => (0, false),
            AddrMode::Imm => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, false)
            }
            AddrMode::Zp0 => (self.fetch_u8(bus) as u16, false),
            AddrMode::Zpx => {
                let base = self.fetch_u8(bus);
                (base.wrapping_add(self.x) as u16, false)
            }
            AddrMode::Zpy => {
                let base = self.fetch_u8(bus);
                (base.wrapping_add(self.y) as u16, false)
            }
            AddrMode::Rel => {
                let offset = self.fetch_u8(bus) as i8;
                let base = self.pc;
                let target = base.wrapping_add(offset as u16);
                (target, (target & 0xFF00) != (base & 0xFF00))
            }
            AddrMode::Abs => (self.fetch_u16(bus), false),
            AddrMode::Abx | AddrMode::AbxW => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(self.x as u16);
                (addr, (addr & 0xFF00) != (base & 0xFF00))
            }
            AddrMode::Aby | AddrMode::AbyW => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(self.y as u16);
                (addr, (addr & 0xFF00) != (base & 0xFF00))
            }
            AddrMode::Ind => {
                let ptr = self.fetch_u16(bus);
                (bus.read_u16_wrap(ptr), false)
            }
            AddrMode::Idx => {
                let zp = self.fetch_u8(bus);
                let ptr = zp.wrapping_add(self.x);
                (bus.read_u16_wrap(ptr as u16), false)
            }
            AddrMode::Idy | AddrMode::IdyW => {
                let zp = self.fetch_u8(bus);
                let base = bus.read_u16_wrap(zp as u16);
                let addr = base.wrapping_add(self.y as u16);
                (addr, (addr & 0xFF00) != (base & 0xFF00))
            }
        }
    }

    /// Reads-modifies-writes through `addr`, or through the accumulator when
    /// `mode` is [`AddrMode::Acc`]. Real hardware performs a dummy write of
    /// the unmodified value before the real one; that costs no extra cycles
    /// here since the table already bills RMW opcodes for it.
    fn rmw(
        &mut self,
        bus: &mut impl Bus,
        mode: AddrMode,
        addr: u16,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) -> u8 {
        if matches!(mode, AddrMode::Acc) {
            let value = self.a;
            let result = f(self, value);
            self.a = result;
            result
        } else {
            let value = bus.read(addr);
            bus.write(addr, value);
            let result = f(self, value);
            bus.write(addr, result);
            result
        }
    }

    fn branch(&mut self, target: u16, taken: bool, page_crossed: bool) -> u8 {
        if !taken {
            return 0;
        }
        self.pc = target;
        if page_crossed {
            2
        } else {
            1
        }
    }

    fn adc(&mut self, value: u8) {
        let a = self.a;
        let carry_in = self.status.contains(Status::C) as u16;
        let sum = a as u16 + value as u16 + carry_in;
        let result = sum as u8;
        self.status.set_flag(Status::C, sum > 0xFF);
        self.status
            .set_flag(Status::V, (a ^ result) & (value ^ result) & 0x80 != 0);
        self.status.set_zn(result);
        self.a = result;
    }

    fn sbc(&mut self, value: u8) {
        // A - M - (1 - C) is equivalent to A + !M + C.
        self.adc(!value);
    }

    fn compare(&mut self, reg: u8, value: u8) {
        let result = reg.wrapping_sub(value);
        self.status.set_flag(Status::C, reg >= value);
        self.status.set_zn(result);
    }

    /// Executes the decoded instruction and returns its total cycle cost
    /// (base cycles, plus page-cross/branch-taken extras where applicable).
    fn execute(&mut self, bus: &mut impl Bus, info: OpcodeInfo) -> u8 {
        let (addr, page_crossed) = self.effective_address(bus, info.mode);
        let mut cycles = info.cycles;
        if info.page_cross_penalty && page_crossed && info.mode != AddrMode::Rel {
            cycles += 1;
        }

        match info.mnemonic {
            Mnemonic::Lda => {
                self.a = bus.read(addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Ldx => {
                self.x = bus.read(addr);
                self.status.set_zn(self.x);
            }
            Mnemonic::Ldy => {
                self.y = bus.read(addr);
                self.status.set_zn(self.y);
            }
            Mnemonic::Lax => {
                let value = bus.read(addr);
                self.a = value;
                self.x = value;
                self.status.set_zn(value);
            }
            Mnemonic::Sta => bus.write(addr, self.a),
            Mnemonic::Stx => bus.write(addr, self.x),
            Mnemonic::Sty => bus.write(addr, self.y),
            Mnemonic::Sax => bus.write(addr, self.a & self.x),
            Mnemonic::Adc => {
                let value = bus.read(addr);
                self.adc(value);
            }
            Mnemonic::Sbc => {
                let value = bus.read(addr);
                self.sbc(value);
            }
            Mnemonic::And => {
                self.a &= bus.read(addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Ora => {
                self.a |= bus.read(addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Eor => {
                self.a ^= bus.read(addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Cmp => {
                let value = bus.read(addr);
                self.compare(self.a, value);
            }
            Mnemonic::Cpx => {
                let value = bus.read(addr);
                self.compare(self.x, value);
            }
            Mnemonic::Cpy => {
                let value = bus.read(addr);
                self.compare(self.y, value);
            }
            Mnemonic::Bit => {
                let value = bus.read(addr);
                self.status.set_flag(Status::Z, (self.a & value) == 0);
                self.status.set_flag(Status::V, value & 0x40 != 0);
                self.status.set_flag(Status::N, value & 0x80 != 0);
            }
            Mnemonic::Asl => {
                self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = asl_value(v);
                    cpu.status.set_flag(Status::C, carry);
                    cpu.status.set_zn(result);
                    result
                });
            }
            Mnemonic::Lsr => {
                self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = lsr_value(v);
                    cpu.status.set_flag(Status::C, carry);
                    cpu.status.set_zn(result);
                    result
                });
            }
            Mnemonic::Rol => {
                let carry_in = self.status.contains(Status::C);
                self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = rol_value(v, carry_in);
                    cpu.status.set_flag(Status::C, carry);
                    cpu.status.set_zn(result);
                    result
                });
            }
            Mnemonic::Ror => {
                let carry_in = self.status.contains(Status::C);
                self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = ror_value(v, carry_in);
                    cpu.status.set_flag(Status::C, carry);
                    cpu.status.set_zn(result);
                    result
                });
            }
            Mnemonic::Inc => {
                self.rmw(bus, info.mode, addr, |cpu, v| {
                    let result = v.wrapping_add(1);
                    cpu.status.set_zn(result);
                    result
                });
            }
            Mnemonic::Dec => {
                self.rmw(bus, info.mode, addr, |cpu, v| {
                    let result = v.wrapping_sub(1);
                    cpu.status.set_zn(result);
                    result
                });
            }
            Mnemonic::Slo => {
                let result = self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = asl_value(v);
                    cpu.status.set_flag(Status::C, carry);
                    result
                });
                self.a |= result;
                self.status.set_zn(self.a);
            }
            Mnemonic::Rla => {
                let carry_in = self.status.contains(Status::C);
                let result = self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = rol_value(v, carry_in);
                    cpu.status.set_flag(Status::C, carry);
                    result
                });
                self.a &= result;
                self.status.set_zn(self.a);
            }
            Mnemonic::Sre => {
                let result = self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = lsr_value(v);
                    cpu.status.set_flag(Status::C, carry);
                    result
                });
                self.a ^= result;
                self.status.set_zn(self.a);
            }
            Mnemonic::Rra => {
                let carry_in = self.status.contains(Status::C);
                let result = self.rmw(bus, info.mode, addr, |cpu, v| {
                    let (result, carry) = ror_value(v, carry_in);
                    cpu.status.set_flag(Status::C, carry);
                    result
                });
                self.adc(result);
            }
            Mnemonic::Dcp => {
                let result = self.rmw(bus, info.mode, addr, |_, v| v.wrapping_sub(1));
                self.compare(self.a, result);
            }
            Mnemonic::Isb => {
                let result = self.rmw(bus, info.mode, addr, |_, v| v.wrapping_add(1));
                self.sbc(result);
            }
            Mnemonic::Anc => {
                self.a &= bus.read(addr);
                self.status.set_zn(self.a);
                let negative = self.status.contains(Status::N);
                self.status.set_flag(Status::C, negative);
            }
            Mnemonic::Alr => {
                self.a &= bus.read(addr);
                let (result, carry) = lsr_value(self.a);
                self.a = result;
                self.status.set_flag(Status::C, carry);
                self.status.set_zn(self.a);
            }
            Mnemonic::Arr => {
                self.a &= bus.read(addr);
                let carry_in = self.status.contains(Status::C);
                let (result, _) = ror_value(self.a, carry_in);
                self.a = result;
                self.status.set_zn(self.a);
                self.status.set_flag(Status::C, self.a & 0x40 != 0);
                self.status
                    .set_flag(Status::V, ((self.a >> 6) ^ (self.a >> 5)) & 1 != 0);
            }
            Mnemonic::Axs => {
                let value = bus.read(addr);
                let base = self.a & self.x;
                let result = base.wrapping_sub(value);
                self.status.set_flag(Status::C, base >= value);
                self.status.set_zn(result);
                self.x = result;
            }
            Mnemonic::Xaa => {
                // Unstable on real hardware (depends on analog bus decay);
                // approximated as the common emulator behavior A = X & imm.
                let value = bus.read(addr);
                self.a = self.x & value;
                self.status.set_zn(self.a);
            }
            Mnemonic::Lxa => {
                // Unstable; approximated as A = X = (A & imm).
                let value = bus.read(addr);
                self.a &= value;
                self.x = self.a;
                self.status.set_zn(self.a);
            }
            Mnemonic::Sha => {
                let hi = ((addr >> 8) as u8).wrapping_add(1);
                bus.write(addr, self.a & self.x & hi);
            }
            Mnemonic::Shx => {
                let hi = ((addr >> 8) as u8).wrapping_add(1);
                bus.write(addr, self.x & hi);
            }
            Mnemonic::Shy => {
                let hi = ((addr >> 8) as u8).wrapping_add(1);
                bus.write(addr, self.y & hi);
            }
            Mnemonic::Tas => {
                self.sp = self.a & self.x;
                let hi = ((addr >> 8) as u8).wrapping_add(1);
                bus.write(addr, self.sp & hi);
            }
            Mnemonic::Las => {
                let value = bus.read(addr) & self.sp;
                self.a = value;
                self.x = value;
                self.sp = value;
                self.status.set_zn(value);
            }
            Mnemonic::Bcc => cycles += self.branch(addr, !self.status.contains(Status::C), page_crossed),
            Mnemonic::Bcs => cycles += self.branch(addr, self.status.contains(Status::C), page_crossed),
            Mnemonic::Beq => cycles += self.branch(addr, self.status.contains(Status::Z), page_crossed),
            Mnemonic::Bmi => cycles += self.branch(addr, self.status.contains(Status::N), page_crossed),
            Mnemonic::Bne => cycles += self.branch(addr, !self.status.contains(Status::Z), page_crossed),
            Mnemonic::Bpl => cycles += self.branch(addr, !self.status.contains(Status::N), page_crossed),
            Mnemonic::Bvc => cycles += self.branch(addr, !self.status.contains(Status::V), page_crossed),
            Mnemonic::Bvs => cycles += self.branch(addr, self.status.contains(Status::V), page_crossed),
            Mnemonic::Clc => self.status.set_flag(Status::C, false),
            Mnemonic::Cld => self.status.set_flag(Status::D, false),
            Mnemonic::Cli => self.status.set_flag(Status::I, false),
            Mnemonic::Clv => self.status.set_flag(Status::V, false),
            Mnemonic::Sec => self.status.set_flag(Status::C, true),
            Mnemonic::Sed => self.status.set_flag(Status::D, true),
            Mnemonic::Sei => self.status.set_flag(Status::I, true),
            Mnemonic::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }
            Mnemonic::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Mnemonic::Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Mnemonic::Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Mnemonic::Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Mnemonic::Txs => self.sp = self.x,
            Mnemonic::Pha => self.push(bus, self.a),
            Mnemonic::Php => {
                let byte = self.status.to_stack_byte(true);
                self.push(bus, byte);
            }
            Mnemonic::Pla => {
                self.a = self.pull(bus);
                self.status.set_zn(self.a);
            }
            Mnemonic::Plp => {
                let byte = self.pull(bus);
                self.status = Status::from_stack_byte(byte);
            }
            Mnemonic::Jmp => self.pc = addr,
            Mnemonic::Jsr => {
                let return_addr = self.pc.wrapping_sub(1);
                self.push_u16(bus, return_addr);
                self.pc = addr;
            }
            Mnemonic::Rts => {
                let return_addr = self.pull_u16(bus);
                self.pc = return_addr.wrapping_add(1);
            }
            Mnemonic::Rti => {
                let byte = self.pull(bus);
                self.status = Status::from_stack_byte(byte);
                self.pc = self.pull_u16(bus);
            }
            Mnemonic::Brk => {
                self.pc = self.pc.wrapping_add(1);
                self.push_u16(bus, self.pc);
                let byte = self.status.to_stack_byte(true);
                self.push(bus, byte);
                self.status.set_flag(Status::I, true);
                self.pc = bus.read_u16(vectors::IRQ);
            }
            Mnemonic::Nop => {}
        }

        cycles
    }
}

fn asl_value(value: u8) -> (u8, bool) {
    (value << 1, value & 0x80 != 0)
}

fn lsr_value(value: u8) -> (u8, bool) {
    (value >> 1, value & 1 != 0)
}

fn rol_value(value: u8, carry_in: bool) -> (u8, bool) {
    ((value << 1) | carry_in as u8, value & 0x80 != 0)
}

fn ror_value(value: u8, carry_in: bool) -> (u8, bool) {
    ((value >> 1) | ((carry_in as u8) << 7), value & 1 != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestBus {
        memory: [u8; 0x10000],
    }

    impl TestBus {
        fn new() -> Self {
            Self { memory: [0; 0x10000] }
        }

        fn load(&mut self, addr: u16, program: &[u8]) {
            for (i, &byte) in program.iter().enumerate() {
                self.memory[addr as usize + i] = byte;
            }
        }

        fn set_reset_vector(&mut self, addr: u16) {
            self.memory[0xFFFC] = addr as u8;
            self.memory[0xFFFD] = (addr >> 8) as u8;
        }
    }

    impl Bus for TestBus {
        fn read(&mut self, addr: u16) -> u8 {
            self.memory[addr as usize]
        }

        fn write(&mut self, addr: u16, value: u8) {
            self.memory[addr as usize] = value;
        }

        fn peek(&self, addr: u16) -> u8 {
            self.memory[addr as usize]
        }
    }

    fn boot(program: &[u8]) -> (Cpu, TestBus) {
        let mut bus = TestBus::new();
        bus.load(0x8000, program);
        bus.set_reset_vector(0x8000);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        (cpu, bus)
    }

    #[test]
    fn reset_loads_vector_and_power_on_state() {
        let (cpu, _bus) = boot(&[]);
        assert_eq!(cpu.pc(), 0x8000);
        assert_eq!(cpu.sp(), 0xFD);
        assert_eq!(cpu.status().bits(), 0x24);
        assert_eq!(cpu.cycles(), 7);
    }

    #[test]
    fn lda_immediate_sets_registers_and_cycles() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x42]);
        let before = cpu.cycles();
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.a(), 0x42);
        assert_eq!(cpu.pc(), 0x8002);
        assert_eq!(cpu.cycles() - before, 2);
        assert!(!cpu.status().contains(Status::Z));
        assert!(!cpu.status().contains(Status::N));
    }

    #[test]
    fn lda_zero_and_negative_flags() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x00]);
        cpu.step(&mut bus).unwrap();
        assert!(cpu.status().contains(Status::Z));

        let (mut cpu, mut bus) = boot(&[0xA9, 0x80]);
        cpu.step(&mut bus).unwrap();
        assert!(cpu.status().contains(Status::N));
    }

    #[test]
    fn sta_zero_page_writes_through_bus() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x42, 0x85, 0x10]);
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();
        assert_eq!(bus.read(0x0010), 0x42);
    }

    #[test]
    fn adc_boundary_sets_overflow_and_negative() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x7F, 0x69, 0x01]);
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.a(), 0x80);
        assert!(cpu.status().contains(Status::V));
        assert!(cpu.status().contains(Status::N));
        assert!(!cpu.status().contains(Status::Z));
    }

    #[test]
    fn sbc_boundary_clears_carry_no_overflow() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x50, 0x38, 0xE9, 0xF0]);
        cpu.step(&mut bus).unwrap(); // LDA #$50
        cpu.step(&mut bus).unwrap(); // SEC
        cpu.step(&mut bus).unwrap(); // SBC #$F0
        assert_eq!(cpu.a(), 0x60);
        assert!(!cpu.status().contains(Status::C));
        assert!(!cpu.status().contains(Status::V));
    }

    #[test]
    fn jsr_and_rts_round_trip() {
        let mut bus = TestBus::new();
        bus.load(0x8000, &[0x20, 0x10, 0x80]);
        bus.memory[0x8010] = 0x60;
        bus.set_reset_vector(0x8000);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        let sp_before = cpu.sp();
        cpu.step(&mut bus).unwrap(); // JSR $8010
        assert_eq!(cpu.pc(), 0x8010);
        assert_eq!(cpu.sp(), sp_before.wrapping_sub(2));

        cpu.step(&mut bus).unwrap(); // RTS
        assert_eq!(cpu.pc(), 0x8003);
        assert_eq!(cpu.sp(), sp_before);
    }

    #[test]
    fn push_pull_round_trip() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x42, 0x48, 0xA9, 0x00, 0x68]);
        cpu.step(&mut bus).unwrap(); // LDA #$42
        cpu.step(&mut bus).unwrap(); // PHA
        cpu.step(&mut bus).unwrap(); // LDA #$00
        assert_eq!(cpu.a(), 0x00);
        cpu.step(&mut bus).unwrap(); // PLA
        assert_eq!(cpu.a(), 0x42);
    }

    #[test]
    fn branch_taken_adds_cycle_and_crosses_page() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x00, 0xF0, 0x05]);
        cpu.step(&mut bus).unwrap(); // LDA #$00
        let before = cpu.cycles();
        cpu.step(&mut bus).unwrap(); // BEQ +5 (taken, no page cross)
        assert_eq!(cpu.pc(), 0x8009);
        assert_eq!(cpu.cycles() - before, 3);
    }

    #[test]
    fn branch_not_taken_stays_in_place() {
        let (mut cpu, mut bus) = boot(&[0xA9, 0x01, 0xF0, 0x05]);
        cpu.step(&mut bus).unwrap(); // LDA #$01
        let before = cpu.cycles();
        cpu.step(&mut bus).unwrap(); // BEQ (not taken)
        assert_eq!(cpu.pc(), 0x8004);
        assert_eq!(cpu.cycles() - before, 2);
    }

    #[test]
    fn indirect_jmp_page_wrap_bug() {
        let mut bus = TestBus::new();
        bus.load(0x8000, &[0x6C, 0xFF, 0x10]);
        bus.memory[0x10FF] = 0x00;
        bus.memory[0x1100] = 0x90; // real next page, ignored by the bug
        bus.memory[0x1000] = 0x80; // wrapped-to byte, used instead
        bus.set_reset_vector(0x8000);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.pc(), 0x8000);
    }

    #[test]
    fn status_byte_always_has_bit_five_set() {
        let (mut cpu, mut bus) = boot(&[0x08]); // PHP
        cpu.step(&mut bus).unwrap();
        let pushed = bus.read(0x01FD);
        assert_eq!(pushed & 0x20, 0x20);
        assert_eq!(pushed & 0x10, 0x10); // B set for PHP

        let _ = &mut cpu;
    }

    #[test]
    fn nmi_pushes_status_with_break_clear() {
        let (mut cpu, mut bus) = boot(&[0xEA]); // NOP, never reached
        bus.memory[0xFFFA] = 0x00;
        bus.memory[0xFFFB] = 0x90;
        cpu.trigger_nmi();
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.pc(), 0x9000);
        let pushed = bus.read(0x01FC);
        assert_eq!(pushed & 0x10, 0); // B clear for NMI
        assert_eq!(pushed & 0x20, 0x20);
    }

    #[test]
    fn unknown_opcode_is_lenient_nop_by_default() {
        let (mut cpu, mut bus) = boot(&[0x02]); // JAM
        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cycles, 2);
        assert_eq!(cpu.pc(), 0x8001);
    }

    #[test]
    fn unknown_opcode_errors_in_strict_mode() {
        let mut bus = TestBus::new();
        bus.load(0x8000, &[0x02]);
        bus.set_reset_vector(0x8000);
        let mut cpu = Cpu::new().with_strict_mode(true);
        cpu.reset(&mut bus);
        let result = cpu.step(&mut bus);
        assert!(matches!(result, Err(CpuError::UnknownOpcode(0x02, 0x8000))));
    }

    #[test]
    fn dma_stall_consumes_cycles_without_fetching() {
        let (mut cpu, mut bus) = boot(&[0xEA]);
        cpu.add_stall(513);
        for _ in 0..513 {
            cpu.step(&mut bus).unwrap();
        }
        assert_eq!(cpu.pc(), 0x8000);
    }
}
