//! 6502 Addressing Modes.
//!
//! The 6502 CPU supports various addressing modes that determine how
//! the operand for an instruction is fetched.

/// Addressing modes for 6502 instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// Implicit - No operand, operation is implied.
    /// Example: CLC, SEC, INX
    Imp,

    /// Accumulator - Operates on the accumulator.
    /// Example: ASL A, ROL A
    Acc,

    /// Immediate - 8-bit constant operand.
    /// Example: LDA #$42
    Imm,

    /// Zero Page - 8-bit address in zero page ($0000-$00FF).
    /// Example: LDA $42
    Zp0,

    /// Zero Page,X - Zero page address plus X register (wraps within zero page).
    /// Example: LDA $42,X
    Zpx,

    /// Zero Page,Y - Zero page address plus Y register (wraps within zero page).
    /// Example: LDX $42,Y
    Zpy,

    /// Relative - Signed 8-bit offset for branch instructions.
    /// Example: BEQ label
    Rel,

    /// Absolute - Full 16-bit address.
    /// Example: LDA $1234
    Abs,

    /// Absolute,X - 16-bit address plus X register.
    /// Example: LDA $1234,X
    Abx,

    /// Absolute,Y - 16-bit address plus Y register.
    /// Example: LDA $1234,Y
    Aby,

    /// Indirect - 16-bit address points to 16-bit target address.
    /// Used only by JMP. Has a bug where crossing page boundary wraps.
    /// Example: JMP ($1234)
    Ind,

    /// Indexed Indirect - (Zero Page,X)
    /// Pointer in zero page indexed by X.
    /// Example: LDA ($42,X)
    Idx,

    /// Indirect Indexed - (Zero Page),Y
    /// Pointer in zero page, indexed by Y after fetching.
    /// Example: LDA ($42),Y
    Idy,

    /// Absolute,X with forced dummy read (for write instructions).
    AbxW,

    /// Absolute,Y with forced dummy read (for write instructions).
    AbyW,

    /// Indirect Indexed with forced dummy read (for write instructions).
    IdyW,
}

impl AddrMode {
    /// Returns the base number of bytes for this addressing mode's operand.
    /// Does not include the opcode byte.
    #[must_use]
    pub const fn operand_size(self) -> u8 {
        match self {
            Self::Imp | Self::Acc => 0,
            Self::Imm
            | Self::Zp0
            | Self::Zpx
            | Self::Zpy
            | Self::Rel
            | Self::Idx
            | Self::Idy
            | Self::IdyW => 1,
            Self::Abs | Self::Abx | Self::Aby | Self::Ind | Self::AbxW | Self::AbyW => 2,
        }
    }

    /// Returns the base number of cycles for this addressing mode.
    /// Additional cycles may be added for page boundary crossings.
    #[must_use]
    pub const fn base_cycles(self) -> u8 {
        match self {
            Self::Imp | Self::Acc => 0,
            Self::Imm => 1,
            Self::Zp0 => 2,
            Self::Zpx | Self::Zpy => 3,
            Self::Rel => 1, // +1 if branch taken, +1 if page crossed
            Self::Abs => 3,
            Self::Abx | Self::Aby => 3,   // +1 if page crossed for reads
            Self::AbxW | Self::AbyW => 4, // Always 4 for writes
            Self::Ind => 4,
            Self::Idx => 5,
            Self::Idy => 4,  // +1 if page crossed for reads
            Self::IdyW => 5, // Always 5 for writes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_size() {
        assert_eq!(AddrMode::Imp.operand_size(), 0);
        assert_eq!(AddrMode::Acc.operand_size(), 0);
        assert_eq!(AddrMode::Imm.operand_size(), 1);
        assert_eq!(AddrMode::Zp0.operand_size(), 1);
        assert_eq!(AddrMode::Abs.operand_size(), 2);
        assert_eq!(AddrMode::Ind.operand_size(), 2);
    }
}
