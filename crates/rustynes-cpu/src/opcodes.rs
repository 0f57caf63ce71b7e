//! 6502 opcode dispatch table.
//!
//! The table is pure data: `(mnemonic, addressing mode, base cycles, page-cross
//! penalty, unofficial)` per opcode byte. [`crate::cpu::Cpu::step`] decodes the
//! addressing mode generically, then matches on [`Mnemonic`] to run the
//! per-category executor. Bytes with no table entry (the `JAM`/`KIL`
//! instructions that hang real hardware, plus any other gap) decode to
//! `None` and are handled by the caller's unknown-opcode policy.

use crate::addressing::AddrMode;

/// 6502 instruction mnemonics, official and the commonly-emulated
/// undocumented opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
    Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror,
    Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    /// `LDA`+`LDX` combined (unofficial).
    Lax,
    /// `STA`&`STX` combined (unofficial).
    Sax,
    /// `DEC` then `CMP` (unofficial).
    Dcp,
    /// `INC` then `SBC` (unofficial, aka ISC).
    Isb,
    /// `ASL` then `ORA` (unofficial).
    Slo,
    /// `ROL` then `AND` (unofficial).
    Rla,
    /// `LSR` then `EOR` (unofficial).
    Sre,
    /// `ROR` then `ADC` (unofficial).
    Rra,
    /// `AND` immediate, copy bit 7 into carry (unofficial).
    Anc,
    /// `AND` immediate then `LSR` (unofficial).
    Alr,
    /// `AND` immediate then `ROR` with odd V/C rules (unofficial).
    Arr,
    /// `(A&X) - imm` into X, no borrow semantics (unofficial, aka SBX).
    Axs,
    /// Highly unstable `AND X` into A (unofficial, aka ANE); approximated.
    Xaa,
    /// Highly unstable `AND` of bus/X/imm into A and X (unofficial, aka LAX #imm); approximated.
    Lxa,
    /// Highly unstable `A & X & (high byte + 1)` store (unofficial, aka AHX/SHA); approximated.
    Sha,
    /// Highly unstable `X & (high byte + 1)` store (unofficial); approximated.
    Shx,
    /// Highly unstable `Y & (high byte + 1)` store (unofficial); approximated.
    Shy,
    /// Highly unstable `(A&X) & (high byte + 1)` store, loads into SP too (unofficial, aka TAS/SHS); approximated.
    Tas,
    /// Highly unstable `(mem & SP)` into A, X, SP (unofficial, aka LAS/LAR); approximated.
    Las,
}

/// One decoded opcode table entry.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// The operation to perform.
    pub mnemonic: Mnemonic,
    /// How the operand address is computed.
    pub mode: AddrMode,
    /// Base cycle count (addressing-mode fetch + operation), excluding
    /// branch-taken/page-cross extras added by the executor.
    pub cycles: u8,
    /// Whether a page crossing during address computation adds one cycle.
    pub page_cross_penalty: bool,
    /// True for opcodes absent from the documented instruction set.
    pub unofficial: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, cycles: u8, page_cross_penalty: bool, unofficial: bool) -> Option<OpcodeInfo> {
    Some(OpcodeInfo { mnemonic, mode, cycles, page_cross_penalty, unofficial })
}

use AddrMode::{Abs, Abx as Abx_, AbxW as AbxW_, Aby as Aby_, AbyW as AbyW_, Acc, Idx, Idy, IdyW, Imm, Imp, Ind, Rel, Zp0, Zpx, Zpy};

/// 256-entry opcode dispatch table indexed by opcode byte.
#[rustfmt::skip]
pub static OPCODE_TABLE: [Option<OpcodeInfo>; 256] = [
    // 0x00-0x0F
    op(Mnemonic::Brk, Imp, 7, false, false), op(Mnemonic::Ora, Idx, 6, false, false), None, op(Mnemonic::Slo, Idx, 8, false, true),
    op(Mnemonic::Nop, Zp0, 3, false, true), op(Mnemonic::Ora, Zp0, 3, false, false), op(Mnemonic::Asl, Zp0, 5, false, false), op(Mnemonic::Slo, Zp0, 5, false, true),
    op(Mnemonic::Php, Imp, 3, false, false), op(Mnemonic::Ora, Imm, 2, false, false), op(Mnemonic::Asl, Acc, 2, false, false), op(Mnemonic::Anc, Imm, 2, false, true),
    op(Mnemonic::Nop, Abs, 4, false, true), op(Mnemonic::Ora, Abs, 4, false, false), op(Mnemonic::Asl, Abs, 6, false, false), op(Mnemonic::Slo, Abs, 6, false, true),
    // 0x10-0x1F
    op(Mnemonic::Bpl, Rel, 2, true, false), op(Mnemonic::Ora, Idy, 5, true, false), None, op(Mnemonic::Slo, IdyW, 8, false, true),
    op(Mnemonic::Nop, Zpx, 4, false, true), op(Mnemonic::Ora, Zpx, 4, false, false), op(Mnemonic::Asl, Zpx, 6, false, false), op(Mnemonic::Slo, Zpx, 6, false, true),
    op(Mnemonic::Clc, Imp, 2, false, false), op(Mnemonic::Ora, Aby_, 4, true, false), op(Mnemonic::Nop, Imp, 2, false, true), op(Mnemonic::Slo, AbyW_, 7, false, true),
    op(Mnemonic::Nop, Abx_, 4, true, true), op(Mnemonic::Ora, Abx_, 4, true, false), op(Mnemonic::Asl, AbxW_, 7, false, false), op(Mnemonic::Slo, AbxW_, 7, false, true),
    // 0x20-0x2F
    op(Mnemonic::Jsr, Abs, 6, false, false), op(Mnemonic::And, Idx, 6, false, false), None, op(Mnemonic::Rla, Idx, 8, false, true),
    op(Mnemonic::Bit, Zp0, 3, false, false), op(Mnemonic::And, Zp0, 3, false, false), op(Mnemonic::Rol, Zp0, 5, false, false), op(Mnemonic::Rla, Zp0, 5, false, true),
    op(Mnemonic::Plp, Imp, 4, false, false), op(Mnemonic::And, Imm, 2, false, false), op(Mnemonic::Rol, Acc, 2, false, false), op(Mnemonic::Anc, Imm, 2, false, true),
    op(Mnemonic::Bit, Abs, 4, false, false), op(Mnemonic::And, Abs, 4, false, false), op(Mnemonic::Rol, Abs, 6, false, false), op(Mnemonic::Rla, Abs, 6, false, true),
    // 0x30-0x3F
    op(Mnemonic::Bmi, Rel, 2, true, false), op(Mnemonic::And, Idy, 5, true, false), None, op(Mnemonic::Rla, IdyW, 8, false, true),
    op(Mnemonic::Nop, Zpx, 4, false, true), op(Mnemonic::And, Zpx, 4, false, false), op(Mnemonic::Rol, Zpx, 6, false, false), op(Mnemonic::Rla, Zpx, 6, false, true),
    op(Mnemonic::Sec, Imp, 2, false, false), op(Mnemonic::And, Aby_, 4, true, false), op(Mnemonic::Nop, Imp, 2, false, true), op(Mnemonic::Rla, AbyW_, 7, false, true),
    op(Mnemonic::Nop, Abx_, 4, true, true), op(Mnemonic::And, Abx_, 4, true, false), op(Mnemonic::Rol, AbxW_, 7, false, false), op(Mnemonic::Rla, AbxW_, 7, false, true),
    // 0x40-0x4F
    op(Mnemonic::Rti, Imp, 6, false, false), op(Mnemonic::Eor, Idx, 6, false, false), None, op(Mnemonic::Sre, Idx, 8, false, true),
    op(Mnemonic::Nop, Zp0, 3, false, true), op(Mnemonic::Eor, Zp0, 3, false, false), op(Mnemonic::Lsr, Zp0, 5, false, false), op(Mnemonic::Sre, Zp0, 5, false, true),
    op(Mnemonic::Pha, Imp, 3, false, false), op(Mnemonic::Eor, Imm, 2, false, false), op(Mnemonic::Lsr, Acc, 2, false, false), op(Mnemonic::Alr, Imm, 2, false, true),
    op(Mnemonic::Jmp, Abs, 3, false, false), op(Mnemonic::Eor, Abs, 4, false, false), op(Mnemonic::Lsr, Abs, 6, false, false), op(Mnemonic::Sre, Abs, 6, false, true),
    // 0x50-0x5F
    op(Mnemonic::Bvc, Rel, 2, true, false), op(Mnemonic::Eor, Idy, 5, true, false), None, op(Mnemonic::Sre, IdyW, 8, false, true),
    op(Mnemonic::Nop, Zpx, 4, false, true), op(Mnemonic::Eor, Zpx, 4, false, false), op(Mnemonic::Lsr, Zpx, 6, false, false), op(Mnemonic::Sre, Zpx, 6, false, true),
    op(Mnemonic::Cli, Imp, 2, false, false), op(Mnemonic::Eor, Aby_, 4, true, false), op(Mnemonic::Nop, Imp, 2, false, true), op(Mnemonic::Sre, AbyW_, 7, false, true),
    op(Mnemonic::Nop, Abx_, 4, true, true), op(Mnemonic::Eor, Abx_, 4, true, false), op(Mnemonic::Lsr, AbxW_, 7, false, false), op(Mnemonic::Sre, AbxW_, 7, false, true),
    // 0x60-0x6F
    op(Mnemonic::Rts, Imp, 6, false, false), op(Mnemonic::Adc, Idx, 6, false, false), None, op(Mnemonic::Rra, Idx, 8, false, true),
    op(Mnemonic::Nop, Zp0, 3, false, true), op(Mnemonic::Adc, Zp0, 3, false, false), op(Mnemonic::Ror, Zp0, 5, false, false), op(Mnemonic::Rra, Zp0, 5, false, true),
    op(Mnemonic::Pla, Imp, 4, false, false), op(Mnemonic::Adc, Imm, 2, false, false), op(Mnemonic::Ror, Acc, 2, false, false), op(Mnemonic::Arr, Imm, 2, false, true),
    op(Mnemonic::Jmp, Ind, 5, false, false), op(Mnemonic::Adc, Abs, 4, false, false), op(Mnemonic::Ror, Abs, 6, false, false), op(Mnemonic::Rra, Abs, 6, false, true),
    // 0x70-0x7F
    op(Mnemonic::Bvs, Rel, 2, true, false), op(Mnemonic::Adc, Idy, 5, true, false), None, op(Mnemonic::Rra, IdyW, 8, false, true),
    op(Mnemonic::Nop, Zpx, 4, false, true), op(Mnemonic::Adc, Zpx, 4, false, false), op(Mnemonic::Ror, Zpx, 6, false, false), op(Mnemonic::Rra, Zpx, 6, false, true),
    op(Mnemonic::Sei, Imp, 2, false, false), op(Mnemonic::Adc, Aby_, 4, true, false), op(Mnemonic::Nop, Imp, 2, false, true), op(Mnemonic::Rra, AbyW_, 7, false, true),
    op(Mnemonic::Nop, Abx_, 4, true, true), op(Mnemonic::Adc, Abx_, 4, true, false), op(Mnemonic::Ror, AbxW_, 7, false, false), op(Mnemonic::Rra, AbxW_, 7, false, true),
    // 0x80-0x8F
    op(Mnemonic::Nop, Imm, 2, false, true), op(Mnemonic::Sta, Idx, 6, false, false), op(Mnemonic::Nop, Imm, 2, false, true), op(Mnemonic::Sax, Idx, 6, false, true),
    op(Mnemonic::Sty, Zp0, 3, false, false), op(Mnemonic::Sta, Zp0, 3, false, false), op(Mnemonic::Stx, Zp0, 3, false, false), op(Mnemonic::Sax, Zp0, 3, false, true),
    op(Mnemonic::Dey, Imp, 2, false, false), op(Mnemonic::Nop, Imm, 2, false, true), op(Mnemonic::Txa, Imp, 2, false, false), op(Mnemonic::Xaa, Imm, 2, false, true),
    op(Mnemonic::Sty, Abs, 4, false, false), op(Mnemonic::Sta, Abs, 4, false, false), op(Mnemonic::Stx, Abs, 4, false, false), op(Mnemonic::Sax, Abs, 4, false, true),
    // 0x90-0x9F
    op(Mnemonic::Bcc, Rel, 2, true, false), op(Mnemonic::Sta, IdyW, 6, false, false), None, op(Mnemonic::Sha, IdyW, 6, false, true),
    op(Mnemonic::Sty, Zpx, 4, false, false), op(Mnemonic::Sta, Zpx, 4, false, false), op(Mnemonic::Stx, Zpy, 4, false, false), op(Mnemonic::Sax, Zpy, 4, false, true),
    op(Mnemonic::Tya, Imp, 2, false, false), op(Mnemonic::Sta, AbyW_, 5, false, false), op(Mnemonic::Txs, Imp, 2, false, false), op(Mnemonic::Tas, AbyW_, 5, false, true),
    op(Mnemonic::Shy, AbxW_, 5, false, true), op(Mnemonic::Sta, AbxW_, 5, false, false), op(Mnemonic::Shx, AbyW_, 5, false, true), op(Mnemonic::Sha, AbyW_, 5, false, true),
    // 0xA0-0xAF
    op(Mnemonic::Ldy, Imm, 2, false, false), op(Mnemonic::Lda, Idx, 6, false, false), op(Mnemonic::Ldx, Imm, 2, false, false), op(Mnemonic::Lax, Idx, 6, false, true),
    op(Mnemonic::Ldy, Zp0, 3, false, false), op(Mnemonic::Lda, Zp0, 3, false, false), op(Mnemonic::Ldx, Zp0, 3, false, false), op(Mnemonic::Lax, Zp0, 3, false, true),
    op(Mnemonic::Tay, Imp, 2, false, false), op(Mnemonic::Lda, Imm, 2, false, false), op(Mnemonic::Tax, Imp, 2, false, false), op(Mnemonic::Lxa, Imm, 2, false, true),
    op(Mnemonic::Ldy, Abs, 4, false, false), op(Mnemonic::Lda, Abs, 4, false, false), op(Mnemonic::Ldx, Abs, 4, false, false), op(Mnemonic::Lax, Abs, 4, false, true),
    // 0xB0-0xBF
    op(Mnemonic::Bcs, Rel, 2, true, false), op(Mnemonic::Lda, Idy, 5, true, false), None, op(Mnemonic::Lax, Idy, 5, true, true),
    op(Mnemonic::Ldy, Zpx, 4, false, false), op(Mnemonic::Lda, Zpx, 4, false, false), op(Mnemonic::Ldx, Zpy, 4, false, false), op(Mnemonic::Lax, Zpy, 4, false, true),
    op(Mnemonic::Clv, Imp, 2, false, false), op(Mnemonic::Lda, Aby_, 4, true, false), op(Mnemonic::Tsx, Imp, 2, false, false), op(Mnemonic::Las, Aby_, 4, true, true),
    op(Mnemonic::Ldy, Abx_, 4, true, false), op(Mnemonic::Lda, Abx_, 4, true, false), op(Mnemonic::Ldx, Aby_, 4, true, false), op(Mnemonic::Lax, Aby_, 4, true, true),
    // 0xC0-0xCF
    op(Mnemonic::Cpy, Imm, 2, false, false), op(Mnemonic::Cmp, Idx, 6, false, false), op(Mnemonic::Nop, Imm, 2, false, true), op(Mnemonic::Dcp, Idx, 8, false, true),
    op(Mnemonic::Cpy, Zp0, 3, false, false), op(Mnemonic::Cmp, Zp0, 3, false, false), op(Mnemonic::Dec, Zp0, 5, false, false), op(Mnemonic::Dcp, Zp0, 5, false, true),
    op(Mnemonic::Iny, Imp, 2, false, false), op(Mnemonic::Cmp, Imm, 2, false, false), op(Mnemonic::Dex, Imp, 2, false, false), op(Mnemonic::Axs, Imm, 2, false, true),
    op(Mnemonic::Cpy, Abs, 4, false, false), op(Mnemonic::Cmp, Abs, 4, false, false), op(Mnemonic::Dec, Abs, 6, false, false), op(Mnemonic::Dcp, Abs, 6, false, true),
    // 0xD0-0xDF
    op(Mnemonic::Bne, Rel, 2, true, false), op(Mnemonic::Cmp, Idy, 5, true, false), None, op(Mnemonic::Dcp, IdyW, 8, false, true),
    op(Mnemonic::Nop, Zpx, 4, false, true), op(Mnemonic::Cmp, Zpx, 4, false, false), op(Mnemonic::Dec, Zpx, 6, false, false), op(Mnemonic::Dcp, Zpx, 6, false, true),
    op(Mnemonic::Cld, Imp, 2, false, false), op(Mnemonic::Cmp, Aby_, 4, true, false), op(Mnemonic::Nop, Imp, 2, false, true), op(Mnemonic::Dcp, AbyW_, 7, false, true),
    op(Mnemonic::Nop, Abx_, 4, true, true), op(Mnemonic::Cmp, Abx_, 4, true, false), op(Mnemonic::Dec, AbxW_, 7, false, false), op(Mnemonic::Dcp, AbxW_, 7, false, true),
    // 0xE0-0xEF
    op(Mnemonic::Cpx, Imm, 2, false, false), op(Mnemonic::Sbc, Idx, 6, false, false), op(Mnemonic::Nop, Imm, 2, false, true), op(Mnemonic::Isb, Idx, 8, false, true),
    op(Mnemonic::Cpx, Zp0, 3, false, false), op(Mnemonic::Sbc, Zp0, 3, false, false), op(Mnemonic::Inc, Zp0, 5, false, false), op(Mnemonic::Isb, Zp0, 5, false, true),
    op(Mnemonic::Inx, Imp, 2, false, false), op(Mnemonic::Sbc, Imm, 2, false, false), op(Mnemonic::Nop, Imp, 2, false, false), op(Mnemonic::Sbc, Imm, 2, false, true),
    op(Mnemonic::Cpx, Abs, 4, false, false), op(Mnemonic::Sbc, Abs, 4, false, false), op(Mnemonic::Inc, Abs, 6, false, false), op(Mnemonic::Isb, Abs, 6, false, true),
    // 0xF0-0xFF
    op(Mnemonic::Beq, Rel, 2, true, false), op(Mnemonic::Sbc, Idy, 5, true, false), None, op(Mnemonic::Isb, IdyW, 8, false, true),
    op(Mnemonic::Nop, Zpx, 4, false, true), op(Mnemonic::Sbc, Zpx, 4, false, false), op(Mnemonic::Inc, Zpx, 6, false, false), op(Mnemonic::Isb, Zpx, 6, false, true),
    op(Mnemonic::Sed, Imp, 2, false, false), op(Mnemonic::Sbc, Aby_, 4, true, false), op(Mnemonic::Nop, Imp, 2, false, true), op(Mnemonic::Isb, AbyW_, 7, false, true),
    op(Mnemonic::Nop, Abx_, 4, true, true), op(Mnemonic::Sbc, Abx_, 4, true, false), op(Mnemonic::Inc, AbxW_, 7, false, false), op(Mnemonic::Isb, AbxW_, 7, false, true),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_opcodes_decode() {
        assert_eq!(OPCODE_TABLE[0xA9].unwrap().mnemonic, Mnemonic::Lda);
        assert_eq!(OPCODE_TABLE[0xA9].unwrap().mode, Imm);
        assert_eq!(OPCODE_TABLE[0xA9].unwrap().cycles, 2);
        assert_eq!(OPCODE_TABLE[0x00].unwrap().mnemonic, Mnemonic::Brk);
        assert_eq!(OPCODE_TABLE[0xEA].unwrap().mnemonic, Mnemonic::Nop);
        assert!(!OPCODE_TABLE[0xEA].unwrap().unofficial);
    }

    #[test]
    fn jam_opcodes_are_absent() {
        for byte in [0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2] {
            assert!(OPCODE_TABLE[byte].is_none(), "expected no entry for ${byte:02X}");
        }
    }

    #[test]
    fn unofficial_opcodes_marked() {
        assert!(OPCODE_TABLE[0xA3].unwrap().unofficial); // LAX (idx)
        assert_eq!(OPCODE_TABLE[0xA3].unwrap().mnemonic, Mnemonic::Lax);
        assert!(OPCODE_TABLE[0xEB].unwrap().unofficial); // SBC #imm (dup of 0xE9)
        assert_eq!(OPCODE_TABLE[0xEB].unwrap().mnemonic, Mnemonic::Sbc);
    }

    #[test]
    fn jmp_indirect_has_correct_mode_and_cycles() {
        let entry = OPCODE_TABLE[0x6C].unwrap();
        assert_eq!(entry.mnemonic, Mnemonic::Jmp);
        assert_eq!(entry.mode, Ind);
        assert_eq!(entry.cycles, 5);
    }
}
