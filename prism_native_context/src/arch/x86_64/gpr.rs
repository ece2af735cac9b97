//! x64 general-purpose register encodings.
//!
//! Instruction-level fault recovery reads operand registers out of the
//! interrupted context. Operands are encoded with the 4-bit hardware
//! number (ModR/M bits plus REX extension); this maps them to the
//! `ucontext_t` greg slot that holds the live value.

use super::{
    REG_R8, REG_R9, REG_R10, REG_R11, REG_R12, REG_R13, REG_R14, REG_R15, REG_RAX, REG_RBP,
    REG_RBX, REG_RCX, REG_RDI, REG_RDX, REG_RSI, REG_RSP,
};

// =============================================================================
// General-Purpose Registers (GPR)
// =============================================================================

/// x64 general-purpose register with its hardware encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Gpr {
    Rax = 0,
    Rcx = 1,
    Rdx = 2,
    Rbx = 3,
    Rsp = 4,
    Rbp = 5,
    Rsi = 6,
    Rdi = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl Gpr {
    /// All 16 general-purpose registers in encoding order.
    pub const ALL: [Gpr; 16] = [
        Gpr::Rax,
        Gpr::Rcx,
        Gpr::Rdx,
        Gpr::Rbx,
        Gpr::Rsp,
        Gpr::Rbp,
        Gpr::Rsi,
        Gpr::Rdi,
        Gpr::R8,
        Gpr::R9,
        Gpr::R10,
        Gpr::R11,
        Gpr::R12,
        Gpr::R13,
        Gpr::R14,
        Gpr::R15,
    ];

    /// Hardware encoding (0-15).
    #[inline(always)]
    pub const fn encoding(self) -> u8 {
        self as u8
    }

    /// Register for a 4-bit hardware encoding.
    #[inline]
    pub const fn from_encoding(enc: u8) -> Option<Gpr> {
        if (enc as usize) < Self::ALL.len() {
            Some(Self::ALL[enc as usize])
        } else {
            None
        }
    }

    /// Index of this register in `mcontext_t::gregs`.
    ///
    /// The kernel saves registers in `struct sigcontext` order, which is
    /// unrelated to the hardware encoding.
    #[inline]
    pub const fn greg_index(self) -> usize {
        match self {
            Gpr::Rax => REG_RAX,
            Gpr::Rcx => REG_RCX,
            Gpr::Rdx => REG_RDX,
            Gpr::Rbx => REG_RBX,
            Gpr::Rsp => REG_RSP,
            Gpr::Rbp => REG_RBP,
            Gpr::Rsi => REG_RSI,
            Gpr::Rdi => REG_RDI,
            Gpr::R8 => REG_R8,
            Gpr::R9 => REG_R9,
            Gpr::R10 => REG_R10,
            Gpr::R11 => REG_R11,
            Gpr::R12 => REG_R12,
            Gpr::R13 => REG_R13,
            Gpr::R14 => REG_R14,
            Gpr::R15 => REG_R15,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
