//! x86-64 register context.
//!
//! Mirrors `mcontext_t::gregs`, which the kernel fills in `struct
//! sigcontext` order: r8-r15, rdi, rsi, rbp, rbx, rdx, rax, rcx, rsp, rip
//! and then flags and fault state. The fifteen integer registers other
//! than rsp sit in `gregs[REG_R8..=REG_RCX]`, one run the root scan strides
//! over.

mod gpr;

pub use gpr::Gpr;

use super::register_accessors;
use crate::context::{LimitedRegisters, NativeRegisters, Register};

// =============================================================================
// gregs Indices
// =============================================================================

/// Index of r8 in `gregs`.
pub const REG_R8: usize = 0;
/// Index of r9 in `gregs`.
pub const REG_R9: usize = 1;
/// Index of r10 in `gregs`.
pub const REG_R10: usize = 2;
/// Index of r11 in `gregs`.
pub const REG_R11: usize = 3;
/// Index of r12 in `gregs`.
pub const REG_R12: usize = 4;
/// Index of r13 in `gregs`.
pub const REG_R13: usize = 5;
/// Index of r14 in `gregs`.
pub const REG_R14: usize = 6;
/// Index of r15 in `gregs`.
pub const REG_R15: usize = 7;
/// Index of rdi in `gregs`.
pub const REG_RDI: usize = 8;
/// Index of rsi in `gregs`.
pub const REG_RSI: usize = 9;
/// Index of rbp in `gregs`.
pub const REG_RBP: usize = 10;
/// Index of rbx in `gregs`.
pub const REG_RBX: usize = 11;
/// Index of rdx in `gregs`.
pub const REG_RDX: usize = 12;
/// Index of rax in `gregs`.
pub const REG_RAX: usize = 13;
/// Index of rcx in `gregs`.
pub const REG_RCX: usize = 14;
/// Index of rsp in `gregs`.
pub const REG_RSP: usize = 15;
/// Index of rip in `gregs`.
pub const REG_RIP: usize = 16;
/// Index of rflags in `gregs`.
pub const REG_EFL: usize = 17;

/// Number of entries in `gregs`.
pub const NGREG: usize = 23;

// =============================================================================
// X64Context
// =============================================================================

/// Saved x86-64 register state.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct X64Context {
    pub(crate) gregs: [u64; NGREG],
}

register_accessors! {
    X64Context, u64;
    rax, rax_mut => gregs[REG_RAX];
    rcx, rcx_mut => gregs[REG_RCX];
    rdx, rdx_mut => gregs[REG_RDX];
    rbx, rbx_mut => gregs[REG_RBX];
    rsp, rsp_mut => gregs[REG_RSP];
    rbp, rbp_mut => gregs[REG_RBP];
    rsi, rsi_mut => gregs[REG_RSI];
    rdi, rdi_mut => gregs[REG_RDI];
    r8, r8_mut => gregs[REG_R8];
    r9, r9_mut => gregs[REG_R9];
    r10, r10_mut => gregs[REG_R10];
    r11, r11_mut => gregs[REG_R11];
    r12, r12_mut => gregs[REG_R12];
    r13, r13_mut => gregs[REG_R13];
    r14, r14_mut => gregs[REG_R14];
    r15, r15_mut => gregs[REG_R15];
    rip, rip_mut => gregs[REG_RIP];
    eflags, eflags_mut => gregs[REG_EFL];
}

impl X64Context {
    /// Value of a register given its instruction encoding (0 = rax, 1 = rcx,
    /// ..., 15 = r15).
    ///
    /// The caller must have validated `index`; anything outside `0..16` is
    /// a bug and panics.
    #[inline]
    pub fn register_value_by_index(&self, index: u32) -> u64 {
        debug_assert!(index < 16, "x64 register index {} out of range", index);
        match u8::try_from(index).ok().and_then(Gpr::from_encoding) {
            Some(gpr) => self.gpr(gpr),
            None => panic!("x64 register index {} out of range", index),
        }
    }

    /// Program counter.
    #[inline]
    pub fn pc(&self) -> u64 {
        self.rip()
    }

    /// Value of `reg`.
    #[inline]
    pub fn gpr(&self, reg: Gpr) -> u64 {
        self.gregs[reg.greg_index()]
    }

    /// Live storage of `reg`.
    #[inline]
    pub fn gpr_mut(&mut self, reg: Gpr) -> &mut u64 {
        &mut self.gregs[reg.greg_index()]
    }
}

impl NativeRegisters for X64Context {
    type Word = u64;
    type Limited = X64LimitedContext;

    const ARCH: &'static str = "x86_64";
    const REGISTERS: &'static [Register<Self>] = Self::NAMED;
    const CONTIGUOUS_RUNS: &'static [&'static [&'static str]] = &[&[
        "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15", "rdi", "rsi", "rbp", "rbx", "rdx",
        "rax", "rcx",
    ]];
    const CONTROL_REGISTERS: &'static [&'static str] = &["rsp", "rip"];
    const EXTRA_ROOTS: &'static [&'static str] = &[];

    #[inline]
    fn instruction_pointer(&self) -> usize {
        self.rip() as usize
    }

    #[inline]
    fn stack_pointer(&self) -> usize {
        self.rsp() as usize
    }

    #[inline]
    fn frame_pointer(&self) -> usize {
        self.rbp() as usize
    }

    fn for_each_possible_object_ref<F>(&mut self, mut visitor: F)
    where
        F: FnMut(&mut u64),
    {
        for slot in &mut self.gregs[REG_R8..=REG_RCX] {
            visitor(slot);
        }
    }

    fn to_limited_context(&self, limited: &mut X64LimitedContext) {
        limited.ip = self.rip();
        limited.rsp = self.rsp();
        limited.rbp = self.rbp();
        limited.rax = self.rax();
        limited.rbx = self.rbx();
        limited.rdx = self.rdx();
        limited.r12 = self.r12();
        limited.r13 = self.r13();
        limited.r14 = self.r14();
        limited.r15 = self.r15();
    }

    fn redirect(&mut self, target: &X64LimitedContext, arg0: u64, arg1: u64) {
        *self.rip_mut() = target.ip;
        *self.rsp_mut() = target.rsp;
        *self.rbp_mut() = target.rbp;
        *self.rax_mut() = target.rax;
        *self.rbx_mut() = target.rbx;
        *self.rdx_mut() = target.rdx;
        *self.r12_mut() = target.r12;
        *self.r13_mut() = target.r13;
        *self.r14_mut() = target.r14;
        *self.r15_mut() = target.r15;

        // System V: first two integer arguments.
        *self.rdi_mut() = arg0;
        *self.rsi_mut() = arg1;
    }
}

// =============================================================================
// X64LimitedContext
// =============================================================================

/// Limited register context for x86-64.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct X64LimitedContext {
    /// Instruction pointer.
    pub ip: u64,
    /// Stack pointer.
    pub rsp: u64,
    /// Frame pointer.
    pub rbp: u64,
    /// Return value register.
    pub rax: u64,
    /// Callee-saved.
    pub rbx: u64,
    /// Second return value register.
    pub rdx: u64,
    /// Callee-saved.
    pub r12: u64,
    /// Callee-saved.
    pub r13: u64,
    /// Callee-saved.
    pub r14: u64,
    /// Callee-saved.
    pub r15: u64,
}

impl LimitedRegisters for X64LimitedContext {
    #[inline]
    fn ip(&self) -> usize {
        self.ip as usize
    }

    #[inline]
    fn sp(&self) -> usize {
        self.rsp as usize
    }

    #[inline]
    fn fp(&self) -> usize {
        self.rbp as usize
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_alias_gregs() {
        let mut ctx = X64Context::default();
        *ctx.rax_mut() = 0xDEAD;
        *ctx.rip_mut() = 0x1000;
        assert_eq!(ctx.gregs[REG_RAX], 0xDEAD);
        assert_eq!(ctx.gregs[REG_RIP], 0x1000);
    }

    #[test]
    fn test_register_value_by_index_follows_encoding() {
        let mut ctx = X64Context::default();
        for gpr in Gpr::ALL {
            *ctx.gpr_mut(gpr) = 0x100 + gpr.encoding() as u64;
        }
        for index in 0..16u32 {
            assert_eq!(ctx.register_value_by_index(index), 0x100 + index as u64);
        }
        assert_eq!(ctx.register_value_by_index(0), ctx.rax());
        assert_eq!(ctx.register_value_by_index(4), ctx.rsp());
        assert_eq!(ctx.register_value_by_index(7), ctx.rdi());
    }

    #[test]
    #[should_panic]
    fn test_register_value_by_index_rejects_out_of_range() {
        let ctx = X64Context::default();
        ctx.register_value_by_index(16);
    }

    #[test]
    #[should_panic]
    fn test_register_value_by_index_rejects_truncating_index() {
        // 256 must not wrap around to rax.
        let ctx = X64Context::default();
        ctx.register_value_by_index(256);
    }

    #[test]
    fn test_pc_is_rip() {
        let mut ctx = X64Context::default();
        *ctx.rip_mut() = 0x4010_2030;
        assert_eq!(ctx.pc(), 0x4010_2030);
        assert_eq!(ctx.instruction_pointer(), 0x4010_2030);
    }

    #[test]
    fn test_scan_skips_rsp_and_rip() {
        let mut ctx = X64Context::default();
        *ctx.rsp_mut() = 1;
        *ctx.rip_mut() = 1;
        let mut visited = 0;
        ctx.for_each_possible_object_ref(|slot| {
            assert_eq!(*slot, 0);
            visited += 1;
        });
        assert_eq!(visited, 15);
    }

    #[test]
    fn test_redirect_writes_rdi_rsi() {
        let mut ctx = X64Context::default();
        *ctx.rbx_mut() = 0x55;
        let mut limited = X64LimitedContext::default();
        ctx.to_limited_context(&mut limited);
        limited.ip = 0xCAFE_0000;

        ctx.redirect(&limited, 7, 9);

        assert_eq!(ctx.rip(), 0xCAFE_0000);
        assert_eq!(ctx.rdi(), 7);
        assert_eq!(ctx.rsi(), 9);
        assert_eq!(ctx.rbx(), 0x55);
    }
}
