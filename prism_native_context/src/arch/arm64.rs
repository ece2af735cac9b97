//! AArch64 register context.
//!
//! Mirrors the head of the Linux `mcontext_t` (`struct sigcontext`):
//! `fault_address`, `regs[31]` holding x0-x30, then `sp`, `pc`, `pstate`.

use super::register_accessors;
use crate::context::{LimitedRegisters, NativeRegisters, Register};

/// Index of the frame pointer (x29) in `regs`.
pub const FP: usize = 29;
/// Index of the link register (x30) in `regs`.
pub const LR: usize = 30;

/// Saved AArch64 register state.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arm64Context {
    pub(crate) fault_address: u64,
    pub(crate) regs: [u64; 31],
    pub(crate) sp: u64,
    pub(crate) pc: u64,
    pub(crate) pstate: u64,
}

register_accessors! {
    Arm64Context, u64;
    x0, x0_mut => regs[0];
    x1, x1_mut => regs[1];
    x2, x2_mut => regs[2];
    x3, x3_mut => regs[3];
    x4, x4_mut => regs[4];
    x5, x5_mut => regs[5];
    x6, x6_mut => regs[6];
    x7, x7_mut => regs[7];
    x8, x8_mut => regs[8];
    x9, x9_mut => regs[9];
    x10, x10_mut => regs[10];
    x11, x11_mut => regs[11];
    x12, x12_mut => regs[12];
    x13, x13_mut => regs[13];
    x14, x14_mut => regs[14];
    x15, x15_mut => regs[15];
    x16, x16_mut => regs[16];
    x17, x17_mut => regs[17];
    x18, x18_mut => regs[18];
    x19, x19_mut => regs[19];
    x20, x20_mut => regs[20];
    x21, x21_mut => regs[21];
    x22, x22_mut => regs[22];
    x23, x23_mut => regs[23];
    x24, x24_mut => regs[24];
    x25, x25_mut => regs[25];
    x26, x26_mut => regs[26];
    x27, x27_mut => regs[27];
    x28, x28_mut => regs[28];
    fp, fp_mut => regs[FP];
    lr, lr_mut => regs[LR];
    sp, sp_mut => sp;
    pc, pc_mut => pc;
}

impl Arm64Context {
    /// Processor state (NZCV, EL, ...).
    #[inline]
    pub fn pstate(&self) -> u64 {
        self.pstate
    }

    /// Faulting data address for SIGSEGV/SIGBUS.
    #[inline]
    pub fn fault_address(&self) -> u64 {
        self.fault_address
    }
}

impl NativeRegisters for Arm64Context {
    type Word = u64;
    type Limited = Arm64LimitedContext;

    const ARCH: &'static str = "aarch64";
    const REGISTERS: &'static [Register<Self>] = Self::NAMED;
    const CONTIGUOUS_RUNS: &'static [&'static [&'static str]] = &[&[
        "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12", "x13",
        "x14", "x15", "x16", "x17", "x18", "x19", "x20", "x21", "x22", "x23", "x24", "x25", "x26",
        "x27", "x28",
    ]];
    const CONTROL_REGISTERS: &'static [&'static str] = &["sp", "pc"];
    const EXTRA_ROOTS: &'static [&'static str] = &["fp", "lr"];

    #[inline]
    fn instruction_pointer(&self) -> usize {
        self.pc() as usize
    }

    #[inline]
    fn stack_pointer(&self) -> usize {
        self.sp() as usize
    }

    #[inline]
    fn frame_pointer(&self) -> usize {
        self.fp() as usize
    }

    fn for_each_possible_object_ref<F>(&mut self, mut visitor: F)
    where
        F: FnMut(&mut u64),
    {
        for slot in &mut self.regs[0..=28] {
            visitor(slot);
        }

        visitor(self.fp_mut());

        // lr is usable as a scratch register.
        visitor(self.lr_mut());
    }

    fn to_limited_context(&self, limited: &mut Arm64LimitedContext) {
        limited.ip = self.pc();
        limited.sp = self.sp();
        limited.fp = self.fp();
        limited.lr = self.lr();
        limited.x0 = self.x0();
        limited.x1 = self.x1();
        limited.x19_x28.copy_from_slice(&self.regs[19..=28]);
    }

    fn redirect(&mut self, target: &Arm64LimitedContext, arg0: u64, arg1: u64) {
        *self.pc_mut() = target.ip;
        *self.sp_mut() = target.sp;
        *self.fp_mut() = target.fp;
        *self.lr_mut() = target.lr;
        *self.x0_mut() = target.x0;
        *self.x1_mut() = target.x1;
        self.regs[19..=28].copy_from_slice(&target.x19_x28);

        *self.x0_mut() = arg0;
        *self.x1_mut() = arg1;
    }
}

/// Limited register context for AArch64.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arm64LimitedContext {
    /// Frame pointer (x29).
    pub fp: u64,
    /// Link register (x30).
    pub lr: u64,
    /// First argument / return value.
    pub x0: u64,
    /// Second argument / return value.
    pub x1: u64,
    /// Callee-saved x19-x28.
    pub x19_x28: [u64; 10],
    /// Stack pointer.
    pub sp: u64,
    /// Instruction pointer.
    pub ip: u64,
}

impl LimitedRegisters for Arm64LimitedContext {
    #[inline]
    fn ip(&self) -> usize {
        self.ip as usize
    }

    #[inline]
    fn sp(&self) -> usize {
        self.sp as usize
    }

    #[inline]
    fn fp(&self) -> usize {
        self.fp as usize
    }
}
