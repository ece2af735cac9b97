//! 32-bit ARM register context.
//!
//! Mirrors the Linux `mcontext_t`: `trap_no`, `error_code`, `oldmask`,
//! then r0-r15 as consecutive 32-bit words (r11 = fp, r12 = ip scratch,
//! r13 = sp, r14 = lr, r15 = pc), `cpsr` and `fault_address`.

use super::register_accessors;
use crate::context::{LimitedRegisters, NativeRegisters, Register};

/// Saved ARM register state.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmContext {
    _trap_no: u32,
    _error_code: u32,
    _oldmask: u32,
    pub(crate) regs: [u32; 16],
    pub(crate) cpsr: u32,
    pub(crate) fault_address: u32,
}

register_accessors! {
    ArmContext, u32;
    r0, r0_mut => regs[0];
    r1, r1_mut => regs[1];
    r2, r2_mut => regs[2];
    r3, r3_mut => regs[3];
    r4, r4_mut => regs[4];
    r5, r5_mut => regs[5];
    r6, r6_mut => regs[6];
    r7, r7_mut => regs[7];
    r8, r8_mut => regs[8];
    r9, r9_mut => regs[9];
    r10, r10_mut => regs[10];
    r11, r11_mut => regs[11];
    r12, r12_mut => regs[12];
    sp, sp_mut => regs[13];
    lr, lr_mut => regs[14];
    pc, pc_mut => regs[15];
}

impl ArmContext {
    /// Current program status register.
    #[inline]
    pub fn cpsr(&self) -> u32 {
        self.cpsr
    }

    /// Faulting data address for SIGSEGV/SIGBUS.
    #[inline]
    pub fn fault_address(&self) -> u32 {
        self.fault_address
    }
}

impl NativeRegisters for ArmContext {
    type Word = u32;
    type Limited = ArmLimitedContext;

    const ARCH: &'static str = "arm";
    const REGISTERS: &'static [Register<Self>] = Self::NAMED;
    const CONTIGUOUS_RUNS: &'static [&'static [&'static str]] = &[&[
        "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12",
    ]];
    const CONTROL_REGISTERS: &'static [&'static str] = &["sp", "pc"];
    const EXTRA_ROOTS: &'static [&'static str] = &[];

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
        self.r11() as usize
    }

    fn for_each_possible_object_ref<F>(&mut self, mut visitor: F)
    where
        F: FnMut(&mut u32),
    {
        for slot in &mut self.regs[0..=12] {
            visitor(slot);
        }
    }

    fn to_limited_context(&self, limited: &mut ArmLimitedContext) {
        limited.ip = self.pc();
        limited.sp = self.sp();
        limited.lr = self.lr();
        limited.r0 = self.r0();
        limited.r4_r11.copy_from_slice(&self.regs[4..=11]);
    }

    fn redirect(&mut self, target: &ArmLimitedContext, arg0: u32, arg1: u32) {
        *self.pc_mut() = target.ip;
        *self.sp_mut() = target.sp;
        *self.lr_mut() = target.lr;
        *self.r0_mut() = target.r0;
        self.regs[4..=11].copy_from_slice(&target.r4_r11);

        *self.r0_mut() = arg0;
        *self.r1_mut() = arg1;
    }
}

/// Limited register context for ARM.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmLimitedContext {
    /// First argument / return value.
    pub r0: u32,
    /// Callee-saved r4-r11 (r11 is the frame pointer).
    pub r4_r11: [u32; 8],
    /// Instruction pointer.
    pub ip: u32,
    /// Stack pointer.
    pub sp: u32,
    /// Link register.
    pub lr: u32,
}

impl LimitedRegisters for ArmLimitedContext {
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
        self.r4_r11[7] as usize
    }
}
