//! LoongArch64 register context.
//!
//! Mirrors the Linux `mcontext_t`: `pc`, then `regs[32]` holding r0-r31
//! (r0 zero, r1 ra, r2 tp, r3 sp, r4-r11 a0-a7, r12-r20 t0-t8, r21
//! reserved, r22 fp, r23-r31 s0-s8), then `flags`.

use super::register_accessors;
use crate::context::{LimitedRegisters, NativeRegisters, Register};

/// Saved LoongArch64 register state.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoongArch64Context {
    pub(crate) pc: u64,
    pub(crate) regs: [u64; 32],
    _flags: u32,
}

register_accessors! {
    LoongArch64Context, u64;
    r0, r0_mut => regs[0];
    ra, ra_mut => regs[1];
    r2, r2_mut => regs[2];
    sp, sp_mut => regs[3];
    r4, r4_mut => regs[4];
    r5, r5_mut => regs[5];
    r6, r6_mut => regs[6];
    r7, r7_mut => regs[7];
    r8, r8_mut => regs[8];
    r9, r9_mut => regs[9];
    r10, r10_mut => regs[10];
    r11, r11_mut => regs[11];
    r12, r12_mut => regs[12];
    r13, r13_mut => regs[13];
    r14, r14_mut => regs[14];
    r15, r15_mut => regs[15];
    r16, r16_mut => regs[16];
    r17, r17_mut => regs[17];
    r18, r18_mut => regs[18];
    r19, r19_mut => regs[19];
    r20, r20_mut => regs[20];
    r21, r21_mut => regs[21];
    fp, fp_mut => regs[22];
    r23, r23_mut => regs[23];
    r24, r24_mut => regs[24];
    r25, r25_mut => regs[25];
    r26, r26_mut => regs[26];
    r27, r27_mut => regs[27];
    r28, r28_mut => regs[28];
    r29, r29_mut => regs[29];
    r30, r30_mut => regs[30];
    r31, r31_mut => regs[31];
    pc, pc_mut => pc;
}

impl NativeRegisters for LoongArch64Context {
    type Word = u64;
    type Limited = LoongArch64LimitedContext;

    const ARCH: &'static str = "loongarch64";
    const REGISTERS: &'static [Register<Self>] = Self::NAMED;
    const CONTIGUOUS_RUNS: &'static [&'static [&'static str]] = &[
        &["ra", "r2"],
        &[
            "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15", "r16",
            "r17", "r18", "r19", "r20", "r21", "fp", "r23", "r24", "r25", "r26", "r27", "r28",
            "r29", "r30", "r31",
        ],
    ];
    const CONTROL_REGISTERS: &'static [&'static str] = &["sp", "pc"];
    const EXTRA_ROOTS: &'static [&'static str] = &["ra"];

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
        // ra..r31 with sp (r3) cut out; r0 is hardwired to zero.
        for slot in &mut self.regs[1..=2] {
            visitor(slot);
        }
        for slot in &mut self.regs[4..=31] {
            visitor(slot);
        }

        // ra is usable as a scratch register.
        visitor(self.ra_mut());
    }

    fn to_limited_context(&self, limited: &mut LoongArch64LimitedContext) {
        limited.ip = self.pc();
        limited.sp = self.sp();
        limited.fp = self.fp();
        limited.ra = self.ra();
        limited.r4 = self.r4();
        limited.r5 = self.r5();
        limited.r23_r31.copy_from_slice(&self.regs[23..=31]);
    }

    fn redirect(&mut self, target: &LoongArch64LimitedContext, arg0: u64, arg1: u64) {
        *self.pc_mut() = target.ip;
        *self.sp_mut() = target.sp;
        *self.fp_mut() = target.fp;
        *self.ra_mut() = target.ra;
        *self.r4_mut() = target.r4;
        *self.r5_mut() = target.r5;
        self.regs[23..=31].copy_from_slice(&target.r23_r31);

        // a0, a1
        *self.r4_mut() = arg0;
        *self.r5_mut() = arg1;
    }
}

/// Limited register context for LoongArch64.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoongArch64LimitedContext {
    /// Frame pointer (r22).
    pub fp: u64,
    /// Return address (r1).
    pub ra: u64,
    /// First argument / return value (a0).
    pub r4: u64,
    /// Second argument / return value (a1).
    pub r5: u64,
    /// Callee-saved s0-s8.
    pub r23_r31: [u64; 9],
    /// Stack pointer.
    pub sp: u64,
    /// Instruction pointer.
    pub ip: u64,
}

impl LimitedRegisters for LoongArch64LimitedContext {
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
