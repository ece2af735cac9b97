//! RISC-V 64 register context.
//!
//! Mirrors `mcontext_t::__gregs`: slot 0 holds the pc, slot n holds xn for
//! n in 1..32 (ra, sp, gp, tp, t0-t2, fp/s0, s1, a0-a7, s2-s11, t3-t6).

use super::register_accessors;
use crate::context::{LimitedRegisters, NativeRegisters, Register};

/// Saved RISC-V 64 register state.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiscV64Context {
    pub(crate) gregs: [u64; 32],
}

register_accessors! {
    RiscV64Context, u64;
    pc, pc_mut => gregs[0];
    ra, ra_mut => gregs[1];
    sp, sp_mut => gregs[2];
    gp, gp_mut => gregs[3];
    tp, tp_mut => gregs[4];
    t0, t0_mut => gregs[5];
    t1, t1_mut => gregs[6];
    t2, t2_mut => gregs[7];
    fp, fp_mut => gregs[8];
    s1, s1_mut => gregs[9];
    a0, a0_mut => gregs[10];
    a1, a1_mut => gregs[11];
    a2, a2_mut => gregs[12];
    a3, a3_mut => gregs[13];
    a4, a4_mut => gregs[14];
    a5, a5_mut => gregs[15];
    a6, a6_mut => gregs[16];
    a7, a7_mut => gregs[17];
    s2, s2_mut => gregs[18];
    s3, s3_mut => gregs[19];
    s4, s4_mut => gregs[20];
    s5, s5_mut => gregs[21];
    s6, s6_mut => gregs[22];
    s7, s7_mut => gregs[23];
    s8, s8_mut => gregs[24];
    s9, s9_mut => gregs[25];
    s10, s10_mut => gregs[26];
    s11, s11_mut => gregs[27];
    t3, t3_mut => gregs[28];
    t4, t4_mut => gregs[29];
    t5, t5_mut => gregs[30];
    t6, t6_mut => gregs[31];
}

impl NativeRegisters for RiscV64Context {
    type Word = u64;
    type Limited = RiscV64LimitedContext;

    const ARCH: &'static str = "riscv64";
    const REGISTERS: &'static [Register<Self>] = Self::NAMED;
    const CONTIGUOUS_RUNS: &'static [&'static [&'static str]] = &[&[
        "gp", "tp", "t0", "t1", "t2", "fp", "s1", "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
        "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
    ]];
    const CONTROL_REGISTERS: &'static [&'static str] = &["sp", "pc"];
    const EXTRA_ROOTS: &'static [&'static str] = &["ra", "fp"];

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
        // ra..t6 with sp (x2) cut out.
        visitor(self.ra_mut());
        for slot in &mut self.gregs[3..=31] {
            visitor(slot);
        }

        // ra and fp are usable as scratch registers.
        visitor(self.ra_mut());
        visitor(self.fp_mut());
    }

    fn to_limited_context(&self, limited: &mut RiscV64LimitedContext) {
        limited.ip = self.pc();
        limited.sp = self.sp();
        limited.fp = self.fp();
        limited.ra = self.ra();
        limited.a0 = self.a0();
        limited.a1 = self.a1();
        limited.s1 = self.s1();
        limited.s2_s11.copy_from_slice(&self.gregs[18..=27]);
    }

    fn redirect(&mut self, target: &RiscV64LimitedContext, arg0: u64, arg1: u64) {
        *self.pc_mut() = target.ip;
        *self.sp_mut() = target.sp;
        *self.fp_mut() = target.fp;
        *self.ra_mut() = target.ra;
        *self.a0_mut() = target.a0;
        *self.a1_mut() = target.a1;
        *self.s1_mut() = target.s1;
        self.gregs[18..=27].copy_from_slice(&target.s2_s11);

        *self.a0_mut() = arg0;
        *self.a1_mut() = arg1;
    }
}

/// Limited register context for RISC-V 64.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiscV64LimitedContext {
    /// Frame pointer (s0).
    pub fp: u64,
    /// Return address.
    pub ra: u64,
    /// First argument / return value.
    pub a0: u64,
    /// Second argument / return value.
    pub a1: u64,
    /// Callee-saved s1.
    pub s1: u64,
    /// Callee-saved s2-s11.
    pub s2_s11: [u64; 10],
    /// Stack pointer.
    pub sp: u64,
    /// Instruction pointer.
    pub ip: u64,
}

impl LimitedRegisters for RiscV64LimitedContext {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pc_lives_in_slot_zero() {
        let mut ctx = RiscV64Context::default();
        *ctx.pc_mut() = 0x1_0000;
        assert_eq!(ctx.gregs[0], 0x1_0000);
        assert_eq!(ctx.instruction_pointer(), 0x1_0000);
    }

    #[test]
    fn test_scan_duplicates_ra_and_fp() {
        let mut ctx = RiscV64Context::default();
        for n in 0..32 {
            ctx.gregs[n] = 0x100 + n as u64;
        }
        let mut seen = Vec::new();
        ctx.for_each_possible_object_ref(|slot| seen.push(*slot));

        assert_eq!(seen.len(), 32);
        assert!(!seen.contains(&0x100)); // pc
        assert!(!seen.contains(&0x102)); // sp
        assert_eq!(seen.iter().filter(|&&v| v == 0x101).count(), 2);
        assert_eq!(seen.iter().filter(|&&v| v == 0x108).count(), 2);
    }

    #[test]
    fn test_a0_a1_are_contiguous() {
        let mut ctx = RiscV64Context::default();
        let a0 = ctx.a0_mut() as *mut u64 as usize;
        let a7 = ctx.a7_mut() as *mut u64 as usize;
        assert_eq!(a7 - a0, 7 * 8);
    }
}
