//! The contract every architecture's register context implements.
//!
//! Dispatch is static: callers are generic over [`NativeRegisters`] or use
//! the [`NativeContext`](crate::NativeContext) alias directly. There is no
//! trait object anywhere on the signal path.

use std::fmt::Debug;

// =============================================================================
// Register Table
// =============================================================================

/// A named register slot of a context type.
///
/// `slot` returns a reference into the context's own storage, so the
/// address it yields is the address of the live register.
pub struct Register<C: NativeRegisters> {
    /// Architectural register name (`"rax"`, `"x0"`, `"ra"`, ...).
    pub name: &'static str,
    /// Accessor returning the register's storage.
    pub slot: fn(&mut C) -> &mut C::Word,
}

impl<C: NativeRegisters> Register<C> {
    /// Address of this register inside `context`.
    #[inline]
    pub fn address(&self, context: &mut C) -> usize {
        (self.slot)(context) as *mut C::Word as usize
    }
}

// =============================================================================
// NativeRegisters
// =============================================================================

/// A view over the operating system's saved register state.
///
/// # Signal safety
///
/// Every method is synchronous, operates only on `self` and caller-supplied
/// storage, and never allocates. They may be called from a signal handler.
pub trait NativeRegisters: Default + Sized + 'static {
    /// Integer register width.
    type Word: Copy + Eq + Debug + From<u32> + Into<u64>;

    /// Portable register subset consumed by the unwinder.
    type Limited: LimitedRegisters;

    /// Short architecture name used in diagnostics.
    const ARCH: &'static str;

    /// Every named register, in declaration order.
    const REGISTERS: &'static [Register<Self>];

    /// Runs of registers that enumeration strides over. Each run must be
    /// laid out one word apart in ascending order.
    const CONTIGUOUS_RUNS: &'static [&'static [&'static str]];

    /// Stack pointer and program counter. Never reported as roots.
    const CONTROL_REGISTERS: &'static [&'static str];

    /// Roots outside `CONTIGUOUS_RUNS` that enumeration must also visit,
    /// such as the frame pointer or a scratch-usable link register.
    const EXTRA_ROOTS: &'static [&'static str];

    /// Current instruction pointer.
    fn instruction_pointer(&self) -> usize;

    /// Current stack pointer.
    fn stack_pointer(&self) -> usize;

    /// Current frame pointer.
    fn frame_pointer(&self) -> usize;

    /// Visit every register slot that may hold an object reference.
    ///
    /// The visitor receives the live slot and may overwrite it to relocate
    /// the referent. Scratch-usable registers can be visited twice.
    fn for_each_possible_object_ref<F>(&mut self, visitor: F)
    where
        F: FnMut(&mut Self::Word);

    /// Copy the unwinder's register subset into `limited`.
    fn to_limited_context(&self, limited: &mut Self::Limited);

    /// Rewrite this context so the thread resumes at `target.ip()` with the
    /// logical state of `target` and `arg0`/`arg1` in the first two
    /// argument registers.
    ///
    /// The stack pointer is taken from `target`. Pass the value obtained
    /// from [`to_limited_context`](Self::to_limited_context) to keep it.
    fn redirect(&mut self, target: &Self::Limited, arg0: Self::Word, arg1: Self::Word);
}

// =============================================================================
// LimitedRegisters
// =============================================================================

/// The portable limited register context.
pub trait LimitedRegisters: Default + Copy + Debug + PartialEq {
    /// Instruction pointer.
    fn ip(&self) -> usize;

    /// Stack pointer.
    fn sp(&self) -> usize;

    /// Frame pointer.
    fn fp(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::arm64::Arm64Context;

    #[test]
    fn test_register_address_points_into_context() {
        let mut ctx = Arm64Context::default();
        let base = &ctx as *const Arm64Context as usize;
        let end = base + std::mem::size_of::<Arm64Context>();
        for register in Arm64Context::REGISTERS {
            let addr = register.address(&mut ctx);
            assert!(addr >= base && addr < end, "{} outside context", register.name);
        }
    }
}
