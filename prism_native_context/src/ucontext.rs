//! Borrowing the kernel's `ucontext_t` as a [`NativeContext`].
//!
//! The native context type mirrors the leading fields of `mcontext_t`, so a
//! pointer to `uc_mcontext` can be reinterpreted in place. The assertions
//! below pin the mirror to libc's definition at compile time.

use std::mem::{offset_of, size_of};
use std::ptr;

use libc::c_void;

use crate::NativeContext;

/// Borrow the native register context of a signal's `ucontext_t`.
///
/// # Safety
///
/// `ucontext` must be the third argument of an `SA_SIGINFO` handler (or
/// otherwise point to a valid `ucontext_t`), and the returned borrow must
/// not outlive the handler invocation.
#[inline]
pub unsafe fn native_context_mut<'a>(ucontext: *mut c_void) -> &'a mut NativeContext {
    let uc = ucontext.cast::<libc::ucontext_t>();
    // SAFETY: the caller guarantees `uc` is valid; the cast target is a
    // layout prefix of `mcontext_t` (checked below).
    unsafe { &mut *ptr::addr_of_mut!((*uc).uc_mcontext).cast::<NativeContext>() }
}

/// Shared-borrow variant of [`native_context_mut`].
///
/// # Safety
///
/// Same contract as [`native_context_mut`].
#[inline]
pub unsafe fn native_context<'a>(ucontext: *const c_void) -> &'a NativeContext {
    let uc = ucontext.cast::<libc::ucontext_t>();
    // SAFETY: see `native_context_mut`.
    unsafe { &*ptr::addr_of!((*uc).uc_mcontext).cast::<NativeContext>() }
}

// =============================================================================
// Layout Checks
// =============================================================================

const _: () = assert!(size_of::<NativeContext>() <= size_of::<libc::mcontext_t>());

#[cfg(target_arch = "x86_64")]
const _: () = {
    use crate::arch::x86_64::{NGREG, X64Context};
    assert!(offset_of!(libc::mcontext_t, gregs) == offset_of!(X64Context, gregs));
    assert!(
        offset_of!(libc::mcontext_t, fpregs) - offset_of!(libc::mcontext_t, gregs)
            == NGREG * size_of::<u64>()
    );
};

#[cfg(target_arch = "aarch64")]
const _: () = {
    use crate::arch::arm64::Arm64Context;
    assert!(offset_of!(libc::mcontext_t, regs) == offset_of!(Arm64Context, regs));
    assert!(offset_of!(libc::mcontext_t, sp) == offset_of!(Arm64Context, sp));
    assert!(offset_of!(libc::mcontext_t, pc) == offset_of!(Arm64Context, pc));
};

#[cfg(target_arch = "arm")]
const _: () = {
    use crate::arch::arm::ArmContext;
    assert!(offset_of!(libc::mcontext_t, arm_r0) == offset_of!(ArmContext, regs));
    assert!(offset_of!(libc::mcontext_t, arm_pc) == offset_of!(ArmContext, regs) + 15 * 4);
};

#[cfg(target_arch = "loongarch64")]
const _: () = {
    use crate::arch::loongarch64::LoongArch64Context;
    assert!(offset_of!(libc::mcontext_t, __pc) == offset_of!(LoongArch64Context, pc));
    assert!(offset_of!(libc::mcontext_t, __gregs) == offset_of!(LoongArch64Context, regs));
};

#[cfg(target_arch = "riscv64")]
const _: () = {
    use crate::arch::riscv64::RiscV64Context;
    assert!(offset_of!(libc::mcontext_t, __gregs) == offset_of!(RiscV64Context, gregs));
};
