//! C ABI entry points for the native runtime.
//!
//! Every function takes the raw `ucontext_t*` passed to an `SA_SIGINFO`
//! handler and is safe to call from that handler.

use libc::c_void;

use crate::context::NativeRegisters;
use crate::ucontext::{native_context, native_context_mut};
use crate::{LimitedContext, NativeWord};

/// Callback receiving one possible object reference slot.
///
/// The slot is a live register and may be overwritten.
pub type ObjectRefCallback = unsafe extern "C" fn(slot: *mut usize, data: *mut c_void);

/// Translate a signal context into the limited context at `out`.
///
/// # Safety
///
/// `context` must point to a valid `ucontext_t` and `out` to writable
/// `LimitedContext` storage.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prism_native_context_to_limited_context(
    context: *const c_void,
    out: *mut LimitedContext,
) {
    // SAFETY: guaranteed by the caller.
    unsafe { native_context(context).to_limited_context(&mut *out) }
}

/// Redirect a signal context so the thread resumes at `limited.ip` with
/// `arg0` and `arg1` in the first two argument registers.
///
/// # Safety
///
/// `context` must point to a valid `ucontext_t` and `limited` to a valid
/// `LimitedContext`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prism_redirect_native_context(
    context: *mut c_void,
    limited: *const LimitedContext,
    arg0: NativeWord,
    arg1: NativeWord,
) {
    // SAFETY: guaranteed by the caller.
    unsafe { native_context_mut(context).redirect(&*limited, arg0, arg1) }
}

/// Report every register that may hold an object reference to `callback`.
///
/// # Safety
///
/// `context` must point to a valid `ucontext_t`. `callback` must be safe to
/// call with `data` from a signal handler.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prism_for_each_possible_object_ref(
    context: *mut c_void,
    callback: ObjectRefCallback,
    data: *mut c_void,
) {
    // SAFETY: guaranteed by the caller.
    let context = unsafe { native_context_mut(context) };
    context.for_each_possible_object_ref(|slot| {
        // SAFETY: NativeWord has the size and alignment of usize.
        unsafe { callback((slot as *mut NativeWord).cast::<usize>(), data) }
    });
}

/// Value of general-purpose register `index` in hardware encoding order.
///
/// # Safety
///
/// `context` must point to a valid `ucontext_t`. Panics (aborting across
/// the C boundary) when `index` is 16 or more.
#[cfg(target_arch = "x86_64")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prism_get_register_value_by_index(
    context: *const c_void,
    index: u32,
) -> u64 {
    // SAFETY: guaranteed by the caller.
    unsafe { native_context(context).register_value_by_index(index) }
}

/// Program counter of a signal context.
///
/// # Safety
///
/// `context` must point to a valid `ucontext_t`.
#[cfg(target_arch = "x86_64")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prism_get_pc(context: *const c_void) -> u64 {
    // SAFETY: guaranteed by the caller.
    unsafe { native_context(context).pc() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LimitedRegisters;
    use std::ptr;

    unsafe extern "C" fn count_and_tag(slot: *mut usize, data: *mut c_void) {
        unsafe {
            *data.cast::<usize>() += 1;
            *slot = 0x7A6;
        }
    }

    fn zeroed_ucontext() -> libc::ucontext_t {
        // SAFETY: all-zero is a valid ucontext_t.
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn test_callback_sees_every_root_slot() {
        let mut uc = zeroed_ucontext();
        let raw = ptr::addr_of_mut!(uc).cast::<c_void>();
        let mut count = 0usize;
        unsafe {
            prism_for_each_possible_object_ref(
                raw,
                count_and_tag,
                ptr::addr_of_mut!(count).cast::<c_void>(),
            );
        }

        let mut expected = 0usize;
        let mut tagged = 0usize;
        let context = unsafe { native_context_mut(raw) };
        context.for_each_possible_object_ref(|slot| {
            expected += 1;
            if *slot == 0x7A6 {
                tagged += 1;
            }
        });
        assert_eq!(count, expected);
        assert_eq!(tagged, expected);
    }

    #[test]
    fn test_redirect_then_translate() {
        let mut uc = zeroed_ucontext();
        let raw = ptr::addr_of_mut!(uc).cast::<c_void>();
        let mut target = LimitedContext::default();
        unsafe { prism_native_context_to_limited_context(raw, &mut target) };
        target.ip = 0x4000;

        unsafe { prism_redirect_native_context(raw, &target, 1, 2) };
        let mut after = LimitedContext::default();
        unsafe { prism_native_context_to_limited_context(raw, &mut after) };
        assert_eq!(after.ip(), 0x4000);
        assert_eq!(after.sp(), target.sp());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_x64_register_exports() {
        let mut uc = zeroed_ucontext();
        let raw = ptr::addr_of_mut!(uc).cast::<c_void>();
        let context = unsafe { native_context_mut(raw) };
        *context.rip_mut() = 0x1000;
        *context.rbx_mut() = 0xB;

        unsafe {
            assert_eq!(prism_get_pc(raw), 0x1000);
            assert_eq!(prism_get_register_value_by_index(raw, 3), 0xB);
        }
    }
}
