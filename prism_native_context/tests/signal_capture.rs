//! Capture a real signal context on the host.
//!
//! Installs an `SA_SIGINFO` handler for SIGUSR2, raises the signal on the
//! current thread and inspects the kernel-provided `ucontext_t` from inside
//! the handler. Results leave the handler through atomics only.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use libc::{c_int, c_void, siginfo_t};
use prism_native_context::{
    ContextConfig, LimitedContext, LimitedRegisters, NativeContext, NativeRegisters, initialize,
    native_context_mut,
};

static HANDLED: AtomicBool = AtomicBool::new(false);
static VISITS: AtomicUsize = AtomicUsize::new(0);
static IP: AtomicUsize = AtomicUsize::new(0);
static SP: AtomicUsize = AtomicUsize::new(0);
static LIMITED_IP: AtomicUsize = AtomicUsize::new(0);
static LIMITED_SP: AtomicUsize = AtomicUsize::new(0);

extern "C" fn on_suspend(_sig: c_int, _info: *mut siginfo_t, uc: *mut c_void) {
    // SAFETY: `uc` is the kernel's ucontext_t for this delivery.
    let context = unsafe { native_context_mut(uc) };

    let mut visits = 0;
    context.for_each_possible_object_ref(|_| visits += 1);

    let mut limited = LimitedContext::default();
    context.to_limited_context(&mut limited);

    VISITS.store(visits, Ordering::Relaxed);
    IP.store(context.instruction_pointer(), Ordering::Relaxed);
    SP.store(context.stack_pointer(), Ordering::Relaxed);
    LIMITED_IP.store(limited.ip(), Ordering::Relaxed);
    LIMITED_SP.store(limited.sp(), Ordering::Relaxed);
    HANDLED.store(true, Ordering::Release);
}

fn expected_visits() -> usize {
    let mut visits = 0;
    NativeContext::default().for_each_possible_object_ref(|_| visits += 1);
    visits
}

#[test]
fn test_sigusr2_context_capture() {
    assert_eq!(initialize(&ContextConfig::default()), Ok(()));

    let handler: extern "C" fn(c_int, *mut siginfo_t, *mut c_void) = on_suspend;
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        let mut previous: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = libc::SA_SIGINFO;
        libc::sigemptyset(&mut action.sa_mask);

        assert_eq!(libc::sigaction(libc::SIGUSR2, &action, &mut previous), 0);
        assert_eq!(libc::raise(libc::SIGUSR2), 0);
        assert_eq!(libc::sigaction(libc::SIGUSR2, &previous, std::ptr::null_mut()), 0);
    }

    assert!(HANDLED.load(Ordering::Acquire));
    assert_eq!(VISITS.load(Ordering::Relaxed), expected_visits());

    let ip = IP.load(Ordering::Relaxed);
    let sp = SP.load(Ordering::Relaxed);
    assert_ne!(ip, 0);
    assert_ne!(sp, 0);
    assert_eq!(LIMITED_IP.load(Ordering::Relaxed), ip);
    assert_eq!(LIMITED_SP.load(Ordering::Relaxed), sp);

    // The interrupted thread was running on this stack.
    let local = 0u8;
    let here = &local as *const u8 as usize;
    assert!(sp.abs_diff(here) < 1 << 20, "sp {:#x} far from {:#x}", sp, here);
}
