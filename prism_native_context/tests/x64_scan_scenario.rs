//! End-to-end root scan of a suspended x86-64 thread.
//!
//! A thread stopped with a heap pointer in rax must report that value
//! exactly once, and must never report its instruction or stack pointer.

use prism_native_context::arch::x86_64::{X64Context, X64LimitedContext};
use prism_native_context::{LimitedRegisters, NativeRegisters};

const HEAP_REF: u64 = 0xDEAD;
const RIP: u64 = 0x1000;
const RSP: u64 = 0x7FFF_FFFF_0000;

fn suspended_thread() -> X64Context {
    let mut ctx = X64Context::default();
    *ctx.rax_mut() = HEAP_REF;
    *ctx.rip_mut() = RIP;
    *ctx.rsp_mut() = RSP;
    ctx
}

#[test]
fn test_scan_reports_heap_ref_once() {
    let mut ctx = suspended_thread();
    let mut seen = Vec::new();
    ctx.for_each_possible_object_ref(|slot| seen.push(*slot));

    assert_eq!(seen.iter().filter(|&&v| v == HEAP_REF).count(), 1);
    assert!(!seen.contains(&RIP));
    assert!(!seen.contains(&RSP));
}

#[test]
fn test_scan_relocates_in_place() {
    const MOVED: u64 = 0xBEEF;

    let mut ctx = suspended_thread();
    ctx.for_each_possible_object_ref(|slot| {
        if *slot == HEAP_REF {
            *slot = MOVED;
        }
    });

    assert_eq!(ctx.rax(), MOVED);
    assert_eq!(ctx.rip(), RIP);
    assert_eq!(ctx.rsp(), RSP);
}

#[test]
fn test_unwinder_snapshot_of_suspended_thread() {
    let ctx = suspended_thread();
    let mut limited = X64LimitedContext::default();
    ctx.to_limited_context(&mut limited);

    assert_eq!(limited.ip(), RIP as usize);
    assert_eq!(limited.sp(), RSP as usize);
    assert_eq!(limited.rax, HEAP_REF);
}

#[test]
fn test_redirect_suspended_thread_to_trampoline() {
    const TRAMPOLINE: u64 = 0x2000;

    let mut ctx = suspended_thread();
    let mut limited = X64LimitedContext::default();
    ctx.to_limited_context(&mut limited);
    limited.ip = TRAMPOLINE;

    ctx.redirect(&limited, RIP, 0);

    assert_eq!(ctx.rip(), TRAMPOLINE);
    assert_eq!(ctx.rsp(), RSP);
    assert_eq!(ctx.rdi(), RIP);
    assert_eq!(ctx.rsi(), 0);
    assert_eq!(ctx.rax(), HEAP_REF);
}
