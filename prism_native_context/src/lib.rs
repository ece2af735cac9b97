//! Prism Native Context
//!
//! Register-level access to a thread that was interrupted by the GC's
//! suspension signal. Everything here runs inside an asynchronous signal
//! handler on the interrupted thread, so nothing allocates, locks or blocks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ SA_SIGINFO handler           │  ucontext_t* from the kernel
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │ NativeContext                │  borrows uc_mcontext in place
//! │  (X64Context, Arm64Context,  │
//! │   ArmContext, ...)           │
//! └───┬──────────┬───────────┬───┘
//!     ▼          ▼           ▼
//!  root scan  translate   redirect
//!  (GC)       (unwinder)  (trampoline)
//! ```
//!
//! All five architecture views are plain `#[repr(C)]` data and compile on
//! every host. Exactly one of them is the [`NativeContext`] of a build,
//! chosen by `target_arch`; unsupported targets fail to compile.
//!
//! # Usage
//!
//! ```ignore
//! use prism_native_context::{NativeRegisters, native_context_mut};
//!
//! extern "C" fn on_suspend(_: libc::c_int, _: *mut libc::siginfo_t, uc: *mut libc::c_void) {
//!     let context = unsafe { native_context_mut(uc) };
//!     context.for_each_possible_object_ref(|slot| scan_conservatively(slot));
//! }
//! ```
//!
//! # Initialization
//!
//! [`initialize`] verifies the register layout once per process, before the
//! suspension handler is installed. Enumeration strides over register
//! arrays and relies on that verification.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(not(any(target_os = "linux", target_os = "android")))]
compile_error!("prism_native_context only understands the Linux ucontext_t layout");

pub mod arch;
pub mod config;
pub mod context;
pub mod ffi;
pub mod layout;

mod init;
mod ucontext;

pub use config::ContextConfig;
pub use context::{LimitedRegisters, NativeRegisters, Register};
pub use init::{initialize, is_initialized};
pub use layout::{LayoutError, verify_all_layouts, verify_layout};
pub use ucontext::{native_context, native_context_mut};

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        /// Register context of the architecture this crate was built for.
        pub type NativeContext = arch::x86_64::X64Context;
        /// Limited context produced and consumed by [`NativeContext`].
        pub type LimitedContext = arch::x86_64::X64LimitedContext;
    } else if #[cfg(target_arch = "aarch64")] {
        /// Register context of the architecture this crate was built for.
        pub type NativeContext = arch::arm64::Arm64Context;
        /// Limited context produced and consumed by [`NativeContext`].
        pub type LimitedContext = arch::arm64::Arm64LimitedContext;
    } else if #[cfg(target_arch = "arm")] {
        /// Register context of the architecture this crate was built for.
        pub type NativeContext = arch::arm::ArmContext;
        /// Limited context produced and consumed by [`NativeContext`].
        pub type LimitedContext = arch::arm::ArmLimitedContext;
    } else if #[cfg(target_arch = "loongarch64")] {
        /// Register context of the architecture this crate was built for.
        pub type NativeContext = arch::loongarch64::LoongArch64Context;
        /// Limited context produced and consumed by [`NativeContext`].
        pub type LimitedContext = arch::loongarch64::LoongArch64LimitedContext;
    } else if #[cfg(target_arch = "riscv64")] {
        /// Register context of the architecture this crate was built for.
        pub type NativeContext = arch::riscv64::RiscV64Context;
        /// Limited context produced and consumed by [`NativeContext`].
        pub type LimitedContext = arch::riscv64::RiscV64LimitedContext;
    } else {
        compile_error!("prism_native_context: unsupported target architecture");
    }
}

/// Machine word of the native architecture.
pub type NativeWord = <NativeContext as NativeRegisters>::Word;

// Slots handed to the collector are reinterpreted as `usize`.
const _: () = assert!(std::mem::size_of::<NativeWord>() == std::mem::size_of::<usize>());
