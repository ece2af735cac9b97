//! Register layout verification.
//!
//! The root scan strides over register arrays instead of naming every
//! register. That is only sound if the named accessors and the strided
//! runs agree, so every context type is checked once at startup:
//!
//! - no two named registers share storage
//! - each run in `CONTIGUOUS_RUNS` advances by exactly one word
//! - every slot the root scan visits is a named register
//! - the root scan never visits sp or pc
//! - the root scan visits every run member and every extra root
//!
//! Verification allocates and must not run inside a signal handler.

use std::fmt;
use std::mem;

use crate::arch::{
    arm::ArmContext, arm64::Arm64Context, loongarch64::LoongArch64Context,
    riscv64::RiscV64Context, x86_64::X64Context,
};
use crate::context::NativeRegisters;

// =============================================================================
// LayoutError
// =============================================================================

/// A register layout that the root scan cannot rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// A register in a contiguous run is not one word after its predecessor.
    NonContiguous {
        /// Architecture name.
        arch: &'static str,
        /// Offending register.
        register: &'static str,
        /// Expected byte offset from the start of the context.
        expected: usize,
        /// Actual byte offset from the start of the context.
        actual: usize,
    },
    /// Two named registers share storage.
    Aliased {
        /// Architecture name.
        arch: &'static str,
        /// First register.
        first: &'static str,
        /// Second register.
        second: &'static str,
    },
    /// A run or control list names a register with no accessor.
    UnknownRegister {
        /// Architecture name.
        arch: &'static str,
        /// The missing name.
        register: &'static str,
    },
    /// The root scan reported a stack pointer or program counter slot.
    ControlRegisterVisited {
        /// Architecture name.
        arch: &'static str,
        /// The control register.
        register: &'static str,
    },
    /// The root scan reported a slot that no named register covers.
    UnnamedSlot {
        /// Architecture name.
        arch: &'static str,
        /// Byte offset of the slot from the start of the context.
        offset: usize,
    },
    /// A run member or extra root that the root scan never visits.
    MissingRoot {
        /// Architecture name.
        arch: &'static str,
        /// The skipped register.
        register: &'static str,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::NonContiguous {
                arch,
                register,
                expected,
                actual,
            } => write!(
                f,
                "{}: register {} at offset {} breaks its run (expected {})",
                arch, register, actual, expected
            ),
            LayoutError::Aliased {
                arch,
                first,
                second,
            } => write!(f, "{}: registers {} and {} share storage", arch, first, second),
            LayoutError::UnknownRegister { arch, register } => {
                write!(f, "{}: no accessor for register {}", arch, register)
            }
            LayoutError::ControlRegisterVisited { arch, register } => {
                write!(f, "{}: root scan visits control register {}", arch, register)
            }
            LayoutError::UnnamedSlot { arch, offset } => {
                write!(f, "{}: root scan visits unnamed slot at offset {}", arch, offset)
            }
            LayoutError::MissingRoot { arch, register } => {
                write!(f, "{}: root scan skips register {}", arch, register)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

// =============================================================================
// Verification
// =============================================================================

/// Verify the register layout of `C`.
pub fn verify_layout<C: NativeRegisters>() -> Result<(), LayoutError> {
    let mut context = C::default();
    let base = &context as *const C as usize;

    let offsets: Vec<(&'static str, usize)> = C::REGISTERS
        .iter()
        .map(|register| (register.name, register.address(&mut context) - base))
        .collect();

    for (i, &(first, offset)) in offsets.iter().enumerate() {
        if let Some(&(second, _)) = offsets[i + 1..].iter().find(|(_, o)| *o == offset) {
            return Err(LayoutError::Aliased {
                arch: C::ARCH,
                first,
                second,
            });
        }
    }

    let offset_of = |register: &'static str| {
        offsets
            .iter()
            .find(|(name, _)| *name == register)
            .map(|&(_, offset)| offset)
            .ok_or(LayoutError::UnknownRegister {
                arch: C::ARCH,
                register,
            })
    };

    let width = mem::size_of::<C::Word>();
    for run in C::CONTIGUOUS_RUNS {
        let Some((&head, rest)) = run.split_first() else {
            continue;
        };
        let start = offset_of(head)?;
        for (n, &register) in rest.iter().enumerate() {
            let expected = start + (n + 1) * width;
            let actual = offset_of(register)?;
            if actual != expected {
                return Err(LayoutError::NonContiguous {
                    arch: C::ARCH,
                    register,
                    expected,
                    actual,
                });
            }
        }
    }

    let mut control = Vec::with_capacity(C::CONTROL_REGISTERS.len());
    for &register in C::CONTROL_REGISTERS {
        control.push((register, offset_of(register)?));
    }

    let mut visited = Vec::new();
    let mut failure = None;
    context.for_each_possible_object_ref(|slot| {
        if failure.is_some() {
            return;
        }
        let offset = slot as *mut C::Word as usize - base;
        visited.push(offset);
        if let Some(&(register, _)) = control.iter().find(|(_, o)| *o == offset) {
            failure = Some(LayoutError::ControlRegisterVisited {
                arch: C::ARCH,
                register,
            });
        } else if !offsets.iter().any(|(_, o)| *o == offset) {
            failure = Some(LayoutError::UnnamedSlot {
                arch: C::ARCH,
                offset,
            });
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    let required = C::CONTIGUOUS_RUNS
        .iter()
        .flat_map(|run| run.iter().copied())
        .chain(C::EXTRA_ROOTS.iter().copied());
    for register in required {
        if !visited.contains(&offset_of(register)?) {
            return Err(LayoutError::MissingRoot {
                arch: C::ARCH,
                register,
            });
        }
    }

    Ok(())
}

/// Verify all five architecture layouts.
pub fn verify_all_layouts() -> Result<(), LayoutError> {
    verify_layout::<X64Context>()?;
    verify_layout::<Arm64Context>()?;
    verify_layout::<ArmContext>()?;
    verify_layout::<LoongArch64Context>()?;
    verify_layout::<RiscV64Context>()
}

// =============================================================================
// Tests
// =============================================================================
