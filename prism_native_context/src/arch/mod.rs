//! Per-architecture register contexts.
//!
//! Each module mirrors the register prefix of the Linux `mcontext_t` for
//! one architecture:
//!
//! | Module        | Context              | Word  |
//! |---------------|----------------------|-------|
//! | `x86_64`      | `X64Context`         | `u64` |
//! | `arm64`       | `Arm64Context`       | `u64` |
//! | `arm`         | `ArmContext`         | `u32` |
//! | `loongarch64` | `LoongArch64Context` | `u64` |
//! | `riscv64`     | `RiscV64Context`     | `u64` |

pub mod arm;
pub mod arm64;
pub mod loongarch64;
pub mod riscv64;
pub mod x86_64;

/// Generate named register accessors and the `NAMED` register table.
///
/// Each entry `name, name_mut => field[index];` produces a by-value reader
/// and a `&mut` accessor into the live storage.
macro_rules! register_accessors {
    (
        $ctx:ty, $word:ty;
        $( $name:ident, $name_mut:ident => $field:ident $([$idx:expr])? ; )+
    ) => {
        impl $ctx {
            $(
                #[doc = concat!("Value of `", stringify!($name), "`.")]
                #[inline(always)]
                pub fn $name(&self) -> $word {
                    self.$field $([$idx])?
                }

                #[doc = concat!("Live storage of `", stringify!($name), "`.")]
                #[inline(always)]
                pub fn $name_mut(&mut self) -> &mut $word {
                    &mut self.$field $([$idx])?
                }
            )+

            const NAMED: &'static [$crate::context::Register<$ctx>] = &[
                $(
                    $crate::context::Register {
                        name: stringify!($name),
                        slot: <$ctx>::$name_mut,
                    },
                )+
            ];
        }
    };
}

pub(crate) use register_accessors;
