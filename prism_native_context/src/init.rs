//! One-time process initialization.

use std::sync::OnceLock;

use log::{debug, error};

use crate::config::ContextConfig;
use crate::context::NativeRegisters;
use crate::layout::{LayoutError, verify_all_layouts, verify_layout};
use crate::NativeContext;

/// Outcome of the first [`initialize`] call.
static INIT: OnceLock<Result<(), LayoutError>> = OnceLock::new();

/// Verify register layouts according to `config`.
///
/// Must run before the suspension handler is installed. Only the first call
/// does any work; later calls return its outcome whatever their `config`.
pub fn initialize(config: &ContextConfig) -> Result<(), LayoutError> {
    *INIT.get_or_init(|| run(config))
}

/// Whether [`initialize`] has completed, successfully or not.
#[inline]
pub fn is_initialized() -> bool {
    INIT.get().is_some()
}

fn run(config: &ContextConfig) -> Result<(), LayoutError> {
    let result = if config.verify_all_architectures {
        verify_all_layouts()
    } else if config.verify_layout {
        verify_layout::<NativeContext>()
    } else {
        debug!("{}: layout verification disabled", NativeContext::ARCH);
        return Ok(());
    };

    match &result {
        Ok(()) => debug!(
            "{}: register layout verified ({} named registers)",
            NativeContext::ARCH,
            NativeContext::REGISTERS.len()
        ),
        Err(err) => error!("register layout verification failed: {}", err),
    }
    result
}
