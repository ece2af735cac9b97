//! Startup configuration for context handling.

use log::trace;

// =============================================================================
// Context Configuration
// =============================================================================

/// Settings consumed once by [`initialize`](crate::initialize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    /// Verify the native register layout before it is used.
    pub verify_layout: bool,

    /// Also verify the layouts of the non-native architectures.
    pub verify_all_architectures: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            verify_layout: true,
            verify_all_architectures: false,
        }
    }
}

impl ContextConfig {
    /// Environment variable overriding native layout verification (`0`/`off`
    /// disables).
    pub const ENV_VERIFY_LAYOUT: &'static str = "PRISM_CONTEXT_VERIFY_LAYOUT";

    /// Environment variable that enables verification of every architecture.
    pub const ENV_VERIFY_ALL: &'static str = "PRISM_CONTEXT_VERIFY_ALL";

    /// Defaults overridden by `PRISM_CONTEXT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(Self::ENV_VERIFY_LAYOUT).map(|v| Self::parse_flag(&v)) {
            trace!("{}={}", Self::ENV_VERIFY_LAYOUT, value);
            config.verify_layout = value;
        }
        if let Some(value) = lookup(Self::ENV_VERIFY_ALL).map(|v| Self::parse_flag(&v)) {
            trace!("{}={}", Self::ENV_VERIFY_ALL, value);
            config.verify_all_architectures = value;
        }

        config
    }

    /// Empty, `0`, `off`, `false` and `no` are false; anything else is true.
    fn parse_flag(value: &str) -> bool {
        !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "off" | "false" | "no"
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
