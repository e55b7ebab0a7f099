//! Expander configuration.
//!
//! Defaults, overridden by environment variables:
//!
//! | variable                     | effect                                  |
//! |------------------------------|-----------------------------------------|
//! | `PMX_PROC_MACROS`            | `0`/`false`/`off` disables expansion    |
//! | `PMX_FN_LIKE_PROC_MACROS`    | same, for function-like macros only     |
//! | `PMX_PROC_MACRO_TIMEOUT_MS`  | per-request timeout in milliseconds     |

use std::time::Duration;

use tracing::warn;

pub const ENV_PROC_MACROS: &str = "PMX_PROC_MACROS";
pub const ENV_FN_LIKE_PROC_MACROS: &str = "PMX_FN_LIKE_PROC_MACROS";
pub const ENV_PROC_MACRO_TIMEOUT_MS: &str = "PMX_PROC_MACRO_TIMEOUT_MS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpanderConfig {
    /// Master switch for proc-macro expansion.
    pub enabled: bool,
    /// Function-like macros only. Attribute and derive macros ignore it.
    pub function_like_enabled: bool,
    /// Handed to the transport with every request.
    pub timeout: Duration,
    /// Run attribute macro items through the syntax-error fixup.
    pub fixup_syntax_errors: bool,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        ExpanderConfig {
            enabled: true,
            function_like_enabled: true,
            timeout: DEFAULT_TIMEOUT,
            fixup_syntax_errors: true,
        }
    }
}

impl ExpanderConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from `lookup`. Bad values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(enabled) = lookup(ENV_PROC_MACROS).and_then(|v| parse_switch(ENV_PROC_MACROS, &v)) {
            config.enabled = enabled;
        }
        if let Some(enabled) =
            lookup(ENV_FN_LIKE_PROC_MACROS).and_then(|v| parse_switch(ENV_FN_LIKE_PROC_MACROS, &v))
        {
            config.function_like_enabled = enabled;
        }
        if let Some(value) = lookup(ENV_PROC_MACRO_TIMEOUT_MS) {
            match value.trim().parse::<u64>() {
                Ok(millis) => config.timeout = Duration::from_millis(millis),
                Err(err) => warn!(
                    variable = ENV_PROC_MACRO_TIMEOUT_MS,
                    %value,
                    %err,
                    "ignoring unparsable timeout"
                ),
            }
        }
        config
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_function_like_enabled(mut self, enabled: bool) -> Self {
        self.function_like_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_fixup_syntax_errors(mut self, fixup: bool) -> Self {
        self.fixup_syntax_errors = fixup;
        self
    }
}

fn parse_switch(variable: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => {
            warn!(variable, value, "ignoring unrecognized switch value");
            None
        }
    }
}
