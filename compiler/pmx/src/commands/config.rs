//! `pmx config`: the expander configuration the environment produces.

use pmx_expand::{
    ExpanderConfig, ENV_FN_LIKE_PROC_MACROS, ENV_PROC_MACROS, ENV_PROC_MACRO_TIMEOUT_MS,
};

pub fn show_config() -> String {
    render(&ExpanderConfig::from_env())
}

fn render(config: &ExpanderConfig) -> String {
    format!(
        "enabled: {}  ({ENV_PROC_MACROS})\n\
         function_like_enabled: {}  ({ENV_FN_LIKE_PROC_MACROS})\n\
         timeout: {}ms  ({ENV_PROC_MACRO_TIMEOUT_MS})\n\
         fixup_syntax_errors: {}\n",
        config.enabled,
        config.function_like_enabled,
        config.timeout.as_millis(),
        config.fixup_syntax_errors,
    )
}
