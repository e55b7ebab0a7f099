//! Proc-macro expansion through an out-of-process expander.
//!
//! [`ProcMacroExpander::expand`] takes a macro call, lowers it to token
//! trees, sends it to the expander, and turns the answer back into source
//! text plus a [`RangeMap`](pmx_tt::RangeMap) from that text to the call's
//! input.
//!
//! The steps after the expander answers are also usable on their own:
//! - [`recover`]: reattach token ids the proc macro dropped
//! - [`to_mapped_text`]: render a token tree as text with a range table
//! - [`fixup_syntax_errors`]: make an attribute macro item parseable

mod cancel;
mod config;
mod error;
mod expander;
mod fixup;
mod recover;
mod text;

use std::sync::Once;

pub use cancel::CancellationFlag;
pub use config::{
    ExpanderConfig, ENV_FN_LIKE_PROC_MACROS, ENV_PROC_MACROS, ENV_PROC_MACRO_TIMEOUT_MS,
};
pub use error::ExpansionError;
pub use expander::{MacroCall, MacroCallBody, ProcMacroDef, ProcMacroExpander, SyntaxProducer};
pub use fixup::{
    fixup_syntax_errors, NodeKind, SyntaxElement, SyntaxNode, SyntaxToken, TokenKind,
    FIXUP_PLACEHOLDER,
};
pub use recover::recover;
pub use text::to_mapped_text;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=pmx_expand=trace`. With `PMX_LOG_TREE=1` spans are printed as
/// an indented tree instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = std::env::var("PMX_LOG_TREE").is_ok_and(|v| v == "1");
        let (tree_layer, fmt_layer) = if tree {
            let layer = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true);
            (Some(layer), None)
        } else {
            (None, Some(fmt::layer().with_target(true).with_level(true)))
        };
        tracing_subscriber::registry()
            .with(tree_layer)
            .with(fmt_layer)
            .with(filter)
            .init();
    });
}
