//! Stack growth guard for deeply nested token trees.
//!
//! Proc-macro output can nest delimiters arbitrarily deep (think recursive
//! `macro_rules!` generating `((((...))))`). The flat tree codec walks trees
//! with explicit work queues, but span recovery, text reconstruction, and
//! the attribute-item fixup are naturally depth-first. Those passes wrap
//! each descent in [`ensure_sufficient_stack`].
//!
//! - **Native targets**: grows the stack on demand via `stacker`.
//! - **WASM targets**: plain call.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 64 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn visit(subtree: &Subtree) {
///     ensure_sufficient_stack(|| {
///         for child in &subtree.token_trees { /* ... */ }
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
