//! Token trees for talking to an out-of-process proc-macro expander.
//!
//! This crate contains the data side of proc-macro expansion:
//! - [`Subtree`] / [`TokenTree`] / [`Leaf`]: the tree a proc macro consumes and produces
//! - [`TokenMap`]: what each [`TokenId`] corresponds to in the original source
//! - [`RangeMap`] / [`MappedText`]: offset correspondence between generated and source text
//! - [`FlatTree`]: the primitive-array wire encoding of a [`Subtree`]
//! - [`ExpanderVersion`] / [`CodecFlags`]: which record shapes the wire encoding uses
//!
//! Everything here is a plain value. No I/O.
//!
//! # Design Philosophy
//!
//! - **Flat on the wire**: trees become five `u32` arrays plus a string table
//! - **No recursion in the codec**: encode walks a work queue, decode fills
//!   subtrees back-to-front
//! - **Version is data**: the record shape is a [`CodecFlags`] value computed
//!   once per protocol version and threaded through the codec

mod flat;
mod lit_kind;
mod mapped_text;
mod range_map;
mod token_map;
mod tree;
mod version;

pub use flat::{FlatTree, FlatTreeError};
pub use lit_kind::LitKind;
pub use mapped_text::{MappedText, MutableMappedText};
pub use range_map::{MappedTextRange, RangeMap};
pub use token_map::{DelimiterMeta, DelimiterPart, MappedSubtree, TokenMap, TokenMeta, TokenMetadata};
pub use tree::{
    Delimiter, DelimiterKind, Ident, IdentIsRaw, Leaf, Literal, Punct, Spacing, Subtree, TokenId,
    TokenTree,
};
pub use version::{CodecFlags, ExpanderVersion};
