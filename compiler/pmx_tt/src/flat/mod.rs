//! Flat, primitive-array encoding of a [`Subtree`].
//!
//! # Layout
//!
//! Five `u32` arrays and a string table:
//!
//! | array        | record                                                  |
//! |--------------|---------------------------------------------------------|
//! | `subtree`    | `[open_id, (close_id), kind, start, end]`               |
//! | `literal`    | `[id, text]` or `[id, text, kind, suffix]`               |
//! | `punct`      | `[id, char, spacing]`                                   |
//! | `ident`      | `[id, text]` or `[id, text, is_raw]`                    |
//! | `token_tree` | tagged child index: low 2 bits select the array above   |
//!
//! `start..end` of a subtree record slices `token_tree`. The bracketed and
//! alternative shapes are selected by [`CodecFlags`]. Subtree 0 is the root,
//! and every subtree is referenced only from a subtree with a lower index.
//! Extended literal records split the text into symbol, kind and suffix; see
//! `lit.rs` for the convention.

mod decode;
mod encode;
mod lit;

use serde::{Deserialize, Serialize};

use crate::{CodecFlags, ExpanderVersion, Subtree};

const TAG_SUBTREE: u32 = 0b00;
const TAG_LITERAL: u32 = 0b01;
const TAG_PUNCT: u32 = 0b10;
const TAG_IDENT: u32 = 0b11;
const TAG_MASK: u32 = 0b11;
const TAG_BITS: u32 = 2;

/// `u32::MAX` in optional slots (close id, literal suffix).
const NONE: u32 = u32::MAX;

/// Wire form of a [`Subtree`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FlatTree {
    pub subtree: Vec<u32>,
    pub literal: Vec<u32>,
    pub punct: Vec<u32>,
    pub ident: Vec<u32>,
    pub token_tree: Vec<u32>,
    pub text: Vec<String>,
}

impl FlatTree {
    /// Encode `root` using the record shapes of `version`.
    pub fn from_subtree(root: &Subtree, version: ExpanderVersion) -> FlatTree {
        encode::encode(root, CodecFlags::for_version(version))
    }

    /// Decode with the record shapes of `version`.
    ///
    /// A malformed tree is a protocol violation by the expander and is
    /// reported, never repaired.
    pub fn to_subtree(&self, version: ExpanderVersion) -> Result<Subtree, FlatTreeError> {
        decode::decode(self, CodecFlags::for_version(version))
    }
}

/// Contract violation found while decoding a [`FlatTree`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FlatTreeError {
    #[error("{array} index {index} out of range (len {len})")]
    IndexOutOfRange {
        array: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{array} array has {len} entries, not a multiple of record size {stride}")]
    MisalignedRecords {
        array: &'static str,
        len: usize,
        stride: usize,
    },
    #[error("unknown delimiter kind {0}")]
    UnknownDelimiterKind(u32),
    #[error("unknown spacing {0}")]
    UnknownSpacing(u32),
    #[error("unknown literal kind {0}")]
    UnknownLitKind(u32),
    #[error("invalid punct char {0:#x}")]
    InvalidChar(u32),
    #[error("flat tree has no root subtree")]
    MissingRoot,
    #[error("subtree {parent} references subtree {child}, which is not after it")]
    BackReference { parent: usize, child: usize },
    #[error("subtree {0} is referenced more than once")]
    SubtreeReused(usize),
}

#[cfg(test)]
mod tests;
