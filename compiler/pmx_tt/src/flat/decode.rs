//! Back-to-front decoder.
//!
//! Subtree records are processed in reverse index order. A subtree only
//! references subtrees with higher indices, so by the time it is built its
//! children already are, and each one is moved into place exactly once.

use super::{lit, FlatTree, FlatTreeError, NONE, TAG_BITS, TAG_IDENT, TAG_LITERAL, TAG_MASK, TAG_PUNCT};
use crate::{
    CodecFlags, Delimiter, DelimiterKind, Ident, IdentIsRaw, Leaf, LitKind, Literal, Punct,
    Spacing, Subtree, TokenId, TokenTree,
};

pub(super) fn decode(flat: &FlatTree, flags: CodecFlags) -> Result<Subtree, FlatTreeError> {
    Decoder { flat, flags }.decode()
}

struct Decoder<'f> {
    flat: &'f FlatTree,
    flags: CodecFlags,
}

impl Decoder<'_> {
    fn decode(&self) -> Result<Subtree, FlatTreeError> {
        let stride = self.flags.subtree_stride();
        let records = &self.flat.subtree;
        if records.len() % stride != 0 {
            return Err(FlatTreeError::MisalignedRecords {
                array: "subtree",
                len: records.len(),
                stride,
            });
        }

        let count = records.len() / stride;
        let mut built: Vec<Option<Subtree>> = Vec::with_capacity(count);
        built.resize_with(count, || None);

        for (index, record) in records.chunks_exact(stride).enumerate().rev() {
            let subtree = self.subtree(index, record, &mut built)?;
            built[index] = Some(subtree);
        }

        built
            .into_iter()
            .next()
            .flatten()
            .ok_or(FlatTreeError::MissingRoot)
    }

    fn subtree(
        &self,
        index: usize,
        record: &[u32],
        built: &mut [Option<Subtree>],
    ) -> Result<Subtree, FlatTreeError> {
        let slot = self.flags.subtree_kind_slot();
        let open_id = TokenId::from_wire(record[0]);
        let kind = record[slot];
        let start = to_usize(record[slot + 1]);
        let end = to_usize(record[slot + 2]);

        let children = self.flat.token_tree.get(start..end).ok_or(
            FlatTreeError::IndexOutOfRange {
                array: "token_tree",
                index: end,
                len: self.flat.token_tree.len(),
            },
        )?;

        let mut token_trees = Vec::with_capacity(children.len());
        for &index_tag in children {
            let child = to_usize(index_tag >> TAG_BITS);
            let tt = match index_tag & TAG_MASK {
                TAG_LITERAL => TokenTree::Leaf(self.literal(child)?),
                TAG_PUNCT => TokenTree::Leaf(self.punct(child)?),
                TAG_IDENT => TokenTree::Leaf(self.ident(child)?),
                // TAG_SUBTREE, the only remaining 2-bit value
                _ => TokenTree::Subtree(take_subtree(built, index, child)?),
            };
            token_trees.push(tt);
        }

        let delimiter = match kind {
            0 => None,
            1 => Some(Delimiter::new(open_id, DelimiterKind::Parenthesis)),
            2 => Some(Delimiter::new(open_id, DelimiterKind::Brace)),
            3 => Some(Delimiter::new(open_id, DelimiterKind::Bracket)),
            other => return Err(FlatTreeError::UnknownDelimiterKind(other)),
        };

        Ok(Subtree {
            delimiter,
            token_trees,
        })
    }

    fn literal(&self, index: usize) -> Result<Leaf, FlatTreeError> {
        let record = record(
            &self.flat.literal,
            "literal",
            index,
            self.flags.literal_stride(),
        )?;
        let id = TokenId::from_wire(record[0]);
        let symbol = self.text(record[1])?;

        let (text, kind) = if self.flags.extended_leaf_data {
            let kind = LitKind::from_wire(record[2])
                .ok_or(FlatTreeError::UnknownLitKind(record[2]))?;
            let suffix = match record[3] {
                NONE => None,
                suffix => Some(self.text(suffix)?),
            };
            let text = lit::join(symbol, kind, suffix);
            // Verbatim text is classified like a legacy record.
            let kind = match kind {
                LitKind::Err => LitKind::infer(&text),
                kind => kind,
            };
            (text, kind)
        } else {
            (symbol.to_owned(), LitKind::infer(symbol))
        };

        Ok(Leaf::Literal(Literal { text, kind, id }))
    }

    fn punct(&self, index: usize) -> Result<Leaf, FlatTreeError> {
        let record = record(&self.flat.punct, "punct", index, CodecFlags::PUNCT_STRIDE)?;
        let id = TokenId::from_wire(record[0]);
        let char = char::from_u32(record[1]).ok_or(FlatTreeError::InvalidChar(record[1]))?;
        let spacing = match record[2] {
            0 => Spacing::Alone,
            1 => Spacing::Joint,
            other => return Err(FlatTreeError::UnknownSpacing(other)),
        };
        Ok(Leaf::Punct(Punct { char, spacing, id }))
    }

    fn ident(&self, index: usize) -> Result<Leaf, FlatTreeError> {
        let record = record(&self.flat.ident, "ident", index, self.flags.ident_stride())?;
        let id = TokenId::from_wire(record[0]);
        let text = self.text(record[1])?;

        let (text, is_raw) = if self.flags.extended_leaf_data {
            (text, IdentIsRaw::from_bool(record[2] != 0))
        } else {
            match text.strip_prefix("r#") {
                Some(name) => (name, IdentIsRaw::Yes),
                None => (text, IdentIsRaw::No),
            }
        };

        Ok(Leaf::Ident(Ident {
            text: text.to_owned(),
            is_raw,
            id,
        }))
    }

    fn text(&self, index: u32) -> Result<&str, FlatTreeError> {
        let index = to_usize(index);
        self.flat
            .text
            .get(index)
            .map(String::as_str)
            .ok_or(FlatTreeError::IndexOutOfRange {
                array: "text",
                index,
                len: self.flat.text.len(),
            })
    }
}

/// Move an already-built child subtree out of `built`.
fn take_subtree(
    built: &mut [Option<Subtree>],
    parent: usize,
    child: usize,
) -> Result<Subtree, FlatTreeError> {
    if child <= parent {
        return Err(FlatTreeError::BackReference { parent, child });
    }
    let len = built.len();
    built
        .get_mut(child)
        .ok_or(FlatTreeError::IndexOutOfRange {
            array: "subtree",
            index: child,
            len,
        })?
        .take()
        .ok_or(FlatTreeError::SubtreeReused(child))
}

/// The `index`-th fixed-size record of `array`.
fn record<'f>(
    array: &'f [u32],
    name: &'static str,
    index: usize,
    stride: usize,
) -> Result<&'f [u32], FlatTreeError> {
    let out_of_range = FlatTreeError::IndexOutOfRange {
        array: name,
        index,
        len: array.len() / stride,
    };
    let start = index.checked_mul(stride).ok_or(out_of_range.clone())?;
    array.get(start..start + stride).ok_or(out_of_range)
}

#[inline]
fn to_usize(raw: u32) -> usize {
    raw as usize
}
