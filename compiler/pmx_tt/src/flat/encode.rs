//! Breadth-first encoder.
//!
//! Subtrees are numbered in the order they are enqueued, so a child subtree
//! always gets a higher index than its parent. The decoder relies on that.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::{lit, FlatTree, NONE, TAG_BITS, TAG_IDENT, TAG_LITERAL, TAG_PUNCT, TAG_SUBTREE};
use crate::{
    CodecFlags, DelimiterKind, Ident, Leaf, Literal, Punct, Spacing, Subtree, TokenId,
    TokenTree,
};

pub(super) fn encode(root: &Subtree, flags: CodecFlags) -> FlatTree {
    let mut builder = FlatTreeBuilder::new(flags);
    builder.write(root);
    builder.finish()
}

/// Array index as stored on the wire.
#[expect(
    clippy::cast_possible_truncation,
    reason = "flat tree arrays are addressed with u32 on the wire"
)]
#[inline]
fn wire_index(index: usize) -> u32 {
    index as u32
}

#[inline]
fn tagged(index: usize, tag: u32) -> u32 {
    (wire_index(index) << TAG_BITS) | tag
}

struct FlatTreeBuilder<'a> {
    flags: CodecFlags,
    work: VecDeque<(usize, &'a Subtree)>,
    string_table: FxHashMap<String, u32>,
    flat: FlatTree,
}

impl<'a> FlatTreeBuilder<'a> {
    fn new(flags: CodecFlags) -> Self {
        FlatTreeBuilder {
            flags,
            work: VecDeque::new(),
            string_table: FxHashMap::default(),
            flat: FlatTree::default(),
        }
    }

    fn finish(self) -> FlatTree {
        self.flat
    }

    fn write(&mut self, root: &'a Subtree) {
        self.enqueue(root);
        while let Some((index, subtree)) = self.work.pop_front() {
            self.subtree(index, subtree);
        }
    }

    /// Reserve a subtree record and queue its children for later.
    fn enqueue(&mut self, subtree: &'a Subtree) -> usize {
        let stride = self.flags.subtree_stride();
        let index = self.flat.subtree.len() / stride;
        let (id, kind) = match subtree.delimiter {
            None => (TokenId::UNMAPPED, 0),
            Some(delimiter) => (delimiter.id, delimiter_tag(delimiter.kind)),
        };
        self.flat.subtree.push(id.to_wire());
        if self.flags.encode_close_span {
            self.flat.subtree.push(NONE);
        }
        self.flat.subtree.extend([kind, NONE, NONE]);
        self.work.push_back((index, subtree));
        index
    }

    fn subtree(&mut self, index: usize, subtree: &'a Subtree) {
        let first = self.flat.token_tree.len();
        let count = subtree.token_trees.len();
        self.flat.token_tree.resize(first + count, NONE);

        let slot = index * self.flags.subtree_stride() + self.flags.subtree_kind_slot();
        self.flat.subtree[slot + 1] = wire_index(first);
        self.flat.subtree[slot + 2] = wire_index(first + count);

        for (offset, child) in subtree.token_trees.iter().enumerate() {
            let index_tag = match child {
                TokenTree::Subtree(child) => tagged(self.enqueue(child), TAG_SUBTREE),
                TokenTree::Leaf(Leaf::Literal(lit)) => self.literal(lit),
                TokenTree::Leaf(Leaf::Punct(punct)) => self.punct(*punct),
                TokenTree::Leaf(Leaf::Ident(ident)) => self.ident(ident),
            };
            self.flat.token_tree[first + offset] = index_tag;
        }
    }

    fn literal(&mut self, lit: &Literal) -> u32 {
        let index = self.flat.literal.len() / self.flags.literal_stride();
        if self.flags.extended_leaf_data {
            let (symbol, kind, suffix) = lit::split(lit);
            let text = self.intern(symbol);
            let suffix = suffix.map_or(NONE, |suffix| self.intern(suffix));
            self.flat
                .literal
                .extend([lit.id.to_wire(), text, kind.to_wire(), suffix]);
        } else {
            let text = self.intern(&lit.text);
            self.flat.literal.extend([lit.id.to_wire(), text]);
        }
        tagged(index, TAG_LITERAL)
    }

    fn punct(&mut self, punct: Punct) -> u32 {
        let index = self.flat.punct.len() / CodecFlags::PUNCT_STRIDE;
        let spacing = match punct.spacing {
            Spacing::Alone => 0,
            Spacing::Joint => 1,
        };
        self.flat
            .punct
            .extend([punct.id.to_wire(), u32::from(punct.char), spacing]);
        tagged(index, TAG_PUNCT)
    }

    fn ident(&mut self, ident: &Ident) -> u32 {
        let index = self.flat.ident.len() / self.flags.ident_stride();
        if self.flags.extended_leaf_data {
            let text = self.intern(&ident.text);
            self.flat.ident.extend([
                ident.id.to_wire(),
                text,
                u32::from(ident.is_raw.is_raw()),
            ]);
        } else {
            let text = if ident.is_raw.is_raw() {
                self.intern(&format!("r#{}", ident.text))
            } else {
                self.intern(&ident.text)
            };
            self.flat.ident.extend([ident.id.to_wire(), text]);
        }
        tagged(index, TAG_IDENT)
    }

    /// Index of `text` in the string table, adding it on first sight.
    fn intern(&mut self, text: &str) -> u32 {
        if let Some(&index) = self.string_table.get(text) {
            return index;
        }
        let index = wire_index(self.flat.text.len());
        self.flat.text.push(text.to_owned());
        self.string_table.insert(text.to_owned(), index);
        index
    }
}

fn delimiter_tag(kind: DelimiterKind) -> u32 {
    match kind {
        DelimiterKind::Parenthesis => 1,
        DelimiterKind::Brace => 2,
        DelimiterKind::Bracket => 3,
    }
}
