//! Span recovery.
//!
//! Real proc macros tend to drop token ids from punctuation and delimiters
//! while keeping them on identifiers and literals. When an unmapped token
//! follows a mapped one, it most likely is the next token of the source.
//! The guess is accepted only if the token map agrees on what that token was.

use pmx_stack::ensure_sufficient_stack;
use pmx_tt::{Delimiter, Leaf, Punct, Subtree, TokenId, TokenMap, TokenTree};
use tracing::trace;

/// Reattach dropped ids in `subtree`, in place.
pub fn recover(subtree: &mut Subtree, token_map: &TokenMap) {
    let mut recovery = Recovery {
        token_map,
        previous: TokenId::UNMAPPED,
    };
    recovery.subtree(subtree);
}

struct Recovery<'m> {
    token_map: &'m TokenMap,
    /// Id of the last leaf or open delimiter seen in pre-order.
    previous: TokenId,
}

impl Recovery<'_> {
    fn subtree(&mut self, subtree: &mut Subtree) {
        if let Some(delimiter) = &mut subtree.delimiter {
            self.delimiter(delimiter);
            self.previous = delimiter.id;
        }
        for tt in &mut subtree.token_trees {
            match tt {
                TokenTree::Leaf(Leaf::Punct(punct)) => {
                    self.punct(punct);
                    self.previous = punct.id;
                }
                TokenTree::Leaf(leaf) => self.previous = leaf.id(),
                TokenTree::Subtree(child) => ensure_sufficient_stack(|| self.subtree(child)),
            }
        }
    }

    /// The id to try for a token currently carrying `id`.
    fn candidate(&self, id: TokenId) -> Option<TokenId> {
        if id.is_mapped() {
            return None;
        }
        self.previous.successor()
    }

    fn delimiter(&self, delimiter: &mut Delimiter) {
        let Some(candidate) = self.candidate(delimiter.id) else {
            return;
        };
        let matches = self
            .token_map
            .delimiter(candidate)
            .is_some_and(|meta| meta.origin_kind == delimiter.kind);
        if matches {
            trace!(id = %candidate, kind = ?delimiter.kind, "recovered delimiter id");
            delimiter.id = candidate;
        }
    }

    fn punct(&self, punct: &mut Punct) {
        let Some(candidate) = self.candidate(punct.id) else {
            return;
        };
        let recovered = Leaf::Punct(Punct {
            id: candidate,
            ..*punct
        });
        let matches = self
            .token_map
            .token(candidate)
            .is_some_and(|meta| meta.origin.is_same_token(&recovered));
        if matches {
            trace!(id = %candidate, char = %punct.char, "recovered punct id");
            punct.id = candidate;
        }
    }
}
