//! Source metadata for each [`TokenId`].

use crate::{DelimiterKind, Leaf, Subtree, TokenId};

/// Where a leaf token came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMeta {
    /// Offset of the token in the text the subtree was lowered from.
    pub start_offset: usize,
    /// Whitespace and comments between this token and the next one.
    pub right_trivia: String,
    /// The leaf as the syntax producer emitted it.
    pub origin: Leaf,
}

/// One bracket of a delimiter pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelimiterPart {
    pub start_offset: usize,
    pub right_trivia: String,
}

/// Where a delimiter pair came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelimiterMeta {
    pub open: DelimiterPart,
    /// `None` for an unclosed delimiter.
    pub close: Option<DelimiterPart>,
    pub origin_kind: DelimiterKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenMetadata {
    Token(TokenMeta),
    Delimiter(DelimiterMeta),
}

/// Metadata indexed by [`TokenId`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenMap {
    entries: Vec<TokenMetadata>,
}

impl TokenMap {
    pub fn new(entries: Vec<TokenMetadata>) -> Self {
        TokenMap { entries }
    }

    /// Record metadata for the next id and return that id.
    ///
    /// `None`, leaving the map unchanged, once every id is taken.
    pub fn push(&mut self, meta: TokenMetadata) -> Option<TokenId> {
        let id = TokenId::from_index(self.entries.len())?;
        self.entries.push(meta);
        Some(id)
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&TokenMetadata> {
        self.entries.get(id.index()?)
    }

    pub fn token(&self, id: TokenId) -> Option<&TokenMeta> {
        match self.get(id)? {
            TokenMetadata::Token(meta) => Some(meta),
            TokenMetadata::Delimiter(_) => None,
        }
    }

    pub fn delimiter(&self, id: TokenId) -> Option<&DelimiterMeta> {
        match self.get(id)? {
            TokenMetadata::Delimiter(meta) => Some(meta),
            TokenMetadata::Token(_) => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenate. Ids of `other` must already start at `self.len()`.
    #[must_use]
    pub fn merge(mut self, other: TokenMap) -> TokenMap {
        self.entries.extend(other.entries);
        self
    }
}

/// A subtree together with the token map its ids index into.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MappedSubtree {
    pub subtree: Subtree,
    pub token_map: TokenMap,
}

impl MappedSubtree {
    pub fn new(subtree: Subtree, token_map: TokenMap) -> Self {
        MappedSubtree { subtree, token_map }
    }
}
