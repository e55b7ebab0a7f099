//! The token tree handed to and received from a proc macro.
//!
//! A proc macro is a function from a [`Subtree`] to a [`Subtree`]. Every leaf
//! and every delimiter carries a [`TokenId`] so that tokens in the output can
//! be traced back to the input source.

use std::fmt;
use std::fmt::Write as _;

use pmx_stack::ensure_sufficient_stack;

use crate::LitKind;

/// Identity correlating a token with a position in the original source.
///
/// The syntax producer assigns consecutive non-negative ids in a
/// left-to-right token scan. [`TokenId::UNMAPPED`] (`-1`) marks tokens the
/// expander fabricated or whose identity it dropped.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TokenId(pub i32);

impl TokenId {
    /// No mapping to the source.
    pub const UNMAPPED: TokenId = TokenId(-1);

    /// Whether this id refers to a source token.
    #[inline]
    pub const fn is_mapped(self) -> bool {
        self.0 >= 0
    }

    /// Index into a [`TokenMap`](crate::TokenMap), if mapped.
    #[inline]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// The id naming entry `index` of a [`TokenMap`](crate::TokenMap).
    ///
    /// `None` past `i32::MAX`, where ids run out.
    #[inline]
    pub fn from_index(index: usize) -> Option<TokenId> {
        i32::try_from(index).ok().map(TokenId)
    }

    /// The id a source-adjacent token would carry.
    ///
    /// `None` for unmapped ids and on overflow.
    #[inline]
    pub fn successor(self) -> Option<TokenId> {
        if !self.is_mapped() {
            return None;
        }
        self.0.checked_add(1).map(TokenId)
    }

    /// Two's complement reinterpretation used on the wire (`-1` is `u32::MAX`).
    #[inline]
    pub const fn to_wire(self) -> u32 {
        u32::from_ne_bytes(self.0.to_ne_bytes())
    }

    /// Inverse of [`TokenId::to_wire`].
    #[inline]
    pub const fn from_wire(raw: u32) -> TokenId {
        TokenId(i32::from_ne_bytes(raw.to_ne_bytes()))
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a space may follow a punctuation token.
///
/// `Joint` punctuation fuses with the next token (`=` in `=>`). The last
/// token of a stream is always `Alone`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Spacing {
    Alone,
    Joint,
}

impl Spacing {
    fn as_str(self) -> &'static str {
        match self {
            Spacing::Alone => "alone",
            Spacing::Joint => "joint",
        }
    }
}

/// Whether an identifier was written with the `r#` prefix.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IdentIsRaw {
    No,
    Yes,
}

impl IdentIsRaw {
    /// Textual prefix: `""` or `"r#"`.
    #[inline]
    pub const fn prefix(self) -> &'static str {
        match self {
            IdentIsRaw::No => "",
            IdentIsRaw::Yes => "r#",
        }
    }

    #[inline]
    pub const fn from_bool(is_raw: bool) -> Self {
        if is_raw {
            IdentIsRaw::Yes
        } else {
            IdentIsRaw::No
        }
    }

    #[inline]
    pub const fn is_raw(self) -> bool {
        matches!(self, IdentIsRaw::Yes)
    }
}

/// Bracket kind of a delimited subtree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DelimiterKind {
    Parenthesis,
    Brace,
    Bracket,
}

impl DelimiterKind {
    pub const fn open_char(self) -> char {
        match self {
            DelimiterKind::Parenthesis => '(',
            DelimiterKind::Brace => '{',
            DelimiterKind::Bracket => '[',
        }
    }

    pub const fn close_char(self) -> char {
        match self {
            DelimiterKind::Parenthesis => ')',
            DelimiterKind::Brace => '}',
            DelimiterKind::Bracket => ']',
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Delimiter {
    pub id: TokenId,
    pub kind: DelimiterKind,
}

impl Delimiter {
    #[inline]
    pub const fn new(id: TokenId, kind: DelimiterKind) -> Self {
        Delimiter { id, kind }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Literal {
    /// Full source text, including quotes and suffix.
    pub text: String,
    pub kind: LitKind,
    pub id: TokenId,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Punct {
    pub char: char,
    pub spacing: Spacing,
    pub id: TokenId,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Ident {
    /// Identifier text without the `r#` prefix.
    pub text: String,
    pub is_raw: IdentIsRaw,
    pub id: TokenId,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Leaf {
    Literal(Literal),
    Punct(Punct),
    Ident(Ident),
}

impl Leaf {
    pub fn literal(text: impl Into<String>, kind: LitKind, id: TokenId) -> Self {
        Leaf::Literal(Literal {
            text: text.into(),
            kind,
            id,
        })
    }

    pub fn punct(char: char, spacing: Spacing, id: TokenId) -> Self {
        Leaf::Punct(Punct { char, spacing, id })
    }

    pub fn ident(text: impl Into<String>, id: TokenId) -> Self {
        Leaf::Ident(Ident {
            text: text.into(),
            is_raw: IdentIsRaw::No,
            id,
        })
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        match self {
            Leaf::Literal(lit) => lit.id,
            Leaf::Punct(punct) => punct.id,
            Leaf::Ident(ident) => ident.id,
        }
    }

    /// Spacing after this leaf. Only punctuation can be `Joint`.
    #[inline]
    pub fn spacing(&self) -> Spacing {
        match self {
            Leaf::Punct(punct) => punct.spacing,
            Leaf::Literal(_) | Leaf::Ident(_) => Spacing::Alone,
        }
    }

    /// Whether `self` and `other` are the same source token.
    ///
    /// Literal kinds are not compared: older protocol versions carry no kind
    /// and the receiving side re-infers one, which may differ from the lexer's.
    pub fn is_same_token(&self, other: &Leaf) -> bool {
        match (self, other) {
            (Leaf::Literal(a), Leaf::Literal(b)) => a.id == b.id && a.text == b.text,
            _ => self == other,
        }
    }

    /// Append the source text of this leaf.
    pub fn push_text(&self, out: &mut String) {
        match self {
            Leaf::Literal(lit) => out.push_str(&lit.text),
            Leaf::Punct(punct) => out.push(punct.char),
            Leaf::Ident(ident) => {
                out.push_str(ident.is_raw.prefix());
                out.push_str(&ident.text);
            }
        }
    }

    /// Length in bytes of [`Leaf::push_text`] output.
    pub fn text_len(&self) -> usize {
        match self {
            Leaf::Literal(lit) => lit.text.len(),
            Leaf::Punct(punct) => punct.char.len_utf8(),
            Leaf::Ident(ident) => ident.is_raw.prefix().len() + ident.text.len(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenTree {
    Leaf(Leaf),
    Subtree(Subtree),
}

impl From<Leaf> for TokenTree {
    fn from(leaf: Leaf) -> Self {
        TokenTree::Leaf(leaf)
    }
}

impl From<Subtree> for TokenTree {
    fn from(subtree: Subtree) -> Self {
        TokenTree::Subtree(subtree)
    }
}

/// A sequence of token trees, optionally wrapped in a delimiter.
///
/// The root subtree of a macro input or output has no delimiter.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Subtree {
    pub delimiter: Option<Delimiter>,
    pub token_trees: Vec<TokenTree>,
}

impl Subtree {
    /// Undelimited subtree, as used for the root.
    pub fn root(token_trees: Vec<TokenTree>) -> Self {
        Subtree {
            delimiter: None,
            token_trees,
        }
    }

    pub fn delimited(delimiter: Delimiter, token_trees: Vec<TokenTree>) -> Self {
        Subtree {
            delimiter: Some(delimiter),
            token_trees,
        }
    }

    /// Indented dump, one token per line, with ids and punct spacing.
    ///
    /// ```text
    /// SUBTREE $
    ///   IDENT   foo 0
    ///   PUNCT   ! [alone] 1
    ///   SUBTREE () 2
    ///     LITERAL 1 3
    /// ```
    pub fn to_debug_string(&self) -> String {
        let mut out = String::new();
        debug_subtree(self, &mut out, 0);
        out
    }
}

/// Drops nested subtrees from an explicit stack.
///
/// Expander output can nest arbitrarily deep; the derived drop glue would
/// recurse once per level.
impl Drop for Subtree {
    fn drop(&mut self) {
        if !self.token_trees.iter().any(|tt| matches!(tt, TokenTree::Subtree(_))) {
            return;
        }
        let mut pending = Vec::new();
        detach_subtrees(&mut self.token_trees, &mut pending);
        while let Some(mut subtree) = pending.pop() {
            detach_subtrees(&mut subtree.token_trees, &mut pending);
        }
    }
}

fn detach_subtrees(token_trees: &mut Vec<TokenTree>, pending: &mut Vec<Subtree>) {
    for tt in token_trees.drain(..) {
        if let TokenTree::Subtree(subtree) = tt {
            pending.push(subtree);
        }
    }
}

impl TokenTree {
    pub fn to_debug_string(&self) -> String {
        let mut out = String::new();
        debug_token_tree(self, &mut out, 0);
        out
    }
}

fn debug_token_tree(tt: &TokenTree, out: &mut String, level: usize) {
    match tt {
        TokenTree::Leaf(leaf) => {
            push_indent(out, level);
            debug_leaf(leaf, out);
        }
        TokenTree::Subtree(subtree) => debug_subtree(subtree, out, level),
    }
}

fn debug_subtree(subtree: &Subtree, out: &mut String, level: usize) {
    ensure_sufficient_stack(|| {
        push_indent(out, level);
        match subtree.delimiter {
            None => out.push_str("SUBTREE $"),
            Some(delimiter) => {
                let _ = write!(
                    out,
                    "SUBTREE {}{} {}",
                    delimiter.kind.open_char(),
                    delimiter.kind.close_char(),
                    delimiter.id
                );
            }
        }
        for tt in &subtree.token_trees {
            out.push('\n');
            debug_token_tree(tt, out, level + 1);
        }
    });
}

fn debug_leaf(leaf: &Leaf, out: &mut String) {
    let _ = match leaf {
        Leaf::Literal(lit) => write!(out, "LITERAL {} {}", lit.text, lit.id),
        Leaf::Punct(punct) => write!(
            out,
            "PUNCT   {} [{}] {}",
            punct.char,
            punct.spacing.as_str(),
            punct.id
        ),
        Leaf::Ident(ident) => write!(
            out,
            "IDENT   {}{} {}",
            ident.is_raw.prefix(),
            ident.text,
            ident.id
        ),
    };
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}
