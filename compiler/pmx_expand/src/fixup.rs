//! Syntax-error fixup for attribute macro items.
//!
//! Attribute proc macros usually expect valid Rust, while code being edited
//! usually isn't. Before an item goes to the expander, expressions containing
//! parse errors are replaced with a placeholder identifier and missing
//! semicolons are inserted. Untouched tokens keep their source mapping.
//!
//! Parsing is not done here. The syntax producer hands over a [`SyntaxNode`]
//! tree whose tokens carry offsets into the item text.

use pmx_stack::ensure_sufficient_stack;
use pmx_tt::{MappedText, MutableMappedText};

/// Identifier substituted for broken expressions.
pub const FIXUP_PLACEHOLDER: &str = "__pmx_fixup";

/// Node kinds the fixup cares about. Everything else is [`NodeKind::Other`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    Expr,
    /// Expression ending in a block (`if`, `match`, `{}`); needs no `;` as a statement.
    BlockExpr,
    /// `receiver.field` or `receiver.method()`.
    DotExpr,
    ExprStmt,
    LetDecl,
    /// Any other statement.
    Stmt,
    /// Parser error recovery node.
    Error,
    Other,
}

impl NodeKind {
    fn is_expr(self) -> bool {
        matches!(self, NodeKind::Expr | NodeKind::BlockExpr | NodeKind::DotExpr)
    }

    fn is_stmt(self) -> bool {
        matches!(self, NodeKind::ExprStmt | NodeKind::LetDecl | NodeKind::Stmt)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Semicolon,
    Dot,
    Whitespace,
    Comment,
    Other,
}

impl TokenKind {
    fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyntaxToken {
    pub kind: TokenKind,
    pub text: String,
    /// Offset in the item text.
    pub offset: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub children: Vec<SyntaxElement>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxElement {
    fn is_trivia(&self) -> bool {
        matches!(self, SyntaxElement::Token(token) if token.kind.is_trivia())
    }
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, children: Vec<SyntaxElement>) -> Self {
        SyntaxNode { kind, children }
    }

    /// Whether this node holds a parse error that should be papered over.
    ///
    /// Errors inside nested expressions belong to those expressions, and a
    /// `.`-expression keeps its receiver intact.
    fn has_error_to_handle(&self) -> bool {
        self.kind != NodeKind::DotExpr
            && self.children.iter().any(|child| match child {
                SyntaxElement::Node(node) => {
                    node.kind == NodeKind::Error
                        || (!node.kind.is_expr() && node.has_error_to_handle())
                }
                SyntaxElement::Token(_) => false,
            })
    }

    fn has_semicolon(&self) -> bool {
        self.children.iter().any(
            |child| matches!(child, SyntaxElement::Token(token) if token.kind == TokenKind::Semicolon),
        )
    }

    /// `a.` with nothing after the dot.
    fn is_missing_member(&self) -> bool {
        let dot = self.children.iter().rposition(
            |child| matches!(child, SyntaxElement::Token(token) if token.kind == TokenKind::Dot),
        );
        dot.is_some_and(|dot| self.children[dot + 1..].iter().all(SyntaxElement::is_trivia))
    }

    /// Expression statements ending in a block don't need a `;`.
    fn needs_semicolon(&self) -> bool {
        self.children
            .iter()
            .find_map(|child| match child {
                SyntaxElement::Node(node) if node.kind.is_expr() => Some(node.kind),
                _ => None,
            })
            .is_some_and(|kind| kind != NodeKind::BlockExpr)
    }
}

impl From<SyntaxNode> for SyntaxElement {
    fn from(node: SyntaxNode) -> Self {
        SyntaxElement::Node(node)
    }
}

impl From<SyntaxToken> for SyntaxElement {
    fn from(token: SyntaxToken) -> Self {
        SyntaxElement::Token(token)
    }
}

/// Rewrite `input` so an expander assuming valid syntax can handle it.
///
/// `item` is the parse of `input.text`. Returns `input` itself when nothing
/// needed fixing; otherwise the new text maps back through `input.ranges`.
pub fn fixup_syntax_errors(input: &MappedText, item: &SyntaxNode) -> MappedText {
    let mut fixup = Fixup {
        out: MutableMappedText::with_capacity(input.text.len()),
        changed: false,
    };
    fixup.node(item, None);

    if !fixup.changed {
        return input.clone();
    }
    let rewritten = fixup.out.into_mapped_text();
    MappedText::new(rewritten.text, input.ranges.map_all(&rewritten.ranges))
}

struct Fixup {
    out: MutableMappedText,
    /// Set once anything unmapped was written.
    changed: bool,
}

impl Fixup {
    fn insert(&mut self, text: &str) {
        self.out.append_unmapped(text);
        self.changed = true;
    }

    /// `next` is the first following sibling that is not trivia.
    fn node(&mut self, node: &SyntaxNode, next: Option<&SyntaxElement>) {
        match node.kind {
            NodeKind::Expr | NodeKind::BlockExpr if node.has_error_to_handle() => {
                self.insert(FIXUP_PLACEHOLDER);
            }
            NodeKind::DotExpr => {
                self.children(node);
                if node.is_missing_member() {
                    self.insert(FIXUP_PLACEHOLDER);
                }
            }
            NodeKind::ExprStmt => {
                self.children(node);
                let next_is_stmt =
                    matches!(next, Some(SyntaxElement::Node(next)) if next.kind.is_stmt());
                if !node.has_semicolon() && node.needs_semicolon() && next_is_stmt {
                    self.insert(";");
                }
            }
            NodeKind::LetDecl => {
                self.children(node);
                if !node.has_semicolon() {
                    self.insert(";");
                }
            }
            _ => self.children(node),
        }
    }

    fn children(&mut self, node: &SyntaxNode) {
        for (index, child) in node.children.iter().enumerate() {
            match child {
                SyntaxElement::Token(token) => self.out.append_mapped(&token.text, token.offset),
                SyntaxElement::Node(child) => {
                    let next = node.children[index + 1..]
                        .iter()
                        .find(|sibling| !sibling.is_trivia());
                    ensure_sufficient_stack(|| self.node(child, next));
                }
            }
        }
    }
}
