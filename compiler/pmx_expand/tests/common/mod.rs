//! Test doubles: a toy lexer standing in for the syntax producer and an
//! in-process transport standing in for the expander.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    dead_code,
    reason = "Tests can panic; not every test binary uses every helper"
)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pmx_expand::{SyntaxNode, SyntaxProducer};
use pmx_proto::{ExpandMacro, PanicMessage, ProcMacroServer, Request, Response, Transport, TransportError};
use pmx_tt::{
    Delimiter, DelimiterKind, DelimiterMeta, DelimiterPart, ExpanderVersion, FlatTree, Leaf,
    LitKind, MappedSubtree, Spacing, Subtree, TokenId, TokenMap, TokenMeta, TokenMetadata,
    TokenTree,
};

// -- Syntax producer --

/// Lexes identifiers, integers, `"strings"`, brackets and single-char
/// punctuation. Whitespace becomes trailing trivia of the previous token.
pub struct ToyProducer;

impl SyntaxProducer for ToyProducer {
    fn token_tree(&self, text: &str, start_offset: usize, first_id: usize) -> MappedSubtree {
        lex(text, start_offset, first_id)
    }

    fn parse_item(&self, _text: &str) -> Option<SyntaxNode> {
        None
    }
}

/// Lexes like [`ToyProducer`] and answers every item parse with `item`.
pub struct ItemProducer {
    pub item: SyntaxNode,
}

impl SyntaxProducer for ItemProducer {
    fn token_tree(&self, text: &str, start_offset: usize, first_id: usize) -> MappedSubtree {
        lex(text, start_offset, first_id)
    }

    fn parse_item(&self, _text: &str) -> Option<SyntaxNode> {
        Some(self.item.clone())
    }
}

#[derive(Copy, Clone)]
enum Trailing {
    Token(usize),
    Open(usize),
    Close(usize),
}

struct Lexer {
    start_offset: usize,
    first_id: usize,
    entries: Vec<TokenMetadata>,
    stack: Vec<Subtree>,
    trailing: Option<Trailing>,
}

impl Lexer {
    fn next_id(&self) -> TokenId {
        TokenId(i32::try_from(self.first_id + self.entries.len()).unwrap())
    }

    fn leaf(&mut self, leaf: Leaf, offset: usize) {
        self.trailing = Some(Trailing::Token(self.entries.len()));
        self.entries.push(TokenMetadata::Token(TokenMeta {
            start_offset: self.start_offset + offset,
            right_trivia: String::new(),
            origin: leaf.clone(),
        }));
        self.stack.last_mut().unwrap().token_trees.push(leaf.into());
    }

    fn open(&mut self, kind: DelimiterKind, offset: usize) {
        let id = self.next_id();
        self.trailing = Some(Trailing::Open(self.entries.len()));
        self.entries.push(TokenMetadata::Delimiter(DelimiterMeta {
            open: DelimiterPart {
                start_offset: self.start_offset + offset,
                right_trivia: String::new(),
            },
            close: None,
            origin_kind: kind,
        }));
        self.stack
            .push(Subtree::delimited(Delimiter::new(id, kind), Vec::new()));
    }

    fn close(&mut self, offset: usize) {
        let subtree = self.stack.pop().unwrap();
        let index = subtree.delimiter.unwrap().id.index().unwrap() - self.first_id;
        let TokenMetadata::Delimiter(meta) = &mut self.entries[index] else {
            panic!("delimiter id should index a delimiter entry");
        };
        meta.close = Some(DelimiterPart {
            start_offset: self.start_offset + offset,
            right_trivia: String::new(),
        });
        self.trailing = Some(Trailing::Close(index));
        self.stack.last_mut().unwrap().token_trees.push(subtree.into());
    }

    fn trivia(&mut self, text: &str) {
        let target = match self.trailing {
            None => return,
            Some(Trailing::Token(i)) => match &mut self.entries[i] {
                TokenMetadata::Token(meta) => &mut meta.right_trivia,
                TokenMetadata::Delimiter(_) => return,
            },
            Some(Trailing::Open(i)) => match &mut self.entries[i] {
                TokenMetadata::Delimiter(meta) => &mut meta.open.right_trivia,
                TokenMetadata::Token(_) => return,
            },
            Some(Trailing::Close(i)) => match &mut self.entries[i] {
                TokenMetadata::Delimiter(meta) => &mut meta.close.as_mut().unwrap().right_trivia,
                TokenMetadata::Token(_) => return,
            },
        };
        target.push_str(text);
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_punct(c: char) -> bool {
    !is_word(c) && !c.is_whitespace() && !"()[]{}\"".contains(c)
}

pub fn lex(text: &str, start_offset: usize, first_id: usize) -> MappedSubtree {
    let mut lexer = Lexer {
        start_offset,
        first_id,
        entries: Vec::new(),
        stack: vec![Subtree::root(Vec::new())],
        trailing: None,
    };
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map_or(text.len(), |&(offset, _)| offset);

    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        let mut j = i + 1;
        if c.is_whitespace() {
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            lexer.trivia(&text[offset..end_of(j)]);
        } else if is_word(c) {
            while j < chars.len() && is_word(chars[j].1) {
                j += 1;
            }
            let word = &text[offset..end_of(j)];
            let id = lexer.next_id();
            let leaf = if c.is_ascii_digit() {
                Leaf::literal(word, LitKind::Integer, id)
            } else {
                Leaf::ident(word, id)
            };
            lexer.leaf(leaf, offset);
        } else if c == '"' {
            while j < chars.len() && chars[j].1 != '"' {
                j += 1;
            }
            j = (j + 1).min(chars.len());
            let id = lexer.next_id();
            lexer.leaf(Leaf::literal(&text[offset..end_of(j)], LitKind::Str, id), offset);
        } else if let Some(kind) = open_kind(c) {
            lexer.open(kind, offset);
        } else if ")]}".contains(c) {
            lexer.close(offset);
        } else {
            let joint = chars.get(j).is_some_and(|&(_, next)| is_punct(next));
            let spacing = if joint { Spacing::Joint } else { Spacing::Alone };
            let id = lexer.next_id();
            lexer.leaf(Leaf::punct(c, spacing, id), offset);
        }
        i = j;
    }

    let root = lexer.stack.pop().unwrap();
    MappedSubtree::new(root, TokenMap::new(lexer.entries))
}

fn open_kind(c: char) -> Option<DelimiterKind> {
    match c {
        '(' => Some(DelimiterKind::Parenthesis),
        '{' => Some(DelimiterKind::Brace),
        '[' => Some(DelimiterKind::Bracket),
        _ => None,
    }
}

// -- Transport --

type Handler = dyn Fn(&ExpandMacro, ExpanderVersion) -> Result<Response, TransportError> + Send + Sync;

/// In-process expander. Reports `reported` to version checks and answers
/// expansions with `handler`.
pub struct MockTransport {
    reported: u32,
    handler: Box<Handler>,
    check_delay: Duration,
    pub log: Arc<RequestLog>,
}

#[derive(Default)]
pub struct RequestLog {
    pub requests: Mutex<Vec<Request>>,
    pub version_checks: AtomicUsize,
}

impl RequestLog {
    pub fn expand_requests(&self) -> Vec<ExpandMacro> {
        self.requests
            .lock()
            .iter()
            .filter_map(|request| match request {
                Request::ExpandMacro(expand) => Some(expand.clone()),
                Request::ApiVersionCheck {} => None,
            })
            .collect()
    }

    pub fn version_checks(&self) -> usize {
        self.version_checks.load(Ordering::SeqCst)
    }
}

impl MockTransport {
    pub fn new(
        reported: u32,
        handler: impl Fn(&ExpandMacro, ExpanderVersion) -> Result<Response, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        MockTransport {
            reported,
            handler: Box::new(handler),
            check_delay: Duration::ZERO,
            log: Arc::default(),
        }
    }

    /// Make version checks slow enough for concurrent callers to overlap.
    pub fn with_check_delay(mut self, delay: Duration) -> Self {
        self.check_delay = delay;
        self
    }

    /// An expander that returns its input body unchanged.
    pub fn echo() -> Self {
        MockTransport::new(ExpanderVersion::LATEST.as_u32(), |request, _| {
            Ok(Response::ExpandMacro(Ok(request.macro_body.clone())))
        })
    }

    /// Wrap into a server that negotiates versions.
    pub fn into_server(self) -> (Arc<ProcMacroServer>, Arc<RequestLog>) {
        let log = Arc::clone(&self.log);
        (Arc::new(ProcMacroServer::new(self, true)), log)
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request, _timeout: Duration) -> Result<Response, TransportError> {
        self.log.requests.lock().push(request.clone());
        match request {
            Request::ApiVersionCheck {} => {
                self.log.version_checks.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(self.check_delay);
                Ok(Response::ApiVersionCheck(self.reported))
            }
            Request::ExpandMacro(expand) => {
                (self.handler)(expand, ExpanderVersion::negotiate(self.reported))
            }
        }
    }
}

/// Decode a request body at `version`, apply `f`, and answer with the result.
pub fn rewrite_body(
    request: &ExpandMacro,
    version: ExpanderVersion,
    f: impl FnOnce(&mut Subtree),
) -> Result<Response, TransportError> {
    let mut body = request.macro_body.to_subtree(version).unwrap();
    f(&mut body);
    Ok(Response::ExpandMacro(Ok(FlatTree::from_subtree(&body, version))))
}

/// Drop ids from punctuation and delimiters, like real proc macros do.
pub fn strip_punct_ids(subtree: &mut Subtree) {
    if let Some(delimiter) = &mut subtree.delimiter {
        delimiter.id = TokenId::UNMAPPED;
    }
    for tt in &mut subtree.token_trees {
        match tt {
            TokenTree::Leaf(Leaf::Punct(punct)) => punct.id = TokenId::UNMAPPED,
            TokenTree::Leaf(_) => {}
            TokenTree::Subtree(child) => strip_punct_ids(child),
        }
    }
}

pub fn panic_response(message: &str) -> Result<Response, TransportError> {
    Ok(Response::ExpandMacro(Err(PanicMessage(message.to_owned()))))
}
