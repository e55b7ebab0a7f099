//! Literal text in the extended record shape.
//!
//! Extended literal records carry a symbol, a kind and an optional suffix.
//! The symbol is the source text between the quotes, escapes left as
//! written, so wrapping it back in the quotes of its kind gives the source
//! text again. Numbers travel whole. Anything else, raw strings included,
//! travels verbatim as [`LitKind::Err`].

use crate::{LitKind, Literal};

/// Symbol, wire kind and suffix of `lit`.
pub(super) fn split(lit: &Literal) -> (&str, LitKind, Option<&str>) {
    match lit.kind {
        LitKind::Integer | LitKind::Float => (lit.text.as_str(), lit.kind, None),
        kind => match split_quoted(&lit.text, kind) {
            Some((symbol, suffix)) => (symbol, kind, suffix),
            None => (lit.text.as_str(), LitKind::Err, None),
        },
    }
}

fn split_quoted(text: &str, kind: LitKind) -> Option<(&str, Option<&str>)> {
    let (open, close) = quotes(kind)?;
    let rest = text.strip_prefix(open)?;
    let end = rest.rfind(close)?;
    let suffix = &rest[end + close.len_utf8()..];
    Some((&rest[..end], (!suffix.is_empty()).then_some(suffix)))
}

/// Source text of a literal received as `symbol` of `kind`.
///
/// Raw string kinds get the fewest `#`s that keep the symbol intact.
pub(super) fn join(symbol: &str, kind: LitKind, suffix: Option<&str>) -> String {
    let mut text = match kind {
        LitKind::StrRaw => raw("r", symbol),
        LitKind::ByteStrRaw => raw("br", symbol),
        LitKind::CStrRaw => raw("cr", symbol),
        kind => match quotes(kind) {
            Some((open, close)) => format!("{open}{symbol}{close}"),
            None => symbol.to_owned(),
        },
    };
    if let Some(suffix) = suffix {
        text.push_str(suffix);
    }
    text
}

fn quotes(kind: LitKind) -> Option<(&'static str, char)> {
    match kind {
        LitKind::Byte => Some(("b'", '\'')),
        LitKind::Char => Some(("'", '\'')),
        LitKind::Str => Some(("\"", '"')),
        LitKind::ByteStr => Some(("b\"", '"')),
        LitKind::CStr => Some(("c\"", '"')),
        _ => None,
    }
}

fn raw(prefix: &str, symbol: &str) -> String {
    let mut hashes = String::new();
    while symbol.contains(&format!("\"{hashes}")) {
        hashes.push('#');
    }
    format!("{prefix}{hashes}\"{symbol}\"{hashes}")
}
