//! Literal kinds and their wire tags.

/// Kind of a literal token.
///
/// Wire tags follow declaration order with `Err` at `0`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LitKind {
    /// Unknown or unclassifiable.
    Err,
    Byte,
    Char,
    Integer,
    Float,
    Str,
    StrRaw,
    ByteStr,
    ByteStrRaw,
    CStr,
    CStrRaw,
}

/// Integer suffixes, longest first so `usize` is not mistaken for an exponent.
const INT_SUFFIXES: [&str; 12] = [
    "usize", "isize", "u128", "i128", "u64", "i64", "u32", "i32", "u16", "i16", "u8", "i8",
];

impl LitKind {
    pub const fn to_wire(self) -> u32 {
        match self {
            LitKind::Err => 0,
            LitKind::Byte => 1,
            LitKind::Char => 2,
            LitKind::Integer => 3,
            LitKind::Float => 4,
            LitKind::Str => 5,
            LitKind::StrRaw => 6,
            LitKind::ByteStr => 7,
            LitKind::ByteStrRaw => 8,
            LitKind::CStr => 9,
            LitKind::CStrRaw => 10,
        }
    }

    /// `None` for tags outside `0..=10`.
    pub const fn from_wire(tag: u32) -> Option<LitKind> {
        Some(match tag {
            0 => LitKind::Err,
            1 => LitKind::Byte,
            2 => LitKind::Char,
            3 => LitKind::Integer,
            4 => LitKind::Float,
            5 => LitKind::Str,
            6 => LitKind::StrRaw,
            7 => LitKind::ByteStr,
            8 => LitKind::ByteStrRaw,
            9 => LitKind::CStr,
            10 => LitKind::CStrRaw,
            _ => return None,
        })
    }

    /// Classify literal source text.
    ///
    /// Used where the wire record carries no kind. Anything unrecognized
    /// (including negative numbers) is [`LitKind::Err`].
    pub fn infer(text: &str) -> LitKind {
        match text.as_bytes() {
            [b'b', b'\'', ..] => LitKind::Byte,
            [b'\'', ..] => LitKind::Char,
            [b'"', ..] => LitKind::Str,
            [b'r', b'"' | b'#', ..] => LitKind::StrRaw,
            [b'b', b'"', ..] => LitKind::ByteStr,
            [b'b', b'r', b'"' | b'#', ..] => LitKind::ByteStrRaw,
            [b'c', b'"', ..] => LitKind::CStr,
            [b'c', b'r', b'"' | b'#', ..] => LitKind::CStrRaw,
            [b'0'..=b'9', ..] => infer_number(text),
            _ => LitKind::Err,
        }
    }
}

fn infer_number(text: &str) -> LitKind {
    if ["0x", "0o", "0b"].iter().any(|radix| text.starts_with(radix)) {
        return LitKind::Integer;
    }
    if INT_SUFFIXES.iter().any(|suffix| text.ends_with(suffix)) {
        return LitKind::Integer;
    }
    if text.ends_with("f32")
        || text.ends_with("f64")
        || text.contains(['.', 'e', 'E'])
    {
        return LitKind::Float;
    }
    LitKind::Integer
}
