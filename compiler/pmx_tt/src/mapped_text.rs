//! Text paired with its mapping back to source offsets.

use crate::{MappedTextRange, RangeMap};

/// Text whose spans map back to source offsets through `ranges`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MappedText {
    pub text: String,
    pub ranges: RangeMap,
}

impl MappedText {
    pub fn new(text: String, ranges: RangeMap) -> Self {
        MappedText { text, ranges }
    }

    /// Text copied verbatim from source starting at `src_offset`.
    pub fn single(text: impl Into<String>, src_offset: usize) -> Self {
        let text = text.into();
        let ranges = RangeMap::single(src_offset, text.len());
        MappedText { text, ranges }
    }
}

/// Builder for [`MappedText`] that records ranges as text is appended.
#[derive(Clone, Debug, Default)]
pub struct MutableMappedText {
    text: String,
    ranges: RangeMap,
}

impl MutableMappedText {
    pub fn with_capacity(capacity: usize) -> Self {
        MutableMappedText {
            text: String::with_capacity(capacity),
            ranges: RangeMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append `text` that was copied from source offset `src_offset`.
    pub fn append_mapped(&mut self, text: &str, src_offset: usize) {
        self.ranges
            .merge_add(MappedTextRange::new(src_offset, self.text.len(), text.len()));
        self.text.push_str(text);
    }

    /// Append synthesized `text` with no source counterpart.
    pub fn append_unmapped(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn into_mapped_text(self) -> MappedText {
        MappedText {
            text: self.text,
            ranges: self.ranges,
        }
    }
}
