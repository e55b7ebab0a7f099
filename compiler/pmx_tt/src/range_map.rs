//! Offset correspondence between generated text and source text.

use smallvec::SmallVec;

/// A span of `length` bytes at `dst_offset` in generated text that is a
/// verbatim copy of the span at `src_offset` in source text.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MappedTextRange {
    pub src_offset: usize,
    pub dst_offset: usize,
    pub length: usize,
}

impl MappedTextRange {
    #[inline]
    pub const fn new(src_offset: usize, dst_offset: usize, length: usize) -> Self {
        MappedTextRange {
            src_offset,
            dst_offset,
            length,
        }
    }

    #[inline]
    pub const fn src_end(&self) -> usize {
        self.src_offset + self.length
    }

    #[inline]
    pub const fn dst_end(&self) -> usize {
        self.dst_offset + self.length
    }

    #[inline]
    #[must_use]
    pub const fn shift_dst_right(self, delta: usize) -> Self {
        MappedTextRange {
            src_offset: self.src_offset,
            dst_offset: self.dst_offset + delta,
            length: self.length,
        }
    }
}

/// Ordered, non-overlapping table of [`MappedTextRange`]s.
///
/// Ranges are kept sorted by `dst_offset`. Building a table by appending in
/// generated-text order (as every producer in this workspace does) upholds
/// that without sorting.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct RangeMap {
    ranges: SmallVec<[MappedTextRange; 2]>,
}

impl RangeMap {
    pub fn new() -> Self {
        RangeMap::default()
    }

    /// Table from ranges already sorted by `dst_offset`.
    pub fn from_ranges(ranges: impl IntoIterator<Item = MappedTextRange>) -> Self {
        let mut map = RangeMap::new();
        for range in ranges {
            map.merge_add(range);
        }
        map
    }

    /// Table mapping `[src_offset, src_offset + length)` onto `[0, length)`.
    pub fn single(src_offset: usize, length: usize) -> Self {
        RangeMap::from_ranges([MappedTextRange::new(src_offset, 0, length)])
    }

    #[inline]
    pub fn ranges(&self) -> &[MappedTextRange] {
        &self.ranges
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Append a range, extending the last one when both are contiguous in
    /// source and generated text. Empty ranges are dropped.
    pub fn merge_add(&mut self, range: MappedTextRange) {
        if range.length == 0 {
            return;
        }
        if let Some(last) = self.ranges.last_mut() {
            if last.src_end() == range.src_offset && last.dst_end() == range.dst_offset {
                last.length += range.length;
                return;
            }
        }
        self.ranges.push(range);
    }

    /// Append every range of `other` after this table's ranges.
    pub fn extend(&mut self, other: &RangeMap) {
        for &range in &other.ranges {
            self.merge_add(range);
        }
    }

    /// Shift every generated-text offset right by `delta`.
    #[must_use]
    pub fn shift_dst_right(&self, delta: usize) -> RangeMap {
        RangeMap {
            ranges: self
                .ranges
                .iter()
                .map(|range| range.shift_dst_right(delta))
                .collect(),
        }
    }

    /// Largest generated-text end offset, if any range exists.
    pub fn max_dst_end(&self) -> Option<usize> {
        self.ranges.iter().map(MappedTextRange::dst_end).max()
    }

    /// Compose `self` (A → B) with `other` (B → C) into A → C.
    ///
    /// Only the parts of `other` whose source side lands inside a range of
    /// `self` survive.
    #[must_use]
    pub fn map_all(&self, other: &RangeMap) -> RangeMap {
        let mut result = RangeMap::new();
        for outer in &other.ranges {
            let start = self
                .ranges
                .partition_point(|inner| inner.dst_end() <= outer.src_offset);
            for inner in &self.ranges[start..] {
                if inner.dst_offset >= outer.src_end() {
                    break;
                }
                let lo = inner.dst_offset.max(outer.src_offset);
                let hi = inner.dst_end().min(outer.src_end());
                if lo < hi {
                    result.merge_add(MappedTextRange::new(
                        inner.src_offset + (lo - inner.dst_offset),
                        outer.dst_offset + (lo - outer.src_offset),
                        hi - lo,
                    ));
                }
            }
        }
        result
    }

    /// Source offset that generated offset `dst` was copied from.
    pub fn map_offset_to_source(&self, dst: usize) -> Option<usize> {
        let idx = self.ranges.partition_point(|range| range.dst_end() <= dst);
        let range = self.ranges.get(idx)?;
        (range.dst_offset <= dst).then(|| range.src_offset + (dst - range.dst_offset))
    }

    /// Generated offset that source offset `src` was copied to.
    ///
    /// Returns the first occurrence when a source span was copied twice.
    pub fn map_offset_to_expansion(&self, src: usize) -> Option<usize> {
        self.ranges
            .iter()
            .find(|range| range.src_offset <= src && src < range.src_end())
            .map(|range| range.dst_offset + (src - range.src_offset))
    }
}
