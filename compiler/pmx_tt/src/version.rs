//! Proc-macro expander protocol versions.

/// Protocol version spoken by an expander instance.
///
/// Each version adds to the previous one; comparisons are meaningful.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum ExpanderVersion {
    /// Expander predates the `ApiVersionCheck` request.
    NoVersionCheck = 0,
    VersionCheck = 1,
    /// Subtree records reserve a slot for the closing delimiter id.
    EncodeCloseSpan = 2,
    /// Requests carry `has_global_spans`.
    HasGlobalSpans = 3,
    RustAnalyzerSpanSupport = 4,
    /// Literal and identifier records carry kind, suffix, and raw flag.
    ExtendedLeafData = 5,
}

impl ExpanderVersion {
    /// Newest version this client speaks.
    pub const LATEST: ExpanderVersion = ExpanderVersion::ExtendedLeafData;

    pub const fn from_u32(raw: u32) -> Option<ExpanderVersion> {
        Some(match raw {
            0 => ExpanderVersion::NoVersionCheck,
            1 => ExpanderVersion::VersionCheck,
            2 => ExpanderVersion::EncodeCloseSpan,
            3 => ExpanderVersion::HasGlobalSpans,
            4 => ExpanderVersion::RustAnalyzerSpanSupport,
            5 => ExpanderVersion::ExtendedLeafData,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Version to use with an expander reporting `reported`.
    ///
    /// Expanders newer than this client are spoken to at [`ExpanderVersion::LATEST`].
    pub fn negotiate(reported: u32) -> ExpanderVersion {
        ExpanderVersion::from_u32(reported).unwrap_or(ExpanderVersion::LATEST)
    }

    pub const ALL: [ExpanderVersion; 6] = [
        ExpanderVersion::NoVersionCheck,
        ExpanderVersion::VersionCheck,
        ExpanderVersion::EncodeCloseSpan,
        ExpanderVersion::HasGlobalSpans,
        ExpanderVersion::RustAnalyzerSpanSupport,
        ExpanderVersion::ExtendedLeafData,
    ];
}

/// Record shapes of the flat tree encoding for one protocol version.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CodecFlags {
    /// Subtree records are `[open, close, kind, start, end]` instead of `[open, kind, start, end]`.
    pub encode_close_span: bool,
    /// Literals are `[id, text, kind, suffix]` and identifiers `[id, text, is_raw]`.
    pub extended_leaf_data: bool,
}

impl CodecFlags {
    pub const PUNCT_STRIDE: usize = 3;

    pub const fn for_version(version: ExpanderVersion) -> Self {
        CodecFlags {
            encode_close_span: version as u8 >= ExpanderVersion::EncodeCloseSpan as u8,
            extended_leaf_data: version as u8 >= ExpanderVersion::ExtendedLeafData as u8,
        }
    }

    /// Position of the kind field within a subtree record.
    #[inline]
    pub const fn subtree_kind_slot(self) -> usize {
        if self.encode_close_span {
            2
        } else {
            1
        }
    }

    #[inline]
    pub const fn subtree_stride(self) -> usize {
        self.subtree_kind_slot() + 3
    }

    #[inline]
    pub const fn literal_stride(self) -> usize {
        if self.extended_leaf_data {
            4
        } else {
            2
        }
    }

    #[inline]
    pub const fn ident_stride(self) -> usize {
        if self.extended_leaf_data {
            3
        } else {
            2
        }
    }
}
