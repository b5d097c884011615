//! The RawSegment type: a pre-overlap slice of the body.

use std::fmt;

use crate::BoundaryKind;

/// Why a segment ends where it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitKind {
    /// A detected boundary candidate.
    Boundary(BoundaryKind),
    /// No usable candidate; cut at the estimated target.
    TokenLimit,
    /// The segment runs to the end of the body.
    EndOfText,
}

impl SplitKind {
    /// Kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SplitKind::Boundary(kind) => kind.as_str(),
            SplitKind::TokenLimit => "token-limit",
            SplitKind::EndOfText => "end-of-text",
        }
    }
}

impl From<BoundaryKind> for SplitKind {
    fn from(kind: BoundaryKind) -> Self {
        SplitKind::Boundary(kind)
    }
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous, non-overlapping slice of the body, before overlap.
///
/// Consecutive segments tile the body exactly:
/// `segments[i].char_end == segments[i + 1].char_start`.
///
/// ## Byte Offsets
///
/// `char_start` and `char_end` are byte offsets on char boundaries, so they
/// slice the body directly:
///
/// ```rust
/// use seams::{RawSegment, SplitKind};
///
/// let body = "Hello, world!";
/// let seg = RawSegment::new(7, 13, 2, SplitKind::EndOfText, 0);
/// assert_eq!(seg.text(body), "world!");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSegment {
    /// Byte offset where the segment starts.
    pub char_start: usize,
    /// Byte offset where the segment ends (exclusive).
    pub char_end: usize,
    /// Exact token count of the segment text.
    pub token_count: usize,
    /// How the end of this segment was chosen.
    pub boundary_kind: SplitKind,
    /// Zero-based emission order.
    pub index: usize,
}

impl RawSegment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(
        char_start: usize,
        char_end: usize,
        token_count: usize,
        boundary_kind: SplitKind,
        index: usize,
    ) -> Self {
        Self {
            char_start,
            char_end,
            token_count,
            boundary_kind,
            index,
        }
    }

    /// The segment's text within `body`.
    #[must_use]
    pub fn text<'a>(&self, body: &'a str) -> &'a str {
        &body[self.span()]
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.char_end - self.char_start
    }

    /// Whether the segment is empty (only for an empty body).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.char_end == self.char_start
    }

    /// The byte span of this segment in the body.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.char_start..self.char_end
    }
}

impl fmt::Display for RawSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawSegment {{ index: {}, span: {}..{}, tokens: {}, end: {} }}",
            self.index, self.char_start, self.char_end, self.token_count, self.boundary_kind
        )
    }
}
