//! Boundary detection.
//!
//! Finds the positions in a body where a split is semantically preferable
//! to a hard cut. Three kinds are recognised, in order of preference:
//!
//! ```text
//! > A quoted highlight line.          <- highlight-start (priority 1)
//! > Another one.
//!
//! Plain prose follows. It has two     <- paragraph-break (priority 2)
//! sentences. Here is the second.      <- sentence-end    (priority 3)
//! ```
//!
//! Quoted excerpts are semantically atomic, so the start of one is the best
//! place to cut. Paragraphs come next. Sentence ends are a cheap heuristic
//! (punctuation, whitespace, uppercase letter) and the most expendable;
//! false positives like "Dr. Smith" are tolerated.
//!
//! All three are direct scans over the text with a few characters of
//! lookahead. No regex engine is involved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ChunkingConfig;

/// The kind of a boundary candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    /// Start of a line opening with the highlight marker.
    HighlightStart,
    /// Just after a run of two or more newlines.
    ParagraphBreak,
    /// Just after the whitespace following `.`, `!` or `?`.
    SentenceEnd,
}

impl BoundaryKind {
    /// All kinds, most preferred first.
    pub const ALL: [BoundaryKind; 3] = [
        BoundaryKind::HighlightStart,
        BoundaryKind::ParagraphBreak,
        BoundaryKind::SentenceEnd,
    ];

    /// Tie-break rank; lower is preferred.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            BoundaryKind::HighlightStart => 1,
            BoundaryKind::ParagraphBreak => 2,
            BoundaryKind::SentenceEnd => 3,
        }
    }

    /// Kebab-case name, as used in serialized metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BoundaryKind::HighlightStart => "highlight-start",
            BoundaryKind::ParagraphBreak => "paragraph-break",
            BoundaryKind::SentenceEnd => "sentence-end",
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position where a split is preferable to a hard cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryCandidate {
    /// Byte offset into the body; always on a char boundary.
    pub position: usize,
    /// What produced this candidate.
    pub kind: BoundaryKind,
    /// Tie-break rank, copied from [`BoundaryKind::priority`].
    pub priority: u8,
}

impl BoundaryCandidate {
    /// Create a candidate of the given kind.
    #[must_use]
    pub const fn new(position: usize, kind: BoundaryKind) -> Self {
        Self {
            position,
            kind,
            priority: kind.priority(),
        }
    }
}

/// Scan `body` for every enabled boundary kind.
///
/// The result is sorted by `(position, priority)`. Candidates of different
/// kinds at the same position are all kept.
///
/// ```rust
/// use seams::{detect_boundaries, BoundaryKind, ChunkingConfig};
///
/// let body = "One.\n\nTwo. Three.";
/// let found = detect_boundaries(body, &ChunkingConfig::default());
///
/// // "\n\n" is both a paragraph break and sentence-ending whitespace
/// assert_eq!(found[0].position, 6);
/// assert_eq!(found[0].kind, BoundaryKind::ParagraphBreak);
/// assert_eq!(found[1].position, 6);
/// assert_eq!(found[1].kind, BoundaryKind::SentenceEnd);
/// assert_eq!(found[2].position, 11);
/// ```
#[must_use]
pub fn detect_boundaries(body: &str, config: &ChunkingConfig) -> Vec<BoundaryCandidate> {
    let mut candidates = Vec::new();

    if config.highlight_starts {
        highlight_starts(body, config.highlight_marker, &mut candidates);
    }
    if config.paragraph_breaks {
        paragraph_breaks(body, &mut candidates);
    }
    if config.sentence_ends {
        sentence_ends(body, &mut candidates);
    }

    // Each scan emits in position order; a stable sort merges them.
    candidates.sort_by_key(|c| (c.position, c.priority));
    candidates
}

fn highlight_starts(body: &str, marker: char, out: &mut Vec<BoundaryCandidate>) {
    let mut line_start = 0;
    for line in body.split_inclusive('\n') {
        if line.starts_with(marker) {
            out.push(BoundaryCandidate::new(line_start, BoundaryKind::HighlightStart));
        }
        line_start += line.len();
    }
}

fn paragraph_breaks(body: &str, out: &mut Vec<BoundaryCandidate>) {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\n' {
            i += 1;
            continue;
        }

        // Consume the run; `\r` between newlines belongs to it.
        let mut newlines = 0;
        let mut j = i;
        while j < bytes.len() && (bytes[j] == b'\n' || bytes[j] == b'\r') {
            if bytes[j] == b'\n' {
                newlines += 1;
            }
            j += 1;
        }
        if newlines >= 2 {
            out.push(BoundaryCandidate::new(j, BoundaryKind::ParagraphBreak));
        }
        i = j;
    }
}

fn sentence_ends(body: &str, out: &mut Vec<BoundaryCandidate>) {
    let mut chars = body.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let mut saw_whitespace = false;
        while let Some(&(_, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            saw_whitespace = true;
            chars.next();
        }

        if let Some(&(pos, next)) = chars.peek() {
            if saw_whitespace && next.is_uppercase() {
                out.push(BoundaryCandidate::new(pos, BoundaryKind::SentenceEnd));
            }
        }
    }
}
