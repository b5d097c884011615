//! Overlap windowing and chunk assembly.
//!
//! ## Why Overlap?
//!
//! A fact that straddles a split is only half-present in either chunk.
//! Borrowing a little text across each split gives both sides context:
//!
//! ```text
//! segments:  [ A A A A ][ B B B B ][ C C C C ]
//!
//! chunk 0:   [ A A A A  b ]
//! chunk 1:          [ a  B B B B  c ]
//! chunk 2:                     [ b  C C C C ]
//! ```
//!
//! Each chunk borrows up to `overlap_tokens * chars_per_token` characters
//! from the end of the previous segment and the start of the next. The
//! first chunk borrows nothing before it, the last nothing after it. A
//! single-segment document gets no overlap at all.
//!
//! Token counts are recomputed on the extended text; the overlap budget is
//! only an estimate.

use crate::chunk::{fingerprint, Chunk, ChunkMetadata};
use crate::segmenter::CharMap;
use crate::{ChunkingConfig, DocumentMetadata, RawSegment, Result, TokenCounter};

/// Turn segments into final chunks: apply overlap, count tokens, attach
/// metadata and fingerprints.
///
/// Chunk order equals segment order.
///
/// # Errors
///
/// Only token counter failures, propagated unchanged.
///
/// ```rust
/// use seams::{assemble, CharRatioCounter, ChunkingConfig, DocumentMetadata, RawSegment, SplitKind};
///
/// let body = "aaaa|bbbb|cccc";
/// let segments = [
///     RawSegment::new(0, 5, 2, SplitKind::TokenLimit, 0),
///     RawSegment::new(5, 10, 2, SplitKind::TokenLimit, 1),
///     RawSegment::new(10, 14, 1, SplitKind::EndOfText, 2),
/// ];
/// let config = ChunkingConfig::new(2).with_chars_per_token(1).unwrap().with_overlap(2);
///
/// let chunks = assemble(
///     body,
///     &segments,
///     "doc",
///     &DocumentMetadata::default(),
///     &config,
///     &CharRatioCounter::new(1),
/// )
/// .unwrap();
/// assert_eq!(chunks[0].content, "aaaa|bb");
/// assert_eq!(chunks[1].content, "a|bbbb|cc");
/// assert_eq!(chunks[2].content, "b|cccc");
/// ```
pub fn assemble<C>(
    body: &str,
    segments: &[RawSegment],
    parent_id: &str,
    parent: &DocumentMetadata,
    config: &ChunkingConfig,
    counter: &C,
) -> Result<Vec<Chunk>>
where
    C: TokenCounter + ?Sized,
{
    let total = segments.len();
    let budget = if total > 1 { config.overlap_chars() } else { 0 };
    let chars = CharMap::new(body);

    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let start = match i.checked_sub(1).map(|p| &segments[p]) {
                Some(prev) => take_tail(&chars, prev, budget),
                None => seg.char_start,
            };
            let end = match segments.get(i + 1) {
                Some(next) => take_head(&chars, next, budget),
                None => seg.char_end,
            };

            let content = body[start..end].to_string();
            let token_count = counter.count_tokens(&content)?;

            Ok(Chunk {
                content_fingerprint: fingerprint(&content),
                content,
                chunk_index: i,
                total_chunks: total,
                token_count,
                char_start: seg.char_start,
                char_end: seg.char_end,
                overlap_start_len: seg.char_start - start,
                overlap_end_len: end - seg.char_end,
                metadata: ChunkMetadata::new(parent_id, i, total, parent),
            })
        })
        .collect()
}

/// Start of the last `budget` characters of `prev`.
fn take_tail(chars: &CharMap<'_>, prev: &RawSegment, budget: usize) -> usize {
    let end = chars.char_at(prev.char_end);
    let floor = chars.char_at(prev.char_start);
    chars.byte_at(end.saturating_sub(budget).max(floor))
}

/// End of the first `budget` characters of `next`.
fn take_head(chars: &CharMap<'_>, next: &RawSegment, budget: usize) -> usize {
    let start = chars.char_at(next.char_start);
    let ceil = chars.char_at(next.char_end);
    chars.byte_at(start.saturating_add(budget).min(ceil))
}
