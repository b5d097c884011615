//! Split-point arbitration.
//!
//! Walks the body from start to end, choosing each split near a token
//! budget using the detected boundaries.
//!
//! ## The Algorithm
//!
//! ```text
//! cursor        target              cursor + max
//!   |--------------|---------------------|
//!        [ before ]|[ after ]
//!        overlap    max_tokens
//!        budget     * 0.3
//! ```
//!
//! For each segment:
//!
//! 1. Estimate the target offset `target_tokens` ahead of the cursor with
//!    the characters-per-token ratio. The token counter is expensive, so it
//!    is not called per candidate.
//! 2. Consider candidates strictly after the cursor and no further than
//!    `max_tokens` ahead. Once the target reaches the end of the body the
//!    rest is taken whole: the end sits at distance 0.
//! 3. Pick, in order:
//!    - the closest candidate at or before the target, if within the
//!      overlap budget (lower priority wins at equal positions);
//!    - the closest candidate after the target, if within `max_tokens * 0.3`;
//!    - the nearest candidate on either side, "before" winning ties;
//!    - a hard cut at the target.
//! 4. Count the segment exactly, then advance.
//!
//! The cursor always moves forward by at least one character, so the loop
//! terminates on any input.

use crate::{BoundaryCandidate, ChunkingConfig, RawSegment, Result, SplitKind, TokenCounter};

/// Split `body` into contiguous, non-overlapping segments.
///
/// `candidates` must be sorted by `(position, priority)`, as
/// [`detect_boundaries`](crate::detect_boundaries) returns them.
///
/// # Errors
///
/// Only token counter failures, propagated unchanged.
///
/// ```rust
/// use seams::{detect_boundaries, segment, CharRatioCounter, ChunkingConfig};
///
/// let body = "First paragraph here.\n\nSecond paragraph here.";
/// let config = ChunkingConfig::new(6).with_max(12).unwrap().with_overlap(2);
/// let candidates = detect_boundaries(body, &config);
///
/// let segments = segment(body, &CharRatioCounter::default(), &config, &candidates).unwrap();
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].text(body), "First paragraph here.\n\n");
/// assert_eq!(segments[1].text(body), "Second paragraph here.");
/// ```
pub fn segment<C>(
    body: &str,
    counter: &C,
    config: &ChunkingConfig,
    candidates: &[BoundaryCandidate],
) -> Result<Vec<RawSegment>>
where
    C: TokenCounter + ?Sized,
{
    let total = counter.count_tokens(body)?;
    if total <= config.target_tokens {
        return Ok(vec![RawSegment::new(0, body.len(), total, SplitKind::EndOfText, 0)]);
    }

    let chars = CharMap::new(body);
    let char_len = chars.len();
    let mut segments = Vec::with_capacity(char_len / config.target_chars().max(1) + 1);
    let mut cursor = 0;

    while cursor < body.len() {
        let cursor_char = chars.char_at(cursor);
        let SplitPoint { mut position, mut kind } = choose_split(&chars, cursor_char, config, candidates);

        if kind != SplitKind::EndOfText && position < body.len() {
            let rest = char_len - chars.char_at(position);
            let remainder = char_len - cursor_char;
            if config.estimate_tokens(rest) < config.min_tokens && remainder <= config.max_chars() {
                tracing::trace!(cursor, rest, "folding short tail into final segment");
                position = body.len();
                kind = SplitKind::EndOfText;
            }
        }

        // Forward progress. Never remove.
        if position <= cursor {
            position = chars.byte_at(cursor_char + 1);
        }

        let token_count = counter.count_tokens(&body[cursor..position])?;
        tracing::trace!(start = cursor, end = position, token_count, %kind, "segment");
        segments.push(RawSegment::new(cursor, position, token_count, kind, segments.len()));
        cursor = position;
    }

    Ok(segments)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SplitPoint {
    position: usize,
    kind: SplitKind,
}

fn choose_split(
    chars: &CharMap<'_>,
    cursor_char: usize,
    config: &ChunkingConfig,
    candidates: &[BoundaryCandidate],
) -> SplitPoint {
    let len = chars.byte_len();
    let cursor = chars.byte_at(cursor_char);
    let target_char = cursor_char.saturating_add(config.target_chars()).min(chars.len());
    let target = chars.byte_at(target_char);
    let window_end = chars.byte_at(cursor_char.saturating_add(config.max_chars()));

    if target == len {
        return SplitPoint {
            position: len,
            kind: SplitKind::EndOfText,
        };
    }

    let lo = candidates.partition_point(|c| c.position <= cursor);
    let hi = candidates.partition_point(|c| c.position <= window_end);
    let window: Vec<SplitPoint> = candidates[lo..hi.max(lo)]
        .iter()
        .map(|c| SplitPoint {
            position: c.position,
            kind: c.kind.into(),
        })
        .collect();

    let pivot = window.partition_point(|p| p.position <= target);

    // Closest at or before; the first entry at that position has the lowest priority.
    let before = window[..pivot].last().map(|last| {
        let first = window[..pivot].partition_point(|p| p.position < last.position);
        window[first]
    });
    let after = window.get(pivot).copied();

    let before_dist = before.map(|p| target_char - chars.char_at(p.position));
    let after_dist = after.map(|p| chars.char_at(p.position) - target_char);

    match (before.zip(before_dist), after.zip(after_dist)) {
        (Some((b, d)), _) if d <= config.overlap_chars() => b,
        (_, Some((a, d))) if d <= config.lookahead_chars() => a,
        (Some((b, db)), Some((a, da))) => {
            if db <= da {
                b
            } else {
                a
            }
        }
        (Some((b, _)), None) => b,
        (None, Some((a, _))) => a,
        (None, None) => {
            tracing::debug!(cursor, target, "no boundary in window, cutting at token limit");
            SplitPoint {
                position: target,
                kind: SplitKind::TokenLimit,
            }
        }
    }
}

/// Converts between byte offsets and character indices.
///
/// Budgets are counted in characters while offsets are bytes. Pure ASCII
/// text, the common case, needs no table.
#[derive(Debug)]
pub(crate) struct CharMap<'a> {
    body: &'a str,
    offsets: Option<Vec<usize>>,
}

impl<'a> CharMap<'a> {
    pub(crate) fn new(body: &'a str) -> Self {
        let offsets = (!body.is_ascii()).then(|| {
            body.char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(body.len()))
                .collect()
        });
        Self { body, offsets }
    }

    /// Number of characters.
    pub(crate) fn len(&self) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.len() - 1,
            None => self.body.len(),
        }
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.body.len()
    }

    /// Character index of a byte offset on a char boundary.
    pub(crate) fn char_at(&self, byte: usize) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.partition_point(|&o| o < byte),
            None => byte.min(self.body.len()),
        }
    }

    /// Byte offset of a character index, clamped to the end of the body.
    pub(crate) fn byte_at(&self, ch: usize) -> usize {
        match &self.offsets {
            Some(offsets) => offsets[ch.min(offsets.len() - 1)],
            None => ch.min(self.body.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundaryKind, CharRatioCounter, Error, FnCounter};

    fn run(body: &str, config: &ChunkingConfig, candidates: &[BoundaryCandidate]) -> Vec<RawSegment> {
        segment(body, &CharRatioCounter::default(), config, candidates).unwrap()
    }

    fn sentences(positions: &[usize]) -> Vec<BoundaryCandidate> {
        positions
            .iter()
            .map(|&p| BoundaryCandidate::new(p, BoundaryKind::SentenceEnd))
            .collect()
    }

    #[test]
    fn test_short_body_single_segment() {
        let segments = run("tiny", &ChunkingConfig::new(10), &[]);
        assert_eq!(segments, vec![RawSegment::new(0, 4, 1, SplitKind::EndOfText, 0)]);
    }

    #[test]
    fn test_empty_body() {
        let segments = run("", &ChunkingConfig::new(10), &[]);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_empty());
        assert_eq!(segments[0].token_count, 0);
    }

    #[test]
    fn test_hard_cuts_without_candidates() {
        let body = "a".repeat(100);
        let segments = run(&body, &ChunkingConfig::new(5), &[]);

        let spans: Vec<_> = segments.iter().map(RawSegment::span).collect();
        assert_eq!(spans, vec![0..20, 20..40, 40..60, 60..80, 80..100]);
        assert!(segments[..4].iter().all(|s| s.boundary_kind == SplitKind::TokenLimit));
        assert_eq!(segments[4].boundary_kind, SplitKind::EndOfText);
        assert!(segments.iter().all(|s| s.token_count == 5));
    }

    #[test]
    fn test_equal_position_prefers_lower_priority() {
        let body = "a".repeat(40);
        let config = ChunkingConfig::new(2).with_max(10).unwrap().with_overlap(1);
        let candidates = vec![
            BoundaryCandidate::new(6, BoundaryKind::ParagraphBreak),
            BoundaryCandidate::new(6, BoundaryKind::SentenceEnd),
        ];
        let segments = run(&body, &config, &candidates);

        assert_eq!(segments[0].span(), 0..6);
        assert_eq!(
            segments[0].boundary_kind,
            SplitKind::Boundary(BoundaryKind::ParagraphBreak)
        );
        assert_eq!(segments.last().map(|s| s.char_end), Some(40));
    }

    #[test]
    fn test_no_candidates_cuts_at_target() {
        let body = "a".repeat(700);
        let config = ChunkingConfig::new(100).with_max(200).unwrap().with_overlap(20);
        let segments = run(&body, &config, &[]);

        let spans: Vec<_> = segments.iter().map(RawSegment::span).collect();
        assert_eq!(spans, vec![0..400, 400..700]);
        assert_eq!(segments[0].boundary_kind, SplitKind::TokenLimit);
        assert_eq!(segments[0].token_count, 100);
        assert_eq!(segments[1].boundary_kind, SplitKind::EndOfText);
    }

    #[test]
    fn test_before_within_tolerance_beats_closer_after() {
        // target 400, before tolerance 80, lookahead 60
        let body = "a".repeat(1000);
        let config = ChunkingConfig::new(100).with_max(200).unwrap().with_overlap(20);
        let segments = run(&body, &config, &sentences(&[390, 402]));
        assert_eq!(segments[0].span(), 0..390);
        assert_eq!(
            segments[0].boundary_kind,
            SplitKind::Boundary(BoundaryKind::SentenceEnd)
        );
    }

    #[test]
    fn test_after_within_lookahead_beats_distant_before() {
        // target 40, before tolerance 4, lookahead 30
        let body = "a".repeat(200);
        let config = ChunkingConfig::new(10).with_max(100).unwrap().with_overlap(1);
        let segments = run(&body, &config, &sentences(&[20, 60]));
        assert_eq!(segments[0].span(), 0..60);
    }

    #[test]
    fn test_fallback_tie_prefers_before() {
        // target 40, window 48, before tolerance 4, lookahead 3
        let body = "a".repeat(200);
        let config = ChunkingConfig::new(10).with_max(12).unwrap().with_overlap(1);
        let segments = run(&body, &config, &sentences(&[34, 46]));
        assert_eq!(segments[0].span(), 0..34);
    }

    #[test]
    fn test_fallback_nearest_after() {
        let body = "a".repeat(200);
        let config = ChunkingConfig::new(10).with_max(12).unwrap().with_overlap(1);
        let segments = run(&body, &config, &sentences(&[30, 46]));
        assert_eq!(segments[0].span(), 0..46);
    }

    #[test]
    fn test_candidates_beyond_max_are_ignored() {
        let body = "a".repeat(200);
        let config = ChunkingConfig::new(10).with_max(12).unwrap();
        let segments = run(&body, &config, &sentences(&[49]));
        assert_eq!(segments[0].span(), 0..40);
        assert_eq!(segments[0].boundary_kind, SplitKind::TokenLimit);
    }

    #[test]
    fn test_short_tail_is_folded() {
        let body = "a".repeat(68);
        let candidates = sentences(&[20, 40, 60]);

        let config = ChunkingConfig::new(5).with_max(10).unwrap();
        let spans: Vec<_> = run(&body, &config, &candidates).iter().map(RawSegment::span).collect();
        assert_eq!(spans, vec![0..20, 20..40, 40..60, 60..68]);

        let config = config.with_min(3).unwrap();
        let segments = run(&body, &config, &candidates);
        let spans: Vec<_> = segments.iter().map(RawSegment::span).collect();
        assert_eq!(spans, vec![0..20, 20..40, 40..68]);
        assert_eq!(segments[2].boundary_kind, SplitKind::EndOfText);
    }

    #[test]
    fn test_zero_width_split_still_advances() {
        let config = ChunkingConfig {
            chars_per_token: 0,
            ..ChunkingConfig::new(1)
        };
        let segments = run("abcdefgh", &config, &[]);
        assert_eq!(segments.len(), 8);
        assert!(segments.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_multibyte_cuts_on_char_boundaries() {
        let body = "日本語のテキスト".repeat(10);
        let segments = run(&body, &ChunkingConfig::new(3), &[]);

        assert_eq!(segments[0].text(&body).chars().count(), 12);
        for s in &segments {
            assert!(body.is_char_boundary(s.char_start));
            assert!(body.is_char_boundary(s.char_end));
        }
        let rebuilt: String = segments.iter().map(|s| s.text(&body)).collect();
        assert_eq!(rebuilt, body);
    }

    #[test]
    fn test_counter_error_propagates() {
        let counter = FnCounter::new(|text: &str| {
            if text.len() < 100 {
                Err("cannot tokenize fragment")
            } else {
                Ok(text.len())
            }
        });
        let body = "a".repeat(100);
        let result = segment(&body, &counter, &ChunkingConfig::new(5), &[]);
        assert!(matches!(result, Err(Error::TokenCount(_))));
    }

    #[test]
    fn test_char_map_round_trip() {
        let body = "aé日b";
        let map = CharMap::new(body);
        assert_eq!(map.len(), 4);
        assert_eq!(map.byte_at(2), 3);
        assert_eq!(map.char_at(6), 3);
        assert_eq!(map.byte_at(99), body.len());
    }
}
