//! Chunking configuration.
//!
//! ## Target, Max, Min
//!
//! A single chunk size is not enough to place splits well. `seams` takes
//! three token budgets:
//!
//! - `target_tokens`: what each chunk aims for before overlap is added.
//! - `max_tokens`: the ceiling that bounds how far past the target the
//!   segmenter may look for a boundary.
//! - `min_tokens`: a trailing remainder smaller than this is folded into
//!   the previous segment instead of becoming a chunk of its own.
//!
//! ```text
//! cursor          target            cursor + max
//!   |---------------|-------------------|
//!            ^          ^
//!   boundary within     boundary within
//!   overlap budget      max_tokens * 0.3
//! ```
//!
//! ## Characters per Token
//!
//! Counting tokens is potentially expensive, so positions are estimated
//! with a fixed characters-per-token ratio (4 by default, a common rule of
//! thumb for English with BPE tokenizers). Exact counts are taken only
//! once per emitted segment and once per final chunk.

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryKind;

/// Configuration for one chunking run.
///
/// # Examples
///
/// ```rust
/// use seams::ChunkingConfig;
///
/// let config = ChunkingConfig::new(100)
///     .with_max(200)
///     .unwrap()
///     .with_overlap(20);
/// assert_eq!(config.target_tokens, 100);
/// assert_eq!(config.max_tokens, 200);
/// assert_eq!(config.overlap_chars(), 80);
/// ```
///
/// Configurations can also be loaded from YAML or JSON; missing fields fall
/// back to [`ChunkingConfig::default`]. Call [`ChunkingConfig::validate`]
/// after deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Desired token count per chunk before overlap.
    pub target_tokens: usize,
    /// Hard ceiling used to bound the split-point search window.
    pub max_tokens: usize,
    /// A trailing remainder below this is accepted as part of the previous segment.
    pub min_tokens: usize,
    /// Approximate token count duplicated between adjacent chunks.
    pub overlap_tokens: usize,
    /// Fixed ratio used for every character estimate and budget.
    pub chars_per_token: usize,
    /// Detect lines opening with [`ChunkingConfig::highlight_marker`].
    pub highlight_starts: bool,
    /// Detect runs of two or more newlines.
    pub paragraph_breaks: bool,
    /// Detect sentence-terminating punctuation.
    pub sentence_ends: bool,
    /// Marker that opens a highlighted (quoted) line.
    pub highlight_marker: char,
}

impl ChunkingConfig {
    /// Characters per token assumed when no ratio is configured.
    pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

    /// Create a configuration where `max_tokens == target_tokens`, with no
    /// overlap, no minimum and every boundary kind enabled.
    #[must_use]
    pub const fn new(target_tokens: usize) -> Self {
        Self {
            target_tokens,
            max_tokens: target_tokens,
            min_tokens: 0,
            overlap_tokens: 0,
            chars_per_token: Self::DEFAULT_CHARS_PER_TOKEN,
            highlight_starts: true,
            paragraph_breaks: true,
            sentence_ends: true,
            highlight_marker: '>',
        }
    }

    /// Set the hard ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if `max < target_tokens`.
    pub fn with_max(self, max: usize) -> Result<Self, ConfigError> {
        if max < self.target_tokens {
            Err(ConfigError::MaxLessThanTarget {
                target: self.target_tokens,
                max,
            })
        } else {
            Ok(Self {
                max_tokens: max,
                ..self
            })
        }
    }

    /// Set the trailing-remainder minimum.
    ///
    /// # Errors
    ///
    /// Returns an error if `min > target_tokens`.
    pub fn with_min(self, min: usize) -> Result<Self, ConfigError> {
        if min > self.target_tokens {
            Err(ConfigError::MinExceedsTarget {
                target: self.target_tokens,
                min,
            })
        } else {
            Ok(Self {
                min_tokens: min,
                ..self
            })
        }
    }

    /// Set the overlap between adjacent chunks.
    #[must_use]
    pub fn with_overlap(self, overlap: usize) -> Self {
        Self {
            overlap_tokens: overlap,
            ..self
        }
    }

    /// Set the characters-per-token ratio.
    ///
    /// # Errors
    ///
    /// Returns an error if `ratio == 0`.
    pub fn with_chars_per_token(self, ratio: usize) -> Result<Self, ConfigError> {
        if ratio == 0 {
            Err(ConfigError::ZeroCharsPerToken)
        } else {
            Ok(Self {
                chars_per_token: ratio,
                ..self
            })
        }
    }

    /// Change the marker that opens a highlighted line.
    #[must_use]
    pub fn with_highlight_marker(self, marker: char) -> Self {
        Self {
            highlight_marker: marker,
            ..self
        }
    }

    /// Enable or disable detection of one boundary kind.
    #[must_use]
    pub fn with_boundary(mut self, kind: BoundaryKind, enabled: bool) -> Self {
        match kind {
            BoundaryKind::HighlightStart => self.highlight_starts = enabled,
            BoundaryKind::ParagraphBreak => self.paragraph_breaks = enabled,
            BoundaryKind::SentenceEnd => self.sentence_ends = enabled,
        }
        self
    }

    /// Whether a boundary kind participates in detection.
    #[must_use]
    pub fn detects(&self, kind: BoundaryKind) -> bool {
        match kind {
            BoundaryKind::HighlightStart => self.highlight_starts,
            BoundaryKind::ParagraphBreak => self.paragraph_breaks,
            BoundaryKind::SentenceEnd => self.sentence_ends,
        }
    }

    /// Check the invariants the builder methods enforce.
    ///
    /// Needed after deserializing, where fields are set directly.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_tokens == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        if self.max_tokens < self.target_tokens {
            return Err(ConfigError::MaxLessThanTarget {
                target: self.target_tokens,
                max: self.max_tokens,
            });
        }
        if self.min_tokens > self.target_tokens {
            return Err(ConfigError::MinExceedsTarget {
                target: self.target_tokens,
                min: self.min_tokens,
            });
        }
        if self.chars_per_token == 0 {
            return Err(ConfigError::ZeroCharsPerToken);
        }
        Ok(())
    }

    /// Estimated character length of a target-sized segment.
    #[must_use]
    pub fn target_chars(&self) -> usize {
        self.target_tokens.saturating_mul(self.chars_per_token)
    }

    /// Estimated character length of a max-sized segment.
    #[must_use]
    pub fn max_chars(&self) -> usize {
        self.max_tokens.saturating_mul(self.chars_per_token)
    }

    /// Character budget borrowed from each neighbour, and the tolerance for
    /// boundaries found before the target.
    #[must_use]
    pub fn overlap_chars(&self) -> usize {
        self.overlap_tokens.saturating_mul(self.chars_per_token)
    }

    /// Tolerance in characters for boundaries found after the target
    /// (`max_tokens * 0.3`).
    #[must_use]
    pub fn lookahead_chars(&self) -> usize {
        self.max_tokens.saturating_mul(3) / 10
    }

    /// Token estimate for a span of `chars` characters, rounded up.
    #[must_use]
    pub fn estimate_tokens(&self, chars: usize) -> usize {
        chars.div_ceil(self.chars_per_token.max(1))
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        // ~512 tokens per chunk, ~2 KiB of English text at 4 chars/token
        Self {
            max_tokens: 1024,
            min_tokens: 64,
            overlap_tokens: 64,
            ..Self::new(512)
        }
    }
}

/// Error when configuring a chunking run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Target must be > 0.
    #[error("target_tokens must be > 0")]
    ZeroTarget,

    /// Max must be >= target.
    #[error("max_tokens ({max}) must be >= target_tokens ({target})")]
    MaxLessThanTarget {
        /// The target token count.
        target: usize,
        /// The max that was too small.
        max: usize,
    },

    /// Min must be <= target.
    #[error("min_tokens ({min}) must be <= target_tokens ({target})")]
    MinExceedsTarget {
        /// The target token count.
        target: usize,
        /// The min that was too large.
        min: usize,
    },

    /// The characters-per-token ratio must be > 0.
    #[error("chars_per_token must be > 0")]
    ZeroCharsPerToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = ChunkingConfig::new(100);
        assert_eq!(config.max_tokens, 100);
        assert_eq!(config.min_tokens, 0);
        assert_eq!(config.overlap_tokens, 0);
        assert_eq!(config.chars_per_token, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_budgets() {
        let config = ChunkingConfig::new(100).with_max(200).unwrap().with_overlap(20);
        assert_eq!(config.target_chars(), 400);
        assert_eq!(config.max_chars(), 800);
        assert_eq!(config.overlap_chars(), 80);
        assert_eq!(config.lookahead_chars(), 60);
        assert_eq!(config.estimate_tokens(401), 101);
    }

    #[test]
    fn test_max_less_than_target_error() {
        let result = ChunkingConfig::new(100).with_max(50);
        assert_eq!(
            result,
            Err(ConfigError::MaxLessThanTarget { target: 100, max: 50 })
        );
    }

    #[test]
    fn test_min_exceeds_target_error() {
        assert!(ChunkingConfig::new(100).with_min(101).is_err());
        assert!(ChunkingConfig::new(100).with_min(100).is_ok());
    }

    #[test]
    fn test_zero_ratio_error() {
        assert_eq!(
            ChunkingConfig::new(10).with_chars_per_token(0),
            Err(ConfigError::ZeroCharsPerToken)
        );
    }

    #[test]
    fn test_boundary_toggles() {
        let config = ChunkingConfig::new(10).with_boundary(BoundaryKind::SentenceEnd, false);
        assert!(!config.detects(BoundaryKind::SentenceEnd));
        assert!(config.detects(BoundaryKind::ParagraphBreak));
        assert!(config.detects(BoundaryKind::HighlightStart));
    }

    #[test]
    fn test_validate_catches_zero_target() {
        let config = ChunkingConfig {
            target_tokens: 0,
            ..ChunkingConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTarget));
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let config: ChunkingConfig =
            serde_yaml::from_str("target_tokens: 256\nmax_tokens: 300\nsentence_ends: false\n")
                .unwrap();
        assert_eq!(config.target_tokens, 256);
        assert_eq!(config.max_tokens, 300);
        assert_eq!(config.overlap_tokens, 64);
        assert!(!config.sentence_ends);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_is_valid() {
        assert!(ChunkingConfig::default().validate().is_ok());
    }
}
