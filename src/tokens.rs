//! Pluggable token counting.
//!
//! `seams` never tokenizes text itself. Chunk sizes are budgeted in
//! "tokens", and what a token is belongs to the caller: the embedding
//! model's tokenizer, a cached BPE table, or a cheap approximation.
//!
//! The only requirements are determinism and rough monotonicity with
//! length. Exact parity with any particular model is not needed, only that
//! the same counter is used for a whole chunking run.
//!
//! | Counter | Cost | Notes |
//! |---------|------|-------|
//! | [`CharRatioCounter`] | O(n) | `ceil(chars / ratio)`, matches the segmenter's estimate |
//! | [`WordCounter`] | O(n) | UAX #29 word bounds, punctuation counted |
//! | [`FnCounter`] | caller's | Adapts a real tokenizer; errors propagate |

use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, Result};

/// Counts tokens in a piece of text.
///
/// Implementations are shared across threads when documents are chunked in
/// parallel, hence the `Send + Sync` bound. A counter backed by mutable
/// state (a cache, say) must synchronize internally.
pub trait TokenCounter: Send + Sync {
    /// Count the tokens in `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenCount`] if the text cannot be tokenized.
    /// The chunker propagates this unchanged.
    fn count_tokens(&self, text: &str) -> Result<usize>;
}

impl<T: TokenCounter + ?Sized> TokenCounter for &T {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        (**self).count_tokens(text)
    }
}

impl<T: TokenCounter + ?Sized> TokenCounter for Arc<T> {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        (**self).count_tokens(text)
    }
}

impl<T: TokenCounter + ?Sized> TokenCounter for Box<T> {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        (**self).count_tokens(text)
    }
}

/// Approximates tokens as `ceil(chars / chars_per_token)`.
///
/// ```rust
/// use seams::{CharRatioCounter, TokenCounter};
///
/// let counter = CharRatioCounter::default();
/// assert_eq!(counter.count_tokens("abcdefgh").unwrap(), 2);
/// assert_eq!(counter.count_tokens("abcdefghi").unwrap(), 3);
/// assert_eq!(counter.count_tokens("").unwrap(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRatioCounter {
    chars_per_token: usize,
}

impl CharRatioCounter {
    /// Create a counter with the given ratio.
    ///
    /// # Panics
    ///
    /// Panics if `chars_per_token == 0`.
    #[must_use]
    pub fn new(chars_per_token: usize) -> Self {
        assert!(chars_per_token > 0, "chars_per_token must be > 0");
        Self { chars_per_token }
    }

    /// The configured ratio.
    #[must_use]
    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }
}

impl Default for CharRatioCounter {
    fn default() -> Self {
        Self::new(crate::ChunkingConfig::DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenCounter for CharRatioCounter {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(text.chars().count().div_ceil(self.chars_per_token))
    }
}

/// Counts UAX #29 word-bound segments, skipping pure whitespace.
///
/// Words and punctuation marks each count as one token, which tracks
/// subword tokenizers more closely than a character ratio does for
/// punctuation-heavy text.
///
/// ```rust
/// use seams::{TokenCounter, WordCounter};
///
/// let n = WordCounter.count_tokens("Hello, world!").unwrap();
/// assert_eq!(n, 4); // "Hello" "," "world" "!"
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(text
            .split_word_bounds()
            .filter(|w| !w.trim().is_empty())
            .count())
    }
}

/// Adapts a fallible closure into a [`TokenCounter`].
///
/// Use this to plug in a real tokenizer. Its error is wrapped in
/// [`Error::TokenCount`].
///
/// ```rust
/// use seams::{FnCounter, TokenCounter};
///
/// let counter = FnCounter::new(|text: &str| {
///     if text.contains('\u{FFFD}') {
///         Err("replacement character in input")
///     } else {
///         Ok(text.split_whitespace().count())
///     }
/// });
/// assert_eq!(counter.count_tokens("a b c").unwrap(), 3);
/// assert!(counter.count_tokens("bad \u{FFFD}").is_err());
/// ```
#[derive(Clone)]
pub struct FnCounter<F> {
    count: F,
}

impl<F> FnCounter<F> {
    /// Wrap `count`.
    pub fn new(count: F) -> Self {
        Self { count }
    }
}

impl<F> std::fmt::Debug for FnCounter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCounter").finish_non_exhaustive()
    }
}

impl<F, E> TokenCounter for FnCounter<F>
where
    F: Fn(&str) -> std::result::Result<usize, E> + Send + Sync,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn count_tokens(&self, text: &str) -> Result<usize> {
        (self.count)(text).map_err(Error::token_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_ratio_counts_chars_not_bytes() {
        let counter = CharRatioCounter::new(2);
        // 4 chars, 12 bytes
        assert_eq!(counter.count_tokens("日本語!").unwrap(), 2);
    }

    #[test]
    #[should_panic]
    fn test_zero_ratio_panics() {
        let _ = CharRatioCounter::new(0);
    }

    #[test]
    fn test_word_counter_skips_whitespace() {
        assert_eq!(WordCounter.count_tokens("  one   two\n\nthree ").unwrap(), 3);
        assert_eq!(WordCounter.count_tokens("").unwrap(), 0);
    }

    #[test]
    fn test_fn_counter_wraps_error() {
        let counter = FnCounter::new(|_: &str| -> std::result::Result<usize, String> {
            Err("tokenizer unavailable".to_string())
        });
        let err = counter.count_tokens("text").unwrap_err();
        assert!(matches!(err, Error::TokenCount(_)));
        assert!(err.to_string().contains("tokenizer unavailable"));
    }

    #[test]
    fn test_shared_counter() {
        let counter: Arc<dyn TokenCounter> = Arc::new(CharRatioCounter::default());
        assert_eq!(counter.count_tokens("abcd").unwrap(), 1);
        assert_eq!((&counter).count_tokens("abcde").unwrap(), 2);
    }
}
