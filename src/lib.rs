//! # seams
//!
//! Semantic document chunking for retrieval-augmented generation (RAG)
//! pipelines.
//!
//! ## The Problem
//!
//! Embedding models have context windows and retrieval works best on
//! focused passages, so long documents are split into chunks. Where the
//! splits land matters:
//!
//! - A quoted highlight cut in half loses the point it was quoting
//! - A paragraph split mid-argument loses coherence
//! - A chunk that ends exactly at a split has no context for what follows
//!
//! `seams` splits at the most natural boundary near a token budget, and
//! overlaps neighbouring chunks so nothing sits alone at an edge.
//!
//! ## The Pipeline
//!
//! Each document goes through four pure stages:
//!
//! ```text
//! raw document
//!     │  split_metadata       ---\ntitle: ..\n---\n  →  (DocumentMetadata, body)
//!     ▼
//! body
//!     │  detect_boundaries    highlight-start < paragraph-break < sentence-end
//!     ▼
//! candidates
//!     │  segment              closest boundary to each token-budget target
//!     ▼
//! raw segments                contiguous, non-overlapping
//!     │  assemble             overlap, token counts, ids, SHA-256
//!     ▼
//! chunks
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use seams::{chunk, CharRatioCounter, ChunkingConfig};
//!
//! let config = ChunkingConfig::new(100)
//!     .with_max(200)
//!     .unwrap()
//!     .with_overlap(20);
//!
//! let doc = "---\ntitle: Delta\n---\n".to_string()
//!     + &"Rivers carry silt down to the delta every spring. ".repeat(60);
//!
//! let chunks = chunk(&doc, "delta", &config, &CharRatioCounter::default()).unwrap();
//!
//! assert_eq!(chunks.len(), 8);
//! assert_eq!(chunks[0].overlap_start_len, 0);
//! assert_eq!(chunks[7].overlap_end_len, 0);
//! assert_eq!(chunks[3].metadata.chunk_id, "delta-chunk-003");
//! ```
//!
//! ## Token Counting
//!
//! Budgets are in tokens, but tokenizing is the caller's business. Pass any
//! [`TokenCounter`]: [`CharRatioCounter`] for a fast estimate,
//! [`WordCounter`] for Unicode word bounds, or wrap your model's tokenizer
//! with [`FnCounter`]. Counter errors propagate unchanged.
//!
//! ## Guarantees
//!
//! | Property | Holds |
//! |----------|-------|
//! | Segments tile the body exactly | always |
//! | `chunks[i].chunk_index == i` | always |
//! | Same input, same chunks and fingerprints | always |
//! | Empty body gives one empty chunk | always |
//! | Malformed headers are an error | never |
//!
//! Offsets are byte offsets on char boundaries; character budgets never
//! split a code point.

mod assemble;
mod boundary;
mod chunk;
mod chunker;
mod config;
mod error;
mod metadata;
mod segment;
mod segmenter;
mod tokens;

pub use assemble::assemble;
pub use boundary::{detect_boundaries, BoundaryCandidate, BoundaryKind};
pub use chunk::{chunk_id, fingerprint, Chunk, ChunkMetadata};
pub use chunker::DocumentChunker;
pub use config::{ChunkingConfig, ConfigError};
pub use error::{Error, Result};
pub use metadata::{split_metadata, DocumentMetadata, DELIMITER};
pub use segment::{RawSegment, SplitKind};
pub use segmenter::segment;
pub use tokens::{CharRatioCounter, FnCounter, TokenCounter, WordCounter};

/// Chunk one document.
///
/// Separates the metadata header, detects boundaries, segments the body
/// and assembles overlapping chunks. Equivalent to
/// [`DocumentChunker::chunk`] without keeping a chunker around.
///
/// # Errors
///
/// Returns [`Error::Config`] for an invalid configuration and
/// [`Error::TokenCount`] if the counter fails. Nothing about the document
/// itself is an error.
pub fn chunk<C>(
    document_text: &str,
    parent_id: &str,
    config: &ChunkingConfig,
    counter: &C,
) -> Result<Vec<Chunk>>
where
    C: TokenCounter + ?Sized,
{
    DocumentChunker::new(config.clone(), counter)?.chunk(document_text, parent_id)
}
