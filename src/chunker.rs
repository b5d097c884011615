//! The document chunker: the four stages wired together.

use crate::{
    assemble, detect_boundaries, segment, split_metadata, Chunk, ChunkingConfig,
    DocumentMetadata, RawSegment, Result, TokenCounter,
};

/// Chunks documents with one configuration and one token counter.
///
/// Holds no per-document state, so one instance can serve many threads
/// when the counter is `Sync` (which [`TokenCounter`] requires).
///
/// ## Example
///
/// ```rust
/// use seams::{ChunkingConfig, CharRatioCounter, DocumentChunker};
///
/// let config = ChunkingConfig::new(20).with_max(40).unwrap().with_overlap(5);
/// let chunker = DocumentChunker::new(config, CharRatioCounter::default()).unwrap();
///
/// let doc = "---\ntitle: Walks\n---\n\
///            The path climbs through oak woods above the river. \
///            Near the top it opens onto heath and gorse.\n\n\
///            From the summit the estuary is visible on clear days. \
///            The descent follows an old drovers' road.";
/// let chunks = chunker.chunk(doc, "walks").unwrap();
///
/// assert!(chunks.len() > 1);
/// assert_eq!(chunks[0].metadata.chunk_id, "walks-chunk-000");
/// assert_eq!(chunks[0].metadata.title.as_deref(), Some("Walks"));
/// assert!(chunks.iter().all(|c| c.total_chunks == chunks.len()));
/// ```
#[derive(Debug, Clone)]
pub struct DocumentChunker<C> {
    config: ChunkingConfig,
    counter: C,
}

impl<C: TokenCounter> DocumentChunker<C> {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config` fails
    /// [`ChunkingConfig::validate`].
    pub fn new(config: ChunkingConfig, counter: C) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, counter })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// The token counter in use.
    #[must_use]
    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Chunk a raw document: separate its metadata header, then chunk the body.
    ///
    /// # Errors
    ///
    /// Only token counter failures.
    pub fn chunk(&self, document: &str, parent_id: &str) -> Result<Vec<Chunk>> {
        let (metadata, body) = split_metadata(document);
        self.chunk_body(body, parent_id, &metadata)
    }

    /// Chunk a body whose metadata has already been separated.
    ///
    /// # Errors
    ///
    /// Only token counter failures.
    pub fn chunk_body(
        &self,
        body: &str,
        parent_id: &str,
        metadata: &DocumentMetadata,
    ) -> Result<Vec<Chunk>> {
        let segments = self.segments(body)?;
        let chunks = assemble(body, &segments, parent_id, metadata, &self.config, &self.counter)?;

        tracing::debug!(
            parent_id,
            body_len = body.len(),
            chunks = chunks.len(),
            "chunked document"
        );
        Ok(chunks)
    }

    /// The pre-overlap segmentation of `body`.
    ///
    /// # Errors
    ///
    /// Only token counter failures.
    pub fn segments(&self, body: &str) -> Result<Vec<RawSegment>> {
        let candidates = detect_boundaries(body, &self.config);
        tracing::trace!(candidates = candidates.len(), "detected boundaries");
        segment(body, &self.counter, &self.config, &candidates)
    }

    /// Estimate the number of chunks for a body of `body_len` characters.
    ///
    /// Useful for pre-allocation. Approximate.
    #[must_use]
    pub fn estimate_chunks(&self, body_len: usize) -> usize {
        body_len.div_ceil(self.config.target_chars().max(1)).max(1)
    }
}
