//! The Chunk type: the final, overlap-extended output unit.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::metadata::{render_header, DocumentMetadata};
use crate::Result;

/// Metadata attached to every chunk.
///
/// The parent's `title`, `author`, `source`, `category`, `tags` and `url`
/// are copied; everything else in the parent header is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Identifier of the document this chunk came from.
    pub parent_id: String,
    /// `{parent_id}-chunk-{index:03}`.
    pub chunk_id: String,
    /// Zero-based position within the parent.
    pub chunk_index: usize,
    /// Number of chunks the parent produced.
    pub total_chunks: usize,
    /// Parent title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Parent author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Where the parent came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Parent category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Parent tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parent canonical URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ChunkMetadata {
    /// Build the metadata for chunk `chunk_index` of `total_chunks`.
    #[must_use]
    pub fn new(
        parent_id: &str,
        chunk_index: usize,
        total_chunks: usize,
        parent: &DocumentMetadata,
    ) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            chunk_id: chunk_id(parent_id, chunk_index),
            chunk_index,
            total_chunks,
            title: parent.title.clone(),
            author: parent.author.clone(),
            source: parent.source.clone(),
            category: parent.category.clone(),
            tags: parent.tags.clone(),
            url: parent.url.clone(),
        }
    }

    /// Recover chunk metadata from a header parsed by
    /// [`split_metadata`](crate::split_metadata).
    ///
    /// Returns `None` if any synthesized field is missing or malformed.
    #[must_use]
    pub fn from_document_metadata(meta: &DocumentMetadata) -> Option<Self> {
        let field = |name: &str| meta.extra.get(name);
        Some(Self {
            parent_id: field("parent_id")?.clone(),
            chunk_id: field("chunk_id")?.clone(),
            chunk_index: field("chunk_index")?.parse().ok()?,
            total_chunks: field("total_chunks")?.parse().ok()?,
            title: meta.title.clone(),
            author: meta.author.clone(),
            source: meta.source.clone(),
            category: meta.category.clone(),
            tags: meta.tags.clone(),
            url: meta.url.clone(),
        })
    }
}

/// Deterministic identifier of chunk `index` of `parent_id`.
///
/// ```rust
/// assert_eq!(seams::chunk_id("doc-7", 3), "doc-7-chunk-003");
/// assert_eq!(seams::chunk_id("doc-7", 1234), "doc-7-chunk-1234");
/// ```
#[must_use]
pub fn chunk_id(parent_id: &str, index: usize) -> String {
    format!("{parent_id}-chunk-{index:03}")
}

/// SHA-256 of `content`, lowercase hex.
#[must_use]
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// A chunk of a document, ready to embed.
///
/// ## Core and Overlap
///
/// `content` is the core range of the body plus text borrowed from the
/// neighbouring segments:
///
/// ```text
/// body:     ....xxxx[cccccccccccc]yyyy....
///                   ^char_start  ^char_end
/// content:      xxxx cccccccccccc yyyy
///               |--|              |--|
///   overlap_start_len            overlap_end_len
/// ```
///
/// All offsets and lengths are byte offsets into the body, not character
/// indices. They always fall on char boundaries, so `&body[chunk.span()]`
/// is the core text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text to embed, overlap included.
    pub content: String,
    /// Zero-based position within the parent.
    pub chunk_index: usize,
    /// Number of chunks the parent produced.
    pub total_chunks: usize,
    /// Token count of `content`.
    pub token_count: usize,
    /// Start of the core range in the body.
    pub char_start: usize,
    /// End of the core range in the body (exclusive).
    pub char_end: usize,
    /// Bytes borrowed from the previous segment.
    pub overlap_start_len: usize,
    /// Bytes borrowed from the next segment.
    pub overlap_end_len: usize,
    /// Parent metadata plus this chunk's identity.
    pub metadata: ChunkMetadata,
    /// SHA-256 hex of `content`.
    pub content_fingerprint: String,
}

impl Chunk {
    /// The core text, without borrowed overlap.
    #[must_use]
    pub fn core(&self) -> &str {
        &self.content[self.overlap_start_len..self.content.len() - self.overlap_end_len]
    }

    /// The text prepended from the previous segment.
    #[must_use]
    pub fn leading_overlap(&self) -> &str {
        &self.content[..self.overlap_start_len]
    }

    /// The text appended from the next segment.
    #[must_use]
    pub fn trailing_overlap(&self) -> &str {
        &self.content[self.content.len() - self.overlap_end_len..]
    }

    /// Byte span of the core range in the body.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.char_start..self.char_end
    }

    /// Byte span of `content` in the body, overlap included.
    #[must_use]
    pub fn extended_span(&self) -> std::ops::Range<usize> {
        self.char_start - self.overlap_start_len..self.char_end + self.overlap_end_len
    }

    /// Render the chunk as a document: its metadata header followed by its
    /// content.
    ///
    /// Feeding the result to [`split_metadata`](crate::split_metadata)
    /// returns `content` as the body, and
    /// [`ChunkMetadata::from_document_metadata`] recovers `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`](crate::Error::Render) if YAML rendering fails.
    pub fn to_document(&self) -> Result<String> {
        let mut doc = render_header(&self.metadata)?;
        doc.push_str(&self.content);
        Ok(doc)
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk {{ id: {}, span: {}..{}, overlap: -{}/+{}, tokens: {} }}",
            self.metadata.chunk_id,
            self.char_start,
            self.char_end,
            self.overlap_start_len,
            self.overlap_end_len,
            self.token_count
        )
    }
}
