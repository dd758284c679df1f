//! Sparse bag-of-words documents and the corpus sink seam

use super::CorpusError;

/// One document as `(token_id, count)` pairs with strictly ascending ids
pub type BowDocument = Vec<(u32, u32)>;

/// Receiver for encoded documents during the second corpus pass
///
/// Documents arrive in article-key order, one call per document. Empty
/// documents are delivered too, so a sink can keep its own document
/// numbering aligned with the key space.
pub trait CorpusSink {
    fn write_document(&mut self, doc: &[(u32, u32)]) -> Result<(), CorpusError>;
}
