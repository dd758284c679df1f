//! Two-pass corpus construction over stored articles
//!
//! Reads normalized articles back from the record store in key order and
//! turns them into a token vocabulary plus a sparse bag-of-words corpus.
//! Both passes stream one document at a time; nothing here ever holds the
//! corpus in memory.
//!
//! # Example Usage
//!
//! ```no_run
//! use mkcorpus::config::CorpusConfig;
//! use mkcorpus::corpus::CorpusBuilder;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = CorpusBuilder::new(CorpusConfig::default());
//! let stats = builder.build(Path::new("data/records.db"), Path::new("data"))?;
//! println!("{} documents, {} terms", stats.num_docs, stats.num_terms);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       CorpusBuilder                        │
//! └────────────────────────────────────────────────────────────┘
//!        │ pass 1                           │ pass 2
//!        ▼                                  ▼
//! ┌──────────────────┐             ┌──────────────────┐
//! │ DocumentIterator │             │ DocumentIterator │
//! │ (own connection) │             │ (own connection) │
//! └──────────────────┘             └──────────────────┘
//!        │                                  │
//!        ▼                                  ▼
//! ┌──────────────────┐   doc2bow   ┌──────────────────┐
//! │    Vocabulary    │ ──────────> │    CorpusSink    │
//! │ ids, doc freqs   │             │ (Matrix Market)  │
//! └──────────────────┘             └──────────────────┘
//! ```

pub mod bow;
pub mod builder;
pub mod iter;
pub mod mm;
pub mod vocab;

// Re-export main types
pub use bow::{BowDocument, CorpusSink};
pub use builder::{CorpusBuilder, CorpusStats};
pub use iter::DocumentIterator;
pub use mm::MatrixMarketWriter;
pub use vocab::Vocabulary;

use thiserror::Error;

/// Errors from corpus construction
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("document {0} missing from store")]
    MissingDocument(i64),

    #[error("vocabulary serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("vocabulary file malformed: {0}")]
    Malformed(String),

    #[error("matrix header exceeds reserved space: {0}")]
    HeaderTooLong(String),
}
