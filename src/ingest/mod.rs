//! Streaming ingestion of MediaWiki dumps
//!
//! This module turns a dump file into classified rows in the record store
//! without ever holding the dump in memory. Pages stream through an XML
//! event walk, each one is classified from its namespace and redirect
//! target, and article text is normalized before it is written.
//!
//! # Supported Formats
//!
//! - **Plain XML dumps**: uncompressed MediaWiki export (`.xml`)
//! - **Compressed dumps**: bzip2-compressed export (`.xml.bz2`)
//!
//! # Example Usage
//!
//! ```no_run
//! use mkcorpus::config::IngestConfig;
//! use mkcorpus::ingest::IngestRunner;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = IngestRunner::new(IngestConfig::default());
//! let counts = runner.run(
//!     Path::new("enwiki-latest-pages-articles.xml.bz2"),
//!     Path::new("data/records.db"),
//! )?;
//! println!("Stored {} articles", counts.articles);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       IngestRunner                         │
//! │        (two passes: count, then key-assign + store)        │
//! └────────────────────────────────────────────────────────────┘
//!               │                              │
//!               ▼                              ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │      DumpClassifier      │   │      TextNormalizer      │
//! │ - XML event streaming    │   │ - markup stripping       │
//! │ - bz2 decompress         │   │ - stopwords, stemming    │
//! │ - page classification    │   │   (articles only)        │
//! └──────────────────────────┘   └──────────────────────────┘
//!               │                              │
//!               └──────────────┬───────────────┘
//!                              ▼
//!                 ┌──────────────────────────┐
//!                 │       RecordStore        │
//!                 │ template/redirect/       │
//!                 │ articles tables          │
//!                 └──────────────────────────┘
//! ```

pub mod classifier;
pub mod progress;
pub mod record;
pub mod runner;

// Re-export main types
pub use classifier::DumpClassifier;
pub use progress::{IngestProgress, LogStatus, NullStatus, StatusSink};
pub use record::{
    ClassCounts, ClassifiedRecord, DumpFormat, IngestError, PageAccumulator, RecordKind,
};
pub use runner::IngestRunner;
