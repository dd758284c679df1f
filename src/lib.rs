//! mkcorpus: streaming corpus construction from MediaWiki dumps
//!
//! Builds a bag-of-words corpus from a raw Wikipedia XML dump in two
//! stages, never holding the dump in memory:
//! - **Ingest**: stream the dump, classify every page (template, redirect,
//!   article), normalize article text, and store rows in SQLite under
//!   randomly permuted corpus keys
//! - **Corpus**: two lazy passes over the stored articles producing a token
//!   vocabulary and a sparse Matrix Market corpus

pub mod config;
pub mod corpus;
pub mod ingest;
pub mod keys;
pub mod store;
pub mod text;
pub mod util;

pub use config::Config;
