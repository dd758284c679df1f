//! Text preparation for corpus construction
//!
//! Turns raw wiki markup into the flat token lists the corpus is built
//! from. Stripping and normalization are separate stages so the stripper
//! can be reused on its own:
//!
//! ```text
//! raw markup ── MarkupStripper ──> plain text ── TextNormalizer ──> tokens
//!                (templates,          (lowercase, stopwords,
//!                 tables, links)       stemming)
//! ```
//!
//! # Example Usage
//!
//! ```
//! use mkcorpus::text::TextNormalizer;
//!
//! let normalizer = TextNormalizer::new();
//! let tokens = normalizer.normalize("The '''quick''' fox [[jump|jumped]].");
//! assert_eq!(tokens, vec!["quick", "fox", "jump"]);
//! ```

pub mod markup;
pub mod normalizer;

pub use markup::MarkupStripper;
pub use normalizer::TextNormalizer;
