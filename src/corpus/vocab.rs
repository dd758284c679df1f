//! Token vocabulary built from a full corpus pass

use super::bow::BowDocument;
use super::CorpusError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// On-disk form of [`Vocabulary`]: token strings and document frequencies
/// indexed by id
#[derive(Debug, Serialize, Deserialize)]
struct VocabularyFile {
    num_docs: usize,
    tokens: Vec<String>,
    doc_freqs: Vec<u32>,
}

/// Token ↔ id mapping with per-token document frequencies
///
/// Ids are assigned in first-seen order across one full pass over the
/// corpus. The mapping is frozen after that pass and reused verbatim by the
/// encoding pass, so both passes must walk documents in the same order.
#[derive(Debug, Default)]
pub struct Vocabulary {
    ids: HashMap<String, u32>,
    tokens: Vec<String>,
    doc_freqs: Vec<u32>,
    num_docs: usize,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one document into the vocabulary: unseen tokens get the next id
    /// in encounter order, and each distinct token bumps its document
    /// frequency once
    pub fn add_document(&mut self, tokens: &[String]) {
        let mut seen: HashSet<u32> = HashSet::new();
        for token in tokens {
            let id = match self.ids.get(token) {
                Some(&id) => id,
                None => {
                    let id = self.tokens.len() as u32;
                    self.ids.insert(token.clone(), id);
                    self.tokens.push(token.clone());
                    self.doc_freqs.push(0);
                    id
                }
            };
            if seen.insert(id) {
                self.doc_freqs[id as usize] += 1;
            }
        }
        self.num_docs += 1;
    }

    /// Number of documents folded in
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Document frequency for `id`; unknown ids count zero
    pub fn doc_freq(&self, id: u32) -> u32 {
        self.doc_freqs.get(id as usize).copied().unwrap_or(0)
    }

    /// Sparse bag-of-words for one document, ids strictly ascending.
    /// Tokens outside the vocabulary are skipped.
    pub fn doc2bow(&self, tokens: &[String]) -> BowDocument {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(&id) = self.ids.get(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    /// Write the compact id-map artifact
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CorpusError> {
        let file = File::create(path)?;
        let payload = VocabularyFile {
            num_docs: self.num_docs,
            tokens: self.tokens.clone(),
            doc_freqs: self.doc_freqs.clone(),
        };
        serde_json::to_writer(BufWriter::new(file), &payload)?;
        Ok(())
    }

    /// Load a vocabulary saved with [`Vocabulary::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let file = File::open(path)?;
        let payload: VocabularyFile = serde_json::from_reader(BufReader::new(file))?;

        if payload.tokens.len() != payload.doc_freqs.len() {
            return Err(CorpusError::Malformed(format!(
                "{} tokens but {} document frequencies",
                payload.tokens.len(),
                payload.doc_freqs.len()
            )));
        }

        let ids = payload
            .tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as u32))
            .collect();

        Ok(Self {
            ids,
            tokens: payload.tokens,
            doc_freqs: payload.doc_freqs,
            num_docs: payload.num_docs,
        })
    }

    /// Write the human-readable listing: document count on the first line,
    /// then one `id<TAB>token<TAB>doc_frequency` line per token, sorted by
    /// token
    pub fn save_as_text(&self, path: impl AsRef<Path>) -> Result<(), CorpusError> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "{}", self.num_docs)?;
        let mut order: Vec<u32> = (0..self.tokens.len() as u32).collect();
        order.sort_by(|a, b| self.tokens[*a as usize].cmp(&self.tokens[*b as usize]));
        for id in order {
            writeln!(
                out,
                "{}\t{}\t{}",
                id, self.tokens[id as usize], self.doc_freqs[id as usize]
            )?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_ids_assigned_in_first_seen_order() {
        let mut vocab = Vocabulary::new();
        vocab.add_document(&doc(&["b", "a", "b"]));
        vocab.add_document(&doc(&["c", "a"]));

        assert_eq!(vocab.id_of("b"), Some(0));
        assert_eq!(vocab.id_of("a"), Some(1));
        assert_eq!(vocab.id_of("c"), Some(2));
        assert_eq!(vocab.id_of("z"), None);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.num_docs(), 2);
    }

    #[test]
    fn test_document_frequencies_count_documents_not_occurrences() {
        let mut vocab = Vocabulary::new();
        vocab.add_document(&doc(&["a", "a", "a"]));
        vocab.add_document(&doc(&["a", "b"]));

        assert_eq!(vocab.doc_freq(0), 2); // "a" appears in both documents
        assert_eq!(vocab.doc_freq(1), 1);
        assert_eq!(vocab.doc_freq(9), 0);
    }

    #[test]
    fn test_doc2bow_sorted_and_merged() {
        let mut vocab = Vocabulary::new();
        vocab.add_document(&doc(&["b", "a", "c"]));

        let bow = vocab.doc2bow(&doc(&["c", "b", "c", "unknown"]));
        assert_eq!(bow, vec![(0, 1), (2, 2)]);

        let ids: Vec<u32> = bow.iter().map(|(id, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_doc2bow_of_empty_document() {
        let mut vocab = Vocabulary::new();
        vocab.add_document(&doc(&["a"]));
        assert!(vocab.doc2bow(&[]).is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.json");

        let mut vocab = Vocabulary::new();
        vocab.add_document(&doc(&["beta", "alpha"]));
        vocab.add_document(&doc(&["alpha"]));
        vocab.save(&path).unwrap();

        let loaded = Vocabulary::load(&path).unwrap();
        assert_eq!(loaded.num_docs(), 2);
        assert_eq!(loaded.id_of("beta"), Some(0));
        assert_eq!(loaded.id_of("alpha"), Some(1));
        assert_eq!(loaded.doc_freq(1), 2);
    }

    #[test]
    fn test_save_as_text_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.txt");

        let mut vocab = Vocabulary::new();
        vocab.add_document(&doc(&["beta", "alpha", "beta"]));
        vocab.save_as_text(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "1");
        // Sorted by token, not by id
        assert_eq!(lines[1], "1\talpha\t1");
        assert_eq!(lines[2], "0\tbeta\t1");
    }

    #[test]
    fn test_load_rejects_mismatched_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"num_docs":1,"tokens":["a","b"],"doc_freqs":[1]}"#).unwrap();

        match Vocabulary::load(&path) {
            Err(CorpusError::Malformed(_)) => {}
            other => panic!("expected malformed error, got {:?}", other),
        }
    }
}
