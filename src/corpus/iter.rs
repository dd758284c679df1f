//! Restartable key-order iteration over stored articles

use super::CorpusError;
use crate::store::{RecordStore, TableKind};
use std::path::Path;

/// One lazy pass over the articles table in ascending key order
///
/// Each pass opens its own connection and releases it when the iterator is
/// dropped, so independent passes over the same store never share state.
/// Keys are expected to be dense on `[0, N)`; a hole is reported as
/// [`CorpusError::MissingDocument`].
pub struct DocumentIterator {
    store: RecordStore,
    num_documents: usize,
    next_key: i64,
}

impl DocumentIterator {
    /// Open a fresh pass over the store at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let store = RecordStore::open(db_path)?;
        let num_documents = store.count(TableKind::Article)?;
        Ok(Self {
            store,
            num_documents,
            next_key: 0,
        })
    }

    /// Number of documents this pass will yield
    pub fn len(&self) -> usize {
        self.num_documents
    }

    pub fn is_empty(&self) -> bool {
        self.num_documents == 0
    }
}

impl Iterator for DocumentIterator {
    type Item = Result<Vec<String>, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_key >= self.num_documents as i64 {
            return None;
        }
        let key = self.next_key;
        self.next_key += 1;

        match self.store.article_text(key) {
            Ok(Some(text)) => Some(Ok(text
                .split_whitespace()
                .map(str::to_string)
                .collect())),
            Ok(None) => Some(Err(CorpusError::MissingDocument(key))),
            Err(e) => Some(Err(e.into())),
        }
    }
}
