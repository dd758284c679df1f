//! Two-pass corpus construction

use super::bow::CorpusSink;
use super::iter::DocumentIterator;
use super::mm::MatrixMarketWriter;
use super::vocab::Vocabulary;
use super::CorpusError;
use crate::config::CorpusConfig;
use crate::ingest::{LogStatus, NullStatus, StatusSink};
use std::path::Path;
use tracing::info;

/// Totals reported after a build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStats {
    pub num_docs: usize,
    pub num_terms: usize,
    pub num_nnz: u64,
}

/// Orchestrates the vocabulary pass and the encoding pass
pub struct CorpusBuilder {
    config: CorpusConfig,
    quiet: bool,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Self {
        Self {
            config,
            quiet: false,
        }
    }

    /// Set quiet mode (no status output)
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// First pass: fold every document into a fresh vocabulary
    pub fn build_vocabulary<S: StatusSink>(
        &self,
        db_path: &Path,
        status: &S,
    ) -> Result<Vocabulary, CorpusError> {
        let documents = DocumentIterator::open(db_path)?;
        let total = documents.len();
        info!("Vocabulary pass over {} documents", total);

        let interval = self.config.status_interval.max(1);
        let mut vocab = Vocabulary::new();
        for (index, doc) in documents.enumerate() {
            vocab.add_document(&doc?);
            if (index + 1) % interval == 0 {
                status.report(index + 1, interval, total);
            }
        }
        Ok(vocab)
    }

    /// Second pass: encode every document against `vocab` into `sink`.
    /// Walks the same key order as the vocabulary pass.
    pub fn encode_to<S: CorpusSink, T: StatusSink>(
        &self,
        db_path: &Path,
        vocab: &Vocabulary,
        sink: &mut S,
        status: &T,
    ) -> Result<usize, CorpusError> {
        let documents = DocumentIterator::open(db_path)?;
        let total = documents.len();
        let interval = self.config.status_interval.max(1);

        let mut encoded = 0;
        for doc in documents {
            let bow = vocab.doc2bow(&doc?);
            sink.write_document(&bow)?;
            encoded += 1;
            if encoded % interval == 0 {
                status.report(encoded, interval, total);
            }
        }
        Ok(encoded)
    }

    /// Run both passes and write the three artifacts into `out_dir`
    pub fn build(&self, db_path: &Path, out_dir: &Path) -> Result<CorpusStats, CorpusError> {
        if self.quiet {
            self.build_with(db_path, out_dir, &NullStatus)
        } else {
            self.build_with(db_path, out_dir, &LogStatus::new("documents"))
        }
    }

    fn build_with<S: StatusSink>(
        &self,
        db_path: &Path,
        out_dir: &Path,
        status: &S,
    ) -> Result<CorpusStats, CorpusError> {
        std::fs::create_dir_all(out_dir)?;

        let vocab = self.build_vocabulary(db_path, status)?;
        info!(
            "Vocabulary holds {} tokens over {} documents",
            vocab.len(),
            vocab.num_docs()
        );

        vocab.save(out_dir.join(&self.config.dictionary_json))?;
        vocab.save_as_text(out_dir.join(&self.config.dictionary_text))?;

        let mut writer = MatrixMarketWriter::create(out_dir.join(&self.config.corpus_file))?;
        self.encode_to(db_path, &vocab, &mut writer, status)?;
        let stats = CorpusStats {
            num_docs: writer.num_docs(),
            num_terms: writer.num_terms() as usize,
            num_nnz: writer.num_nnz(),
        };
        writer.finalize()?;

        info!(
            "Corpus written: {} documents, {} terms, {} entries",
            stats.num_docs, stats.num_terms, stats.num_nnz
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::bow::BowDocument;
    use crate::ingest::RecordKind;
    use crate::store::{RecordRow, RecordStore};
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Sink that collects encoded documents in memory
    #[derive(Default)]
    struct MemorySink {
        documents: Vec<BowDocument>,
    }

    impl CorpusSink for MemorySink {
        fn write_document(&mut self, doc: &[(u32, u32)]) -> Result<(), CorpusError> {
            self.documents.push(doc.to_vec());
            Ok(())
        }
    }

    /// Status sink that records every reported document count
    #[derive(Default)]
    struct RecordingStatus {
        reports: RefCell<Vec<usize>>,
    }

    impl StatusSink for RecordingStatus {
        fn record(&self, _kind: RecordKind, _title: &str) {}

        fn report(&self, current: usize, _interval: usize, _total: usize) {
            self.reports.borrow_mut().push(current);
        }
    }

    fn seed_store(dir: &tempfile::TempDir) -> PathBuf {
        let db_path = dir.path().join("records.db");
        let store = RecordStore::open(&db_path).unwrap();
        let articles = [
            (0, "alpha beta alpha"),
            (1, "beta gamma"),
            (2, ""),
        ];
        for (key, text) in articles {
            store
                .insert(&RecordRow::Article {
                    key,
                    wiki_id: 100 + key,
                    title: "Doc",
                    text,
                })
                .unwrap();
        }
        db_path
    }

    #[test]
    fn test_vocabulary_pass() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = seed_store(&dir);

        let builder = CorpusBuilder::new(CorpusConfig::default());
        let vocab = builder.build_vocabulary(&db_path, &NullStatus).unwrap();

        assert_eq!(vocab.num_docs(), 3);
        assert_eq!(vocab.id_of("alpha"), Some(0));
        assert_eq!(vocab.id_of("beta"), Some(1));
        assert_eq!(vocab.id_of("gamma"), Some(2));
        assert_eq!(vocab.doc_freq(1), 2); // "beta" appears in two documents
    }

    #[test]
    fn test_encoding_pass_into_memory_sink() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = seed_store(&dir);

        let builder = CorpusBuilder::new(CorpusConfig::default());
        let vocab = builder.build_vocabulary(&db_path, &NullStatus).unwrap();

        let mut sink = MemorySink::default();
        let encoded = builder
            .encode_to(&db_path, &vocab, &mut sink, &NullStatus)
            .unwrap();

        assert_eq!(encoded, 3);
        assert_eq!(sink.documents[0], vec![(0, 2), (1, 1)]);
        assert_eq!(sink.documents[1], vec![(1, 1), (2, 1)]);
        assert!(sink.documents[2].is_empty());
    }

    #[test]
    fn test_status_reported_every_interval() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = seed_store(&dir);

        let config = CorpusConfig {
            status_interval: 2,
            ..CorpusConfig::default()
        };
        let builder = CorpusBuilder::new(config);

        let status = RecordingStatus::default();
        let vocab = builder.build_vocabulary(&db_path, &status).unwrap();
        // 3 documents at interval 2 fire exactly one report
        assert_eq!(*status.reports.borrow(), vec![2]);

        let status = RecordingStatus::default();
        let mut sink = MemorySink::default();
        builder
            .encode_to(&db_path, &vocab, &mut sink, &status)
            .unwrap();
        assert_eq!(*status.reports.borrow(), vec![2]);
    }

    #[test]
    fn test_build_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = seed_store(&dir);
        let out_dir = dir.path().join("artifacts");

        let builder = CorpusBuilder::new(CorpusConfig::default()).with_quiet(true);
        let stats = builder.build(&db_path, &out_dir).unwrap();

        assert_eq!(stats.num_docs, 3);
        assert_eq!(stats.num_terms, 3);
        assert_eq!(stats.num_nnz, 4);

        let vocab = Vocabulary::load(out_dir.join("dictionary.json")).unwrap();
        assert_eq!(vocab.len(), 3);

        let listing = std::fs::read_to_string(out_dir.join("dictionary.txt")).unwrap();
        assert_eq!(listing.lines().next(), Some("3"));

        let mm = std::fs::read_to_string(out_dir.join("corpus.mm")).unwrap();
        let lines: Vec<&str> = mm.lines().collect();
        assert_eq!(lines[1].trim_end(), "3 3 4");
    }

    #[test]
    fn test_build_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("records.db");
        RecordStore::open(&db_path).unwrap();
        let out_dir = dir.path().join("artifacts");

        let builder = CorpusBuilder::new(CorpusConfig::default()).with_quiet(true);
        let stats = builder.build(&db_path, &out_dir).unwrap();

        assert_eq!(stats.num_docs, 0);
        assert_eq!(stats.num_terms, 0);
        assert_eq!(stats.num_nnz, 0);
        assert!(out_dir.join("corpus.mm").exists());
    }
}
