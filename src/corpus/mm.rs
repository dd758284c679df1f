//! Matrix Market serialization of the bag-of-words corpus
//!
//! The `coordinate real general` header needs totals that are unknown until
//! the stream ends, so a fixed-width blank line is reserved up front and
//! patched in place on finalize. Entries stream straight to disk.

use super::bow::CorpusSink;
use super::CorpusError;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

const BANNER: &str = "%%MatrixMarket matrix coordinate real general\n";
/// Reserved width of the size line, excluding its newline
const HEADER_WIDTH: usize = 50;

/// Streaming writer for a sparse corpus in Matrix Market form
///
/// Both coordinates are 1-based in the file. Documents are numbered in the
/// order they are appended; an empty document advances the numbering
/// without emitting entries.
pub struct MatrixMarketWriter {
    out: BufWriter<File>,
    header_offset: u64,
    num_docs: usize,
    num_terms: u32,
    num_nnz: u64,
}

impl MatrixMarketWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let file = File::create(path.as_ref())?;
        let mut out = BufWriter::new(file);

        out.write_all(BANNER.as_bytes())?;
        let header_offset = BANNER.len() as u64;
        out.write_all(&[b' '; HEADER_WIDTH])?;
        out.write_all(b"\n")?;

        Ok(Self {
            out,
            header_offset,
            num_docs: 0,
            num_terms: 0,
            num_nnz: 0,
        })
    }

    /// Documents appended so far
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// Highest 1-based term coordinate seen so far
    pub fn num_terms(&self) -> u32 {
        self.num_terms
    }

    /// Entries written so far
    pub fn num_nnz(&self) -> u64 {
        self.num_nnz
    }

    /// Append one document of `(token_id, count)` pairs, ids ascending
    pub fn append(&mut self, doc: &[(u32, u32)]) -> Result<(), CorpusError> {
        self.num_docs += 1;
        let doc_no = self.num_docs;
        for &(term_id, count) in doc {
            writeln!(self.out, "{} {} {}", doc_no, term_id + 1, count)?;
            self.num_terms = self.num_terms.max(term_id + 1);
            self.num_nnz += 1;
        }
        Ok(())
    }

    /// Patch the size line with the final totals and close the file
    pub fn finalize(self) -> Result<(), CorpusError> {
        let header = format!("{} {} {}", self.num_docs, self.num_terms, self.num_nnz);
        if header.len() > HEADER_WIDTH {
            return Err(CorpusError::HeaderTooLong(header));
        }

        let mut file = self
            .out
            .into_inner()
            .map_err(|e| CorpusError::Io(e.into_error()))?;
        file.seek(SeekFrom::Start(self.header_offset))?;
        file.write_all(header.as_bytes())?;
        Ok(())
    }
}

impl CorpusSink for MatrixMarketWriter {
    fn write_document(&mut self, doc: &[(u32, u32)]) -> Result<(), CorpusError> {
        self.append(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_banner_entries_and_patched_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.mm");

        let mut writer = MatrixMarketWriter::create(&path).unwrap();
        writer.append(&[(0, 1), (2, 3)]).unwrap();
        writer.append(&[]).unwrap();
        writer.append(&[(1, 2)]).unwrap();

        assert_eq!(writer.num_docs(), 3);
        assert_eq!(writer.num_terms(), 3);
        assert_eq!(writer.num_nnz(), 3);
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines[0], "%%MatrixMarket matrix coordinate real general");
        assert_eq!(lines[1].trim_end(), "3 3 3");
        assert_eq!(lines[1].len(), 50);
        // 1-based coordinates; the empty second document leaves no entries
        assert_eq!(lines[2], "1 1 1");
        assert_eq!(lines[3], "1 3 3");
        assert_eq!(lines[4], "3 2 2");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_empty_corpus_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mm");

        let writer = MatrixMarketWriter::create(&path).unwrap();
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[1].trim_end(), "0 0 0");
    }

    #[test]
    fn test_header_patch_preserves_entry_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.mm");

        let mut writer = MatrixMarketWriter::create(&path).unwrap();
        for doc_id in 0..100u32 {
            writer.append(&[(doc_id, 1)]).unwrap();
        }
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[1].trim_end(), "100 100 100");
        assert_eq!(lines[2], "1 1 1");
        assert_eq!(lines[101], "100 100 1");
    }
}
