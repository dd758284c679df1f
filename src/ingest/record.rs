//! Core types for dump ingestion and classification

use std::path::Path;
use thiserror::Error;

/// Mutable per-page state while walking a page subtree.
///
/// Fresh values are installed on every `<page>` start; nothing outlives the
/// page that produced it. `in_revision` tracks whether the walk is inside the
/// nested `<revision>` element, whose own `<id>` must not overwrite the page
/// id.
#[derive(Debug, Clone)]
pub struct PageAccumulator {
    pub title: String,
    pub wiki_id: i64,
    pub redirect_target: String,
    pub namespace: i64,
    pub text: String,
    pub in_revision: bool,
}

impl Default for PageAccumulator {
    fn default() -> Self {
        Self {
            title: String::new(),
            wiki_id: -1,
            redirect_target: String::new(),
            namespace: 0,
            text: String::new(),
            in_revision: false,
        }
    }
}

/// Namespace value that marks a template page
pub const TEMPLATE_NAMESPACE: i64 = 10;

/// Record kind, used for counting and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Template,
    Redirect,
    Article,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Template => "template",
            RecordKind::Redirect => "redirect",
            RecordKind::Article => "article",
        }
    }
}

/// A fully classified record from the dump.
///
/// Classification is a pure function of `(namespace, redirect_target)`:
/// namespace 10 wins over everything, then a non-empty redirect target, then
/// article. Exactly one variant matches any input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedRecord {
    Template {
        wiki_id: i64,
        title: String,
    },
    Redirect {
        wiki_id: i64,
        title: String,
        target: String,
    },
    Article {
        wiki_id: i64,
        title: String,
        text: String,
    },
}

impl ClassifiedRecord {
    /// Classify a finished page accumulator
    pub fn classify(page: PageAccumulator) -> Self {
        if page.namespace == TEMPLATE_NAMESPACE {
            ClassifiedRecord::Template {
                wiki_id: page.wiki_id,
                title: page.title,
            }
        } else if !page.redirect_target.is_empty() {
            ClassifiedRecord::Redirect {
                wiki_id: page.wiki_id,
                title: page.title,
                target: page.redirect_target,
            }
        } else {
            ClassifiedRecord::Article {
                wiki_id: page.wiki_id,
                title: page.title,
                text: page.text,
            }
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            ClassifiedRecord::Template { .. } => RecordKind::Template,
            ClassifiedRecord::Redirect { .. } => RecordKind::Redirect,
            ClassifiedRecord::Article { .. } => RecordKind::Article,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ClassifiedRecord::Template { title, .. } => title,
            ClassifiedRecord::Redirect { title, .. } => title,
            ClassifiedRecord::Article { title, .. } => title,
        }
    }
}

/// Classification counters for one walk of the dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub total: usize,
    pub templates: usize,
    pub redirects: usize,
    pub articles: usize,
}

impl ClassCounts {
    pub fn record(&mut self, kind: RecordKind) {
        self.total += 1;
        match kind {
            RecordKind::Template => self.templates += 1,
            RecordKind::Redirect => self.redirects += 1,
            RecordKind::Article => self.articles += 1,
        }
    }
}

/// Dump file format, detected from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// Uncompressed XML
    PlainXml,
    /// bzip2-compressed XML
    Bzip2Xml,
}

impl DumpFormat {
    pub fn detect(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if name.ends_with(".bz2") {
            DumpFormat::Bzip2Xml
        } else {
            DumpFormat::PlainXml
        }
    }
}

/// Errors raised while walking a dump.
///
/// Structural problems are fatal: the walk stops at the first one and no
/// partial record is recovered.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("UTF-8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("dump truncated inside page '{0}'")]
    TruncatedDump(String),

    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),
}

impl From<quick_xml::Error> for IngestError {
    fn from(e: quick_xml::Error) -> Self {
        IngestError::XmlParse(e.to_string())
    }
}
