//! Streaming classification of MediaWiki dump XML
//!
//! Walks the dump one event at a time and emits one classified record per
//! `<page>` subtree. Memory held is bounded by a single in-flight page no
//! matter how large the dump is: the event buffer is cleared after every
//! event and the accumulator is consumed when its page closes.

use super::record::{
    ClassCounts, ClassifiedRecord, DumpFormat, IngestError, PageAccumulator,
};
use bzip2::read::BzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// XML event reader over a plain or bzip2-compressed dump
enum DumpReader {
    Bzip2(Reader<BufReader<BzDecoder<File>>>),
    Plain(Reader<BufReader<File>>),
}

impl DumpReader {
    fn read_event<'a>(&mut self, buf: &'a mut Vec<u8>) -> Result<Event<'a>, quick_xml::Error> {
        buf.clear();
        match self {
            DumpReader::Bzip2(reader) => reader.read_event_into(buf),
            DumpReader::Plain(reader) => reader.read_event_into(buf),
        }
    }
}

/// Event-driven walker that classifies every page of a dump
pub struct DumpClassifier {
    reader: DumpReader,
    page: Option<PageAccumulator>,
    counts: ClassCounts,
}

impl DumpClassifier {
    /// Open a dump file, decompressing transparently when the name ends in
    /// `.bz2`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let reader = match DumpFormat::detect(path) {
            DumpFormat::Bzip2Xml => {
                let decoder = BzDecoder::new(file);
                let buf_reader = BufReader::with_capacity(1024 * 1024, decoder);
                DumpReader::Bzip2(Reader::from_reader(buf_reader))
            }
            DumpFormat::PlainXml => {
                let buf_reader = BufReader::with_capacity(1024 * 1024, file);
                DumpReader::Plain(Reader::from_reader(buf_reader))
            }
        };

        Ok(Self {
            reader,
            page: None,
            counts: ClassCounts::default(),
        })
    }

    /// Counters for every record emitted so far
    pub fn counts(&self) -> &ClassCounts {
        &self.counts
    }

    /// Parse forward to the next complete page. `Ok(None)` means the stream
    /// is exhausted; any structural error aborts the walk, and input that
    /// ends inside an open page is a truncation error, not exhaustion.
    pub fn next_record(&mut self) -> Result<Option<ClassifiedRecord>, IngestError> {
        let mut buf = Vec::with_capacity(8192);
        let mut text_buf = String::new();
        let mut current_element: Option<String> = None;

        loop {
            let event = self.reader.read_event(&mut buf)?;

            match event {
                Event::Start(ref e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                    match name.as_str() {
                        "page" => {
                            self.page = Some(PageAccumulator::default());
                        }
                        "revision" => {
                            if let Some(ref mut page) = self.page {
                                page.in_revision = true;
                            }
                        }
                        "redirect" => {
                            self.capture_redirect_target(e)?;
                        }
                        "title" | "id" | "ns" | "text" => {
                            current_element = Some(name);
                            text_buf.clear();
                        }
                        _ => {}
                    }
                }
                // <redirect title="..."/> is an empty element in real dumps
                Event::Empty(ref e) => {
                    if e.name().as_ref() == b"redirect" {
                        self.capture_redirect_target(e)?;
                    }
                }
                Event::Text(ref e) => {
                    if current_element.is_some() {
                        text_buf.push_str(&e.unescape()?);
                    }
                }
                Event::CData(ref e) => {
                    if current_element.is_some() {
                        text_buf.push_str(&String::from_utf8(e.to_vec())?);
                    }
                }
                Event::End(ref e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                    if let Some(ref mut page) = self.page {
                        match name.as_str() {
                            "revision" => {
                                page.in_revision = false;
                            }
                            "title" => {
                                page.title = std::mem::take(&mut text_buf);
                                current_element = None;
                            }
                            "id" => {
                                // Revision and contributor ids repeat the
                                // element name; only the page id counts.
                                if !page.in_revision {
                                    page.wiki_id = parse_wiki_id(&text_buf)?;
                                }
                                current_element = None;
                            }
                            "ns" => {
                                page.namespace = text_buf.trim().parse().unwrap_or(0);
                                current_element = None;
                            }
                            "text" => {
                                page.text = std::mem::take(&mut text_buf);
                                current_element = None;
                            }
                            "page" => {
                                let page = match self.page.take() {
                                    Some(p) => p,
                                    None => continue,
                                };
                                let record = ClassifiedRecord::classify(page);
                                self.counts.record(record.kind());
                                return Ok(Some(record));
                            }
                            _ => {}
                        }
                    }
                }
                Event::Eof => {
                    // The XML reader reports a bare end-of-input even with
                    // elements still open, so the in-flight page is the
                    // truncation signal.
                    return match self.page.take() {
                        Some(page) => Err(IngestError::TruncatedDump(page.title)),
                        None => Ok(None),
                    };
                }
                _ => {}
            }
        }
    }

    /// Borrowing iterator over the remaining records
    pub fn records(&mut self) -> RecordIter<'_> {
        RecordIter { classifier: self }
    }

    fn capture_redirect_target(&mut self, e: &BytesStart) -> Result<(), IngestError> {
        if let Some(ref mut page) = self.page {
            let attr = e
                .try_get_attribute("title")
                .map_err(|err| IngestError::XmlParse(err.to_string()))?;
            // A redirect without a title attribute is an empty target, not
            // an error.
            page.redirect_target = match attr {
                Some(attr) => attr
                    .unescape_value()
                    .map_err(|err| IngestError::XmlParse(err.to_string()))?
                    .into_owned(),
                None => String::new(),
            };
        }
        Ok(())
    }
}

fn parse_wiki_id(text: &str) -> Result<i64, IngestError> {
    text.trim()
        .parse()
        .map_err(|_| IngestError::Parse(format!("invalid page id '{}'", text.trim())))
}

/// Iterator adapter over [`DumpClassifier::next_record`]
pub struct RecordIter<'a> {
    classifier: &'a mut DumpClassifier,
}

impl Iterator for RecordIter<'_> {
    type Item = Result<ClassifiedRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.classifier.next_record().transpose()
    }
}
