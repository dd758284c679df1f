//! Status reporting for dump ingestion

use super::record::{ClassCounts, RecordKind};
use crate::util::{elapsed_hms, truncate_str};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Sink for pass status updates
///
/// The driving loop calls [`StatusSink::record`] once per classified page
/// and [`StatusSink::report`] once per status interval of processed items,
/// so a sink never has to do its own cadence bookkeeping. Passes that do
/// not classify (the corpus passes) only ever call `report`.
pub trait StatusSink {
    /// Called for every page classified
    fn record(&self, kind: RecordKind, title: &str);

    /// Called every `interval` processed items with the running count.
    /// `total` is exact where the pass knows it (the storing and corpus
    /// passes) and the configured estimate in the counting pass; zero
    /// means unknown.
    fn report(&self, current: usize, interval: usize, total: usize);
}

/// Sink that discards all updates
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn record(&self, _kind: RecordKind, _title: &str) {}

    fn report(&self, _current: usize, _interval: usize, _total: usize) {}
}

/// Sink that logs one line per report and ignores per-record updates.
///
/// Serves the passes that have no progress bar: the counting pass and the
/// two corpus passes.
pub struct LogStatus {
    noun: &'static str,
}

impl LogStatus {
    pub fn new(noun: &'static str) -> Self {
        Self { noun }
    }
}

impl StatusSink for LogStatus {
    fn record(&self, _kind: RecordKind, _title: &str) {}

    fn report(&self, current: usize, _interval: usize, total: usize) {
        if total > 0 {
            let percent = current as f64 / total as f64 * 100.0;
            tracing::info!(
                "Processed {} of {} {} ({:.1}%)",
                current,
                total,
                self.noun,
                percent
            );
        } else {
            tracing::info!("Processed {} {}", current, self.noun);
        }
    }
}

/// Progress tracker for ingest runs
pub struct IngestProgress {
    /// Progress bar (None if running in quiet mode)
    progress_bar: Option<ProgressBar>,
    /// Start time
    start_time: Instant,
    /// Pages classified
    pages: AtomicUsize,
    /// Template rows stored
    templates: AtomicUsize,
    /// Redirect rows stored
    redirects: AtomicUsize,
    /// Article rows stored
    articles: AtomicUsize,
}

impl IngestProgress {
    /// Create a new progress tracker. `total_articles` sizes the bar; zero
    /// falls back to a spinner.
    pub fn new(total_articles: usize, quiet: bool) -> Self {
        let progress_bar = if !quiet {
            let pb = if total_articles > 0 {
                ProgressBar::new(total_articles as u64)
            } else {
                ProgressBar::new_spinner()
            };

            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );

            Some(pb)
        } else {
            None
        };

        Self {
            progress_bar,
            start_time: Instant::now(),
            pages: AtomicUsize::new(0),
            templates: AtomicUsize::new(0),
            redirects: AtomicUsize::new(0),
            articles: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the counters seen so far
    pub fn counts(&self) -> ClassCounts {
        ClassCounts {
            total: self.pages.load(Ordering::Relaxed),
            templates: self.templates.load(Ordering::Relaxed),
            redirects: self.redirects.load(Ordering::Relaxed),
            articles: self.articles.load(Ordering::Relaxed),
        }
    }

    /// Finish the progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            let counts = self.counts();
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                counts.total as f64 / elapsed
            } else {
                0.0
            };
            pb.finish_with_message(format!(
                "Done! {} articles, {} redirects, {} templates, {:.1} pages/s",
                counts.articles, counts.redirects, counts.templates, rate
            ));
        }
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        let counts = self.counts();
        let elapsed = self.start_time.elapsed().as_secs_f64();

        println!("\nIngest Summary");
        println!("==============");
        println!("Pages classified: {}", counts.total);
        println!("Articles stored:  {}", counts.articles);
        println!("Redirects stored: {}", counts.redirects);
        println!("Templates stored: {}", counts.templates);
        println!("Elapsed time:     {}", elapsed_hms(elapsed));
    }
}

impl StatusSink for IngestProgress {
    fn record(&self, kind: RecordKind, title: &str) {
        let pages = self.pages.fetch_add(1, Ordering::Relaxed) + 1;

        match kind {
            RecordKind::Template => self.templates.fetch_add(1, Ordering::Relaxed),
            RecordKind::Redirect => self.redirects.fetch_add(1, Ordering::Relaxed),
            RecordKind::Article => self.articles.fetch_add(1, Ordering::Relaxed),
        };

        if let Some(ref pb) = self.progress_bar {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                pages as f64 / elapsed
            } else {
                0.0
            };
            pb.set_message(format!("{:.1} pages/s | {}", rate, truncate_str(title, 30)));
        }
    }

    fn report(&self, current: usize, _interval: usize, total: usize) {
        match self.progress_bar {
            Some(ref pb) => pb.set_position(current as u64),
            None => {
                if total > 0 {
                    let percent = current as f64 / total as f64 * 100.0;
                    tracing::info!("{} of {} articles stored ({:.1}%)", current, total, percent);
                } else {
                    tracing::info!("{} articles stored", current);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts() {
        let progress = IngestProgress::new(100, true); // quiet mode for tests

        progress.record(RecordKind::Article, "First Article");
        progress.record(RecordKind::Article, "Second Article");
        progress.record(RecordKind::Template, "Template:Infobox");
        progress.record(RecordKind::Redirect, "Old Name");

        let counts = progress.counts();
        assert_eq!(counts.total, 4);
        assert_eq!(counts.articles, 2);
        assert_eq!(counts.templates, 1);
        assert_eq!(counts.redirects, 1);
    }

    #[test]
    fn test_report_without_bar_does_not_panic() {
        let progress = IngestProgress::new(0, true);
        progress.report(200, 200, 15151);
        progress.report(400, 200, 0);
    }

    #[test]
    fn test_null_status_is_noop() {
        let sink = NullStatus;
        sink.record(RecordKind::Article, "Anything");
        sink.report(1000, 200, 0);
    }

    #[test]
    fn test_log_status_handles_missing_estimate() {
        let sink = LogStatus::new("documents");
        sink.record(RecordKind::Article, "Anything");
        sink.report(200, 200, 15151);
        sink.report(400, 200, 0);
    }
}
