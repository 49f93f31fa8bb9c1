use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::content::ContentClient;
use crate::domain::{CanonicalRecord, SummaryEntry};
use crate::error::CollectorError;
use crate::listing::{ListingSource, Paginator};
use crate::normalize::{image_from_document, normalize};
use crate::pacing::Pacer;
use crate::store::ArtifactStore;
use crate::uri::UriResolver;

#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    pub source: String,
    pub output_dir: String,
    pub started_at: String,
    pub elapsed_ms: u128,
    pub pages: usize,
    pub processed: usize,
    pub metadata_written: usize,
    pub originals_written: usize,
    pub images_written: usize,
    pub summary_written: bool,
    pub failures: Vec<RecordFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    pub index: usize,
    pub filename: String,
    pub stage: FailureStage,
    pub url: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Metadata,
    OriginalMetadata,
    Image,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Metadata => write!(f, "metadata"),
            FailureStage::OriginalMetadata => write!(f, "original_metadata"),
            FailureStage::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

impl ProgressEvent {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            elapsed: None,
        }
    }
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Everything a run accumulates between the first page and the final flush.
struct RunState {
    report: CollectReport,
    summary: Vec<SummaryEntry>,
}

impl RunState {
    fn fail(
        &mut self,
        sink: &dyn ProgressSink,
        index: usize,
        filename: &str,
        stage: FailureStage,
        url: Option<String>,
        err: CollectorError,
    ) {
        let message = err.to_string();
        warn!(
            index,
            %filename,
            %stage,
            url = url.as_deref().unwrap_or("-"),
            %message,
            "record step failed"
        );
        sink.event(ProgressEvent::new(format!(
            "phase=Record; {stage} failed for {filename}: {message}"
        )));
        self.report.failures.push(RecordFailure {
            index,
            filename: filename.to_string(),
            stage,
            url,
            message,
        });
    }
}

/// Collection pipeline: listing pages in, per-item artifacts plus one
/// `metadata.json` out. Strictly sequential.
pub struct App<L: ListingSource, C: ContentClient, P: Pacer> {
    store: ArtifactStore,
    resolver: UriResolver,
    source: L,
    content: C,
    pacer: P,
}

impl<L: ListingSource, C: ContentClient, P: Pacer> App<L, C, P> {
    pub fn new(
        store: ArtifactStore,
        resolver: UriResolver,
        source: L,
        content: C,
        pacer: P,
    ) -> Self {
        Self {
            store,
            resolver,
            source,
            content,
            pacer,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Runs the collection to completion.
    ///
    /// A listing failure aborts the run and nothing is written to the summary
    /// index. Failures inside a single record are collected in the report.
    pub fn collect(&self, sink: &dyn ProgressSink) -> Result<CollectReport, CollectorError> {
        let start = Instant::now();
        let mut run = RunState {
            report: CollectReport {
                source: self.source.kind().to_string(),
                output_dir: self.store.root().to_string(),
                started_at: chrono::Utc::now().to_rfc3339(),
                elapsed_ms: 0,
                pages: 0,
                processed: 0,
                metadata_written: 0,
                originals_written: 0,
                images_written: 0,
                summary_written: false,
                failures: Vec::new(),
            },
            summary: Vec::new(),
        };

        sink.event(ProgressEvent::new("phase=Prepare; creating output layout"));
        self.store.ensure_layout()?;

        sink.event(ProgressEvent::new(format!(
            "phase=Paginate; listing {} collection",
            run.report.source
        )));
        let mut pages = Paginator::new(&self.source);
        for page in pages.by_ref() {
            let items = match page {
                Ok(items) => items,
                Err(err) => {
                    error!(
                        processed = run.report.processed,
                        error = %err,
                        "pagination aborted"
                    );
                    return Err(err);
                }
            };
            for raw in items {
                run.report.processed += 1;
                let index = run.report.processed;
                self.process_record(raw, index, &mut run, sink);
                self.pacer.pause();
            }
            sink.event(ProgressEvent::new(format!(
                "phase=Paginate; processed {} NFTs so far",
                run.report.processed
            )));
        }
        run.report.pages = pages.pages_fetched();

        sink.event(ProgressEvent::new("phase=Finalize; writing metadata.json"));
        match self.store.write_summary_index(&run.summary) {
            Ok(path) => {
                info!(%path, entries = run.summary.len(), "saved metadata collection");
                run.report.summary_written = true;
            }
            Err(err) => {
                warn!(error = %err, "failed to save metadata collection");
            }
        }

        let elapsed = start.elapsed();
        run.report.elapsed_ms = elapsed.as_millis();
        info!(processed = run.report.processed, "finished collection");
        sink.event(ProgressEvent {
            message: format!(
                "phase=Done; total NFTs processed: {}",
                run.report.processed
            ),
            elapsed: Some(elapsed),
        });
        Ok(run.report)
    }

    fn process_record(
        &self,
        raw: Value,
        index: usize,
        run: &mut RunState,
        sink: &dyn ProgressSink,
    ) {
        let record = normalize(raw, self.source.kind(), index);
        let filename = record.filename();
        info!(index, name = %record.name, %filename, "processing NFT");
        sink.event(ProgressEvent::new(format!(
            "phase=Record; processing NFT {index}: {}",
            record.name
        )));

        match self.store.write_metadata(&filename, &record.raw) {
            Ok(_) => run.report.metadata_written += 1,
            Err(err) => run.fail(sink, index, &filename, FailureStage::Metadata, None, err),
        }

        let document_image = self.fetch_original(&record, &filename, index, run, sink);
        let image_uri = record.image_uri.clone().or(document_image);
        match image_uri {
            Some(uri) => {
                let url = self.resolver.resolve(&uri);
                let saved = self
                    .content
                    .fetch_bytes(&url)
                    .and_then(|bytes| self.store.write_image(&filename, &bytes));
                match saved {
                    Ok(path) => {
                        debug!(%path, "saved image");
                        run.report.images_written += 1;
                    }
                    Err(err) => {
                        run.fail(sink, index, &filename, FailureStage::Image, Some(url), err)
                    }
                }
            }
            None => debug!(%filename, "no image uri, skipping download"),
        }

        run.summary.push(record.summary());
    }

    /// Fetches and stores the off-chain document, returning its image field.
    fn fetch_original(
        &self,
        record: &CanonicalRecord,
        filename: &str,
        index: usize,
        run: &mut RunState,
        sink: &dyn ProgressSink,
    ) -> Option<String> {
        let uri = record.metadata_uri.as_deref()?;
        let url = self.resolver.resolve(uri);
        let document = match self.content.fetch_json(&url) {
            Ok(document) => document,
            Err(err) => {
                let stage = FailureStage::OriginalMetadata;
                run.fail(sink, index, filename, stage, Some(url), err);
                return None;
            }
        };
        match self.store.write_original_metadata(filename, &document) {
            Ok(_) => run.report.originals_written += 1,
            Err(err) => {
                let stage = FailureStage::OriginalMetadata;
                run.fail(sink, index, filename, stage, Some(url), err)
            }
        }
        image_from_document(&document)
    }
}
