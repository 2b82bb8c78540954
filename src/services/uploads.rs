//! Tracks one asynchronous upload per selected file.
//!
//! Each batch gets a generation number. Upload tasks report back over a
//! channel tagged with the generation they were started for, and results
//! from a replaced batch are discarded when they arrive.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::product::ProductImage;
use crate::domain::types::ImageUrl;
use crate::domain::upload::{Preview, UploadFile, UploadState, UploadTask};
use crate::repository::{ImageUploader, RepositoryError};

/// Failure reported when the uploader panicked.
pub const UPLOAD_PANICKED: &str = "upload failed unexpectedly";

/// Result of one upload task, tagged with the batch it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub batch: u64,
    pub index: usize,
    pub outcome: Result<ImageUrl, String>,
}

/// A task of the current batch that has just reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledUpload {
    pub index: usize,
    pub name: String,
    pub outcome: Result<ImageUrl, String>,
}

/// Aggregated progress of the current batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadProgress {
    /// No files selected.
    Idle,
    /// At least one upload is still running.
    Uploading { completed: usize, total: usize },
    /// Every upload succeeded or failed.
    Complete { succeeded: usize, failed: usize },
}

pub struct UploadTracker {
    uploader: Arc<dyn ImageUploader>,
    timeout: Duration,
    batch: u64,
    tasks: Vec<UploadTask>,
    results: Vec<ProductImage>,
    handles: Vec<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: mpsc::UnboundedReceiver<UploadEvent>,
}

impl UploadTracker {
    pub fn new(uploader: Arc<dyn ImageUploader>, timeout: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            uploader,
            timeout,
            batch: 0,
            tasks: Vec::new(),
            results: Vec::new(),
            handles: Vec::new(),
            events_tx,
            events_rx,
        }
    }

    /// Replaces the current batch and starts one upload per file.
    ///
    /// Must be called from within a tokio runtime. Returns the new batch
    /// generation.
    pub fn start_batch(&mut self, files: Vec<UploadFile>) -> u64 {
        self.release_batch();
        self.batch += 1;
        log::info!("Uploading batch {} with {} file(s)", self.batch, files.len());

        for (index, file) in files.into_iter().enumerate() {
            self.tasks.push(UploadTask::new(&file));

            let uploader = Arc::clone(&self.uploader);
            let events_tx = self.events_tx.clone();
            let batch = self.batch;
            let timeout = self.timeout;
            self.handles.push(tokio::spawn(async move {
                let upload = tokio::time::timeout(timeout, uploader.upload(&file));
                let outcome = match AssertUnwindSafe(upload).catch_unwind().await {
                    Ok(Ok(Ok(url))) => Ok(url),
                    Ok(Ok(Err(e))) => Err(e.to_string()),
                    Ok(Err(_)) => Err(RepositoryError::Timeout.to_string()),
                    Err(_) => {
                        log::error!("Upload of {} panicked", file.name);
                        Err(UPLOAD_PANICKED.to_string())
                    }
                };
                // Every started task reports exactly once. A send error
                // only means the tracker is gone.
                let _ = events_tx.send(UploadEvent {
                    batch,
                    index,
                    outcome,
                });
            }));
        }
        self.batch
    }

    /// Drops the current batch, its previews and results.
    pub fn reset(&mut self) {
        self.release_batch();
        self.batch += 1;
    }

    fn release_batch(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!(
                "Releasing {} preview(s) of batch {}",
                self.tasks.len(),
                self.batch
            );
        }
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        self.tasks.clear();
        self.results.clear();
    }

    /// Applies one task result.
    ///
    /// Results of a replaced batch and repeated results for an already
    /// settled task are ignored.
    pub fn apply(&mut self, event: UploadEvent) -> Option<SettledUpload> {
        if event.batch != self.batch {
            log::debug!(
                "Discarding upload result of stale batch {} (current {})",
                event.batch,
                self.batch
            );
            return None;
        }
        let task = self.tasks.get_mut(event.index)?;
        if !task.state.is_pending() {
            return None;
        }

        task.state = match &event.outcome {
            Ok(url) => {
                self.results.push(ProductImage::from(url.clone()));
                UploadState::Succeeded(url.clone())
            }
            Err(e) => {
                log::warn!("Upload of {} failed: {e}", task.name());
                UploadState::Failed(e.clone())
            }
        };
        Some(SettledUpload {
            index: event.index,
            name: task.name().to_string(),
            outcome: event.outcome,
        })
    }

    /// Applies every result that has already arrived, without waiting.
    pub fn drain_ready(&mut self) -> Vec<SettledUpload> {
        let mut settled = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            settled.extend(self.apply(event));
        }
        settled
    }

    /// Waits for the next task of the current batch to settle.
    ///
    /// Returns `None` once nothing is outstanding.
    pub async fn next_settled(&mut self) -> Option<SettledUpload> {
        while self.outstanding() > 0 {
            let event = self.events_rx.recv().await?;
            if let Some(settled) = self.apply(event) {
                return Some(settled);
            }
        }
        None
    }

    /// Waits until every task of the current batch has settled.
    pub async fn settle(&mut self) -> Vec<SettledUpload> {
        let mut settled = Vec::new();
        while let Some(upload) = self.next_settled().await {
            settled.push(upload);
        }
        settled
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    /// Number of tasks still waiting for their upload to resolve.
    pub fn outstanding(&self) -> usize {
        self.tasks.iter().filter(|t| t.state.is_pending()).count()
    }

    pub fn progress(&self) -> UploadProgress {
        let total = self.total();
        if total == 0 {
            return UploadProgress::Idle;
        }
        let outstanding = self.outstanding();
        if outstanding > 0 {
            return UploadProgress::Uploading {
                completed: total - outstanding,
                total,
            };
        }
        UploadProgress::Complete {
            succeeded: self.results.len(),
            failed: total - self.results.len(),
        }
    }

    /// Uploaded images in the order their uploads resolved.
    pub fn results(&self) -> &[ProductImage] {
        &self.results
    }

    /// Name and error of every failed task in the current batch.
    pub fn failures(&self) -> Vec<(String, String)> {
        self.tasks
            .iter()
            .filter_map(|task| match &task.state {
                UploadState::Failed(e) => Some((task.name().to_string(), e.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn previews(&self) -> impl Iterator<Item = &Preview> {
        self.tasks.iter().map(|task| &task.preview)
    }
}

impl Drop for UploadTracker {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::TestUploader;

    fn file(name: &str) -> UploadFile {
        UploadFile::new(name, Some("image/png".into()), vec![0; 4])
    }

    fn tracker(uploader: TestUploader) -> UploadTracker {
        UploadTracker::new(Arc::new(uploader), Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn results_follow_arrival_order() {
        let uploader = TestUploader::new()
            .delay("slow.png", Duration::from_millis(50))
            .delay("fast.png", Duration::from_millis(10));
        let mut tracker = tracker(uploader);

        tracker.start_batch(vec![file("slow.png"), file("fast.png")]);
        assert_eq!(
            tracker.progress(),
            UploadProgress::Uploading {
                completed: 0,
                total: 2
            }
        );

        let settled = tracker.settle().await;

        assert_eq!(settled[0].name, "fast.png");
        let urls: Vec<&str> = tracker.results().iter().map(|r| r.image.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://img.example.com/fast.png",
                "https://img.example.com/slow.png"
            ]
        );
        assert_eq!(
            tracker.progress(),
            UploadProgress::Complete {
                succeeded: 2,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn failed_upload_is_absent_from_results() {
        let uploader = TestUploader::new().fail("broken.png", "file too large");
        let mut tracker = tracker(uploader);

        tracker.start_batch(vec![file("a.png"), file("broken.png"), file("b.png")]);
        tracker.settle().await;

        assert_eq!(tracker.results().len(), 2);
        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(
            tracker.failures(),
            vec![("broken.png".to_string(), "file too large".to_string())]
        );
        assert_eq!(
            tracker.progress(),
            UploadProgress::Complete {
                succeeded: 2,
                failed: 1
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_upload_times_out() {
        let uploader = TestUploader::new().delay("huge.png", Duration::from_secs(120));
        let mut tracker = UploadTracker::new(Arc::new(uploader), Duration::from_secs(5));

        tracker.start_batch(vec![file("huge.png")]);
        let settled = tracker.settle().await;

        assert_eq!(settled[0].outcome, Err("request timed out".to_string()));
        assert!(tracker.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_batch_discards_previous_results() {
        let uploader = TestUploader::new().delay("old.png", Duration::from_millis(100));
        let mut tracker = tracker(uploader);

        let first = tracker.start_batch(vec![file("old.png")]);
        let second = tracker.start_batch(vec![file("new.png")]);
        assert_ne!(first, second);
        assert_eq!(tracker.previews().count(), 1);

        tracker.settle().await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        tracker.drain_ready();

        let urls: Vec<&str> = tracker.results().iter().map(|r| r.image.as_str()).collect();
        assert_eq!(urls, vec!["https://img.example.com/new.png"]);
    }

    #[tokio::test]
    async fn stale_and_duplicate_events_are_ignored() {
        let uploader = TestUploader::new().delay("a.png", Duration::from_secs(60));
        let mut tracker = tracker(uploader);
        let stale = tracker.start_batch(vec![file("a.png")]);
        let current = tracker.start_batch(vec![file("a.png")]);
        let url = ImageUrl::new("https://img.example.com/leaked.png").unwrap();

        let leaked = tracker.apply(UploadEvent {
            batch: stale,
            index: 0,
            outcome: Ok(url.clone()),
        });
        assert!(leaked.is_none());
        assert!(tracker.results().is_empty());

        let event = UploadEvent {
            batch: current,
            index: 0,
            outcome: Ok(url),
        };
        assert!(tracker.apply(event.clone()).is_some());
        assert!(tracker.apply(event).is_none());
        assert_eq!(tracker.results().len(), 1);
    }

    #[tokio::test]
    async fn panicking_uploader_settles_as_failure() {
        let uploader = TestUploader::new().panic_on("cursed.png");
        let mut tracker = tracker(uploader);

        tracker.start_batch(vec![file("ok.png"), file("cursed.png")]);
        tracker.settle().await;

        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(
            tracker.failures(),
            vec![("cursed.png".to_string(), UPLOAD_PANICKED.to_string())]
        );
        assert_eq!(tracker.results().len(), 1);
    }

    #[tokio::test]
    async fn reset_returns_to_idle() {
        let mut tracker = tracker(TestUploader::new());
        tracker.start_batch(vec![file("a.png")]);
        tracker.reset();

        assert_eq!(tracker.progress(), UploadProgress::Idle);
        assert!(tracker.next_settled().await.is_none());
    }
}
