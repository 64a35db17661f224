//! Debounced, sequence-gated re-rendering.
//!
//! Every [`RenderScheduler::submit`] takes a new sequence number and restarts
//! a trailing debounce timer. When the timer fires the job composes on the
//! blocking pool. A result is delivered only while its sequence number is
//! still the latest one submitted, so an older render can never replace a
//! newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use shotcraft_model::style::StyleOptions;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::compositor::Composer;

/// Default trailing debounce.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(30);

/// One self-contained unit of composition work.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub seq: u64,
    pub subject: Arc<RgbaImage>,
    pub style: StyleOptions,
}

/// A finished composite and the sequence number it was produced from.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub seq: u64,
    pub image: Arc<RgbaImage>,
}

/// Coalesces bursts of style edits into a single composition.
///
/// Must be used from within a tokio runtime.
pub struct RenderScheduler {
    composer: Arc<dyn Composer>,
    debounce: Duration,
    latest_seq: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<RenderedArtifact>,
    rx: mpsc::UnboundedReceiver<RenderedArtifact>,
    latest_artifact: Option<RenderedArtifact>,
}

impl RenderScheduler {
    pub fn new(composer: Arc<dyn Composer>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            composer,
            debounce,
            latest_seq: Arc::new(AtomicU64::new(0)),
            pending: None,
            tx,
            rx,
            latest_artifact: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Highest sequence number handed out so far.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq.load(Ordering::SeqCst)
    }

    /// Most recent artifact that passed the sequence gate.
    pub fn latest_artifact(&self) -> Option<&RenderedArtifact> {
        self.latest_artifact.as_ref()
    }

    fn next_seq(&self) -> u64 {
        self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Schedule a composition after the debounce delay, replacing any job
    /// that has not delivered yet. Returns the request's sequence number.
    pub fn submit(&mut self, subject: Arc<RgbaImage>, style: StyleOptions) -> u64 {
        let seq = self.next_seq();
        self.cancel_pending();

        let request = RenderRequest {
            seq,
            subject,
            style,
        };
        let composer = Arc::clone(&self.composer);
        let latest = Arc::clone(&self.latest_seq);
        let tx = self.tx.clone();
        let debounce = self.debounce;

        tracing::trace!(seq, "Render scheduled");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != request.seq {
                tracing::trace!(seq = request.seq, "Render superseded before start");
                return;
            }

            let seq = request.seq;
            let result = tokio::task::spawn_blocking(move || {
                composer.compose(&request.subject, &request.style)
            })
            .await;

            match result {
                Ok(image) if latest.load(Ordering::SeqCst) == seq => {
                    let _ = tx.send(RenderedArtifact {
                        seq,
                        image: Arc::new(image),
                    });
                }
                Ok(_) => tracing::debug!(seq, "Discarding stale render"),
                Err(e) => tracing::warn!(seq, error = %e, "Render worker failed"),
            }
        }));
        seq
    }

    /// Compose immediately on the calling thread, superseding any scheduled
    /// work, and record the result as the latest artifact.
    pub fn render_now(&mut self, subject: &RgbaImage, style: &StyleOptions) -> RenderedArtifact {
        let seq = self.next_seq();
        self.cancel_pending();

        let artifact = RenderedArtifact {
            seq,
            image: Arc::new(self.composer.compose(subject, style)),
        };
        tracing::debug!(seq, "Rendered synchronously");
        self.latest_artifact = Some(artifact.clone());
        artifact
    }

    /// Take a delivered artifact without waiting, if one is current.
    pub fn poll_artifact(&mut self) -> Option<RenderedArtifact> {
        while let Ok(artifact) = self.rx.try_recv() {
            if self.accept(&artifact) {
                return Some(artifact);
            }
        }
        None
    }

    /// Wait for the pending job and return its artifact.
    ///
    /// `None` when nothing is pending or the job was superseded.
    pub async fn next_artifact(&mut self) -> Option<RenderedArtifact> {
        loop {
            if let Some(artifact) = self.poll_artifact() {
                return Some(artifact);
            }
            let handle = self.pending.take()?;
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Render job panicked");
                }
            }
        }
    }

    /// Sequence gate applied in the owning context.
    fn accept(&mut self, artifact: &RenderedArtifact) -> bool {
        let latest = self.latest_seq();
        let newer_than_shown = self
            .latest_artifact
            .as_ref()
            .map_or(true, |shown| artifact.seq > shown.seq);
        if artifact.seq == latest && newer_than_shown {
            self.latest_artifact = Some(artifact.clone());
            true
        } else {
            tracing::debug!(seq = artifact.seq, latest, "Dropping stale artifact");
            false
        }
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every style it is asked to compose.
    #[derive(Default)]
    struct RecordingComposer {
        calls: Mutex<Vec<StyleOptions>>,
        delay: Option<Duration>,
    }

    impl RecordingComposer {
        fn calls(&self) -> Vec<StyleOptions> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Composer for RecordingComposer {
        fn compose(&self, subject: &RgbaImage, style: &StyleOptions) -> RgbaImage {
            let first = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(style.clone());
                calls.len() == 1
            };
            if let (true, Some(delay)) = (first, self.delay) {
                std::thread::sleep(delay);
            }
            let pad = style.effective_padding();
            RgbaImage::new(subject.width() + 2 * pad, subject.height() + 2 * pad)
        }
    }

    fn style(padding: f64) -> StyleOptions {
        StyleOptions {
            padding,
            ..StyleOptions::default()
        }
    }

    fn subject() -> Arc<RgbaImage> {
        Arc::new(RgbaImage::new(4, 4))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_within_debounce_composes_once_with_last_style() {
        let composer = Arc::new(RecordingComposer::default());
        let mut scheduler = RenderScheduler::new(composer.clone(), DEFAULT_DEBOUNCE);

        for padding in [10.0, 20.0, 30.0] {
            scheduler.submit(subject(), style(padding));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let artifact = scheduler.next_artifact().await.unwrap();

        let calls = composer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].padding, 30.0);
        assert_eq!(artifact.seq, 3);
        assert_eq!(artifact.image.dimensions(), (64, 64));
        assert_eq!(scheduler.latest_artifact().unwrap().seq, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_submissions_each_render() {
        let composer = Arc::new(RecordingComposer::default());
        let mut scheduler = RenderScheduler::new(composer.clone(), DEFAULT_DEBOUNCE);

        scheduler.submit(subject(), style(1.0));
        assert_eq!(scheduler.next_artifact().await.unwrap().seq, 1);
        scheduler.submit(subject(), style(2.0));
        assert_eq!(scheduler.next_artifact().await.unwrap().seq, 2);
        assert_eq!(composer.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_now_supersedes_pending_job() {
        let composer = Arc::new(RecordingComposer::default());
        let mut scheduler = RenderScheduler::new(composer.clone(), DEFAULT_DEBOUNCE);

        scheduler.submit(subject(), style(5.0));
        let artifact = scheduler.render_now(&subject(), &style(7.0));
        assert_eq!(artifact.seq, 2);
        assert_eq!(artifact.image.dimensions(), (18, 18));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(scheduler.next_artifact().await.is_none());
        assert_eq!(composer.calls().len(), 1);
        assert_eq!(scheduler.latest_artifact().unwrap().seq, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_result_finishing_after_newer_submit_is_discarded() {
        let composer = Arc::new(RecordingComposer {
            delay: Some(Duration::from_millis(150)),
            ..RecordingComposer::default()
        });
        let mut scheduler = RenderScheduler::new(composer.clone(), Duration::from_millis(5));

        scheduler.submit(subject(), style(1.0));
        // Let the first job start its slow composition.
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.submit(subject(), style(2.0));

        let artifact = scheduler.next_artifact().await.unwrap();
        assert_eq!(artifact.seq, 2);

        // The slow first render completes later and must not surface.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(scheduler.poll_artifact().is_none());
        assert_eq!(scheduler.latest_artifact().unwrap().seq, 2);
        assert_eq!(composer.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_gate_rejects_out_of_order_delivery() {
        let composer = Arc::new(RecordingComposer::default());
        let mut scheduler = RenderScheduler::new(composer, DEFAULT_DEBOUNCE);
        scheduler.render_now(&subject(), &style(0.0));
        scheduler.render_now(&subject(), &style(0.0));

        let stale = RenderedArtifact {
            seq: 1,
            image: subject(),
        };
        assert!(!scheduler.accept(&stale));
        assert_eq!(scheduler.latest_artifact().unwrap().seq, 2);
    }

    #[tokio::test]
    async fn test_sequence_numbers_strictly_increase() {
        let composer = Arc::new(RecordingComposer::default());
        let mut scheduler = RenderScheduler::new(composer, DEFAULT_DEBOUNCE);
        let a = scheduler.submit(subject(), style(0.0));
        let b = scheduler.render_now(&subject(), &style(0.0)).seq;
        let c = scheduler.submit(subject(), style(0.0));
        assert!(a < b && b < c);
    }
}
