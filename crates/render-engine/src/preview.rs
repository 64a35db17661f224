//! Live preview of a captured region.
//!
//! A [`PreviewSession`] lives in the owning context. It holds the current
//! style, turns every edit into a debounced render, and produces the final
//! full render on export.

use std::sync::Arc;

use image::RgbaImage;
use shotcraft_common::config::AppConfig;
use shotcraft_common::error::ShotcraftResult;
use shotcraft_model::catalog::BackgroundCatalog;
use shotcraft_model::style::StyleOptions;

use crate::compositor::{Composer, CompositionEngine};
use crate::export::ArtifactSink;
use crate::options::{initial_background_id, style_from_config};
use crate::scheduler::{RenderScheduler, RenderedArtifact};

pub struct PreviewSession {
    subject: Arc<RgbaImage>,
    style: StyleOptions,
    background_id: String,
    catalog: BackgroundCatalog,
    scheduler: RenderScheduler,
}

impl PreviewSession {
    /// Session using the CPU compositor and the configured debounce.
    pub fn new(subject: RgbaImage, config: &AppConfig, catalog: BackgroundCatalog) -> Self {
        Self::with_composer(subject, config, catalog, Arc::new(CompositionEngine::new()))
    }

    pub fn with_composer(
        subject: RgbaImage,
        config: &AppConfig,
        catalog: BackgroundCatalog,
        composer: Arc<dyn Composer>,
    ) -> Self {
        let background_id = initial_background_id(&config.style, &catalog);
        let style = style_from_config(&config.style, &catalog);
        tracing::debug!(
            width = subject.width(),
            height = subject.height(),
            background = %background_id,
            "Preview session started"
        );
        Self {
            subject: Arc::new(subject),
            style,
            background_id,
            catalog,
            scheduler: RenderScheduler::new(composer, config.render.debounce()),
        }
    }

    pub fn subject(&self) -> &RgbaImage {
        &self.subject
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    pub fn background_id(&self) -> &str {
        &self.background_id
    }

    pub fn catalog(&self) -> &BackgroundCatalog {
        &self.catalog
    }

    /// Apply an edit to the live style and schedule a re-render.
    pub fn update(&mut self, edit: impl FnOnce(&mut StyleOptions)) -> u64 {
        edit(&mut self.style);
        self.submit()
    }

    /// Switch background by catalog id; unknown ids select the fallback.
    pub fn select_background(&mut self, id: &str) -> u64 {
        let entry = self.catalog.resolve(id);
        self.background_id = entry.id.clone();
        self.style.background = entry.spec.clone();
        tracing::debug!(requested = id, selected = %self.background_id, "Background selected");
        self.submit()
    }

    /// Schedule a render of the current style.
    pub fn submit(&mut self) -> u64 {
        self.scheduler
            .submit(Arc::clone(&self.subject), self.style.clone())
    }

    /// Wait for the scheduled render, if it survives.
    pub async fn next_preview(&mut self) -> Option<RenderedArtifact> {
        self.scheduler.next_artifact().await
    }

    pub fn poll_preview(&mut self) -> Option<RenderedArtifact> {
        self.scheduler.poll_artifact()
    }

    /// Most recent preview shown.
    pub fn latest(&self) -> Option<&RenderedArtifact> {
        self.scheduler.latest_artifact()
    }

    /// Full render with the current style, superseding pending previews.
    pub fn finalize(&mut self) -> RenderedArtifact {
        self.scheduler.render_now(&self.subject, &self.style)
    }

    /// Final render delivered to `sink`.
    pub fn export(&mut self, sink: &dyn ArtifactSink) -> ShotcraftResult<RenderedArtifact> {
        let artifact = self.finalize();
        sink.deliver(&artifact)?;
        tracing::info!(
            sink = sink.name(),
            seq = artifact.seq,
            width = artifact.image.width(),
            height = artifact.image.height(),
            "Exported"
        );
        Ok(artifact)
    }
}
