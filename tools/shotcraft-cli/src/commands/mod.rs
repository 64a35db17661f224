pub mod backgrounds;
pub mod capture;
pub mod compose;
pub mod init;
pub mod preview;

use std::path::PathBuf;

use clap::Args;
use shotcraft_common::config::{AppConfig, StyleDefaults};
use shotcraft_model::catalog::BackgroundCatalog;
use shotcraft_render_engine::{ArtifactSink, PngFileSink, PreviewSession, RenderedArtifact};

use crate::sinks::ClipboardSink;

/// Style overrides on top of the configured defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Padding around the subject, in pixels
    #[arg(long)]
    pub padding: Option<f64>,

    /// Corner radius, in pixels
    #[arg(long)]
    pub radius: Option<f64>,

    /// Background id (see `shotcraft backgrounds`)
    #[arg(long)]
    pub background: Option<String>,

    /// Disable the drop shadow
    #[arg(long)]
    pub no_shadow: bool,

    /// Shadow opacity [0.0, 1.0]
    #[arg(long)]
    pub shadow_opacity: Option<f64>,

    /// Shadow blur radius, in pixels
    #[arg(long)]
    pub shadow_blur: Option<f64>,

    /// Shadow vertical offset, in pixels
    #[arg(long, allow_hyphen_values = true)]
    pub shadow_offset: Option<f64>,
}

impl StyleArgs {
    pub fn apply(&self, style: &mut StyleDefaults) {
        if let Some(padding) = self.padding {
            style.padding = padding;
        }
        if let Some(radius) = self.radius {
            style.corner_radius = radius;
        }
        if let Some(background) = &self.background {
            style.background_id = background.clone();
        }
        if self.no_shadow {
            style.shadow_enabled = false;
        }
        if let Some(opacity) = self.shadow_opacity {
            style.shadow_opacity = opacity;
        }
        if let Some(blur) = self.shadow_blur {
            style.shadow_blur_radius = blur;
        }
        if let Some(offset) = self.shadow_offset {
            style.shadow_offset_y = offset;
        }
    }
}

/// Built-in backgrounds plus the configured image directory, if any.
pub fn load_catalog(config: &AppConfig) -> BackgroundCatalog {
    match &config.output.backgrounds_dir {
        Some(dir) => BackgroundCatalog::with_image_dir(dir),
        None => BackgroundCatalog::builtin(),
    }
}

/// Preview session for `subject` with the overrides applied.
pub fn open_preview(
    subject: image::RgbaImage,
    config: &AppConfig,
    style: &StyleArgs,
) -> PreviewSession {
    let mut config = config.clone();
    style.apply(&mut config.style);
    let catalog = load_catalog(&config);
    if let Some(requested) = &style.background {
        if catalog.get(requested).is_none() {
            eprintln!("Unknown background '{requested}'; using the first available one");
        }
    }
    PreviewSession::new(subject, &config, catalog)
}

/// Sinks for the requested outputs; a file at the configured default name
/// when nothing else was asked for.
pub fn output_sinks(
    output: Option<PathBuf>,
    copy: bool,
    config: &AppConfig,
) -> Vec<Box<dyn ArtifactSink>> {
    let mut sinks: Vec<Box<dyn ArtifactSink>> = Vec::new();
    let output = match output {
        Some(path) => Some(path),
        None if !copy => Some(PathBuf::from(&config.output.default_file_name)),
        None => None,
    };
    if let Some(path) = output {
        sinks.push(Box::new(PngFileSink::new(path)));
    }
    if copy {
        sinks.push(Box::new(ClipboardSink));
    }
    sinks
}

/// Hand the artifact to every sink. Fails only when no sink accepted it.
pub fn deliver(artifact: &RenderedArtifact, sinks: &[Box<dyn ArtifactSink>]) -> anyhow::Result<()> {
    let mut delivered = 0;
    for sink in sinks {
        match sink.deliver(artifact) {
            Ok(()) => delivered += 1,
            Err(e) => eprintln!("{} failed: {e}", sink.name()),
        }
    }
    if delivered == 0 {
        anyhow::bail!("The screenshot could not be saved");
    }
    println!(
        "Exported {}x{} image to {delivered} destination(s)",
        artifact.image.width(),
        artifact.image.height()
    );
    Ok(())
}
