//! Replay slider edits through the debounced preview.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use shotcraft_common::config::AppConfig;
use shotcraft_render_engine::{ArtifactSink, PngFileSink};

use super::StyleArgs;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Subject image
    pub subject: PathBuf,

    /// Padding values applied one after another
    #[arg(long, value_delimiter = ',', required = true)]
    pub padding: Vec<f64>,

    /// Delay between edits, in milliseconds
    #[arg(long, default_value = "10")]
    pub interval_ms: u64,

    /// Where to write the preview that survives
    #[arg(short, long, default_value = "preview.png")]
    pub output: PathBuf,

    /// Background id (see `shotcraft backgrounds`)
    #[arg(long)]
    pub background: Option<String>,
}

pub async fn run(args: PreviewArgs, config: AppConfig) -> anyhow::Result<()> {
    let subject = image::open(&args.subject)
        .with_context(|| format!("Failed to open {}", args.subject.display()))?
        .to_rgba8();

    let style = StyleArgs {
        background: args.background.clone(),
        ..StyleArgs::default()
    };
    let mut preview = super::open_preview(subject, &config, &style);
    let interval = Duration::from_millis(args.interval_ms);

    let mut last_seq = 0;
    for (i, padding) in args.padding.iter().copied().enumerate() {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        last_seq = preview.update(|style| style.padding = padding);
        if let Some(shown) = preview.poll_preview() {
            let (w, h) = shown.image.dimensions();
            println!("  preview #{} ready ({w}x{h})", shown.seq);
        }
    }

    let Some(artifact) = preview.next_preview().await else {
        anyhow::bail!("No preview survived the last edit");
    };
    println!(
        "{} edit(s) submitted; showing #{} of #{last_seq} ({}x{})",
        args.padding.len(),
        artifact.seq,
        artifact.image.width(),
        artifact.image.height()
    );

    PngFileSink::new(&args.output).deliver(&artifact)?;
    println!("Preview written to {}", args.output.display());
    Ok(())
}
