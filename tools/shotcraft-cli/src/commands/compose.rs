//! Style an existing image.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use shotcraft_common::config::AppConfig;

use super::StyleArgs;

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Subject image
    pub subject: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy the result to the clipboard
    #[arg(long)]
    pub copy: bool,

    #[command(flatten)]
    pub style: StyleArgs,
}

pub fn run(args: ComposeArgs, config: AppConfig) -> anyhow::Result<()> {
    let subject = image::open(&args.subject)
        .with_context(|| format!("Failed to open {}", args.subject.display()))?
        .to_rgba8();
    tracing::info!(
        path = %args.subject.display(),
        width = subject.width(),
        height = subject.height(),
        "Composing"
    );

    let mut preview = super::open_preview(subject, &config, &args.style);
    println!("Background: {}", preview.background_id());
    let artifact = preview.finalize();
    super::deliver(&artifact, &super::output_sinks(args.output, args.copy, &config))
}
