//! Select a region of a frozen frame and export it styled.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use shotcraft_capture_engine::{
    CaptureOutcome, CaptureSession, FailureCue, FrameProvider, ImageFileProvider, SessionConfig,
};
use shotcraft_common::clock::SessionClock;
use shotcraft_common::config::AppConfig;
use shotcraft_input_tracker::backends::ScriptedInput;
use shotcraft_input_tracker::{SampleStreamHeader, SampleWriter};
use shotcraft_model::event::straight_drag;
use shotcraft_model::geometry::Point;
use shotcraft_platform_core::{DisplayId, DisplayInfo};

use super::StyleArgs;
use crate::sinks::TerminalBellCue;

/// Intermediate drag samples synthesized for `--drag`.
const DRAG_STEPS: usize = 8;
const DRAG_INTERVAL_NS: u64 = 8_000_000;

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Image standing in for the frozen display
    #[arg(long)]
    pub frame: PathBuf,

    /// Pixels per point of the frame
    #[arg(long, default_value = "1.0")]
    pub scale: f64,

    /// Height of the display chrome still present in the frame, in points
    #[arg(long, default_value = "0.0")]
    pub chrome: f64,

    /// Drag from (x0, y0) to (x1, y1), in points, Y down
    #[arg(long, value_name = "X0,Y0,X1,Y1", required_unless_present = "samples")]
    pub drag: Option<String>,

    /// Replay pointer samples from a JSONL file
    #[arg(long, conflicts_with = "drag")]
    pub samples: Option<PathBuf>,

    /// Record the pointer samples of this selection to a JSONL file
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy the result to the clipboard
    #[arg(long)]
    pub copy: bool,

    #[command(flatten)]
    pub style: StyleArgs,
}

pub async fn run(args: CaptureArgs, config: AppConfig) -> anyhow::Result<()> {
    let provider = ImageFileProvider::new(&args.frame, args.scale, args.chrome);
    let cue = TerminalBellCue;

    let input = match (&args.drag, &args.samples) {
        (_, Some(path)) => ScriptedInput::from_jsonl_file(path)
            .with_context(|| format!("Failed to read samples from {}", path.display()))?,
        (Some(drag), None) => {
            let (from, to) = parse_drag(drag)?;
            ScriptedInput::new(straight_drag(from, to, DRAG_STEPS, DRAG_INTERVAL_NS))
        }
        (None, None) => anyhow::bail!("Either --drag or --samples is required"),
    };

    // The drag starts on the display the selection belongs to.
    let pointer = input.peek().map(|s| s.position()).unwrap_or(Point::ZERO);
    let session_config = SessionConfig::for_pointer(pointer, &provider, config.capture.clone())
        .map_err(|e| {
            cue.signal(&e);
            e
        })?;
    let display_id = session_config.display_id;
    let mut session = CaptureSession::new(session_config, &provider, &cue);
    if let Some(path) = &args.record {
        let display = session_display(&provider, display_id)?;
        let header = SampleStreamHeader {
            schema_version: "1.0".to_string(),
            epoch_wall: SessionClock::start().epoch_wall().to_string(),
            view_width: display.width_pt,
            view_height: display.height_pt,
            window_flipped: true,
        };
        session = session.with_recorder(SampleWriter::new(path, &header)?);
    }

    let region = match session.run(Box::new(input)).await? {
        CaptureOutcome::Captured(region) => region,
        CaptureOutcome::Cancelled => {
            println!("Selection cancelled; nothing captured");
            return Ok(());
        }
        CaptureOutcome::Degenerate => {
            println!("Selection too small; nothing captured");
            return Ok(());
        }
    };

    let r = region.pixel_rect;
    println!(
        "Captured {}x{} px at ({}, {}) from display {}",
        r.width, r.height, r.x, r.y, region.display_id
    );

    let mut preview = super::open_preview(region.image, &config, &args.style);
    let artifact = preview.finalize();
    super::deliver(&artifact, &super::output_sinks(args.output, args.copy, &config))
}

fn session_display(provider: &dyn FrameProvider, id: DisplayId) -> anyhow::Result<DisplayInfo> {
    provider
        .displays()?
        .into_iter()
        .find(|d| d.id == id)
        .with_context(|| format!("Display {id} disappeared"))
}

/// `"x0,y0,x1,y1"` → two points.
fn parse_drag(spec: &str) -> anyhow::Result<(Point, Point)> {
    let values = spec
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid --drag value '{spec}'"))?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Ok((Point::new(*x0, *y0), Point::new(*x1, *y1))),
        _ => anyhow::bail!("--drag expects four comma-separated numbers, got '{spec}'"),
    }
}
