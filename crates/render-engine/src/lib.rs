//! Shotcraft Render Engine
//!
//! Turns a cropped subject into a styled screenshot and keeps the preview
//! current while the style is edited.
//!
//! # Pipeline Architecture
//!
//! ```text
//! style edit ──► RenderScheduler::submit (seq n, debounce restarts)
//!                        │
//!                        │ timer fires, seq n still latest
//!                        ▼
//!              spawn_blocking(CompositionEngine::compose)
//!                        │
//!                        │ seq n still latest
//!                        ▼
//!                 owning context ──► preview
//!                        │
//!           export ──► render_now ──► ArtifactSink (PNG file, memory)
//! ```

mod background;
mod blur;
mod mask;
mod raster;

pub mod compositor;
pub mod export;
pub mod options;
pub mod preview;
pub mod scheduler;

pub use compositor::{Composer, CompositionEngine};
pub use export::{encode_png, ArtifactSink, MemorySink, PngFileSink};
pub use options::style_from_config;
pub use preview::PreviewSession;
pub use scheduler::{RenderRequest, RenderScheduler, RenderedArtifact};
