//! Shotcraft Capture Engine
//!
//! Freezes a display, lets the user drag out a region, and crops exactly
//! that region out of the frozen pixels.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                CaptureSession                 │
//! │  ┌───────────────┐      ┌──────────────────┐  │
//! │  │ FrameProvider │      │ SelectionSession │  │
//! │  │ (display id)  │      │ (pointer input)  │  │
//! │  └───────┬───────┘      └────────┬─────────┘  │
//! │          ▼                       ▼            │
//! │     FrozenFrame ──────────►   Cropper         │
//! │                        (view → pixel, clamp)  │
//! └──────────────────────────────┬───────────────┘
//!                                ▼
//!                         CapturedRegion
//! ```

pub mod crop;
pub mod frame;
pub mod provider;
pub mod session;

pub use crop::Cropper;
pub use frame::FrozenFrame;
pub use provider::{FrameProvider, ImageFileProvider, StaticFrameProvider};
pub use session::*;
