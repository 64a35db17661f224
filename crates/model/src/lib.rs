//! Shotcraft Model
//!
//! Defines the core data contracts shared by every Shotcraft crate:
//! - **Geometry:** Points, sizes, logical rectangles, and pixel rectangles
//! - **Events:** Timestamped pointer samples driving the selection
//! - **Style:** Padding, corner radius, background, and shadow options
//! - **Catalog:** The ordered list of selectable backgrounds
//! - **Mapper:** Pure conversions between window, view, and pixel space
//!
//! Window and view coordinates are logical points; pixel coordinates index
//! samples of a captured raster.

pub mod catalog;
pub mod event;
pub mod geometry;
pub mod mapper;
pub mod style;

pub use catalog::*;
pub use event::*;
pub use geometry::*;
pub use style::*;
