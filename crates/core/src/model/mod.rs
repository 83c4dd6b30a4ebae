//! Source-side data model.
//!
//! - `color` - source colours and RGB conversion
//! - `state` - graphics/text state snapshots and the clip region
//! - `font` - resolved source fonts
//! - `image` - image payloads

pub mod color;
pub mod font;
pub mod image;
pub mod state;

pub use color::{Color, Rgb8};
pub use font::{CidFont, FontDescriptor, FontKind, SourceFont};
pub use image::{ImageCodec, ImageData, PixelFormat};
pub use state::{ClipPath, ClipRegion, GraphicsState, RenderingMode, TextState, WindingRule};
