//! pdf2ofd - translate PDF page drawing events into OFD page objects.
//!
//! The engine sits between a content-stream interpreter and an OFD container
//! writer. The interpreter replays each page into a [`PageEventSink`]; the
//! engine turns the events into path, image and text objects, collecting
//! fonts and images into a deduplicated resource manifest.

pub mod converter;
pub mod error;
pub mod font;
pub mod geometry;
pub mod interp;
pub mod model;
pub mod ofd;
pub mod params;
pub mod resource;
pub mod translate;

pub use converter::{ContainerWriter, ConversionReport, DocumentConverter, MemoryWriter};
pub use error::{ColorRole, ConvertError, Diagnostic, Result};
pub use interp::{ContentInterpreter, GlyphEvent, PageEventSink, PageInfo, PathSegment};
pub use params::TranslateParams;
pub use resource::{IdAllocator, ResourceRegistry};
pub use translate::{ConversionContext, PageCanvas, PageFrame};
