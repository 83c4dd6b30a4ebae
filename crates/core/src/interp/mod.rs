//! Interface to the external content-stream interpreter.
//!
//! - `sink`: the drawing callback trait the engine implements, and the
//!   interpreter trait the engine drives

pub mod sink;

pub use sink::{ContentInterpreter, GlyphEvent, PageEventSink, PageInfo, PathSegment};
