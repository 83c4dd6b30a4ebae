//! Page event sink - the callback protocol between the source interpreter
//! and the translation engine.
//!
//! The interpreter parses the content stream, tracks the graphics state and
//! calls into a [`PageEventSink`] for every path segment, painting operator,
//! image blit and positioned glyph. Coordinates arrive in source user space
//! (already multiplied by the CTM for path events); all unit and axis
//! conversion happens on the sink side.

use std::sync::Arc;

use crate::error::Result;
use crate::geometry::{Matrix, Point};
use crate::model::{GraphicsState, ImageData, SourceFont, WindingRule};

/// Path segment for graphics operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Move to point (x, y)
    MoveTo(f64, f64),
    /// Line to point (x, y)
    LineTo(f64, f64),
    /// Cubic bezier curve (x1, y1, x2, y2, x3, y3)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Close path
    ClosePath,
}

/// One positioned glyph of a text-show operation.
#[derive(Debug, Clone)]
pub struct GlyphEvent {
    /// Text rendering matrix (text space to device space) of this glyph
    pub trm: Matrix,
    pub font: Arc<SourceFont>,
    /// Character code as decoded from the shown string
    pub code: u32,
    /// Glyph displacement in text space (width / 1000 for horizontal fonts)
    pub displacement: Point,
}

/// Drawing callbacks invoked by the source interpreter for one page.
///
/// Operators that end a path take the graphics state mutably: a pending
/// clip is intersected into it before the retained path is discarded.
pub trait PageEventSink {
    /// Begin a new subpath at (x, y).
    fn on_move_to(&mut self, x: f64, y: f64);

    /// Append a straight segment.
    fn on_line_to(&mut self, x: f64, y: f64);

    /// Append a cubic Bezier segment.
    fn on_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64);

    /// Close the current subpath.
    fn on_close(&mut self);

    /// Append a rectangle given as its four transformed corners.
    fn on_rectangle(&mut self, p0: Point, p1: Point, p2: Point, p3: Point) {
        self.on_move_to(p0.0, p0.1);
        self.on_line_to(p1.0, p1.1);
        self.on_line_to(p2.0, p2.1);
        self.on_line_to(p3.0, p3.1);
        self.on_close();
    }

    /// Mark the current path as a clip path (`W` / `W*`).
    fn on_clip(&mut self, rule: WindingRule);

    /// End the path without painting (`n`).
    fn on_end_path(&mut self, state: &mut GraphicsState);

    /// Stroke the current path.
    fn on_stroke(&mut self, state: &mut GraphicsState);

    /// Fill the current path.
    fn on_fill(&mut self, state: &mut GraphicsState, rule: WindingRule);

    /// Fill, then stroke the current path.
    fn on_fill_and_stroke(&mut self, state: &mut GraphicsState, rule: WindingRule);

    /// Paint an image into the unit square of the current CTM.
    fn on_image(&mut self, state: &GraphicsState, image: &ImageData);

    /// Begin a text-show operation over an encoded byte string.
    fn on_begin_text(&mut self, encoded: &[u8]);

    /// Place one glyph of the current text-show operation.
    fn on_glyph(&mut self, state: &GraphicsState, glyph: &GlyphEvent);

    /// End the current text-show operation.
    fn on_end_text(&mut self, state: &GraphicsState);
}

/// Size of a source page (its crop box) in user space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    pub width: f64,
    pub height: f64,
}

/// The external content-stream interpreter.
///
/// Implementations own the parsed source document. `run_page` replays one
/// page's content stream into the sink.
pub trait ContentInterpreter {
    /// Number of pages; failure here means the source could not be loaded.
    fn page_count(&self) -> Result<usize>;

    /// Crop box size of a page.
    fn page_info(&self, index: usize) -> Result<PageInfo>;

    /// Interpret one page, invoking the sink for each drawing event.
    fn run_page(&self, index: usize, sink: &mut dyn PageEventSink) -> Result<()>;
}
