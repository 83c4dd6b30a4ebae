//! Page Translator - the per-page canvas driven by the interpreter.
//!
//! [`PageCanvas`] owns everything local to one page (retained path, open
//! text run, output layer) and borrows the document-wide
//! [`ConversionContext`]. Objects are appended to the layer in the order
//! their drawing events arrive.

use tracing::{debug, trace};

use super::path::{Paint, PathAccumulator};
use super::text::TextRunAssembler;
use super::{ConversionContext, PageFrame};
use crate::error::Diagnostic;
use crate::geometry::{Boundary, scaling_factor_x, scaling_factor_y};
use crate::interp::{ContentInterpreter, GlyphEvent, PageEventSink};
use crate::model::{GraphicsState, ImageData, WindingRule};
use crate::ofd::{ImageObject, Layer, Page, PageObject, TextObject};

/// Mutable state of one page translation.
#[derive(Debug)]
pub struct PageCanvas<'a> {
    ctx: &'a ConversionContext,
    frame: PageFrame,
    path: PathAccumulator,
    text: TextRunAssembler,
    layer: Layer,
}

impl<'a> PageCanvas<'a> {
    pub fn new(ctx: &'a ConversionContext, frame: PageFrame) -> Self {
        Self {
            ctx,
            frame,
            path: PathAccumulator::new(),
            text: TextRunAssembler::new(),
            layer: Layer::default(),
        }
    }

    pub fn frame(&self) -> &PageFrame {
        &self.frame
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Retained path, for inspection between events.
    pub fn path(&self) -> &PathAccumulator {
        &self.path
    }

    /// Finish the page. A text run still open is flushed as its last glyph
    /// left it.
    pub fn into_page(mut self) -> Page {
        let flushed = self.text.flush(self.ctx, &self.frame);
        self.push_text(flushed);
        debug!(
            page = self.frame.index,
            objects = self.layer.len(),
            "page translated"
        );
        Page {
            index: self.frame.index,
            physical_box: self.frame.physical_box(),
            layer: self.layer,
        }
    }

    fn push_text(&mut self, text: Option<TextObject>) {
        if let Some(text) = text {
            self.layer.push(PageObject::Text(text));
        }
    }

    fn paint(&mut self, state: &mut GraphicsState, passes: &[Paint]) {
        for &paint in passes {
            if let Some(obj) = self.path.paint(self.ctx, &self.frame, state, paint) {
                self.layer.push(PageObject::Path(obj));
            }
        }
        self.path.end(state);
    }

    /// Place an image into the unit square of the CTM.
    fn place_image(&mut self, state: &GraphicsState, image: &ImageData) {
        let (bytes, codec) = match image.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                self.ctx.report(Diagnostic::ImageEncodeFailure {
                    page: self.frame.index,
                    reason: e.to_string(),
                });
                return;
            }
        };
        let resource_id = self.ctx.registry.intern_image(&self.ctx.ids, &bytes, codec);

        let ctm = state.ctm;
        let s = self.frame.scale;
        let sx = scaling_factor_x(ctm);
        let sy = scaling_factor_y(ctm);
        let (w, h) = (sx * s, sy * s);
        let boundary = Boundary::new(ctm.4 * s, (self.frame.height - ctm.5 - sy) * s, w, h);

        let id = self.ctx.ids.allocate();
        trace!(%id, %resource_id, "image");
        self.layer.push(PageObject::Image(ImageObject {
            id,
            boundary,
            resource_id,
            ctm: (w, 0.0, 0.0, h, 0.0, 0.0),
        }));
    }
}

impl PageEventSink for PageCanvas<'_> {
    fn on_move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(x, y);
    }

    fn on_line_to(&mut self, x: f64, y: f64) {
        self.path.line_to(x, y);
    }

    fn on_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.path.curve_to(x1, y1, x2, y2, x3, y3);
    }

    fn on_close(&mut self) {
        self.path.close();
    }

    fn on_clip(&mut self, rule: WindingRule) {
        self.path.clip(rule);
    }

    fn on_end_path(&mut self, state: &mut GraphicsState) {
        self.path.end(state);
    }

    fn on_stroke(&mut self, state: &mut GraphicsState) {
        self.paint(state, &[Paint::Stroke]);
    }

    fn on_fill(&mut self, state: &mut GraphicsState, rule: WindingRule) {
        self.paint(state, &[Paint::Fill(rule)]);
    }

    fn on_fill_and_stroke(&mut self, state: &mut GraphicsState, rule: WindingRule) {
        self.paint(state, &[Paint::Fill(rule), Paint::Stroke]);
    }

    fn on_image(&mut self, state: &GraphicsState, image: &ImageData) {
        self.place_image(state, image);
    }

    fn on_begin_text(&mut self, encoded: &[u8]) {
        trace!(bytes = encoded.len(), "begin text");
        if self.text.is_open() {
            // left open by a missing end event
            let flushed = self.text.begin(self.ctx, &self.frame);
            self.push_text(flushed);
        }
    }

    fn on_glyph(&mut self, state: &GraphicsState, glyph: &GlyphEvent) {
        let flushed = self.text.push_glyph(self.ctx, &self.frame, state, glyph);
        self.push_text(flushed);
    }

    fn on_end_text(&mut self, state: &GraphicsState) {
        let flushed = self.text.end(self.ctx, &self.frame, state);
        self.push_text(flushed);
    }
}

/// Translate one page of `interp` into a [`Page`].
///
/// An interpreter error is reported as a diagnostic; the page keeps the
/// objects produced before the failure.
pub fn translate_page<I>(ctx: &ConversionContext, interp: &I, frame: PageFrame) -> Page
where
    I: ContentInterpreter + ?Sized,
{
    debug!(
        page = frame.index,
        width = frame.target_width(),
        height = frame.target_height(),
        scale = frame.scale,
        "translating page"
    );
    let mut canvas = PageCanvas::new(ctx, frame);
    if let Err(e) = interp.run_page(frame.index, &mut canvas) {
        ctx.report(Diagnostic::PageFailed {
            page: frame.index,
            reason: e.to_string(),
        });
    }
    canvas.into_page()
}
