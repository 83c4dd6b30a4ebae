//! Text Run Assembler - positioned glyphs to text objects.
//!
//! Glyphs of one text-show operation accumulate into a run until the font
//! changes or the operation ends. The first glyph fixes the run's font
//! resource, anchor and boundary; every later glyph only contributes its
//! text, its pen movement (as sparse deltas) and its glyph index.
//!
//! Anchoring depends on the orientation of the text rendering matrix:
//!
//! | orientation      | anchor (x, y)                                        |
//! |------------------|------------------------------------------------------|
//! | 0                | (0, size)                                            |
//! | 90 / 270, c > 0  | (3 * size * abs(c'), 0)                              |
//! | 90 / 270, c <= 0 | (-size, size)                                        |
//! | below 90         | (size * angle / 90, size - x)                        |
//! | above 270        | (size * (angle - 360) / 90, size + abs(x / 2))       |
//! | otherwise        | origin rotated by angle about (advance, height)      |
//!
//! `c'` is the shear-x term of the next glyph's rendering matrix.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::path::resolve_color;
use super::{ConversionContext, PageFrame};
use crate::error::{ColorRole, Diagnostic};
use crate::font::UnicodeCmap;
use crate::geometry::{
    Boundary, Matrix, Orientation, Point, decompose_rotation, glyph_cell_boundary, mult_matrix,
    scaling_factor_y, translation,
};
use crate::interp::GlyphEvent;
use crate::model::{Color, GraphicsState, RenderingMode, SourceFont};
use crate::ofd::{CgTransform, Id, TextCode, TextObject};

/// Glyph placement derived from one glyph event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// Rotation of the rendering matrix in degrees
    pub angle: f64,
    pub orientation: Orientation,
    /// Rendering matrix of the following glyph
    pub next_trm: Matrix,
    /// Pen advance in source units
    pub advance: f64,
    /// Glyph height in source units (may be negative for flipped text)
    pub height: f64,
    /// Font size used for the text object
    pub size: f64,
    /// Top-left of the glyph in target units
    pub top_left: Point,
}

impl GlyphMetrics {
    pub fn measure(frame: &PageFrame, state: &GraphicsState, glyph: &GlyphEvent) -> Self {
        let trm = glyph.trm;
        let text = &state.text;
        let font_size = text.font_size;
        let hscale = text.horizontal_scaling / 100.0;

        let angle = decompose_rotation(trm);
        let orientation = Orientation::from_angle(angle);

        let advance_x = glyph
            .font
            .horizontal_advance(glyph.code, glyph.displacement.0);
        let td = translation(
            advance_x * font_size * hscale,
            glyph.displacement.1 * font_size,
        );
        let next_trm = mult_matrix(mult_matrix(td, text.text_matrix), state.ctm);

        let advance = next_trm.4 - trm.4;
        let height = glyph.font.text_space_height() * scaling_factor_y(trm);

        let mut size = if orientation == Orientation::Upright {
            trm.3 * frame.scale
        } else {
            font_size
        };
        if size == 0.0 {
            size = height * frame.scale;
        }

        Self {
            angle,
            orientation,
            next_trm,
            advance,
            height,
            size,
            top_left: (trm.4 * frame.scale, (frame.height - trm.5) * frame.scale),
        }
    }

    /// Text code anchor relative to the object boundary.
    pub fn anchor(&self, frame: &PageFrame) -> Point {
        let size = self.size;
        match self.orientation {
            Orientation::Upright => (0.0, size),
            Orientation::Quarter90 | Orientation::Quarter270 => {
                let shear = self.next_trm.2;
                if shear > 0.0 {
                    (size * shear.abs() * 3.0, 0.0)
                } else {
                    (-size, size)
                }
            }
            Orientation::Oblique(angle) if angle < 90.0 => {
                let x = size * (angle / 90.0);
                (x, size - x)
            }
            Orientation::Oblique(angle) if angle > 270.0 => {
                let x = size * ((angle - 360.0) / 90.0);
                (x, size + (x / 2.0).abs())
            }
            Orientation::Oblique(angle) => {
                let (sin, cos) = angle.to_radians().sin_cos();
                let w = self.advance * frame.scale;
                let h = self.height.abs() * frame.scale;
                (w * (1.0 - cos) + h * sin, h * (1.0 - cos) - w * sin)
            }
        }
    }

    /// Boundary of a text object opened by this glyph.
    pub fn boundary(&self, frame: &PageFrame, trm: Matrix) -> Boundary {
        let (x, y) = self.top_left;
        if self.orientation == Orientation::Upright {
            return Boundary::new(
                x,
                (y - self.size).abs(),
                trm.0 * frame.scale,
                self.height * frame.scale,
            );
        }
        let cell = glyph_cell_boundary(trm, frame.height, frame.scale);
        let width = if self.orientation == Orientation::Quarter90 {
            self.size * self.next_trm.2.abs()
        } else {
            self.size
        };
        Boundary::new(cell.x, cell.y, width, self.height.abs() * frame.scale)
    }

    /// Object CTM: shear only for upright text, the next glyph matrix otherwise.
    pub fn ctm(&self, frame: &PageFrame, ctm: Matrix) -> Matrix {
        let s = frame.scale;
        if self.orientation == Orientation::Upright {
            (1.0, ctm.2 * s, ctm.1 * s, 1.0, 0.0, 0.0)
        } else {
            let n = self.next_trm;
            (n.0 * s, n.2 * s, n.1 * s, n.3 * s, 0.0, 0.0)
        }
    }
}

/// Glyphs produced by one character of the decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GlyphSpan {
    glyph: u32,
    chars: usize,
}

/// Paint parameters a run is finished with.
#[derive(Debug, Clone, Default)]
struct RunStyle {
    mode: RenderingMode,
    fill: Option<Color>,
    stroke: Option<Color>,
}

impl RunStyle {
    fn of(state: &GraphicsState) -> Self {
        Self {
            mode: state.text.rendering_mode,
            fill: state.fill_color.clone(),
            stroke: state.stroke_color.clone(),
        }
    }
}

/// Run being assembled.
#[derive(Debug)]
struct OpenRun {
    font: Arc<SourceFont>,
    object: TextObject,
    records_glyphs: bool,
    spans: Vec<GlyphSpan>,
    prev: Point,
    glyph_count: usize,
    /// Style of the last glyph pushed
    style: RunStyle,
}

impl OpenRun {
    fn push_delta(&mut self, top_left: Point) {
        if self.glyph_count > 0 {
            let code = &mut self.object.text_code;
            if top_left.0 != self.prev.0 {
                code.delta_x.push(top_left.0 - self.prev.0);
            }
            if top_left.1 != self.prev.1 {
                code.delta_y.push(top_left.1 - self.prev.1);
            }
        }
        self.prev = top_left;
        self.glyph_count += 1;
    }

    fn cg_transforms(&self) -> Vec<CgTransform> {
        if self.spans.is_empty() {
            return Vec::new();
        }
        if self.spans.iter().all(|s| s.chars == 1) {
            return vec![CgTransform {
                code_position: 0,
                code_count: self.spans.len(),
                glyph_count: self.spans.len(),
                glyphs: self.spans.iter().map(|s| s.glyph).collect(),
            }];
        }
        let mut position = 0;
        self.spans
            .iter()
            .map(|span| {
                let cg = CgTransform {
                    code_position: position,
                    code_count: span.chars,
                    glyph_count: 1,
                    glyphs: vec![span.glyph],
                };
                position += span.chars;
                cg
            })
            .collect()
    }

    fn finish(mut self, ctx: &ConversionContext, frame: &PageFrame) -> TextObject {
        self.object.cg_transforms = self.cg_transforms();

        let code = &self.object.text_code;
        let dx: f64 = code.delta_x.iter().sum();
        let dy: f64 = code.delta_y.iter().sum();
        self.object.boundary.width += dx.abs();
        self.object.boundary.height += dy.abs();

        let style = &self.style;
        if style.mode.is_fill() {
            self.object.fill_color = resolve_color(ctx, frame, style.fill.as_ref(), ColorRole::Fill);
            self.object.fill = self.object.fill_color.is_some();
        } else {
            self.object.fill_color = style.fill.as_ref().and_then(|c| c.to_rgb8());
        }
        if style.mode.is_stroke() {
            self.object.stroke_color =
                resolve_color(ctx, frame, style.stroke.as_ref(), ColorRole::Stroke);
            self.object.stroke = self.object.stroke_color.is_some();
        } else {
            self.object.stroke_color = style.stroke.as_ref().and_then(|c| c.to_rgb8());
        }

        trace!(
            id = %self.object.id,
            font = %self.object.font,
            glyphs = self.glyph_count,
            "text run"
        );
        self.object
    }
}

/// Accumulates the glyphs of text-show operations into text objects.
#[derive(Debug, Default)]
pub struct TextRunAssembler {
    run: Option<OpenRun>,
    /// Parsed Unicode cmaps by font object, `None` when parsing failed
    cmaps: FxHashMap<u64, Option<UnicodeCmap>>,
    /// (font object, code) pairs already reported as undecodable
    undecodable: FxHashSet<(u64, u32)>,
}

impl TextRunAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a run is open.
    pub fn is_open(&self) -> bool {
        self.run.is_some()
    }

    /// Start a text-show operation. A run left open is flushed first.
    pub fn begin(&mut self, ctx: &ConversionContext, frame: &PageFrame) -> Option<TextObject> {
        self.flush(ctx, frame)
    }

    /// Close the current run, if any, with the style of its last glyph.
    pub fn flush(&mut self, ctx: &ConversionContext, frame: &PageFrame) -> Option<TextObject> {
        let run = self.run.take()?;
        Some(run.finish(ctx, frame))
    }

    /// Add one glyph. Returns the previous run when the font changed.
    pub fn push_glyph(
        &mut self,
        ctx: &ConversionContext,
        frame: &PageFrame,
        state: &GraphicsState,
        glyph: &GlyphEvent,
    ) -> Option<TextObject> {
        let font = &glyph.font;
        let font_changed = self
            .run
            .as_ref()
            .is_some_and(|run| run.font.object_id != font.object_id);
        let flushed = if font_changed {
            self.flush(ctx, frame)
        } else {
            None
        };

        let (text, decoded) = match font.to_unicode(glyph.code) {
            Some(text) => (text.to_string(), true),
            None => {
                if self.undecodable.insert((font.object_id, glyph.code)) {
                    ctx.report(Diagnostic::UndecodableGlyph {
                        page: frame.index,
                        font: font.name.clone(),
                        code: glyph.code,
                    });
                }
                (ctx.params.placeholder.to_string(), false)
            }
        };

        let metrics = GlyphMetrics::measure(frame, state, glyph);
        if self.run.is_none() {
            self.run = Some(self.open(ctx, frame, glyph, &metrics));
        }

        let cmap = self.cmaps.get(&font.object_id).and_then(Option::as_ref);
        let glyph_index = resolve_glyph_index(font, cmap, glyph.code, &text, decoded);

        let Some(run) = self.run.as_mut() else {
            return flushed;
        };
        if run.records_glyphs {
            run.spans.push(GlyphSpan {
                glyph: glyph_index,
                chars: text.chars().count(),
            });
        }
        run.push_delta(metrics.top_left);
        run.object.text_code.content.push_str(&text);

        if state.text.rendering_mode.is_stroke() {
            let width = state.line_width.max(ctx.params.min_text_line_width);
            run.object.line_width = Some(width * frame.scale);
        }
        run.object.ctm = Some(metrics.ctm(frame, state.ctm));
        run.style = RunStyle::of(state);

        flushed
    }

    /// End the text-show operation, flushing the open run with `state`.
    pub fn end(
        &mut self,
        ctx: &ConversionContext,
        frame: &PageFrame,
        state: &GraphicsState,
    ) -> Option<TextObject> {
        if let Some(run) = self.run.as_mut() {
            run.style = RunStyle::of(state);
        }
        self.flush(ctx, frame)
    }

    fn open(
        &mut self,
        ctx: &ConversionContext,
        frame: &PageFrame,
        glyph: &GlyphEvent,
        metrics: &GlyphMetrics,
    ) -> OpenRun {
        let font = Arc::clone(&glyph.font);
        let id = ctx.ids.allocate();
        let font_id = self.font_resource(ctx, &font);
        let records_glyphs = font.records_glyph_indices();
        if records_glyphs {
            self.load_cmap(&font);
        }

        let (x, y) = metrics.anchor(frame);
        if metrics.orientation != Orientation::Upright {
            debug!(
                %id,
                angle = metrics.angle,
                anchor_x = x,
                anchor_y = y,
                "rotated text run"
            );
        }

        OpenRun {
            object: TextObject {
                id,
                boundary: metrics.boundary(frame, glyph.trm),
                font: font_id,
                size: metrics.size,
                ctm: None,
                line_width: None,
                fill: false,
                stroke: false,
                fill_color: None,
                stroke_color: None,
                text_code: TextCode {
                    x,
                    y,
                    ..TextCode::default()
                },
                cg_transforms: Vec::new(),
            },
            font,
            records_glyphs,
            spans: Vec::new(),
            prev: metrics.top_left,
            glyph_count: 0,
            style: RunStyle::default(),
        }
    }

    fn font_resource(&self, ctx: &ConversionContext, font: &SourceFont) -> Id {
        if let Some(id) = ctx.registry.font_for_key(font.object_id) {
            return id;
        }
        let handle = ctx.registry.intern_font(
            &ctx.ids,
            font.object_id,
            font.program_bytes(),
            font.family_name(),
            font.family_name(),
        );
        if handle.created && handle.stub {
            ctx.report(Diagnostic::MissingFontProgram {
                font: font.name.clone(),
            });
        }
        handle.id
    }

    fn load_cmap(&mut self, font: &SourceFont) {
        let Some(program) = font.truetype_program() else {
            return;
        };
        self.cmaps.entry(font.object_id).or_insert_with(|| {
            UnicodeCmap::parse(program)
                .map_err(|e| debug!(font = %font.name, error = ?e, "no unicode cmap"))
                .ok()
        });
    }
}

/// Glyph index recorded for a glyph of an embedded font.
///
/// The subtype's own mapping is overridden by the program's Unicode cmap
/// when one was loaded. Undecodable glyphs and unresolved indices fall back
/// to the raw code.
fn resolve_glyph_index(
    font: &SourceFont,
    cmap: Option<&UnicodeCmap>,
    code: u32,
    text: &str,
    decoded: bool,
) -> u32 {
    let mut gid = font.code_to_gid(code);
    if let Some(cmap) = cmap {
        gid = text
            .chars()
            .next()
            .and_then(|c| cmap.glyph_id(u32::from(c)))
            .unwrap_or(0);
    }
    if !decoded || gid == 0 { code } else { gid }
}
