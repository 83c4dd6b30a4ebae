//! Shared fixtures: a scripted content interpreter and font builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use pdf2ofd_core::geometry::{Matrix, mult_matrix, translation};
use pdf2ofd_core::model::{
    Color, FontDescriptor, FontKind, GraphicsState, ImageData, RenderingMode, SourceFont,
    WindingRule,
};
use pdf2ofd_core::{
    ContentInterpreter, ConvertError, GlyphEvent, PageEventSink, PageInfo, Result,
};

// ============================================================================
// Float helpers
// ============================================================================

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[track_caller]
pub fn assert_approx(actual: f64, expected: f64) {
    assert!(approx(actual, expected), "expected {expected}, got {actual}");
}

// ============================================================================
// Fonts
// ============================================================================

/// Type1 font mapping codes 32..=126 to ASCII, no embedded program.
pub fn ascii_font(object_id: u64, name: &str) -> Arc<SourceFont> {
    let mut font = SourceFont::new(object_id, name, FontKind::Type1);
    for code in 32u32..=126 {
        if let Some(c) = char::from_u32(code) {
            font.to_unicode.insert(code, c.to_string());
        }
        font.widths.insert(code, 500.0);
    }
    Arc::new(font)
}

/// Embedded TrueType font with a code to glyph index table.
pub fn embedded_truetype(object_id: u64, program: Option<Vec<u8>>) -> Arc<SourceFont> {
    let mut code_to_gid = HashMap::new();
    for code in 32u32..=126 {
        code_to_gid.insert(code, code - 29);
    }
    let mut font = SourceFont::new(
        object_id,
        "ABCDEF+Body",
        FontKind::TrueType {
            program,
            units_per_em: 1000,
            code_to_gid,
        },
    );
    font.descriptor = Some(FontDescriptor {
        family: Some("Body".into()),
        cap_height: 700.0,
        ascent: 900.0,
        descent: -200.0,
        ..FontDescriptor::default()
    });
    for code in 32u32..=126 {
        if let Some(c) = char::from_u32(code) {
            font.to_unicode.insert(code, c.to_string());
        }
        font.widths.insert(code, 600.0);
    }
    font.embedded = true;
    Arc::new(font)
}

/// Minimal sfnt whose only table is a format 12 Unicode cmap built from
/// `(start, end, start_gid)` groups.
pub fn sfnt_with_cmap(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut sub = Vec::new();
    sub.extend_from_slice(&12u16.to_be_bytes());
    sub.extend_from_slice(&0u16.to_be_bytes());
    sub.extend_from_slice(&(16 + 12 * groups.len() as u32).to_be_bytes());
    sub.extend_from_slice(&0u32.to_be_bytes());
    sub.extend_from_slice(&(groups.len() as u32).to_be_bytes());
    for &(start, end, gid) in groups {
        sub.extend_from_slice(&start.to_be_bytes());
        sub.extend_from_slice(&end.to_be_bytes());
        sub.extend_from_slice(&gid.to_be_bytes());
    }

    // cmap header with one (3, 10) encoding record
    let mut cmap = Vec::new();
    cmap.extend_from_slice(&0u16.to_be_bytes());
    cmap.extend_from_slice(&1u16.to_be_bytes());
    cmap.extend_from_slice(&3u16.to_be_bytes());
    cmap.extend_from_slice(&10u16.to_be_bytes());
    cmap.extend_from_slice(&12u32.to_be_bytes());
    cmap.extend_from_slice(&sub);

    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&1u16.to_be_bytes());
    font.extend_from_slice(&[0; 6]);
    font.extend_from_slice(b"cmap");
    font.extend_from_slice(&0u32.to_be_bytes());
    font.extend_from_slice(&28u32.to_be_bytes());
    font.extend_from_slice(&(cmap.len() as u32).to_be_bytes());
    font.extend_from_slice(&cmap);
    font
}

/// Type1 font whose descriptor carries a FontFile3 program.
pub fn type1_with_program(object_id: u64, name: &str, program: &[u8]) -> Arc<SourceFont> {
    let mut font = (*ascii_font(object_id, name)).clone();
    font.descriptor = Some(FontDescriptor {
        font_files: [None, None, Some(program.to_vec())],
        ..FontDescriptor::default()
    });
    Arc::new(font)
}

// ============================================================================
// Scripted interpreter
// ============================================================================

/// One step of a scripted page.
#[derive(Debug, Clone)]
pub enum Op {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    Close,
    Rect(f64, f64, f64, f64),
    Clip(WindingRule),
    EndPath,
    Stroke,
    Fill(WindingRule),
    FillStroke(WindingRule),
    Ctm(Matrix),
    FillColor(Option<Color>),
    StrokeColor(Option<Color>),
    LineWidth(f64),
    Font(Arc<SourceFont>, f64),
    RenderMode(RenderingMode),
    /// Set the text matrix (`Tm`)
    TextMatrix(Matrix),
    /// Show codes with the current font (`Tj`)
    Show(Vec<u32>),
    Image(ImageData),
    /// Abort the page with an interpreter error
    Fail(String),
}

#[derive(Debug, Clone)]
pub struct ScriptedPage {
    pub info: PageInfo,
    pub ops: Vec<Op>,
}

impl ScriptedPage {
    pub fn new(width: f64, height: f64, ops: Vec<Op>) -> Self {
        Self {
            info: PageInfo { width, height },
            ops,
        }
    }
}

/// Replays scripted operators, tracking a minimal graphics state the way a
/// content-stream interpreter would.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInterpreter {
    pub pages: Vec<ScriptedPage>,
    pub load_error: Option<String>,
    /// Pages whose size lookup fails
    pub broken_info: Vec<usize>,
}

impl ScriptedInterpreter {
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }
}

impl ContentInterpreter for ScriptedInterpreter {
    fn page_count(&self) -> Result<usize> {
        match &self.load_error {
            Some(msg) => Err(ConvertError::SourceLoad(msg.clone())),
            None => Ok(self.pages.len()),
        }
    }

    fn page_info(&self, index: usize) -> Result<PageInfo> {
        if self.broken_info.contains(&index) {
            return Err(ConvertError::Interpreter {
                page: index,
                msg: "missing crop box".into(),
            });
        }
        self.pages
            .get(index)
            .map(|p| p.info)
            .ok_or_else(|| ConvertError::Interpreter {
                page: index,
                msg: "no such page".into(),
            })
    }

    fn run_page(&self, index: usize, sink: &mut dyn PageEventSink) -> Result<()> {
        let page = self.pages.get(index).ok_or_else(|| ConvertError::Interpreter {
            page: index,
            msg: "no such page".into(),
        })?;
        let mut state = GraphicsState::default();
        let mut font: Option<Arc<SourceFont>> = None;
        for op in &page.ops {
            match op {
                Op::MoveTo(x, y) => sink.on_move_to(*x, *y),
                Op::LineTo(x, y) => sink.on_line_to(*x, *y),
                Op::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    sink.on_curve_to(*x1, *y1, *x2, *y2, *x3, *y3)
                }
                Op::Close => sink.on_close(),
                Op::Rect(x, y, w, h) => {
                    sink.on_rectangle((*x, *y), (x + w, *y), (x + w, y + h), (*x, y + h))
                }
                Op::Clip(rule) => sink.on_clip(*rule),
                Op::EndPath => sink.on_end_path(&mut state),
                Op::Stroke => sink.on_stroke(&mut state),
                Op::Fill(rule) => sink.on_fill(&mut state, *rule),
                Op::FillStroke(rule) => sink.on_fill_and_stroke(&mut state, *rule),
                Op::Ctm(m) => state.ctm = *m,
                Op::FillColor(c) => state.fill_color = c.clone(),
                Op::StrokeColor(c) => state.stroke_color = c.clone(),
                Op::LineWidth(w) => state.line_width = *w,
                Op::Font(f, size) => {
                    font = Some(Arc::clone(f));
                    state.text.font_size = *size;
                }
                Op::RenderMode(mode) => state.text.rendering_mode = *mode,
                Op::TextMatrix(m) => state.text.text_matrix = *m,
                Op::Show(codes) => {
                    let Some(font) = &font else {
                        return Err(ConvertError::Interpreter {
                            page: index,
                            msg: "no font selected".into(),
                        });
                    };
                    show(sink, &mut state, font, codes);
                }
                Op::Image(data) => sink.on_image(&state, data),
                Op::Fail(msg) => {
                    return Err(ConvertError::Interpreter {
                        page: index,
                        msg: msg.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn show(
    sink: &mut dyn PageEventSink,
    state: &mut GraphicsState,
    font: &Arc<SourceFont>,
    codes: &[u32],
) {
    let encoded: Vec<u8> = codes.iter().map(|c| *c as u8).collect();
    sink.on_begin_text(&encoded);
    for &code in codes {
        let text = &state.text;
        let fs = text.font_size;
        let th = text.horizontal_scaling / 100.0;
        let params = (fs * th, 0.0, 0.0, fs, 0.0, 0.0);
        let trm = mult_matrix(mult_matrix(params, text.text_matrix), state.ctm);
        let width = font.width(code) / 1000.0;
        sink.on_glyph(
            state,
            &GlyphEvent {
                trm,
                font: Arc::clone(font),
                code,
                displacement: (width, 0.0),
            },
        );
        let advance = translation(width * fs * th, 0.0);
        state.text.text_matrix = mult_matrix(advance, state.text.text_matrix);
    }
    sink.on_end_text(state);
}

/// Codes of an ASCII string.
pub fn codes(s: &str) -> Vec<u32> {
    s.chars().map(u32::from).collect()
}
