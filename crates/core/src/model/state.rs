//! Graphics and text state snapshots handed in by the source interpreter.
//!
//! The interpreter owns the authoritative state stack; the engine only
//! reads it, except for the clip region which path-terminating operators
//! intersect into.

use super::color::Color;
use crate::geometry::{MATRIX_IDENTITY, Matrix};
use crate::interp::PathSegment;

/// Text rendering mode (PDF `Tr` operand 0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    #[default]
    Fill,
    Stroke,
    FillStroke,
    Neither,
    FillClip,
    StrokeClip,
    FillStrokeClip,
    Clip,
}

impl RenderingMode {
    /// Map a `Tr` operand. Out-of-range values fall back to `Fill`.
    pub fn from_operand(value: i32) -> Self {
        match value {
            1 => RenderingMode::Stroke,
            2 => RenderingMode::FillStroke,
            3 => RenderingMode::Neither,
            4 => RenderingMode::FillClip,
            5 => RenderingMode::StrokeClip,
            6 => RenderingMode::FillStrokeClip,
            7 => RenderingMode::Clip,
            _ => RenderingMode::Fill,
        }
    }

    pub fn is_fill(self) -> bool {
        matches!(
            self,
            RenderingMode::Fill
                | RenderingMode::FillStroke
                | RenderingMode::FillClip
                | RenderingMode::FillStrokeClip
        )
    }

    pub fn is_stroke(self) -> bool {
        matches!(
            self,
            RenderingMode::Stroke
                | RenderingMode::FillStroke
                | RenderingMode::StrokeClip
                | RenderingMode::FillStrokeClip
        )
    }
}

/// Path filling rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Text state parameters needed for glyph placement.
#[derive(Debug, Clone)]
pub struct TextState {
    /// Font size in text space units (`Tf` operand)
    pub font_size: f64,
    /// Horizontal scaling percentage (100 = normal)
    pub horizontal_scaling: f64,
    /// Text rendering mode
    pub rendering_mode: RenderingMode,
    /// Text matrix (Tm)
    pub text_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_size: 0.0,
            horizontal_scaling: 100.0,
            rendering_mode: RenderingMode::Fill,
            text_matrix: MATRIX_IDENTITY,
        }
    }
}

/// One path intersected into the clip region.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub segments: Vec<PathSegment>,
    pub rule: WindingRule,
}

/// Clip region of the current graphics state: the intersection of every
/// recorded path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipRegion {
    paths: Vec<ClipPath>,
}

impl ClipRegion {
    pub fn intersect(&mut self, segments: Vec<PathSegment>, rule: WindingRule) {
        self.paths.push(ClipPath { segments, rule });
    }

    pub fn paths(&self) -> &[ClipPath] {
        &self.paths
    }

    /// True when nothing has been intersected (the whole page is visible).
    pub fn is_unbounded(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Graphics state snapshot.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Current transformation matrix
    pub ctm: Matrix,
    /// Line width in user space units
    pub line_width: f64,
    /// Stroking colour, `None` when the interpreter could not resolve one
    pub stroke_color: Option<Color>,
    /// Non-stroking (fill) colour
    pub fill_color: Option<Color>,
    /// Text parameters
    pub text: TextState,
    /// Current clip region
    pub clip: ClipRegion,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: MATRIX_IDENTITY,
            line_width: 1.0,
            stroke_color: Some(Color::Gray(0.0)),
            fill_color: Some(Color::Gray(0.0)),
            text: TextState::default(),
            clip: ClipRegion::default(),
        }
    }
}
