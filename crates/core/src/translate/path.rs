//! Path Accumulator - retained path construction and painting.
//!
//! Segments collect in source coordinates until a painting or end operator
//! arrives. Painting converts them to target space and emits one path
//! object per painting pass; every path-terminating operator then resets
//! the retained path.

use tracing::trace;

use super::{ConversionContext, PageFrame};
use crate::error::{ColorRole, Diagnostic};
use crate::interp::PathSegment;
use crate::model::{Color, GraphicsState, Rgb8, WindingRule};
use crate::ofd::{AbbreviatedData, PathCommand, PathObject};

/// One painting pass over the retained path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Fill(WindingRule),
    Stroke,
}

/// Retained path of one page.
#[derive(Debug, Clone, Default)]
pub struct PathAccumulator {
    segments: Vec<PathSegment>,
    pending_clip: Option<WindingRule>,
}

impl PathAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::LineTo(x, y));
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.segments
            .push(PathSegment::CurveTo(x1, y1, x2, y2, x3, y3));
    }

    pub fn close(&mut self) {
        self.segments.push(PathSegment::ClosePath);
    }

    /// Mark the retained path as a clip path for the next terminating operator.
    pub fn clip(&mut self, rule: WindingRule) {
        self.pending_clip = Some(rule);
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn pending_clip(&self) -> Option<WindingRule> {
        self.pending_clip
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Terminate the path: intersect a pending clip into `state`, then reset.
    pub fn end(&mut self, state: &mut GraphicsState) {
        let segments = std::mem::take(&mut self.segments);
        if let Some(rule) = self.pending_clip.take() {
            trace!(segments = segments.len(), ?rule, "clip");
            state.clip.intersect(segments, rule);
        }
    }

    /// Retained path in target units.
    pub fn to_abbreviated(&self, frame: &PageFrame) -> AbbreviatedData {
        let mut data = AbbreviatedData::default();
        for seg in &self.segments {
            let cmd = match *seg {
                PathSegment::MoveTo(x, y) => {
                    let (x, y) = frame.to_target(x, y);
                    PathCommand::Move(x, y)
                }
                PathSegment::LineTo(x, y) => {
                    let (x, y) = frame.to_target(x, y);
                    PathCommand::Line(x, y)
                }
                PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    let (x1, y1) = frame.to_target(x1, y1);
                    let (x2, y2) = frame.to_target(x2, y2);
                    let (x3, y3) = frame.to_target(x3, y3);
                    PathCommand::Cubic(x1, y1, x2, y2, x3, y3)
                }
                PathSegment::ClosePath => PathCommand::Close,
            };
            data.push(cmd);
        }
        data
    }

    /// Build the path object for one painting pass.
    ///
    /// Returns `None` when nothing has been retained. A colour that cannot
    /// be resolved clears the matching style flag.
    pub fn paint(
        &self,
        ctx: &ConversionContext,
        frame: &PageFrame,
        state: &GraphicsState,
        paint: Paint,
    ) -> Option<PathObject> {
        if self.segments.is_empty() {
            return None;
        }
        let (fill, stroke, rule) = match paint {
            Paint::Fill(rule) => {
                let color = resolve_color(ctx, frame, state.fill_color.as_ref(), ColorRole::Fill);
                (color, None, rule)
            }
            Paint::Stroke => {
                let color =
                    resolve_color(ctx, frame, state.stroke_color.as_ref(), ColorRole::Stroke);
                (None, color, WindingRule::NonZero)
            }
        };

        Some(PathObject {
            id: ctx.ids.allocate(),
            boundary: frame.physical_box(),
            line_width: state.line_width * frame.scale,
            fill: fill.is_some(),
            stroke: stroke.is_some(),
            fill_color: fill,
            stroke_color: stroke,
            rule,
            data: self.to_abbreviated(frame),
        })
    }
}

/// Convert a graphics state colour, reporting failures.
pub(crate) fn resolve_color(
    ctx: &ConversionContext,
    frame: &PageFrame,
    color: Option<&Color>,
    role: ColorRole,
) -> Option<Rgb8> {
    let rgb = color.and_then(Color::to_rgb8);
    if rgb.is_none() {
        ctx.report(Diagnostic::UnresolvableColor {
            page: frame.index,
            role,
        });
    }
    rgb
}
