//! Page content translation.
//!
//! - `path`: Path Accumulator, retained path to path objects
//! - `text`: Text Run Assembler, positioned glyphs to text objects
//! - `page`: Page Canvas, the [`PageEventSink`](crate::interp::PageEventSink)
//!   the interpreter drives for one page
//!
//! All three share one [`ConversionContext`] per document and one
//! [`PageFrame`] per page.

pub mod page;
pub mod path;
pub mod text;

use std::sync::Mutex;

use tracing::warn;

use crate::error::Diagnostic;
use crate::geometry::{Boundary, Point, page_scale, to_target_point};
use crate::interp::PageInfo;
use crate::params::TranslateParams;
use crate::resource::{IdAllocator, ResourceRegistry};

pub use page::{PageCanvas, translate_page};
pub use path::{Paint, PathAccumulator};
pub use text::TextRunAssembler;

/// Document-wide state threaded through every translation call.
///
/// Shared by reference between pages; every field is safe to use from
/// several threads at once.
#[derive(Debug, Default)]
pub struct ConversionContext {
    pub ids: IdAllocator,
    pub registry: ResourceRegistry,
    pub params: TranslateParams,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl ConversionContext {
    pub fn new(params: TranslateParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Record a non-fatal condition and log it.
    pub fn report(&self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.diagnostics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(diagnostic);
    }

    /// Diagnostics raised so far, in report order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Split into the registry and the collected diagnostics.
    pub fn into_parts(self) -> (IdAllocator, ResourceRegistry, Vec<Diagnostic>) {
        let diagnostics = self.diagnostics.into_inner().unwrap_or_else(|e| e.into_inner());
        (self.ids, self.registry, diagnostics)
    }
}

/// Placement of one source page in target space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Zero-based page index
    pub index: usize,
    /// Source width in user space units
    pub width: f64,
    /// Source height in user space units
    pub height: f64,
    /// Source units to millimetres
    pub scale: f64,
}

impl PageFrame {
    /// Frame scaling `info` onto `target_width`. `None` for a degenerate page.
    pub fn fit(index: usize, info: PageInfo, target_width: f64) -> Option<Self> {
        if !info.height.is_finite() || info.height <= 0.0 {
            return None;
        }
        let scale = page_scale(target_width, info.width)?;
        Some(Self {
            index,
            width: info.width,
            height: info.height,
            scale,
        })
    }

    /// Frame with an explicit scale.
    pub const fn with_scale(index: usize, width: f64, height: f64, scale: f64) -> Self {
        Self {
            index,
            width,
            height,
            scale,
        }
    }

    pub fn target_width(&self) -> f64 {
        self.width * self.scale
    }

    pub fn target_height(&self) -> f64 {
        self.height * self.scale
    }

    /// Physical box of the page in target units.
    pub fn physical_box(&self) -> Boundary {
        Boundary::new(0.0, 0.0, self.target_width(), self.target_height())
    }

    /// Source point to target page space.
    pub fn to_target(&self, x: f64, y: f64) -> Point {
        to_target_point(x, y, self.height, self.scale)
    }
}
