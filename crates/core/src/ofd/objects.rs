//! OFD page objects.
//!
//! Plain data produced by the translator and consumed by the container
//! writer. Coordinates are target page millimetres with a top-left origin.

use std::fmt;

use crate::geometry::{Boundary, Matrix};
use crate::model::{Rgb8, WindingRule};

/// Document-scoped identifier (`ST_ID`) shared by page objects and resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub u64);

impl Id {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One command of a path's abbreviated data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Move(f64, f64),
    Line(f64, f64),
    Cubic(f64, f64, f64, f64, f64, f64),
    Close,
}

/// Path geometry in target units (`AbbreviatedData`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbbreviatedData {
    commands: Vec<PathCommand>,
}

impl AbbreviatedData {
    pub fn push(&mut self, cmd: PathCommand) {
        self.commands.push(cmd);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Renders the OFD textual form, e.g. `M 0 0 L 10 0 C`.
impl fmt::Display for AbbreviatedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cmd in &self.commands {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match *cmd {
                PathCommand::Move(x, y) => write!(f, "M {} {}", num(x), num(y))?,
                PathCommand::Line(x, y) => write!(f, "L {} {}", num(x), num(y))?,
                PathCommand::Cubic(x1, y1, x2, y2, x3, y3) => write!(
                    f,
                    "B {} {} {} {} {} {}",
                    num(x1),
                    num(y1),
                    num(x2),
                    num(y2),
                    num(x3),
                    num(y3)
                )?,
                PathCommand::Close => f.write_str("C")?,
            }
        }
        Ok(())
    }
}

/// Format a coordinate with at most three decimals and no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// A filled or stroked vector path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathObject {
    pub id: Id,
    pub boundary: Boundary,
    pub line_width: f64,
    pub fill: bool,
    pub stroke: bool,
    pub fill_color: Option<Rgb8>,
    pub stroke_color: Option<Rgb8>,
    pub rule: WindingRule,
    pub data: AbbreviatedData,
}

/// A placed image referencing a multimedia resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageObject {
    pub id: Id,
    pub boundary: Boundary,
    pub resource_id: Id,
    pub ctm: Matrix,
}

/// Positioned text content of a text object.
///
/// `delta_x`/`delta_y` are sparse: only advances that moved the pen are
/// listed, a missing entry means the default advance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextCode {
    pub x: f64,
    pub y: f64,
    pub delta_x: Vec<f64>,
    pub delta_y: Vec<f64>,
    pub content: String,
}

/// Character to glyph binding (`CGTransform`) for embedded subset fonts.
#[derive(Debug, Clone, PartialEq)]
pub struct CgTransform {
    /// Offset of the first character, in characters of the content
    pub code_position: usize,
    pub code_count: usize,
    pub glyph_count: usize,
    pub glyphs: Vec<u32>,
}

/// A run of glyphs in one font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    pub id: Id,
    pub boundary: Boundary,
    pub font: Id,
    pub size: f64,
    pub ctm: Option<Matrix>,
    pub line_width: Option<f64>,
    pub fill: bool,
    pub stroke: bool,
    pub fill_color: Option<Rgb8>,
    pub stroke_color: Option<Rgb8>,
    pub text_code: TextCode,
    pub cg_transforms: Vec<CgTransform>,
}

/// Any object placed on a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PageObject {
    Path(PathObject),
    Image(ImageObject),
    Text(TextObject),
}

impl PageObject {
    pub fn id(&self) -> Id {
        match self {
            PageObject::Path(p) => p.id,
            PageObject::Image(i) => i.id,
            PageObject::Text(t) => t.id,
        }
    }

    pub fn boundary(&self) -> Boundary {
        match self {
            PageObject::Path(p) => p.boundary,
            PageObject::Image(i) => i.boundary,
            PageObject::Text(t) => t.boundary,
        }
    }

    pub fn ctm(&self) -> Option<Matrix> {
        match self {
            PageObject::Path(_) => None,
            PageObject::Image(i) => Some(i.ctm),
            PageObject::Text(t) => t.ctm,
        }
    }

    pub fn as_path(&self) -> Option<&PathObject> {
        match self {
            PageObject::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageObject> {
        match self {
            PageObject::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextObject> {
        match self {
            PageObject::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Ordered page objects of one rendered page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    objects: Vec<PageObject>,
}

impl Layer {
    pub fn push(&mut self, obj: PageObject) {
        self.objects.push(obj);
    }

    pub fn objects(&self) -> &[PageObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageObject> {
        self.objects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviated_data_text() {
        let mut data = AbbreviatedData::default();
        data.push(PathCommand::Move(0.0, 10.0));
        data.push(PathCommand::Line(2.5, -0.0004));
        data.push(PathCommand::Cubic(1.0, 2.0, 3.0, 4.0, 5.125, 6.0));
        data.push(PathCommand::Close);
        assert_eq!(data.to_string(), "M 0 10 L 2.5 0 B 1 2 3 4 5.125 6 C");
    }
}
