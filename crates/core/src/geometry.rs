//! Geometry Transform - source user space to target page space.
//!
//! Source coordinates are PDF user space: bottom-left origin, 1/72 inch
//! units. Target coordinates are OFD page space: top-left origin,
//! millimetres. All functions here are pure.
//!
//! Matrices use the PDF tuple convention `(a, b, c, d, e, f)` which maps
//! `(x, y)` to `(ax + cy + e, bx + dy + f)`. In PDF terms `a`/`d` are the
//! scale terms, `c` is shear-x and `b` is shear-y.

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A 6-element affine transformation matrix (a, b, c, d, e, f).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// Identity transformation matrix.
pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// Angles closer than this to a whole degree are snapped to it.
const ANGLE_SNAP: f64 = 1e-6;

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Multiplies two matrices: applies `m1` first, then `m0`.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

/// Pure translation matrix.
pub const fn translation(tx: f64, ty: f64) -> Matrix {
    (1.0, 0.0, 0.0, 1.0, tx, ty)
}

/// Applies a matrix to a point.
pub fn apply_matrix_pt(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Horizontal scaling factor of a matrix.
///
/// The length of the transformed x unit vector when it carries a shear
/// component, otherwise the signed `a` term.
pub fn scaling_factor_x(m: Matrix) -> f64 {
    let (a, b, ..) = m;
    if b != 0.0 { a.hypot(b) } else { a }
}

/// Vertical scaling factor of a matrix, see [`scaling_factor_x`].
pub fn scaling_factor_y(m: Matrix) -> f64 {
    let (_, _, c, d, ..) = m;
    if c != 0.0 { c.hypot(d) } else { d }
}

/// Rounds to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Scale factor from source units to target millimetres for one page.
///
/// Returns `None` for a degenerate source width.
pub fn page_scale(target_width: f64, source_width: f64) -> Option<f64> {
    if !source_width.is_finite() || source_width <= 0.0 {
        return None;
    }
    Some(round2(target_width / source_width))
}

/// Maps a source point to target page space.
///
/// Flips the y axis against `page_height` (source units) and scales both
/// axes by `scale`.
pub fn to_target_point(x: f64, y: f64, page_height: f64, scale: f64) -> Point {
    (x * scale, (page_height - y) * scale)
}

/// Rotation implied by a matrix, in degrees within `[0, 360)`.
///
/// Derived from `atan2(c, d)`. A matrix with both scale terms zero is an
/// exact quarter turn and is classified from the sign of its shear.
pub fn decompose_rotation(m: Matrix) -> f64 {
    let (a, _, c, d, ..) = m;
    if a == 0.0 && d == 0.0 {
        return if c > 0.0 {
            90.0
        } else if c < 0.0 {
            270.0
        } else {
            0.0
        };
    }
    let mut angle = c.atan2(d).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    let snapped = angle.round();
    if approx_eq(angle, snapped, ANGLE_SNAP) {
        angle = snapped;
    }
    if angle >= 360.0 { angle - 360.0 } else { angle }
}

/// Effective vertical scale of a glyph matrix.
///
/// Quarter-turn matrices have zero scale terms; their size lives in the
/// shear component instead.
pub fn vertical_extent(m: Matrix) -> f64 {
    let (a, _, c, d, ..) = m;
    if a == 0.0 && d == 0.0 {
        c.abs()
    } else {
        scaling_factor_y(m).abs()
    }
}

/// Discrete orientation classes used for text anchoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    Upright,
    Quarter90,
    Quarter270,
    /// Any other angle, in degrees.
    Oblique(f64),
}

impl Orientation {
    pub fn from_angle(angle: f64) -> Self {
        if angle == 0.0 {
            Orientation::Upright
        } else if angle == 90.0 {
            Orientation::Quarter90
        } else if angle == 270.0 {
            Orientation::Quarter270
        } else {
            Orientation::Oblique(angle)
        }
    }

    pub fn of(m: Matrix) -> Self {
        Self::from_angle(decompose_rotation(m))
    }
}

/// Axis-aligned box in target units: origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Boundary {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Boundary {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Boundary of one glyph cell under its text rendering matrix.
///
/// The cell is the `(scaleX + |shearX|) x (scaleY + |shearY|)` box hanging
/// from the baseline origin. The anchor is then moved according to the sign
/// pattern of the matrix so the box keeps enclosing the transformed cell:
///
/// | condition                             | correction                          |
/// |---------------------------------------|-------------------------------------|
/// | shearX < shearY                       | x -= abs(shearX), y -= shearY       |
/// | shearX == shearY                      | y -= shearY                         |
/// | unsheared, scaleX < 0                 | x -= abs(scaleX) (horizontal flip)  |
/// | unsheared, scaleX >= 0, scaleY < 0    | y -= abs(scaleY) (vertical flip)    |
/// | e < 0 / f < 0                         | x += e / y += f                     |
/// | scaleX < 0 and shearX != 0            | x -= abs(scaleX), y -= abs(scaleY)  |
/// | scales zero, shears of equal sign     | y -= height (quarter turn)          |
///
/// All terms are scaled by `scale` before use; `page_height` is in source units.
pub fn glyph_cell_boundary(m: Matrix, page_height: f64, scale: f64) -> Boundary {
    let (a, b, c, d, e, f) = m;
    let (sa, sb, sc, sd) = (a * scale, b * scale, c * scale, d * scale);

    let mut x = e * scale;
    let mut sy = 0.0;
    if c < b {
        sy = sb;
        x -= sc.abs();
    } else if c == b {
        sy = sb;
    }
    let mut y = (page_height - f - d) * scale - sy;

    let width = sa.abs() + sc.abs();
    let height = sd.abs() + sb.abs();

    let unsheared = c == 0.0 || b == 0.0;
    if unsheared {
        if a < 0.0 {
            x -= sa.abs();
        } else if d < 0.0 {
            y -= sd.abs();
        }
    }

    if e < 0.0 {
        x += e * scale;
    }
    if f < 0.0 {
        y += f * scale;
    }

    if a < 0.0 && c != 0.0 {
        x -= sa.abs();
        y -= sd.abs();
    } else if a == 0.0 && d == 0.0 && ((c < 0.0 && b < 0.0) || (c > 0.0 && b > 0.0)) {
        y -= height;
    }

    Boundary::new(x, y, width, height)
}
