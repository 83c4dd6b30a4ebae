//! Source colour values and their conversion to 8-bit RGB.

/// Colour value as held in the source graphics state.
///
/// Component values are in the `[0, 1]` range of their colour space.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Greyscale colour (0.0 = black, 1.0 = white)
    Gray(f64),
    /// RGB colour
    Rgb(f64, f64, f64),
    /// CMYK colour
    Cmyk(f64, f64, f64, f64),
    /// Colour already converted by the interpreter's colour space machinery
    /// (ICC, Lab, Separation, Indexed). `None` when the conversion failed.
    Converted(Option<[f64; 3]>),
    /// Pattern colour - shading and pattern fills have no RGB equivalent.
    Pattern(String),
}

impl Default for Color {
    fn default() -> Self {
        Color::Gray(0.0)
    }
}

impl Color {
    /// Convert to normalised RGB components, `None` when no RGB value exists.
    pub fn to_rgb(&self) -> Option<[f64; 3]> {
        match *self {
            Color::Gray(g) => Some([g, g, g]),
            Color::Rgb(r, g, b) => Some([r, g, b]),
            Color::Cmyk(c, m, y, k) => Some([
                (1.0 - c) * (1.0 - k),
                (1.0 - m) * (1.0 - k),
                (1.0 - y) * (1.0 - k),
            ]),
            Color::Converted(rgb) => rgb,
            Color::Pattern(_) => None,
        }
    }

    /// Convert to 8-bit RGB, see [`Rgb8::from_components`].
    pub fn to_rgb8(&self) -> Option<Rgb8> {
        self.to_rgb().map(Rgb8::from_components)
    }
}

/// 8-bit-per-channel RGB colour in the target document's default colour space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8 { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Clamp normalised components to `[0, 1]` and scale to `[0, 255]`.
    ///
    /// Scaling truncates, so only an exact 1.0 reaches 255.
    pub fn from_components(rgb: [f64; 3]) -> Self {
        Self {
            r: channel(rgb[0]),
            g: channel(rgb[1]),
            b: channel(rgb[2]),
        }
    }
}

fn channel(v: f64) -> u8 {
    if v.is_nan() || v < 0.0 {
        0
    } else {
        (v.min(1.0) * 255.0) as u8
    }
}
