//! Source font description.
//!
//! The interpreter resolves font dictionaries into [`SourceFont`] values and
//! shares them behind `Arc`. The engine reads metrics, Unicode mappings and
//! the embedded font program from here; it never parses font dictionaries.

use std::collections::HashMap;

use crate::geometry::{Matrix, apply_matrix_pt};

/// Font bounding box in glyph space: (llx, lly, urx, ury).
pub type FontBBox = (f64, f64, f64, f64);

/// Font descriptor fields the engine relies on.
#[derive(Debug, Clone, Default)]
pub struct FontDescriptor {
    /// FontFamily entry
    pub family: Option<String>,
    pub cap_height: f64,
    pub ascent: f64,
    pub descent: f64,
    /// Contents of FontFile, FontFile2 and FontFile3, in that order.
    pub font_files: [Option<Vec<u8>>; 3],
}

impl FontDescriptor {
    /// First non-empty embedded font file, trying slots 1, 2, 3 in order.
    pub fn first_font_file(&self) -> Option<&[u8]> {
        self.font_files
            .iter()
            .flatten()
            .map(Vec::as_slice)
            .find(|data| !data.is_empty())
    }
}

/// Descendant of a composite (Type0) font.
#[derive(Debug, Clone)]
pub enum CidFont {
    /// CIDFontType0: CFF-based glyph descriptions.
    Type0,
    /// CIDFontType2: TrueType-based glyph descriptions.
    Type2 {
        program: Option<Vec<u8>>,
        units_per_em: u16,
    },
}

/// Font subtype with the data each subtype needs for glyph lookup.
#[derive(Debug, Clone)]
pub enum FontKind {
    TrueType {
        program: Option<Vec<u8>>,
        units_per_em: u16,
        code_to_gid: HashMap<u32, u32>,
    },
    Type0 {
        descendant: CidFont,
    },
    Type1,
    Type1C {
        code_to_name: HashMap<u32, String>,
        name_to_gid: HashMap<String, u32>,
    },
    Type3 {
        font_matrix: Matrix,
    },
}

/// A font as resolved by the source interpreter.
#[derive(Debug, Clone)]
pub struct SourceFont {
    /// Identity of the font object in the source document. The same
    /// object shown many times on a page maps to a single resource.
    pub object_id: u64,
    /// BaseFont name
    pub name: String,
    pub kind: FontKind,
    pub descriptor: Option<FontDescriptor>,
    pub bbox: FontBBox,
    /// Code to Unicode mapping (ToUnicode CMap or encoding derived)
    pub to_unicode: HashMap<u32, String>,
    /// Glyph widths in 1/1000 text space units
    pub widths: HashMap<u32, f64>,
    pub default_width: f64,
    /// Vertical writing mode
    pub vertical: bool,
    /// Whether the font program is embedded in the source document.
    pub embedded: bool,
    /// Whether the font will be embedded as a subset.
    pub will_be_subset: bool,
}

impl SourceFont {
    pub fn new(object_id: u64, name: impl Into<String>, kind: FontKind) -> Self {
        Self {
            object_id,
            name: name.into(),
            kind,
            descriptor: None,
            bbox: (0.0, -200.0, 1000.0, 800.0),
            to_unicode: HashMap::new(),
            widths: HashMap::new(),
            default_width: 1000.0,
            vertical: false,
            embedded: false,
            will_be_subset: false,
        }
    }

    /// Unicode text for a code, `None` when missing or empty.
    pub fn to_unicode(&self, code: u32) -> Option<&str> {
        self.to_unicode
            .get(&code)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Glyph width in 1/1000 text space units.
    pub fn width(&self, code: u32) -> f64 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }

    /// Family name: descriptor FontFamily, else the base font name.
    pub fn family_name(&self) -> &str {
        self.descriptor
            .as_ref()
            .and_then(|d| d.family.as_deref())
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.name)
    }

    /// Glyph indices are recorded when the font is (or will be) embedded.
    pub fn records_glyph_indices(&self) -> bool {
        self.embedded || self.will_be_subset
    }

    /// TrueType program backing this font, if any.
    pub fn truetype_program(&self) -> Option<&[u8]> {
        match &self.kind {
            FontKind::TrueType { program, .. } => program.as_deref(),
            FontKind::Type0 {
                descendant: CidFont::Type2 { program, .. },
            } => program.as_deref(),
            _ => None,
        }
        .filter(|data| !data.is_empty())
    }

    /// Units per em of a TrueType program, when one backs the font.
    pub fn units_per_em(&self) -> Option<u16> {
        match &self.kind {
            FontKind::TrueType { units_per_em, .. } => Some(*units_per_em),
            FontKind::Type0 {
                descendant: CidFont::Type2 { units_per_em, .. },
            } => Some(*units_per_em),
            _ => None,
        }
    }

    /// Extract the embedded font program, one strategy per subtype.
    pub fn program_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            FontKind::TrueType { .. } => self.truetype_program().or_else(|| self.font_file()),
            FontKind::Type0 { descendant } => match descendant {
                CidFont::Type2 { .. } => self.truetype_program().or_else(|| self.font_file()),
                CidFont::Type0 => self.font_file(),
            },
            FontKind::Type1 | FontKind::Type1C { .. } | FontKind::Type3 { .. } => {
                self.font_file()
            }
        }
    }

    fn font_file(&self) -> Option<&[u8]> {
        self.descriptor.as_ref().and_then(FontDescriptor::first_font_file)
    }

    /// Glyph index for a code from the subtype's own tables.
    ///
    /// Falls back to the code itself when the subtype has no mapping.
    pub fn code_to_gid(&self, code: u32) -> u32 {
        match &self.kind {
            FontKind::TrueType { code_to_gid, .. } => {
                code_to_gid.get(&code).copied().unwrap_or(code)
            }
            FontKind::Type1C {
                code_to_name,
                name_to_gid,
            } => code_to_name
                .get(&code)
                .and_then(|name| name_to_gid.get(name))
                .copied()
                .unwrap_or(code),
            _ => code,
        }
    }

    /// Glyph height in glyph space.
    ///
    /// Half the bounding box height, tightened by CapHeight and then by the
    /// ascent/descent span when the descriptor values look saner.
    pub fn glyph_height(&self) -> f64 {
        let (_, mut lly, _, ury) = self.bbox;
        if lly < f64::from(i16::MIN) {
            lly = -(lly + 65536.0);
        }
        let mut height = (ury - lly) / 2.0;

        if let Some(desc) = &self.descriptor {
            let cap = desc.cap_height;
            if cap != 0.0 && (cap < height || height == 0.0) {
                height = cap;
            }
            let (ascent, descent) = (desc.ascent, desc.descent);
            if cap > ascent
                && ascent > 0.0
                && descent < 0.0
                && ((ascent - descent) / 2.0 < height || height == 0.0)
            {
                height = (ascent - descent) / 2.0;
            }
        }
        height
    }

    /// Glyph height converted to text space.
    pub fn text_space_height(&self) -> f64 {
        let height = self.glyph_height();
        match &self.kind {
            FontKind::Type3 { font_matrix } => apply_matrix_pt(*font_matrix, (0.0, height)).1,
            _ => height / 1000.0,
        }
    }

    /// Horizontal displacement of a glyph in text space.
    ///
    /// Vertical fonts report a vertical displacement, so the advance is
    /// rebuilt from the glyph width.
    pub fn horizontal_advance(&self, code: u32, displacement_x: f64) -> f64 {
        if !self.vertical {
            return displacement_x;
        }
        let mut advance = self.width(code) / 1000.0;
        if let Some(upem) = self.units_per_em()
            && upem != 0
            && upem != 1000
        {
            advance *= 1000.0 / f64::from(upem);
        }
        advance
    }
}
