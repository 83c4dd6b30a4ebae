//! OFD document tree handed to the container writer.
//!
//! Mirrors the package layout: `OFD.xml` document info, `Document.xml`
//! common data and page list, `PublicRes.xml` (colour spaces, fonts) and
//! `DocumentRes.xml` (multimedia), plus the resource files themselves.

use indexmap::IndexMap;

use super::objects::{Id, Layer};
use crate::geometry::Boundary;
use crate::model::ImageCodec;

/// ID of the document default colour space. IDs up to this value are reserved.
pub const DEFAULT_COLOR_SPACE_ID: Id = Id(1);

/// Base location of resource files inside the document directory.
pub const RES_BASE_LOC: &str = "Res";

/// Document metadata (`CT_DocInfo`).
#[derive(Debug, Clone, PartialEq)]
pub struct DocInfo {
    pub doc_id: String,
    pub creator: String,
    pub creator_version: String,
    pub author: String,
    /// ISO date, left to the caller so conversions stay reproducible.
    pub creation_date: Option<String>,
}

impl Default for DocInfo {
    fn default() -> Self {
        Self {
            doc_id: String::new(),
            creator: "OFD".to_string(),
            creator_version: "1.0".to_string(),
            author: "OFD".to_string(),
            creation_date: None,
        }
    }
}

/// Page area boxes (`CT_PageArea`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageArea {
    pub physical_box: Boundary,
    pub application_box: Boundary,
    pub content_box: Boundary,
}

impl PageArea {
    /// All three boxes set to `width x height` at the origin.
    pub fn uniform(width: f64, height: f64) -> Self {
        let b = Boundary::new(0.0, 0.0, width, height);
        Self {
            physical_box: b,
            application_box: b,
            content_box: b,
        }
    }
}

/// Document-wide defaults (`CT_CommonData`).
#[derive(Debug, Clone, PartialEq)]
pub struct CommonData {
    /// Highest ID allocated in the document
    pub max_unit_id: Id,
    pub default_cs: Id,
    pub page_area: PageArea,
    pub public_res: String,
    pub document_res: String,
}

/// Colour space resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    pub id: Id,
    pub kind: &'static str,
    pub bits_per_component: u8,
}

/// Font resource (`CT_Font`). `font_file` is `None` for stubs.
#[derive(Debug, Clone, PartialEq)]
pub struct FontResource {
    pub id: Id,
    pub family_name: String,
    pub font_name: String,
    pub font_file: Option<String>,
}

/// Image resource (`CT_MultiMedia`).
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMedia {
    pub id: Id,
    pub codec: ImageCodec,
    pub file: String,
}

/// `PublicRes.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicRes {
    pub base_loc: String,
    pub color_spaces: Vec<ColorSpace>,
    pub fonts: Vec<FontResource>,
}

/// `DocumentRes.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRes {
    pub base_loc: String,
    pub multimedia: Vec<MultiMedia>,
}

/// One translated page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Zero-based index in the source document
    pub index: usize,
    pub physical_box: Boundary,
    pub layer: Layer,
}

/// Resources collected during conversion, in allocation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceManifest {
    pub fonts: Vec<FontResource>,
    pub multimedia: Vec<MultiMedia>,
    /// Resource file name -> payload
    pub files: IndexMap<String, Vec<u8>>,
}

/// The complete in-memory document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub info: DocInfo,
    pub common_data: CommonData,
    pub public_res: PublicRes,
    pub document_res: DocumentRes,
    pub pages: Vec<Page>,
    pub files: IndexMap<String, Vec<u8>>,
}

impl Document {
    /// Empty document with the default RGB colour space registered.
    pub fn new(info: DocInfo, page_area: PageArea) -> Self {
        Self {
            info,
            common_data: CommonData {
                max_unit_id: DEFAULT_COLOR_SPACE_ID,
                default_cs: DEFAULT_COLOR_SPACE_ID,
                page_area,
                public_res: "PublicRes.xml".to_string(),
                document_res: "DocumentRes.xml".to_string(),
            },
            public_res: PublicRes {
                base_loc: RES_BASE_LOC.to_string(),
                color_spaces: vec![ColorSpace {
                    id: DEFAULT_COLOR_SPACE_ID,
                    kind: "RGB",
                    bits_per_component: 8,
                }],
                fonts: Vec::new(),
            },
            document_res: DocumentRes {
                base_loc: RES_BASE_LOC.to_string(),
                multimedia: Vec::new(),
            },
            pages: Vec::new(),
            files: IndexMap::new(),
        }
    }

    pub fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Move the collected resources in and record the highest allocated ID.
    pub fn finish(&mut self, manifest: ResourceManifest, max_unit_id: Id) {
        self.public_res.fonts.extend(manifest.fonts);
        self.document_res.multimedia.extend(manifest.multimedia);
        self.files.extend(manifest.files);
        self.common_data.max_unit_id = self.common_data.max_unit_id.max(max_unit_id);
    }

    pub fn font(&self, id: Id) -> Option<&FontResource> {
        self.public_res.fonts.iter().find(|f| f.id == id)
    }

    pub fn image(&self, id: Id) -> Option<&MultiMedia> {
        self.document_res.multimedia.iter().find(|m| m.id == id)
    }
}
