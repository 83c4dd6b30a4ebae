//! Target (OFD) document model.

pub mod document;
pub mod objects;

pub use document::{
    CommonData, DEFAULT_COLOR_SPACE_ID, DocInfo, Document, FontResource, MultiMedia, Page,
    PageArea, ResourceManifest,
};
pub use objects::{
    AbbreviatedData, CgTransform, Id, ImageObject, Layer, PageObject, PathCommand, PathObject,
    TextCode, TextObject,
};
