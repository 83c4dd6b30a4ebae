//! Error types for the pdf2ofd translation engine.
//!
//! Only whole-document failures are returned as [`ConvertError`]. Problems
//! scoped to a single object or page are reported as [`Diagnostic`]s and the
//! conversion carries on.

use std::fmt;

use thiserror::Error;

/// Primary error type for document conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("cannot load source document: {0}")]
    SourceLoad(String),

    #[error("interpreter failed on page {page}: {msg}")]
    Interpreter { page: usize, msg: String },

    #[error("image encoding failed: {0}")]
    ImageEncode(String),

    #[error("font program parse error: {0}")]
    FontParse(String),

    #[error("container writer error: {0}")]
    Writer(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for ConvertError.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Which painting colour a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Fill,
    Stroke,
}

/// Non-fatal conditions raised while translating a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A fill or stroke colour could not be converted to RGB; the style flag was suppressed.
    UnresolvableColor { page: usize, role: ColorRole },
    /// A glyph code had no Unicode mapping; the placeholder was substituted.
    UndecodableGlyph { page: usize, font: String, code: u32 },
    /// A font had no extractable program and was registered as a stub.
    MissingFontProgram { font: String },
    /// An image could not be encoded and was dropped from the page.
    ImageEncodeFailure { page: usize, reason: String },
    /// The interpreter failed part-way through a page.
    PageFailed { page: usize, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvableColor { page, role } => {
                write!(f, "page {page}: unresolvable {role:?} colour")
            }
            Diagnostic::UndecodableGlyph { page, font, code } => {
                write!(f, "page {page}: code {code:#x} in font {font} has no unicode")
            }
            Diagnostic::MissingFontProgram { font } => {
                write!(f, "font {font} has no embedded program, registered as stub")
            }
            Diagnostic::ImageEncodeFailure { page, reason } => {
                write!(f, "page {page}: image dropped: {reason}")
            }
            Diagnostic::PageFailed { page, reason } => {
                write!(f, "page {page}: interpreter failed: {reason}")
            }
        }
    }
}
