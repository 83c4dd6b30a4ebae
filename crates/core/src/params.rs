//! Translation parameters.
//!
//! Contains TranslateParams for controlling page scaling and text output.

use crate::error::{ConvertError, Result};

/// Parameters for page translation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateParams {
    /// Width of every target page in millimetres. Each source page is scaled
    /// so that its width maps onto this value.
    pub target_page_width: f64,

    /// Height of the document-level default page area in millimetres.
    pub default_page_height: f64,

    /// Character substituted for glyph codes without a Unicode mapping.
    pub placeholder: char,

    /// Smallest line width used for stroked text, in source units.
    pub min_text_line_width: f64,

    /// Translate pages in parallel. Output order is unchanged.
    pub parallel_pages: bool,
}

impl Default for TranslateParams {
    fn default() -> Self {
        Self {
            target_page_width: 210.0,
            default_page_height: 297.0,
            placeholder: '\u{a4}',
            min_text_line_width: 0.25,
            parallel_pages: false,
        }
    }
}

impl TranslateParams {
    /// Creates new parameters with the specified page size.
    ///
    /// Fails if either dimension is not a positive finite number.
    pub fn new(target_page_width: f64, default_page_height: f64) -> Result<Self> {
        let params = Self {
            target_page_width,
            default_page_height,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Builder-style toggle for parallel page translation.
    pub fn with_parallel_pages(mut self, parallel: bool) -> Self {
        self.parallel_pages = parallel;
        self
    }

    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Check the numeric fields.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.target_page_width) {
            return Err(ConvertError::InvalidParams(format!(
                "target_page_width must be positive, got {}",
                self.target_page_width
            )));
        }
        if !positive(self.default_page_height) {
            return Err(ConvertError::InvalidParams(format!(
                "default_page_height must be positive, got {}",
                self.default_page_height
            )));
        }
        if !self.min_text_line_width.is_finite() || self.min_text_line_width < 0.0 {
            return Err(ConvertError::InvalidParams(format!(
                "min_text_line_width must be non-negative, got {}",
                self.min_text_line_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_a4() {
        let p = TranslateParams::default();
        assert_eq!(p.target_page_width, 210.0);
        assert_eq!(p.default_page_height, 297.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_width() {
        assert!(matches!(
            TranslateParams::new(0.0, 297.0),
            Err(ConvertError::InvalidParams(_))
        ));
    }
}
