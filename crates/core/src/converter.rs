//! Whole-document conversion driver.
//!
//! [`DocumentConverter`] pulls pages out of a [`ContentInterpreter`],
//! translates each one and hands the results to a [`ContainerWriter`].
//! Resource and ID state lives in one [`ConversionContext`] for the whole
//! document, so pages may be translated on several threads.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{ConvertError, Diagnostic, Result};
use crate::interp::ContentInterpreter;
use crate::ofd::{DocInfo, Document, Page, PageArea};
use crate::params::TranslateParams;
use crate::translate::{ConversionContext, PageFrame, translate_page};

/// Receiver of the finished document.
///
/// `write_page` is called once per translated page in page order;
/// `finish` receives the complete tree with all resources.
pub trait ContainerWriter {
    fn write_page(&mut self, page: &Page) -> Result<()>;

    fn finish(&mut self, document: Document) -> Result<()>;
}

/// Writer that keeps the document in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    written: Vec<usize>,
    document: Option<Document>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source indices of the pages written so far.
    pub fn written_pages(&self) -> &[usize] {
        &self.written
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<Document> {
        self.document
    }
}

impl ContainerWriter for MemoryWriter {
    fn write_page(&mut self, page: &Page) -> Result<()> {
        self.written.push(page.index);
        Ok(())
    }

    fn finish(&mut self, document: Document) -> Result<()> {
        if self.document.is_some() {
            return Err(ConvertError::Writer("document already finished".into()));
        }
        self.document = Some(document);
        Ok(())
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    /// Pages in the source document
    pub source_pages: usize,
    /// Pages handed to the writer
    pub pages_written: usize,
    /// Non-fatal conditions, in the order they were raised
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Converts whole documents with one set of parameters.
#[derive(Debug, Clone, Default)]
pub struct DocumentConverter {
    params: TranslateParams,
    info: DocInfo,
}

impl DocumentConverter {
    pub fn new(params: TranslateParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            info: DocInfo::default(),
        })
    }

    pub fn with_info(mut self, info: DocInfo) -> Self {
        self.info = info;
        self
    }

    pub fn params(&self) -> &TranslateParams {
        &self.params
    }

    /// Convert every page of `interp` and finish `writer`.
    ///
    /// Fails only when the source cannot be opened or the writer fails.
    /// Page-level problems end up in the report's diagnostics.
    pub fn convert<I, W>(&self, interp: &I, writer: &mut W) -> Result<ConversionReport>
    where
        I: ContentInterpreter + Sync + ?Sized,
        W: ContainerWriter + ?Sized,
    {
        let source_pages = interp.page_count().map_err(|e| match e {
            ConvertError::SourceLoad(_) => e,
            other => ConvertError::SourceLoad(other.to_string()),
        })?;
        debug!(pages = source_pages, parallel = self.params.parallel_pages, "converting");

        let ctx = ConversionContext::new(self.params.clone());
        let frames = self.page_frames(&ctx, interp, source_pages);

        let pages: Vec<Page> = if self.params.parallel_pages {
            frames
                .into_par_iter()
                .map(|frame| translate_page(&ctx, interp, frame))
                .collect()
        } else {
            frames
                .into_iter()
                .map(|frame| translate_page(&ctx, interp, frame))
                .collect()
        };

        let mut document = Document::new(
            self.info.clone(),
            PageArea::uniform(self.params.target_page_width, self.params.default_page_height),
        );
        for page in pages {
            writer.write_page(&page)?;
            document.push_page(page);
        }
        let pages_written = document.pages.len();

        let max_id = ctx.ids.current();
        let (_, registry, diagnostics) = ctx.into_parts();
        let manifest = registry.into_manifest();
        debug!(
            fonts = manifest.fonts.len(),
            images = manifest.multimedia.len(),
            %max_id,
            "document finished"
        );
        document.finish(manifest, max_id);
        writer.finish(document)?;

        Ok(ConversionReport {
            source_pages,
            pages_written,
            diagnostics,
        })
    }

    /// Target frames of all pages whose size is usable.
    fn page_frames<I>(&self, ctx: &ConversionContext, interp: &I, count: usize) -> Vec<PageFrame>
    where
        I: ContentInterpreter + ?Sized,
    {
        let mut frames = Vec::with_capacity(count);
        for index in 0..count {
            let info = match interp.page_info(index) {
                Ok(info) => info,
                Err(e) => {
                    ctx.report(Diagnostic::PageFailed {
                        page: index,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            match PageFrame::fit(index, info, self.params.target_page_width) {
                Some(frame) => frames.push(frame),
                None => ctx.report(Diagnostic::PageFailed {
                    page: index,
                    reason: format!("degenerate page size {}x{}", info.width, info.height),
                }),
            }
        }
        frames
    }
}
