// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — assemble scanned pages into a multi-page PDF using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use scanmaster_core::error::{Result, ScanmasterError};
use scanmaster_core::types::{EncodedImage, PageLayout, PaperSize};
use tracing::{debug, info, instrument, warn};

use crate::pipeline::export_page;

/// Title embedded in the PDF /Info dictionary unless overridden.
pub const DEFAULT_TITLE: &str = "AI ScanMaster Document";

/// Images are placed at 72 dpi so one pixel is one point before scaling.
const PLACEMENT_DPI: f32 = 72.0;

/// Turns an ordered list of page images into a PDF, one image per page.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    /// Paper width always; paper height too under `PageLayout::PaperSize`.
    paper_size: PaperSize,
    layout: PageLayout,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(PaperSize::A4, PageLayout::FitWidth)
    }
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize, layout: PageLayout) -> Self {
        Self {
            paper_size,
            layout,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn paper_size(&self) -> PaperSize {
        self.paper_size
    }

    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    // -- Page geometry --------------------------------------------------------

    /// Page size in millimetres for an image of `px_w` x `px_h` pixels.
    fn page_size_mm(&self, px_w: u32, px_h: u32) -> (f32, f32) {
        let (paper_w, paper_h) = self.paper_size.dimensions_mm();
        let paper_w = paper_w as f32;
        match self.layout {
            PageLayout::FitWidth => (paper_w, paper_w * px_h as f32 / px_w as f32),
            PageLayout::PaperSize => (paper_w, paper_h as f32),
        }
    }

    /// Where the image goes on a `page_w_pt` x `page_h_pt` page: the scale
    /// from pixels to points and the lower-left translation.
    fn placement(px_w: u32, px_h: u32, page_w_pt: f32, page_h_pt: f32) -> (f32, f32, f32) {
        let mut scale = page_w_pt / px_w as f32;
        // Fixed paper may be too short for a tall image at full width.
        if px_h as f32 * scale > page_h_pt {
            scale = page_h_pt / px_h as f32;
        }
        let rendered_w = px_w as f32 * scale;
        let rendered_h = px_h as f32 * scale;
        let x = (page_w_pt - rendered_w) / 2.0;
        // PDF origin is bottom-left; pin the image to the top edge.
        let y = page_h_pt - rendered_h;
        (scale, x, y)
    }

    // -- Assembly -------------------------------------------------------------

    /// Create a PDF with one page per image, in order.
    ///
    /// Each image is scaled to the full page width with its aspect ratio kept.
    /// When `watermark_footer` is set, every page gets the free-tier caption in
    /// its bottom-right corner; the input images are never modified.
    #[instrument(skip(self, images), fields(pages = images.len(), watermark_footer))]
    pub fn assemble_document(
        &self,
        images: &[EncodedImage],
        watermark_footer: bool,
    ) -> Result<Vec<u8>> {
        if images.is_empty() {
            return Err(ScanmasterError::InvalidParameter(
                "cannot export a document with no pages".into(),
            ));
        }

        let title = self.title.as_deref().unwrap_or(DEFAULT_TITLE);
        info!(paper = ?self.paper_size, layout = ?self.layout, title, "Assembling PDF");

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(images.len());

        for (index, image) in images.iter().enumerate() {
            let raster = export_page(image, watermark_footer)?;
            let (px_w, px_h) = raster.dimensions();

            let raw = RawImage {
                pixels: RawImageData::U8(raster.to_rgb8().into_raw()),
                width: px_w as usize,
                height: px_h as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let (page_w_mm, page_h_mm) = self.page_size_mm(px_w, px_h);
            let page_w_pt = Mm(page_w_mm).into_pt().0;
            let page_h_pt = Mm(page_h_mm).into_pt().0;
            let (scale, x, y) = Self::placement(px_w, px_h, page_w_pt, page_h_pt);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(x)),
                    translate_y: Some(Pt(y)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(PLACEMENT_DPI),
                    rotate: None,
                },
            }];

            debug!(index, px_w, px_h, page_w_mm, page_h_mm, scale, "Page laid out");
            pages.push(PdfPage::new(Mm(page_w_mm), Mm(page_h_mm), ops));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "PDF serialiser reported warnings");
        }
        if output.is_empty() {
            return Err(ScanmasterError::Pdf("serialiser produced no output".into()));
        }

        info!(bytes = output.len(), "PDF assembled");
        Ok(output)
    }

    // -- File output convenience ----------------------------------------------

    /// Assemble a PDF and write it directly to a file.
    pub fn write_to_file(
        &self,
        images: &[EncodedImage],
        watermark_footer: bool,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.assemble_document(images, watermark_footer)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}
