//! PDF text extraction via a glyph-capturing interpreter device.
//!
//! PDFs frequently omit explicit space characters and rely on glyph
//! positioning, so word breaks are inferred from horizontal gaps between
//! consecutive glyph bounding boxes on the same line. Whitespace is
//! collapsed per page afterwards, so only word separation matters here,
//! not layout.

use hayro_interpret::font::Glyph;
use hayro_interpret::hayro_syntax::Pdf;
use hayro_interpret::util::PageExt;
use hayro_interpret::{
    BlendMode, ClipPath, Context, Device, GlyphDrawMode, Image, InterpreterSettings, Paint,
    PathDrawMode, SoftMask, interpret_page,
};
use kurbo::{Affine, Rect, Shape};

use std::sync::Arc;

/// Pages beyond this are skipped with an omission marker.
const MAX_PAGES: usize = 50;

/// Horizontal gap, as a fraction of glyph height, that implies a word break.
const GAP_TO_HEIGHT_RATIO: f64 = 0.25;

/// Minimum vertical bbox overlap ratio for two glyphs to share a line.
const SAME_LINE_OVERLAP_RATIO: f64 = 0.5;

pub(crate) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let pdf = Pdf::new(Arc::new(bytes.to_vec())).map_err(|e| format!("{e:?}"))?;
    let settings = InterpreterSettings::default();

    let pages = pdf.pages();
    let total = pages.len();
    let mut text = String::new();

    for page in pages.iter().take(MAX_PAGES) {
        let (width, height) = page.render_dimensions();
        let bbox = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));

        let mut ctx = Context::new(
            page.initial_transform(true),
            bbox,
            page.xref(),
            settings.clone(),
        );
        let mut device = GlyphCapture::default();
        interpret_page(page, &mut ctx, &mut device);

        // Collapse runs of whitespace within a page; pages stay separated
        // by blank lines.
        let page_text = device.into_text();
        let collapsed = page_text.split_whitespace().collect::<Vec<_>>().join(" ");
        text.push_str(&collapsed);
        text.push_str("\n\n");
    }

    if total > MAX_PAGES {
        text.push_str(&format!("[Remaining {} pages omitted...]", total - MAX_PAGES));
    }

    Ok(text.trim().to_string())
}

/// One glyph event: a best-effort Unicode mapping plus its page-space bbox.
#[derive(Debug, Clone, Copy)]
struct CapturedGlyph {
    ch: Option<char>,
    bbox: Option<Rect>,
}

/// Interpreter device that records glyphs and ignores everything else.
#[derive(Debug, Default)]
struct GlyphCapture {
    glyphs: Vec<CapturedGlyph>,
}

impl GlyphCapture {
    /// Flatten the glyph stream into a string with inferred word breaks.
    fn into_text(self) -> String {
        let mut out = String::new();
        let mut last_bbox: Option<Rect> = None;

        for glyph in &self.glyphs {
            if let (Some(prev), Some(cur)) = (last_bbox, glyph.bbox)
                && same_line(prev, cur)
            {
                let gap = cur.x0 - prev.x1;
                // Negative or zero gaps happen with kerning and overlap.
                if gap > 0.0 {
                    let avg_height = 0.5 * (prev.height() + cur.height());
                    if gap > GAP_TO_HEIGHT_RATIO * avg_height && !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
            }

            if let Some(ch) = glyph.ch {
                out.push(ch);
            }
            if glyph.bbox.is_some() {
                last_bbox = glyph.bbox;
            }
        }

        out
    }
}

fn same_line(a: Rect, b: Rect) -> bool {
    let overlap = a.y1.min(b.y1) - a.y0.max(b.y0);
    if overlap <= 0.0 {
        return false;
    }
    let denom = a.height().min(b.height());
    // Degenerate bboxes fall back to "not same line".
    if denom <= 0.0 {
        return false;
    }
    overlap / denom >= SAME_LINE_OVERLAP_RATIO
}

impl<'a> Device<'a> for GlyphCapture {
    fn set_soft_mask(&mut self, _mask: Option<SoftMask<'a>>) {}

    fn set_blend_mode(&mut self, _blend_mode: BlendMode) {}

    fn draw_path(
        &mut self,
        _path: &kurbo::BezPath,
        _transform: Affine,
        _paint: &Paint<'a>,
        _draw_mode: &PathDrawMode,
    ) {
    }

    fn push_clip_path(&mut self, _clip_path: &ClipPath) {}

    fn push_transparency_group(
        &mut self,
        _opacity: f32,
        _mask: Option<SoftMask<'a>>,
        _blend_mode: BlendMode,
    ) {
    }

    fn draw_glyph(
        &mut self,
        glyph: &Glyph<'a>,
        transform: Affine,
        glyph_transform: Affine,
        _paint: &Paint<'a>,
        _draw_mode: &GlyphDrawMode,
    ) {
        // Transform the outline into page space so rotated or sheared text
        // still gets a usable bbox. Type3 glyphs have no cheap outline.
        let bbox = match glyph {
            Glyph::Outline(outline) => {
                let path_in_page = transform * (glyph_transform * outline.outline());
                Some(path_in_page.bounding_box())
            }
            Glyph::Type3(_) => None,
        };

        self.glyphs.push(CapturedGlyph {
            ch: glyph.as_unicode(),
            bbox,
        });
    }

    fn draw_image(&mut self, _image: Image<'a, '_>, _transform: Affine) {}

    fn pop_clip_path(&mut self) {}

    fn pop_transparency_group(&mut self) {}
}
