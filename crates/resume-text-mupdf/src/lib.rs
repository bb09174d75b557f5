use std::fs::File;
use std::io::Read;
use std::path::Path;

use mupdf::{Document, Page, Rect, TextPageFlags};

use resume_text_core::{BackendError, PdfBackend};

/// Page terminator in the extracted text.
pub const PAGE_BREAK: char = '\x0c';

/// Readers accept the `%PDF-` signature anywhere in the first KiB.
const SIGNATURE_WINDOW: u64 = 1024;

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency so
/// nothing else in the workspace links it.
///
/// Output layout: every text line ends with `\n`, every text block is
/// followed by an empty line, and every page ends with a form feed. A
/// document without pages is an error rather than an empty string.
///
/// Header and footer bands can be dropped by page-height ratio. Both are
/// off by default since a résumé usually carries the candidate's name and
/// contact line at the very top of the first page.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from the top treated as header.
    header_exclusion_ratio: Option<f32>,
    /// Fraction of page height from the bottom treated as footer.
    footer_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = (ratio > 0.0).then_some(ratio);
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = (ratio > 0.0).then_some(ratio);
        self
    }

    /// Vertical range of `page` whose blocks are kept.
    fn body_of(&self, page: &Rect) -> Body {
        let height = page.y1 - page.y0;
        Body {
            top: self.header_exclusion_ratio.map(|r| page.y0 + height * r),
            bottom: self.footer_exclusion_ratio.map(|r| page.y1 - height * r),
        }
    }

    /// Append one page's text, including its trailing page break.
    fn append_page(&self, page: &Page, out: &mut String) -> Result<(), BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(extraction_error)?;
        let body = self.body_of(&page.bounds().map_err(extraction_error)?);

        for block in text_page.blocks().filter(|b| body.keeps(&b.bounds())) {
            let start = out.len();
            for line in block.lines() {
                out.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                out.push('\n');
            }
            if out.len() > start {
                out.push('\n');
            }
        }
        out.push(PAGE_BREAK);
        Ok(())
    }
}

/// Header/footer cut-offs in page coordinates (y grows downward).
struct Body {
    top: Option<f32>,
    bottom: Option<f32>,
}

impl Body {
    /// Blocks ending above `top` or starting below `bottom` are dropped.
    fn keeps(&self, block: &Rect) -> bool {
        self.top.is_none_or(|top| block.y1 > top)
            && self.bottom.is_none_or(|bottom| block.y0 < bottom)
    }
}

/// Reject files that are not PDFs before MuPDF gets to sniff them as some
/// other document type.
fn check_signature(path: &Path) -> Result<(), BackendError> {
    let mut head = Vec::new();
    File::open(path)
        .and_then(|f| f.take(SIGNATURE_WINDOW).read_to_end(&mut head))
        .map_err(|e| BackendError::Open(e.to_string()))?;
    if head.windows(5).any(|w| w == b"%PDF-") {
        Ok(())
    } else {
        Err(BackendError::Open("not a PDF file (no %PDF- header)".into()))
    }
}

fn extraction_error(e: mupdf::Error) -> BackendError {
    BackendError::Extraction(e.to_string())
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Open("invalid path encoding".into()))?;
        check_signature(path)?;
        let document = Document::open(path_str).map_err(|e| BackendError::Open(e.to_string()))?;

        let mut text = String::new();
        let mut pages = 0usize;
        for page in document.pages().map_err(extraction_error)? {
            self.append_page(&page.map_err(extraction_error)?, &mut text)?;
            pages += 1;
        }

        // MuPDF's repair pass can "open" arbitrary bytes as an empty document.
        if pages == 0 {
            return Err(BackendError::Open("document has no pages".into()));
        }

        tracing::debug!(
            path = %path.display(),
            pages,
            bytes = text.len(),
            "extracted PDF text"
        );
        Ok(text)
    }
}
