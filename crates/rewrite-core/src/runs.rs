//! Extracted text runs and heuristic style classification
//!
//! The rendering collaborator reports each run's string, baseline position,
//! bounding box, and raw font name. Weight, slant, and alignment are not in
//! that data, so they are inferred here. Both inferences are best-effort
//! classifiers with no ground truth in the source format: tests pin the
//! documented rules, not "correctness".

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::modification::TextAlign;

lazy_static! {
    static ref BOLD_RE: Regex = Regex::new(r"(?i)bold|black|w[6-9]00").unwrap();
    static ref ITALIC_RE: Regex = Regex::new(r"(?i)italic|oblique").unwrap();
}

/// Alignment band, as a fraction of page width.
const ALIGN_TOLERANCE: f64 = 0.05;

/// Whether a raw font name looks like a bold face.
pub fn is_bold_font(name: &str) -> bool {
    BOLD_RE.is_match(name)
}

/// Whether a raw font name looks like an italic/oblique face.
pub fn is_italic_font(name: &str) -> bool {
    ITALIC_RE.is_match(name)
}

/// Classify a run's horizontal alignment from its geometry.
///
/// Center if the run's midpoint sits within 5% of page width from the page
/// center; right if its right edge sits within 5% of page width from the
/// right edge; left otherwise.
pub fn classify_alignment(x: f64, width: f64, page_width: f64) -> TextAlign {
    let tolerance = page_width * ALIGN_TOLERANCE;
    let run_center = x + width / 2.0;
    let page_center = page_width / 2.0;

    if (run_center - page_center).abs() < tolerance {
        TextAlign::Center
    } else if x + width > page_width - tolerance {
        TextAlign::Right
    } else {
        TextAlign::Left
    }
}

/// One extracted text run with its classified presentation attributes.
///
/// Derived per page and cached for the lifetime of the loaded document;
/// zoom changes only re-project, they never re-extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    /// Baseline anchor in PDF points.
    pub x: f64,
    pub y: f64,
    /// Bounding box in PDF points.
    pub width: f64,
    pub height: f64,
    /// Glyph height doubles as the run's font size.
    pub font_size: f64,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub align: TextAlign,
}

impl TextRun {
    /// Build a classified run from the collaborator's raw geometry.
    #[allow(clippy::too_many_arguments)]
    pub fn classify(
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        font_name: &str,
        page_width: f64,
    ) -> Self {
        Self {
            text: text.to_string(),
            x,
            y,
            width,
            height,
            font_size: height,
            font_name: font_name.to_string(),
            is_bold: is_bold_font(font_name),
            is_italic: is_italic_font(font_name),
            align: classify_alignment(x, width, page_width),
        }
    }
}
