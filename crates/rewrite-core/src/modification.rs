//! Text override data model
//!
//! A [`Modification`] is a single user-authored override painted on top of a
//! page: either a replacement for an existing text run (`edit`) or a freshly
//! inserted text block (`add`). Positions and sizes are always stored in PDF
//! point-space; screen placement is derived at render time.

use serde::{Deserialize, Serialize};

use crate::runs::TextRun;

/// Default content for a freshly inserted text block.
pub const DEFAULT_INSERT_TEXT: &str = "New Text";
/// Default bounding box for insertions, in PDF points.
pub const DEFAULT_INSERT_WIDTH: f64 = 120.0;
pub const DEFAULT_INSERT_HEIGHT: f64 = 16.0;
/// Default font size for insertions, in PDF points.
pub const DEFAULT_INSERT_FONT_SIZE: f64 = 12.0;

/// What a modification does to the page underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationKind {
    /// Overrides an existing run: export white-outs the original glyphs
    /// before drawing the replacement.
    Edit,
    /// New text with nothing underneath to erase.
    Add,
}

/// Horizontal alignment of a text run or override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A positioned text override. Serialized camelCase so the same object shape
/// crosses the WASM boundary unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modification {
    pub id: String,
    /// Zero-based page. Fixed at creation; an override never moves across
    /// pages.
    pub page_index: u32,
    /// Baseline anchor in PDF points (bottom-left origin).
    pub x: f64,
    pub y: f64,
    /// Bounding box of the underlying run in PDF points. Sizes the
    /// redaction rectangle and the on-screen hit box.
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub kind: ModificationKind,
    /// Current editable content. Empty is allowed: an edit then white-outs
    /// the original and draws nothing.
    pub text: String,
    /// Snapshot of the pre-edit text. Kept for reference; export never
    /// reads it.
    #[serde(default)]
    pub original_text: String,
    pub font_size: f64,
    #[serde(default = "default_font_name")]
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub text_align: TextAlign,
}

fn default_font_name() -> String {
    "sans-serif".to_string()
}

impl Modification {
    /// Deterministic id for an edit of an original run.
    ///
    /// Derived from the page and the run's baseline position so that
    /// re-clicking the same run resolves to the same override instead of
    /// creating a duplicate.
    pub fn edit_id(page_index: u32, x: f64, y: f64) -> String {
        format!("orig-{}-{}-{}", page_index, x, y)
    }

    /// Build the edit override for an extracted run, seeded with the run's
    /// text and classified style.
    pub fn edit_of_run(page_index: u32, run: &TextRun) -> Self {
        Self {
            id: Self::edit_id(page_index, run.x, run.y),
            page_index,
            x: run.x,
            y: run.y,
            width: run.width,
            height: run.height,
            kind: ModificationKind::Edit,
            text: run.text.clone(),
            original_text: run.text.clone(),
            font_size: run.font_size,
            font_name: default_font_name(),
            is_bold: run.is_bold,
            is_italic: run.is_italic,
            text_align: run.align,
        }
    }

    /// Build a new insertion at a PDF-space anchor with the default text
    /// and style. The caller supplies the id token.
    pub fn insertion(id: String, page_index: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            page_index,
            x,
            y,
            width: DEFAULT_INSERT_WIDTH,
            height: DEFAULT_INSERT_HEIGHT,
            kind: ModificationKind::Add,
            text: DEFAULT_INSERT_TEXT.to_string(),
            original_text: String::new(),
            font_size: DEFAULT_INSERT_FONT_SIZE,
            font_name: default_font_name(),
            is_bold: false,
            is_italic: false,
            text_align: TextAlign::Left,
        }
    }
}
