//! Text-layer extraction glue
//!
//! The rendering collaborator reports each page's text as raw items
//! (string, 2x3 transform, bounding size, font name). This module decodes
//! those items at the JS boundary and turns them into classified
//! [`TextRun`]s for the hit-layer. Extraction runs once per page; results
//! are cached by the session and survive zoom changes unchanged.
//!
//! A page whose items fail to decode degrades to an empty, non-interactive
//! text layer: the raster render is unaffected and sibling pages keep
//! their layers.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use rewrite_core::TextRun;

/// One raw text item as reported by the renderer's `getTextContent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextItem {
    /// The run's string content (the renderer names this field `str`)
    #[serde(rename = "str")]
    pub text: String,
    /// Text matrix `[a, b, c, d, e, f]`; `e`/`f` are the baseline
    /// translation in PDF points
    pub transform: [f64; 6],
    /// Bounding width in PDF points
    pub width: f64,
    /// Glyph height in PDF points
    pub height: f64,
    #[serde(default)]
    pub font_name: String,
}

/// Classify a page's raw items into text runs.
pub fn classify_items(items: &[RawTextItem], page_width: f64) -> Vec<TextRun> {
    items
        .iter()
        .map(|item| {
            TextRun::classify(
                &item.text,
                item.transform[4],
                item.transform[5],
                item.width,
                item.height,
                &item.font_name,
                page_width,
            )
        })
        .collect()
}

/// Decode and classify items arriving from the JS boundary.
///
/// Returns the degraded empty layer on decode failure so a single corrupt
/// page cannot take down the document; the caller logs and moves on.
pub fn classify_js_items(value: JsValue, page_width: f64) -> Result<Vec<TextRun>, String> {
    let items: Vec<RawTextItem> = serde_wasm_bindgen::from_value(value)
        .map_err(|e| format!("Undecodable text content: {}", e))?;
    Ok(classify_items(&items, page_width))
}
