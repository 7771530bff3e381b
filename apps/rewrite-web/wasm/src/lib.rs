//! WASM bindings for the PDF Rewrite editor
//!
//! This module provides a stateful, session-based API for the browser
//! editor. All state is held in Rust, minimizing JavaScript complexity.
//!
//! ## Architecture
//!
//! - Document state, zoom, modifications, and the text-run cache live in
//!   [`EditorSession`]
//! - Per-page interaction state (active edit, projections) lives in
//!   [`PageOverlay`]
//! - Rendering is delegated to PDF.js through [`PdfViewer`]; export is
//!   pure Rust via `rewrite-core`
//! - JavaScript only handles DOM events and file I/O
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { EditorSession, PageOverlay, EditorMode } from './pkg/rewrite_wasm.js';
//!
//! await init();
//!
//! const session = new EditorSession(file.name, bytes);
//! const overlay = new PageOverlay(0, pageWidth, pageHeight, session.zoom);
//! const mod = overlay.runClicked(EditorMode.Select, run);
//! if (mod) session.upsert({ ...mod, text: "Goodbye" });
//! downloadBlob(session.export(), session.downloadName());
//! ```

pub mod coords;
pub mod overlay;
pub mod session;
pub mod text_layer;
pub mod viewer;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use coords::PageViewport;
pub use overlay::{EditorMode, HitLayerDisplay, OverlayBox, PageOverlay};
pub use session::EditorSession;
pub use text_layer::RawTextItem;
pub use viewer::PdfViewer;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Quick validation check for a PDF file
/// Returns Ok(()) if valid, Err with message if not
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    rewrite_core::quick_validate(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get detailed PDF info without creating a session
/// Useful for showing file info before the user commits to an upload
#[wasm_bindgen]
pub fn get_pdf_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = rewrite_core::validate_pdf(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Get page count from PDF bytes (convenience function)
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    rewrite_core::get_page_count(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }
}
