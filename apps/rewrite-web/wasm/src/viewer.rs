//! PDF.js integration for rendering pages in the browser
//!
//! The rendering collaborator lives behind `pdf-bridge.js`: it rasterizes
//! pages to canvases and reports per-run text geometry at native scale.
//! Pages render independently; a failure is contained to its page (the
//! caller shows a degraded page) and never aborts siblings or the session.

use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

// External JavaScript functions from pdf-bridge.js
#[wasm_bindgen(module = "/www/js/pdf-bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = loadDocument)]
    async fn load_document_internal(data: Uint8Array) -> JsValue;

    #[wasm_bindgen(js_name = renderPage)]
    async fn render_page_internal(
        page_num: u32,
        canvas: &HtmlCanvasElement,
        scale: f64,
    ) -> JsValue;

    #[wasm_bindgen(js_name = getPageSize)]
    async fn get_page_size_internal(page_num: u32) -> JsValue;

    #[wasm_bindgen(js_name = getTextContent)]
    async fn get_text_content_internal(page_num: u32) -> JsValue;
}

/// Thin stateful wrapper over the rendering collaborator.
#[wasm_bindgen]
pub struct PdfViewer {
    page_count: u32,
    loaded: bool,
}

impl Default for PdfViewer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PdfViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self {
            page_count: 0,
            loaded: false,
        }
    }

    /// Hand the document bytes to the renderer. Resolves to the page
    /// count.
    pub async fn load(&mut self, bytes: &[u8]) -> Result<u32, JsValue> {
        let data = Uint8Array::new_with_length(bytes.len() as u32);
        data.copy_from(bytes);

        let result = load_document_internal(data).await;
        if result.is_undefined() || result.is_null() {
            return Err(JsValue::from_str("Failed to load PDF document"));
        }

        let count = result
            .as_f64()
            .ok_or_else(|| JsValue::from_str("Renderer returned no page count"))?;
        self.page_count = count as u32;
        self.loaded = true;
        Ok(self.page_count)
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    #[wasm_bindgen(getter, js_name = isLoaded)]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Rasterize one page (1-indexed) into a canvas at the given scale.
    ///
    /// An error here is the caller's cue to show the degraded page; other
    /// pages are unaffected. A superseded render simply loses the canvas
    /// to the newer one.
    #[wasm_bindgen(js_name = renderPage)]
    pub async fn render_page(
        &self,
        page_num: u32,
        canvas: HtmlCanvasElement,
        scale: f64,
    ) -> Result<(), JsValue> {
        self.check_page(page_num)?;

        let result = render_page_internal(page_num, &canvas, scale).await;
        if result.is_undefined() || result.is_null() {
            return Err(JsValue::from_str(&format!(
                "Render failed for page {}",
                page_num
            )));
        }
        Ok(())
    }

    /// Natural page size `[width, height]` in PDF points.
    #[wasm_bindgen(js_name = pageSize)]
    pub async fn page_size(&self, page_num: u32) -> Result<JsValue, JsValue> {
        self.check_page(page_num)?;
        Ok(get_page_size_internal(page_num).await)
    }

    /// Raw text items for one page at native scale, for the session's
    /// extraction cache. Returns `undefined` when the renderer cannot
    /// decode the page's text; the caller degrades that page's layer.
    #[wasm_bindgen(js_name = textContent)]
    pub async fn text_content(&self, page_num: u32) -> Result<JsValue, JsValue> {
        self.check_page(page_num)?;
        Ok(get_text_content_internal(page_num).await)
    }
}

impl PdfViewer {
    fn check_page(&self, page_num: u32) -> Result<(), JsValue> {
        if !self.loaded {
            return Err(JsValue::from_str("No document loaded"));
        }
        if page_num == 0 || page_num > self.page_count {
            return Err(JsValue::from_str(&format!(
                "Page {} out of range (document has {} pages)",
                page_num, self.page_count
            )));
        }
        Ok(())
    }
}
