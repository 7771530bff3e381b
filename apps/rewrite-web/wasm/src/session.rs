//! Stateful editor session
//!
//! Holds everything for one open document in Rust: the original bytes, the
//! page count, the clamped zoom factor, the modification store, and the
//! per-page text-run cache. JavaScript keeps no state beyond DOM wiring.
//!
//! Loading a new document replaces all of it: modifications, cache, and
//! zoom reset together, so nothing aliases across documents.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

use rewrite_core::export::export_document;
use rewrite_core::store::{ModificationStore, StoreCommand};
use rewrite_core::validation::validate_pdf;
use rewrite_core::{Modification, RewriteError, TextRun};

use crate::text_layer;

/// Zoom clamp range and toolbar step.
pub const ZOOM_MIN: f64 = 0.3;
pub const ZOOM_MAX: f64 = 4.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Session for editing a single PDF document
#[wasm_bindgen]
pub struct EditorSession {
    document_name: String,
    document_bytes: Vec<u8>,
    page_count: u32,
    zoom: f64,
    store: ModificationStore,
    text_cache: HashMap<u32, Vec<TextRun>>,
}

#[wasm_bindgen]
impl EditorSession {
    /// Create a session for an uploaded document. Rejects anything that
    /// fails validation before any state exists.
    #[wasm_bindgen(constructor)]
    pub fn new(name: &str, bytes: &[u8]) -> Result<EditorSession, JsValue> {
        let info = validate_pdf(bytes).map_err(to_js)?;

        Ok(EditorSession {
            document_name: name.to_string(),
            document_bytes: bytes.to_vec(),
            page_count: info.page_count,
            zoom: 1.0,
            store: ModificationStore::new(),
            text_cache: HashMap::new(),
        })
    }

    /// Replace the open document. All modifications and cached text runs
    /// belong to the old document and are dropped; zoom resets.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, name: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let info = validate_pdf(bytes).map_err(to_js)?;

        self.document_name = name.to_string();
        self.document_bytes = bytes.to_vec();
        self.page_count = info.page_count;
        self.zoom = 1.0;
        self.store.clear_all();
        self.text_cache.clear();
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    #[wasm_bindgen(getter, js_name = documentName)]
    pub fn document_name(&self) -> String {
        self.document_name.clone()
    }

    /// Suggested file name for the exported download.
    #[wasm_bindgen(js_name = downloadName)]
    pub fn download_name(&self) -> String {
        format!("rewritten_{}", self.document_name)
    }

    /// Document bytes for the rendering collaborator.
    #[wasm_bindgen(js_name = getDocumentBytes)]
    pub fn get_document_bytes(&self) -> js_sys::Uint8Array {
        let array = js_sys::Uint8Array::new_with_length(self.document_bytes.len() as u32);
        array.copy_from(&self.document_bytes);
        array
    }

    // ============ Zoom ============

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to the supported range. Returns the
    /// effective value.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.zoom
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    // ============ Modification store ============

    /// Insert or fully replace a modification.
    pub fn upsert(&mut self, modification: JsValue) -> Result<(), JsValue> {
        let m: Modification = serde_wasm_bindgen::from_value(modification)
            .map_err(|e| JsValue::from_str(&format!("Invalid modification: {}", e)))?;
        self.store.upsert(m);
        Ok(())
    }

    /// Remove a modification by id. No-op when absent.
    #[wasm_bindgen(js_name = deleteModification)]
    pub fn delete_modification(&mut self, id: &str) -> bool {
        self.store.delete(id)
    }

    /// Remove the most recently created modification.
    #[wasm_bindgen(js_name = undoLast)]
    pub fn undo_last(&mut self) -> bool {
        self.store.undo_last().is_some()
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) {
        self.store.clear_all();
    }

    /// Dispatch a store command message (`Upsert`, `Delete`, `UndoLast`,
    /// `ClearAll`).
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command(&mut self, command: JsValue) -> Result<(), JsValue> {
        let command: StoreCommand = serde_wasm_bindgen::from_value(command)
            .map_err(|e| JsValue::from_str(&format!("Invalid command: {}", e)))?;
        self.store.apply(command);
        Ok(())
    }

    #[wasm_bindgen(js_name = modificationCount)]
    pub fn modification_count(&self) -> usize {
        self.store.len()
    }

    #[wasm_bindgen(js_name = hasChanges)]
    pub fn has_changes(&self) -> bool {
        !self.store.is_empty()
    }

    /// The modifications for one page, in creation order.
    #[wasm_bindgen(js_name = modificationsForPage)]
    pub fn modifications_for_page(&self, page_index: u32) -> Result<JsValue, JsValue> {
        let mods: Vec<&Modification> = self.store.by_page(page_index);
        serde_wasm_bindgen::to_value(&mods)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    // ============ Text-run cache ============

    /// Cache a page's classified text runs from the renderer's raw items.
    ///
    /// Called once per page; later calls for a cached page are ignored so
    /// zoom-triggered re-renders never re-extract. Undecodable items
    /// degrade the page to an empty layer instead of failing the
    /// document. Returns the number of cached runs.
    #[wasm_bindgen(js_name = cachePageText)]
    pub fn cache_page_text(
        &mut self,
        page_index: u32,
        items: JsValue,
        page_width: f64,
    ) -> u32 {
        if let Some(cached) = self.text_cache.get(&page_index) {
            return cached.len() as u32;
        }
        let runs = match text_layer::classify_js_items(items, page_width) {
            Ok(runs) => runs,
            Err(message) => {
                web_sys::console::warn_1(
                    &format!("Text layer degraded for page {}: {}", page_index, message).into(),
                );
                Vec::new()
            }
        };
        let count = runs.len() as u32;
        self.text_cache.insert(page_index, runs);
        count
    }

    #[wasm_bindgen(js_name = hasPageText)]
    pub fn has_page_text(&self, page_index: u32) -> bool {
        self.text_cache.contains_key(&page_index)
    }

    /// The cached runs for a page (empty if never extracted or degraded).
    #[wasm_bindgen(js_name = textRuns)]
    pub fn text_runs(&self, page_index: u32) -> Result<JsValue, JsValue> {
        let runs: &[TextRun] = self
            .text_cache
            .get(&page_index)
            .map(Vec::as_slice)
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&runs)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    // ============ Export ============

    /// Replay all modifications into a new PDF. On failure the store is
    /// untouched, so the user can adjust and retry without losing edits.
    pub fn export(&self) -> Result<js_sys::Uint8Array, JsValue> {
        let bytes = self.export_bytes().map_err(to_js)?;
        let array = js_sys::Uint8Array::new_with_length(bytes.len() as u32);
        array.copy_from(&bytes);
        Ok(array)
    }
}

// Internal methods, also used by native tests (js_sys::Uint8Array and
// JsValue cannot be constructed outside a JS runtime).
impl EditorSession {
    pub fn export_bytes(&self) -> Result<Vec<u8>, RewriteError> {
        export_document(&self.document_bytes, &self.store)
    }

    pub fn store(&self) -> &ModificationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ModificationStore {
        &mut self.store
    }

    /// Rust-typed twin of `cachePageText`.
    pub fn cache_runs(&mut self, page_index: u32, runs: Vec<TextRun>) -> usize {
        self.text_cache.entry(page_index).or_insert(runs).len()
    }

    pub fn cached_runs(&self, page_index: u32) -> Option<&[TextRun]> {
        self.text_cache.get(&page_index).map(Vec::as_slice)
    }
}

fn to_js(err: RewriteError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
