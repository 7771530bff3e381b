//! Interactive overlay state for a rendered page
//!
//! Each page owns a [`PageOverlay`]: the projection viewport plus the
//! page's *active edit* slot (at most one modification being edited). The
//! slot moves Idle -> ActiveEdit on a run click (Select mode) or an
//! empty-canvas click (Insert mode), and back to Idle on focus loss or a
//! Select-mode canvas click. A click on a different target replaces the
//! active id in the same pass. Slots are independent per page; in practice
//! only one is ever occupied because a single input has focus.
//!
//! Overlays never cache screen positions: every modification and every
//! extracted run is re-projected through the viewport on each render,
//! which is what keeps stored point-space geometry invariant under zoom.

use serde::Serialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use rewrite_core::{Modification, TextRun};

use crate::coords::PageViewport;

/// Minimum on-screen width of a modification box, in pixels, so short or
/// empty overrides stay clickable.
const MIN_BOX_WIDTH: f64 = 30.0;

/// How clicks are interpreted.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Clicking an extracted run opens it for editing
    Select,
    /// Clicking empty canvas inserts a new text block
    Insert,
}

/// How the extracted-text hit-layer should be shown.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitLayerDisplay {
    /// Suppressed entirely (an edit is active; avoid double text)
    Hidden,
    /// Low-opacity interactive layer, the default
    Faint,
    /// Full-opacity scan view
    Highlighted,
}

/// A projected screen box for a run or modification at the current zoom.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OverlayBox {
    pub left: f64,
    pub top: f64,
    pub min_width: f64,
    pub height: f64,
    /// On-screen font size in pixels
    pub font_px: f64,
}

/// Per-page overlay state machine.
#[wasm_bindgen]
pub struct PageOverlay {
    page_index: u32,
    viewport: PageViewport,
    active_edit: Option<String>,
}

#[wasm_bindgen]
impl PageOverlay {
    #[wasm_bindgen(constructor)]
    pub fn new(page_index: u32, page_width: f64, page_height: f64, zoom: f64) -> PageOverlay {
        PageOverlay {
            page_index,
            viewport: PageViewport::new(page_width, page_height, zoom),
            active_edit: None,
        }
    }

    #[wasm_bindgen(getter, js_name = pageIndex)]
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Update the projection scale. Stored modifications are untouched;
    /// only subsequent projections change.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport = self.viewport.with_scale(zoom);
    }

    #[wasm_bindgen(getter, js_name = activeEdit)]
    pub fn active_edit(&self) -> Option<String> {
        self.active_edit.clone()
    }

    #[wasm_bindgen(js_name = isEditing)]
    pub fn is_editing(&self, id: &str) -> bool {
        self.active_edit.as_deref() == Some(id)
    }

    /// Make an existing modification the active edit (clicking its box).
    pub fn focus(&mut self, id: &str) {
        self.active_edit = Some(id.to_string());
    }

    /// The edit field lost focus; back to Idle.
    #[wasm_bindgen(js_name = releaseFocus)]
    pub fn release_focus(&mut self) {
        self.active_edit = None;
    }

    /// Display policy for the hit-layer. The active edit always wins over
    /// the scan toggle so the same text is never shown twice.
    #[wasm_bindgen(js_name = hitLayerDisplay)]
    pub fn hit_layer_display(&self, scan: bool) -> HitLayerDisplay {
        if self.active_edit.is_some() {
            HitLayerDisplay::Hidden
        } else if scan {
            HitLayerDisplay::Highlighted
        } else {
            HitLayerDisplay::Faint
        }
    }

    /// JS entry point for a click on an extracted run.
    #[wasm_bindgen(js_name = runClicked)]
    pub fn run_clicked_js(&mut self, mode: EditorMode, run: JsValue) -> Result<JsValue, JsValue> {
        let run: TextRun = serde_wasm_bindgen::from_value(run)
            .map_err(|e| JsValue::from_str(&format!("Invalid text run: {}", e)))?;
        match self.run_clicked(mode, &run) {
            Some(m) => serde_wasm_bindgen::to_value(&m)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// JS entry point for a click on the page canvas.
    #[wasm_bindgen(js_name = canvasClicked)]
    pub fn canvas_clicked_js(
        &mut self,
        mode: EditorMode,
        view_x: f64,
        view_y: f64,
    ) -> Result<JsValue, JsValue> {
        match self.canvas_clicked(mode, view_x, view_y) {
            Some(m) => serde_wasm_bindgen::to_value(&m)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// JS entry point for projecting a modification to screen space.
    #[wasm_bindgen(js_name = projectModification)]
    pub fn project_modification_js(&self, modification: JsValue) -> Result<OverlayBox, JsValue> {
        let m: Modification = serde_wasm_bindgen::from_value(modification)
            .map_err(|e| JsValue::from_str(&format!("Invalid modification: {}", e)))?;
        Ok(self.project(&m))
    }

    /// JS entry point for projecting an extracted run to screen space.
    #[wasm_bindgen(js_name = projectRun)]
    pub fn project_run_js(&self, run: JsValue) -> Result<OverlayBox, JsValue> {
        let run: TextRun = serde_wasm_bindgen::from_value(run)
            .map_err(|e| JsValue::from_str(&format!("Invalid text run: {}", e)))?;
        Ok(self.project_run(&run))
    }
}

impl PageOverlay {
    /// A run was clicked. In Select mode this resolves to the run's
    /// deterministic edit override (re-clicking the same run yields the
    /// same id) and makes it active; other modes ignore the click.
    pub fn run_clicked(&mut self, mode: EditorMode, run: &TextRun) -> Option<Modification> {
        if mode != EditorMode::Select {
            return None;
        }
        let modification = Modification::edit_of_run(self.page_index, run);
        self.active_edit = Some(modification.id.clone());
        Some(modification)
    }

    /// Empty canvas was clicked at a viewport position. Insert mode
    /// creates a new default text block at the corresponding PDF point and
    /// makes it active; Select mode just drops the active edit.
    pub fn canvas_clicked(
        &mut self,
        mode: EditorMode,
        view_x: f64,
        view_y: f64,
    ) -> Option<Modification> {
        if mode != EditorMode::Insert {
            self.release_focus();
            return None;
        }
        let (x, y) = self.viewport.to_pdf(view_x, view_y);
        let modification = Modification::insertion(insertion_id(), self.page_index, x, y);
        self.active_edit = Some(modification.id.clone());
        Some(modification)
    }

    /// Screen box for a modification at the current zoom.
    pub fn project(&self, m: &Modification) -> OverlayBox {
        let (left, _) = self.viewport.to_viewport(m.x, m.y);
        OverlayBox {
            left,
            top: self.viewport.text_top(m.y, m.font_size),
            min_width: MIN_BOX_WIDTH.max(self.viewport.to_pixels(m.width)),
            height: self.viewport.to_pixels(m.height),
            font_px: self.viewport.to_pixels(m.font_size),
        }
    }

    /// Screen box for an extracted run's hit region.
    pub fn project_run(&self, run: &TextRun) -> OverlayBox {
        let (left, _) = self.viewport.to_viewport(run.x, run.y);
        OverlayBox {
            left,
            top: self.viewport.text_top(run.y, run.height),
            min_width: self.viewport.to_pixels(run.width),
            height: self.viewport.to_pixels(run.height),
            font_px: self.viewport.to_pixels(run.height),
        }
    }

    pub fn viewport(&self) -> &PageViewport {
        &self.viewport
    }
}

/// Random token for a freshly inserted text block.
fn insertion_id() -> String {
    format!("add-{}", Uuid::new_v4().simple())
}
