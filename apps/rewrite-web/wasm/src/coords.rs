//! Coordinate transformation between PDF and viewport coordinate systems
//!
//! PDF point-space has its origin at the bottom-left of the page and is
//! independent of display scale; viewport-space has its origin at the
//! top-left and is scaled by the current zoom. The transform is pure and
//! stateless: a [`PageViewport`] captures one page's natural size plus the
//! scale factor, and projections are recomputed on every render pass.

/// One page's projection parameters: natural size in points and the zoom
/// scale applied on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    /// Page width in PDF points
    pub width: f64,
    /// Page height in PDF points
    pub height: f64,
    /// Zoom scale (1.0 = 72 dpi natural size)
    pub scale: f64,
}

impl PageViewport {
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        debug_assert!(scale > 0.0, "viewport scale must be positive");
        Self {
            width,
            height,
            scale,
        }
    }

    /// The same page at a different zoom.
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// On-screen page width in pixels
    pub fn viewport_width(&self) -> f64 {
        self.width * self.scale
    }

    /// On-screen page height in pixels
    pub fn viewport_height(&self) -> f64 {
        self.height * self.scale
    }

    /// Convert a PDF point (bottom-left origin) to a viewport pixel
    /// position (top-left origin, flipped Y axis).
    pub fn to_viewport(&self, pdf_x: f64, pdf_y: f64) -> (f64, f64) {
        (pdf_x * self.scale, (self.height - pdf_y) * self.scale)
    }

    /// Convert a viewport pixel position back to PDF points. Exact inverse
    /// of [`to_viewport`](Self::to_viewport) up to floating-point error.
    pub fn to_pdf(&self, view_x: f64, view_y: f64) -> (f64, f64) {
        (view_x / self.scale, self.height - view_y / self.scale)
    }

    /// Convert a point-space length (font size, box edge) to pixels.
    pub fn to_pixels(&self, length: f64) -> f64 {
        length * self.scale
    }

    /// Top edge of a text box anchored at a PDF baseline.
    ///
    /// Text boxes are laid out from their top-left corner while PDF anchors
    /// text at the baseline, so the glyph height is subtracted from the
    /// projected baseline position.
    pub fn text_top(&self, baseline_y: f64, glyph_height: f64) -> f64 {
        let (_, view_y) = self.to_viewport(0.0, baseline_y);
        view_y - glyph_height * self.scale
    }
}
