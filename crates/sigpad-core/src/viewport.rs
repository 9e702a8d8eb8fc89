//! Viewport scale tracking.
//!
//! The page renderer reports the page's natural size once it has loaded; the
//! host reports the container width on every layout change. Only when both are
//! known does a scale exist.

use crate::error::SignError;
use kurbo::{Point, Size};

/// Derived render metrics. Only constructed with a positive, finite scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Page size in document points.
    pub page_natural_size: Size,
    /// Available display width in pixels.
    pub container_width: f64,
    /// Rendered page size in pixels.
    pub render_size: Size,
    /// Pixels per point.
    pub scale: f64,
}

impl ViewportMetrics {
    /// Compute metrics, or `None` if either input is missing or degenerate.
    pub fn compute(page_natural_size: Size, container_width: f64) -> Option<Self> {
        let page_ok = page_natural_size.width.is_finite()
            && page_natural_size.height.is_finite()
            && page_natural_size.width > 0.0
            && page_natural_size.height > 0.0;
        if !page_ok || !container_width.is_finite() || container_width <= 0.0 {
            return None;
        }
        let render_size = page_natural_size * (container_width / page_natural_size.width);
        let scale = render_size.width / page_natural_size.width;
        Some(Self {
            page_natural_size,
            container_width,
            render_size,
            scale,
        })
    }

    /// Map a document point to a pixel position on the rendered page.
    pub fn to_pixels(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale,
            (self.page_natural_size.height - p.y) * self.scale,
        )
    }

    /// Map a pixel position on the rendered page to a document point.
    pub fn to_document(&self, px: Point) -> Point {
        Point::new(
            px.x / self.scale,
            self.page_natural_size.height - px.y / self.scale,
        )
    }

    /// Convert a document-space length to pixels.
    pub fn len_to_pixels(&self, len: f64) -> f64 {
        len * self.scale
    }
}

/// Observes the two inputs and republishes metrics whenever they change.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    page_natural_size: Option<Size>,
    container_width: Option<f64>,
    metrics: Option<ViewportMetrics>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the page's natural size. Returns `true` if the published
    /// metrics changed.
    pub fn set_page_natural_size(&mut self, size: Size) -> bool {
        self.page_natural_size = Some(size);
        self.republish()
    }

    /// Record the container's rendered width. Returns `true` if the published
    /// metrics changed.
    pub fn set_container_width(&mut self, width: f64) -> bool {
        self.container_width = Some(width);
        self.republish()
    }

    /// Forget the page (e.g. a new document is being loaded).
    pub fn reset_page(&mut self) {
        self.page_natural_size = None;
        self.republish();
    }

    pub fn page_natural_size(&self) -> Option<Size> {
        self.page_natural_size
    }

    pub fn container_width(&self) -> Option<f64> {
        self.container_width
    }

    /// Current metrics, if both inputs are known.
    pub fn metrics(&self) -> Option<ViewportMetrics> {
        self.metrics
    }

    /// Current metrics, or `ViewportNotReady`.
    pub fn require(&self) -> Result<ViewportMetrics, SignError> {
        self.metrics.ok_or(SignError::ViewportNotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.metrics.is_some()
    }

    fn republish(&mut self) -> bool {
        let next = match (self.page_natural_size, self.container_width) {
            (Some(page), Some(width)) => ViewportMetrics::compute(page, width),
            _ => None,
        };
        let changed = next != self.metrics;
        if changed {
            match &next {
                Some(m) => log::debug!(
                    "viewport: page {}x{}pt, container {}px, scale {}",
                    m.page_natural_size.width,
                    m.page_natural_size.height,
                    m.container_width,
                    m.scale
                ),
                None => log::debug!("viewport: not ready"),
            }
        }
        self.metrics = next;
        changed
    }
}
