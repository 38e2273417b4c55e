//! Placeholder geometry tracking.
//!
//! Watches the document region reserved for an embedded view and produces a
//! de-duplicated stream of clipped, visible rectangles. Measurement is
//! observer-driven (mount, window resize, container scroll, element resize);
//! the frame tick only services the short post-mount re-check and retries
//! while the element is detached. It is not a polling loop.

use folio_common::Rect;

/// The clipping extent for embedded views: the scroll container's visible
/// area, minus fixed chrome reserved at the bottom (the status bar).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub reserved_bottom: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            reserved_bottom: 0.0,
        }
    }

    pub fn with_reserved_bottom(mut self, inset: f64) -> Self {
        self.reserved_bottom = inset;
        self
    }

    /// Bottom edge of the visible region, above any reserved chrome.
    pub fn visible_bottom(&self) -> f64 {
        (self.height - self.reserved_bottom).max(0.0)
    }
}

/// Seam to the layout system: where does the placeholder currently sit?
///
/// `placeholder_rect` returns the raw (unclamped) rectangle in viewport
/// coordinates, or `None` while the element is detached from layout.
pub trait PlaceholderProbe {
    fn placeholder_rect(&self) -> Option<Rect>;
    fn viewport(&self) -> Viewport;
}

/// Clip a raw placeholder rectangle to the visible viewport. Left and top
/// clamp to zero, right to the viewport width, bottom to the visible bottom
/// edge. Degenerate results collapse to zero extent, never negative.
pub fn clip_to_viewport(raw: Rect, viewport: Viewport) -> Rect {
    let visible_bottom = viewport.visible_bottom();
    let left = raw.x.max(0.0).min(viewport.width);
    let top = raw.y.max(0.0).min(visible_bottom);
    let right = raw.right().min(viewport.width).max(left);
    let bottom = raw.bottom().min(visible_bottom).max(top);

    Rect::new(left, top, right - left, bottom - top)
}

/// Tracks one placeholder's visible bounds and suppresses no-op emissions.
///
/// Every `on_*` hook returns `Some(bounds)` only when the clipped rectangle
/// actually changed; unchanged geometry produces nothing, so no-op layout
/// passes generate no downstream IPC traffic.
pub struct ViewportTracker<P: PlaceholderProbe> {
    probe: P,
    last: Option<Rect>,
    mounted: bool,
    /// Frames until the deferred post-mount re-check runs.
    recheck_frames: u8,
    recheck_delay: u8,
    /// The probe reported a detached element; retry on the next frame.
    awaiting_attach: bool,
}

impl<P: PlaceholderProbe> ViewportTracker<P> {
    pub fn new(probe: P, recheck_delay: u8) -> Self {
        Self {
            probe,
            last: None,
            mounted: false,
            recheck_frames: 0,
            recheck_delay,
            awaiting_attach: false,
        }
    }

    /// Initial measurement. Also schedules a deferred re-check to catch
    /// geometry that settles after the first layout pass.
    pub fn on_mount(&mut self) -> Option<Rect> {
        self.mounted = true;
        self.recheck_frames = self.recheck_delay;
        self.measure()
    }

    pub fn on_window_resize(&mut self) -> Option<Rect> {
        self.measure()
    }

    pub fn on_container_scroll(&mut self) -> Option<Rect> {
        self.measure()
    }

    /// Content-driven size change of the placeholder itself (reflow).
    pub fn on_element_resize(&mut self) -> Option<Rect> {
        self.measure()
    }

    /// Frame tick. Only services the deferred re-check and the
    /// detached-element retry; a settled tracker does no work here.
    pub fn on_frame(&mut self) -> Option<Rect> {
        if !self.mounted {
            return None;
        }
        if self.awaiting_attach {
            return self.measure();
        }
        if self.recheck_frames > 0 {
            self.recheck_frames -= 1;
            if self.recheck_frames == 0 {
                return self.measure();
            }
        }
        None
    }

    /// Stop measuring and drop any pending frame work.
    pub fn on_unmount(&mut self) {
        self.mounted = false;
        self.awaiting_attach = false;
        self.recheck_frames = 0;
    }

    /// The last emitted bounds, if any.
    pub fn last_bounds(&self) -> Option<Rect> {
        self.last
    }

    /// Forget the de-dup memory so the next measurement emits even when the
    /// geometry is unchanged. Used by the retry flow to force a resend.
    pub fn forget_last(&mut self) {
        self.last = None;
    }

    fn measure(&mut self) -> Option<Rect> {
        if !self.mounted {
            return None;
        }
        let Some(raw) = self.probe.placeholder_rect() else {
            // Detached mid-layout: skip silently, never emit a zero rect.
            self.awaiting_attach = true;
            return None;
        };
        self.awaiting_attach = false;

        let clipped = clip_to_viewport(raw, self.probe.viewport());
        if self.last == Some(clipped) {
            return None;
        }
        self.last = Some(clipped);
        Some(clipped)
    }
}
