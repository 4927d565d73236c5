#![forbid(unsafe_code)]

//! Embedded 2D view hierarchies.
//!
//! A [`ViewHost`] is the local content a panel can render through its
//! bridge instead of a session display: the bookmarks list, prompt
//! bodies, menus. The actual widget trees are opaque to this core — a
//! host only has to paint a whole frame on demand and accept synthetic
//! input. Hosts report failures as values; the panel layer logs and
//! contains them.

use std::fmt;

use visor_core::event::{HoverEvent, PointerEvent, PointerPhase};
use visor_core::geometry::Point;

use visor_render::pixels::{Argb, PixelBuffer};

/// A failure inside embedded view content.
///
/// Contained at the panel boundary: one misbehaving view never blocks
/// input routing or sibling panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError(pub String);

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view error: {}", self.0)
    }
}

impl std::error::Error for ViewError {}

/// A 2D view hierarchy renderable through a panel's bridge.
pub trait ViewHost {
    /// Logical pixel size of the hierarchy; the bridge scales uniformly
    /// from this width onto the texture.
    fn logical_size(&self) -> (f32, f32);

    /// Paint one whole frame. `scale` maps logical to texture pixels.
    fn paint(&mut self, canvas: &mut PixelBuffer, scale: f32) -> Result<(), ViewError>;

    /// Deliver a pointer event in logical coordinates.
    fn dispatch_pointer(&mut self, event: &PointerEvent) -> Result<(), ViewError>;

    /// Deliver a hover event in logical coordinates.
    fn dispatch_hover(&mut self, event: &HoverEvent) -> Result<(), ViewError>;
}

/// The bookmarks list a window swaps in over its session content.
///
/// The list's widgets are out of scope here; this host paints a flat
/// background and tracks interaction, which is all the window core needs
/// to drive the surface-ownership protocol.
#[derive(Debug)]
pub struct BookmarksView {
    logical_width: f32,
    logical_height: f32,
    background: Argb,
    last_pointer: Option<Point>,
    activations: u32,
}

impl BookmarksView {
    /// Create a view sized to its hosting window's content area.
    pub fn new(logical_width: f32, logical_height: f32) -> Self {
        Self {
            logical_width: logical_width.max(1.0),
            logical_height: logical_height.max(1.0),
            background: Argb::from_channels(0xFF, 0x20, 0x23, 0x28),
            last_pointer: None,
            activations: 0,
        }
    }

    /// Resize the logical content area.
    pub fn set_logical_size(&mut self, width: f32, height: f32) {
        self.logical_width = width.max(1.0);
        self.logical_height = height.max(1.0);
    }

    /// Number of pointer-down activations received.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Last pointer position delivered, in logical pixels.
    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }
}

impl ViewHost for BookmarksView {
    fn logical_size(&self) -> (f32, f32) {
        (self.logical_width, self.logical_height)
    }

    fn paint(&mut self, canvas: &mut PixelBuffer, _scale: f32) -> Result<(), ViewError> {
        canvas.clear(self.background);
        Ok(())
    }

    fn dispatch_pointer(&mut self, event: &PointerEvent) -> Result<(), ViewError> {
        self.last_pointer = Some(event.position);
        if event.phase == PointerPhase::Down {
            self.activations += 1;
        }
        Ok(())
    }

    fn dispatch_hover(&mut self, event: &HoverEvent) -> Result<(), ViewError> {
        self.last_pointer = Some(event.position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visor_core::event::PointerButtons;

    #[test]
    fn paint_fills_the_canvas() {
        let mut view = BookmarksView::new(400.0, 300.0);
        let mut canvas = PixelBuffer::new(4, 4);
        view.paint(&mut canvas, 1.0).unwrap();
        assert_ne!(canvas.get(0, 0), Some(Argb::TRANSPARENT));
    }

    #[test]
    fn pointer_down_counts_as_activation() {
        let mut view = BookmarksView::new(400.0, 300.0);
        let down = PointerEvent::new(Point::new(10.0, 20.0), PointerPhase::Down)
            .with_buttons(PointerButtons::PRIMARY);
        view.dispatch_pointer(&down).unwrap();
        view.dispatch_pointer(&PointerEvent::new(Point::new(11.0, 20.0), PointerPhase::Up))
            .unwrap();
        assert_eq!(view.activations(), 1);
        assert_eq!(view.last_pointer(), Some(Point::new(11.0, 20.0)));
    }

    #[test]
    fn degenerate_logical_size_clamps() {
        let view = BookmarksView::new(0.0, -5.0);
        assert_eq!(view.logical_size(), (1.0, 1.0));
    }
}
