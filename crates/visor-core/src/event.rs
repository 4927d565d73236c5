#![forbid(unsafe_code)]

//! Synthetic input events.
//!
//! Input reaches a panel as a 3D controller ray-cast. The platform layer
//! resolves the ray against the panel quad and reports a [`RayHit`] with
//! normalized coordinates; panels convert that into surface-space
//! [`PointerEvent`]s / [`HoverEvent`]s for whichever consumer currently
//! owns the texture (an embedded view or a content session).

use bitflags::bitflags;

use crate::geometry::Point;

bitflags! {
    /// Controller buttons held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PointerButtons: u8 {
        /// Primary trigger / touchpad click.
        const PRIMARY = 1 << 0;
        /// Secondary (context) button.
        const SECONDARY = 1 << 1;
        /// Grip button.
        const GRIP = 1 << 2;
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// A button transitioned to pressed.
    Down,
    /// A button transitioned to released.
    Up,
    /// The pointer moved while pressed.
    Move,
    /// Scroll delta delivered at the pointer position.
    Scroll,
}

/// Phase of a hover interaction (no buttons involved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPhase {
    /// The ray entered the panel.
    Enter,
    /// The ray moved within the panel.
    Move,
    /// The ray left the panel.
    Exit,
}

/// A ray-cast hit on a panel, in normalized panel coordinates.
///
/// `u`/`v` lie in `[0, 1]` with `(0, 0)` at the panel's top-left corner.
/// Values outside the unit square are possible during capture (dragging
/// off the edge) and are clamped at conversion time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub u: f32,
    pub v: f32,
}

impl RayHit {
    /// Create a new hit.
    #[inline]
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// Clamp the hit into the unit square.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            u: self.u.clamp(0.0, 1.0),
            v: self.v.clamp(0.0, 1.0),
        }
    }
}

/// A pointer event in surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position in device-independent surface pixels.
    pub position: Point,
    /// Interaction phase.
    pub phase: PointerPhase,
    /// Buttons held at event time.
    pub buttons: PointerButtons,
    /// Scroll delta for [`PointerPhase::Scroll`], zero otherwise.
    pub scroll_delta: Point,
}

impl PointerEvent {
    /// Create a buttonless event at the given position and phase.
    pub fn new(position: Point, phase: PointerPhase) -> Self {
        Self {
            position,
            phase,
            buttons: PointerButtons::empty(),
            scroll_delta: Point::default(),
        }
    }

    /// Attach held buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }
}

/// A hover event in surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverEvent {
    /// Position in device-independent surface pixels.
    pub position: Point,
    /// Hover phase.
    pub phase: HoverPhase,
}

impl HoverEvent {
    /// Create a new hover event.
    pub const fn new(position: Point, phase: HoverPhase) -> Self {
        Self { position, phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hit_clamps_into_unit_square() {
        let hit = RayHit::new(-0.25, 1.5).clamped();
        assert_eq!(hit, RayHit::new(0.0, 1.0));
        let inside = RayHit::new(0.3, 0.7).clamped();
        assert_eq!(inside, RayHit::new(0.3, 0.7));
    }

    #[test]
    fn pointer_event_builder_sets_buttons() {
        let ev = PointerEvent::new(Point::new(4.0, 8.0), PointerPhase::Down)
            .with_buttons(PointerButtons::PRIMARY | PointerButtons::GRIP);
        assert!(ev.buttons.contains(PointerButtons::PRIMARY));
        assert!(ev.buttons.contains(PointerButtons::GRIP));
        assert!(!ev.buttons.contains(PointerButtons::SECONDARY));
    }

    #[test]
    fn scroll_delta_defaults_to_zero() {
        let ev = PointerEvent::new(Point::default(), PointerPhase::Scroll);
        assert_eq!(ev.scroll_delta, Point::default());
    }
}
