#![forbid(unsafe_code)]

//! The panel base abstraction.
//!
//! A [`PanelCore`] is a positioned, resizable rectangle that owns a
//! [`Placement`], optionally owns a render bridge, and turns 3D ray-cast
//! hits into surface-space input. Windows and overlays embed one and
//! layer their own behavior on top.
//!
//! State machine: `Created → Bound → [Drawing ⇄ Idle] → Released`, where
//! `Drawing` is the lifetime of an open frame guard. A released panel can
//! be bound again before its handle is reused.
//!
//! Input entry points never propagate consumer failures: a malfunctioning
//! view is logged and contained so it cannot stall global input routing.

use std::fmt;

use visor_core::event::{
    HoverEvent, HoverPhase, PointerButtons, PointerEvent, PointerPhase, RayHit,
};
use visor_core::geometry::{PixelSize, Point};
use visor_core::handle::PanelHandle;
use visor_placement::Placement;
use visor_render::bridge::{BridgeError, RenderBridge};
use visor_render::surface::TextureHandle;

use crate::view::ViewHost;

/// Focus behavior when showing a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFocus {
    /// Move input focus to the shown panel.
    Request,
    /// Leave focus where it is.
    Keep,
}

/// Lifecycle state of a panel's surface binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    /// No surface has been supplied yet.
    #[default]
    Created,
    /// A texture handle is attached.
    Bound,
    /// The binding was released; only rebinding or destruction follow.
    Released,
}

/// Errors from panel surface management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelError {
    /// The same live texture handle was supplied twice without clearing.
    AlreadyBound,
    /// The underlying bridge rejected the binding.
    Bridge(BridgeError),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBound => write!(f, "texture already set on this panel"),
            Self::Bridge(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PanelError {}

impl From<BridgeError> for PanelError {
    fn from(err: BridgeError) -> Self {
        Self::Bridge(err)
    }
}

/// Base state shared by every panel kind.
#[derive(Debug)]
pub struct PanelCore {
    handle: PanelHandle,
    placement: Placement,
    state: PanelState,
    texture: Option<TextureHandle>,
    surface_size: PixelSize,
    bridge: Option<RenderBridge>,
}

impl PanelCore {
    /// Create a panel with its handle and initial placement.
    pub fn new(handle: PanelHandle, placement: Placement) -> Self {
        Self {
            handle,
            placement,
            state: PanelState::Created,
            texture: None,
            surface_size: PixelSize::default(),
            bridge: None,
        }
    }

    /// The panel's handle.
    pub fn handle(&self) -> PanelHandle {
        self.handle
    }

    /// The panel's placement.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Mutable access to the placement.
    pub fn placement_mut(&mut self) -> &mut Placement {
        &mut self.placement
    }

    /// Current binding state.
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// The bound texture handle, if any.
    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Pixel size of the bound surface.
    pub fn surface_size(&self) -> PixelSize {
        self.surface_size
    }

    fn check_rebind(&self, handle: &TextureHandle) -> Result<(), PanelError> {
        if let Some(existing) = &self.texture
            && existing.is_live()
            && existing.same_surface(handle)
            && self.state == PanelState::Bound
        {
            return Err(PanelError::AlreadyBound);
        }
        Ok(())
    }

    /// Attach a texture and create a fresh render bridge into it.
    ///
    /// `Created/Released → Bound`. Setting the same live handle twice
    /// without an intervening [`release`](Self::release) fails; a
    /// different handle replaces the old binding.
    pub fn set_surface(&mut self, handle: TextureHandle, size: PixelSize) -> Result<(), PanelError> {
        self.check_rebind(&handle)?;
        if let Some(mut old) = self.bridge.take() {
            old.release();
        }
        let mut bridge = RenderBridge::new();
        bridge.bind(handle.clone(), size)?;
        bridge.set_logical_width(self.placement.width);
        self.texture = Some(handle);
        self.surface_size = size;
        self.bridge = Some(bridge);
        self.state = PanelState::Bound;
        Ok(())
    }

    /// Attach a texture without claiming it through a bridge.
    ///
    /// Used when an external consumer (a session display) owns the
    /// surface; the panel only tracks the handle and its size.
    pub fn adopt_surface(
        &mut self,
        handle: TextureHandle,
        size: PixelSize,
    ) -> Result<(), PanelError> {
        self.check_rebind(&handle)?;
        if let Some(mut old) = self.bridge.take() {
            old.release();
        }
        self.texture = Some(handle);
        self.surface_size = size;
        self.state = PanelState::Bound;
        Ok(())
    }

    /// Bind a fresh bridge to the already-adopted texture.
    ///
    /// The overlay half of the window's surface multiplexing: the texture
    /// stays, ownership moves from the session display to the panel.
    pub fn bind_view_bridge(&mut self) -> Result<(), PanelError> {
        let handle = match &self.texture {
            Some(handle) => handle.clone(),
            None => return Ok(()), // nothing to paint into yet
        };
        if self.bridge.is_some() {
            return Err(PanelError::Bridge(BridgeError::AlreadyBound));
        }
        let mut bridge = RenderBridge::new();
        bridge.bind(handle, self.surface_size)?;
        bridge.set_logical_width(self.placement.width);
        self.bridge = Some(bridge);
        Ok(())
    }

    /// Release only the bridge, keeping the texture adopted.
    pub fn release_view_bridge(&mut self) {
        if let Some(mut bridge) = self.bridge.take() {
            bridge.release();
        }
    }

    /// Whether this panel's bridge currently claims the surface.
    pub fn has_view_bridge(&self) -> bool {
        self.bridge.as_ref().is_some_and(RenderBridge::is_bound)
    }

    /// Resize the bound surface, pushing dimensions to the bridge.
    pub fn resize_surface(&mut self, size: PixelSize) {
        self.surface_size = size;
        if let Some(bridge) = &mut self.bridge {
            bridge.resize(size);
            bridge.set_logical_width(self.placement.width);
        } else if let Some(surface) = self.texture.as_ref().and_then(TextureHandle::surface) {
            surface.set_default_size(size);
        }
    }

    /// Schedule a whole-surface repaint.
    pub fn invalidate(&mut self) {
        if let Some(bridge) = &mut self.bridge {
            bridge.invalidate();
        }
    }

    /// Paint the attached view through the bridge if a repaint is due.
    ///
    /// View failures are logged and swallowed; the opened frame still
    /// commits so the compositor never samples a half-written texture.
    pub fn draw(&mut self, view: &mut dyn ViewHost) {
        let Some(bridge) = &mut self.bridge else {
            return;
        };
        if !bridge.take_repaint() {
            return;
        }
        let (logical_width, _) = view.logical_size();
        bridge.set_logical_width(logical_width);
        let Some(mut frame) = bridge.begin_frame() else {
            tracing::debug!(handle = %self.handle, "skipping paint; surface is gone");
            return;
        };
        let scale = frame.scale_factor();
        if let Err(err) = view.paint(&mut frame, scale) {
            tracing::warn!(handle = %self.handle, %err, "view paint failed; frame committed empty");
        }
        frame.finish();
    }

    /// Convert a normalized ray-cast hit into a surface-space pointer
    /// event.
    pub fn pointer_from_hit(
        &self,
        hit: RayHit,
        phase: PointerPhase,
        buttons: PointerButtons,
    ) -> PointerEvent {
        let hit = hit.clamped();
        let position = Point::new(hit.u * self.placement.width, hit.v * self.placement.height);
        PointerEvent::new(position, phase).with_buttons(buttons)
    }

    /// Convert a normalized ray-cast hit into a hover event.
    pub fn hover_from_hit(&self, hit: RayHit, phase: HoverPhase) -> HoverEvent {
        let hit = hit.clamped();
        HoverEvent::new(
            Point::new(hit.u * self.placement.width, hit.v * self.placement.height),
            phase,
        )
    }

    /// Deliver a pointer event to an embedded view, containing failures.
    pub fn deliver_pointer_to_view(&mut self, view: &mut dyn ViewHost, event: &PointerEvent) {
        if let Err(err) = view.dispatch_pointer(event) {
            tracing::warn!(handle = %self.handle, %err, "view rejected pointer event");
        }
    }

    /// Deliver a hover event to an embedded view, containing failures.
    pub fn deliver_hover_to_view(&mut self, view: &mut dyn ViewHost, event: &HoverEvent) {
        if let Err(err) = view.dispatch_hover(event) {
            tracing::warn!(handle = %self.handle, %err, "view rejected hover event");
        }
    }

    /// Release the bridge and clear the texture reference.
    ///
    /// Idempotent; must run before the panel's placement or handle is
    /// reused. `Created` panels stay `Created`.
    pub fn release(&mut self) {
        if let Some(mut bridge) = self.bridge.take() {
            bridge.release();
        }
        self.texture = None;
        self.surface_size = PixelSize::default();
        if self.state == PanelState::Bound {
            self.state = PanelState::Released;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::BookmarksView;
    use visor_placement::SizeReference;
    use visor_render::surface::{ClaimKind, TextureSurface};

    fn panel() -> PanelCore {
        let placement = Placement::new(800.0, 450.0, &SizeReference::default());
        PanelCore::new(PanelHandle::new(1).unwrap(), placement)
    }

    #[test]
    fn set_surface_transitions_created_to_bound() {
        let mut panel = panel();
        assert_eq!(panel.state(), PanelState::Created);
        let surface = TextureSurface::new(800, 450);
        panel
            .set_surface(surface.handle(), surface.size())
            .unwrap();
        assert_eq!(panel.state(), PanelState::Bound);
        assert_eq!(surface.claimant(), Some(ClaimKind::UiBridge));
    }

    #[test]
    fn same_live_handle_twice_is_rejected() {
        let mut panel = panel();
        let surface = TextureSurface::new(800, 450);
        panel
            .set_surface(surface.handle(), surface.size())
            .unwrap();
        assert_eq!(
            panel.set_surface(surface.handle(), surface.size()),
            Err(PanelError::AlreadyBound)
        );
    }

    #[test]
    fn a_different_handle_replaces_the_binding() {
        let mut panel = panel();
        let first = TextureSurface::new(800, 450);
        let second = TextureSurface::new(800, 450);
        panel.set_surface(first.handle(), first.size()).unwrap();
        panel.set_surface(second.handle(), second.size()).unwrap();
        assert_eq!(first.claimant(), None);
        assert_eq!(second.claimant(), Some(ClaimKind::UiBridge));
    }

    #[test]
    fn release_is_idempotent_and_allows_rebinding() {
        let mut panel = panel();
        let surface = TextureSurface::new(800, 450);
        panel
            .set_surface(surface.handle(), surface.size())
            .unwrap();
        panel.release();
        panel.release();
        assert_eq!(panel.state(), PanelState::Released);
        assert_eq!(surface.claimant(), None);
        panel
            .set_surface(surface.handle(), surface.size())
            .unwrap();
        assert_eq!(panel.state(), PanelState::Bound);
    }

    #[test]
    fn draw_commits_one_frame_per_invalidation() {
        let mut panel = panel();
        let surface = TextureSurface::new(800, 450);
        panel
            .set_surface(surface.handle(), surface.size())
            .unwrap();
        let mut view = BookmarksView::new(800.0, 450.0);
        panel.draw(&mut view); // initial bind schedules a paint
        panel.draw(&mut view); // nothing dirty
        assert_eq!(surface.frames_committed(), 1);
        panel.invalidate();
        panel.draw(&mut view);
        assert_eq!(surface.frames_committed(), 2);
    }

    #[test]
    fn pointer_conversion_scales_and_clamps() {
        let panel = panel();
        let ev = panel.pointer_from_hit(
            RayHit::new(0.5, 2.0),
            PointerPhase::Down,
            PointerButtons::PRIMARY,
        );
        assert_eq!(ev.position, Point::new(400.0, 450.0));
        assert_eq!(ev.phase, PointerPhase::Down);
    }

    #[test]
    fn adopt_surface_does_not_claim() {
        let mut panel = panel();
        let surface = TextureSurface::new(800, 450);
        panel
            .adopt_surface(surface.handle(), surface.size())
            .unwrap();
        assert_eq!(panel.state(), PanelState::Bound);
        assert_eq!(surface.claimant(), None);
        assert!(!panel.has_view_bridge());
    }

    #[test]
    fn view_bridge_toggles_over_an_adopted_surface() {
        let mut panel = panel();
        let surface = TextureSurface::new(800, 450);
        panel
            .adopt_surface(surface.handle(), surface.size())
            .unwrap();
        panel.bind_view_bridge().unwrap();
        assert_eq!(surface.claimant(), Some(ClaimKind::UiBridge));
        panel.release_view_bridge();
        assert_eq!(surface.claimant(), None);
        assert_eq!(panel.state(), PanelState::Bound); // texture still adopted
    }

    #[test]
    fn resize_surface_pushes_to_the_adopted_surface() {
        let mut panel = panel();
        let surface = TextureSurface::new(800, 450);
        panel
            .adopt_surface(surface.handle(), surface.size())
            .unwrap();
        panel.resize_surface(PixelSize::new(1600, 900));
        assert_eq!(surface.size(), PixelSize::new(1600, 900));
    }
}
