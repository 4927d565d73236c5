#![forbid(unsafe_code)]

//! Transient overlay panels: prompts, menus, dialogs, toasts.
//!
//! Overlays are short-lived panels a window spawns in response to
//! session callbacks or chrome actions. Their widget content is opaque
//! to this core; the uniform protocol is create → parent by handle →
//! show (with a focus flag) → resolve/hide → discard. A window tracks at
//! most one live overlay per kind — a newer request of the same kind
//! replaces the older one.

use visor_core::geometry::Point;
use visor_core::handle::PanelHandle;
use visor_placement::{Placement, SizeReference};

use crate::compositor::WidgetSnapshot;
use crate::panel::{PanelCore, ShowFocus};
use crate::registry::WindowContext;
use crate::session::{PromptId, PromptRequest};

/// Overlay kinds a window tracks exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Alert,
    Confirm,
    TextPrompt,
    AuthPrompt,
    ChoicePrompt,
    ContextMenu,
    MaxWindows,
    ConnectivityToast,
    MediaControls,
    ProjectionMenu,
}

/// Parameterized overlay content.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
    /// A session prompt awaiting a response.
    Prompt { id: PromptId, request: PromptRequest },
    /// A context menu anchored at the triggering pointer position.
    ContextMenu {
        anchor: Point,
        link_uri: Option<String>,
    },
    /// The window-count limit dialog.
    MaxWindows { message: String },
    /// A connectivity toast.
    Toast { message: String },
    /// Media transport controls shown over immersive video.
    MediaControls,
    /// The video projection selector.
    ProjectionMenu,
}

impl OverlayContent {
    /// The exclusivity bucket this content occupies.
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::Prompt { request, .. } => match request {
                PromptRequest::Alert { .. } => OverlayKind::Alert,
                PromptRequest::Confirm { .. } => OverlayKind::Confirm,
                PromptRequest::Text { .. } => OverlayKind::TextPrompt,
                PromptRequest::Auth { .. } => OverlayKind::AuthPrompt,
                PromptRequest::Choice { .. } => OverlayKind::ChoicePrompt,
            },
            Self::ContextMenu { .. } => OverlayKind::ContextMenu,
            Self::MaxWindows { .. } => OverlayKind::MaxWindows,
            Self::Toast { .. } => OverlayKind::ConnectivityToast,
            Self::MediaControls => OverlayKind::MediaControls,
            Self::ProjectionMenu => OverlayKind::ProjectionMenu,
        }
    }
}

/// World-space lift of an overlay above its parent surface.
const OVERLAY_Z_OFFSET: f32 = 0.01;

/// A short-lived panel parented to a window by handle.
#[derive(Debug)]
pub struct OverlayPanel {
    core: PanelCore,
    content: OverlayContent,
}

impl OverlayPanel {
    /// Build an overlay parented to `parent`, with kind-appropriate
    /// placement defaults.
    ///
    /// `parent_size` is the parent window's content size in
    /// device-independent pixels, used to anchor pointer-positioned
    /// overlays.
    pub fn new(
        handle: PanelHandle,
        parent: PanelHandle,
        parent_size: (f32, f32),
        content: OverlayContent,
        reference: &SizeReference,
    ) -> Self {
        let (width, height) = match content.kind() {
            OverlayKind::Alert
            | OverlayKind::Confirm
            | OverlayKind::TextPrompt
            | OverlayKind::AuthPrompt
            | OverlayKind::ChoicePrompt => (500.0, 300.0),
            OverlayKind::ContextMenu => (320.0, 200.0),
            OverlayKind::MaxWindows => (420.0, 220.0),
            OverlayKind::ConnectivityToast => (300.0, 80.0),
            OverlayKind::MediaControls => (560.0, 120.0),
            OverlayKind::ProjectionMenu => (220.0, 320.0),
        };
        let mut placement = Placement::new(width, height, reference);
        placement.parent = Some(parent);
        placement.translation.z = OVERLAY_Z_OFFSET;
        placement.opaque = false;
        match &content {
            OverlayContent::ContextMenu { anchor, .. } => {
                // Menu top-left hangs off the pointer position.
                placement.anchor_x = 0.0;
                placement.anchor_y = 0.0;
                placement.parent_anchor_x = (anchor.x / parent_size.0.max(1.0)).clamp(0.0, 1.0);
                placement.parent_anchor_y = (anchor.y / parent_size.1.max(1.0)).clamp(0.0, 1.0);
            }
            OverlayContent::Toast { .. } | OverlayContent::MediaControls => {
                placement.anchor_x = 0.5;
                placement.anchor_y = 1.0;
                placement.parent_anchor_x = 0.5;
                placement.parent_anchor_y = 1.0;
            }
            OverlayContent::ProjectionMenu => {
                // Projection menus stay flat even over a curved window.
                placement.cylinder_map_radius = Some(0.0);
            }
            _ => {}
        }
        Self {
            core: PanelCore::new(handle, placement),
            content,
        }
    }

    /// The overlay's handle.
    pub fn handle(&self) -> PanelHandle {
        self.core.handle()
    }

    /// The overlay's content.
    pub fn content(&self) -> &OverlayContent {
        &self.content
    }

    /// The overlay's kind.
    pub fn kind(&self) -> OverlayKind {
        self.content.kind()
    }

    /// The overlay's placement.
    pub fn placement(&self) -> &Placement {
        self.core.placement()
    }

    /// Whether the overlay is currently visible.
    pub fn is_visible(&self) -> bool {
        self.core.placement().visible
    }

    /// The {handle, placement, texture} tuple for the compositor.
    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            handle: self.core.handle(),
            placement: self.core.placement().clone(),
            texture: self.core.texture().cloned(),
        }
    }

    /// Show the overlay, optionally taking input focus.
    pub fn show(&mut self, ctx: &mut WindowContext<'_>, focus: ShowFocus) {
        self.core.placement_mut().visible = true;
        if focus == ShowFocus::Request {
            ctx.focus.request(self.core.handle());
        }
        ctx.compositor.update_widget(&self.snapshot());
    }

    /// Hide the overlay and release its surface binding and focus.
    pub fn hide(&mut self, ctx: &mut WindowContext<'_>) {
        if self.core.placement().visible {
            self.core.placement_mut().visible = false;
            ctx.compositor.update_widget(&self.snapshot());
        }
        ctx.focus.clear(self.core.handle());
        self.core.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visor_core::geometry::Point;

    fn reference() -> SizeReference {
        SizeReference::default()
    }

    fn parent() -> PanelHandle {
        PanelHandle::new(1).unwrap()
    }

    #[test]
    fn prompt_kinds_map_to_exclusivity_buckets() {
        let content = OverlayContent::Prompt {
            id: PromptId(1),
            request: PromptRequest::Alert {
                title: "t".into(),
                message: "m".into(),
            },
        };
        assert_eq!(content.kind(), OverlayKind::Alert);
        assert_eq!(
            OverlayContent::ProjectionMenu.kind(),
            OverlayKind::ProjectionMenu
        );
    }

    #[test]
    fn context_menu_anchors_at_pointer_position() {
        let handle = PanelHandle::new(9).unwrap();
        let overlay = OverlayPanel::new(
            handle,
            parent(),
            (800.0, 450.0),
            OverlayContent::ContextMenu {
                anchor: Point::new(400.0, 225.0),
                link_uri: None,
            },
            &reference(),
        );
        let p = overlay.placement();
        assert_eq!(p.parent, Some(parent()));
        assert!((p.parent_anchor_x - 0.5).abs() < 1e-5);
        assert!((p.parent_anchor_y - 0.5).abs() < 1e-5);
        assert_eq!(p.anchor_x, 0.0);
    }

    #[test]
    fn projection_menu_opts_out_of_parent_curvature() {
        let overlay = OverlayPanel::new(
            PanelHandle::new(9).unwrap(),
            parent(),
            (800.0, 450.0),
            OverlayContent::ProjectionMenu,
            &reference(),
        );
        assert_eq!(overlay.placement().cylinder_map_radius, Some(0.0));
        assert_eq!(overlay.placement().effective_cylinder_radius(4.0), 0.0);
    }
}
