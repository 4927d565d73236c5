#![forbid(unsafe_code)]

//! Visor public facade crate.
//!
//! Visor renders a panel-based 2D browser chrome into off-screen
//! textures for a 3D (VR) scene and multiplexes independent browsing
//! sessions across movable, resizable window panels. This crate
//! re-exports the stable surface area from the internal crates and
//! offers a top-level error type.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use visor_core::event::{
    HoverEvent, HoverPhase, PointerButtons, PointerEvent, PointerPhase, RayHit,
};
pub use visor_core::geometry::{PixelSize, Point, Vec3, WorldRect};
pub use visor_core::handle::{HandleAllocator, PanelHandle};

// --- Placement re-exports --------------------------------------------------

pub use visor_placement::{
    MoveUpdate, Placement, PlacementMover, Rotation, SizeReference, size_for_area_scale,
};

// --- Render re-exports -----------------------------------------------------

pub use visor_render::bridge::{BridgeError, FramePaint, RenderBridge};
pub use visor_render::pixels::{Argb, PixelBuffer};
pub use visor_render::surface::{ClaimKind, SurfaceClaim, TextureHandle, TextureSurface};

// --- Widget re-exports -----------------------------------------------------

pub use visor_widgets::{
    BookmarkObserver, BookmarksView, CompositorSink, FocusTracker, OverlayContent, OverlayKind,
    OverlayPanel, PanelCore, PanelError, PanelState, PerformanceHint, PromptId, PromptRequest,
    PromptResponse, SessionError, SessionEvent, SessionId, SessionMultiplexer, ShowFocus,
    SurfaceOwner, TopBar, TopBarAction, ViewHost, Viewport, WidgetSnapshot, Window, WindowContext,
    WindowId, WindowPlacement, WindowSettings, Windows,
};

// --- Errors ----------------------------------------------------------------

/// Top-level error type for Visor embedders.
#[derive(Debug)]
pub enum Error {
    /// Panel surface management failure.
    Panel(PanelError),
    /// Render bridge failure.
    Bridge(BridgeError),
    /// Session multiplexer failure.
    Session(SessionError),
    /// Registry failure with message context.
    Registry(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panel(err) => write!(f, "{err}"),
            Self::Bridge(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Registry(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<PanelError> for Error {
    fn from(err: PanelError) -> Self {
        Self::Panel(err)
    }
}

impl From<BridgeError> for Error {
    fn from(err: BridgeError) -> Self {
        Self::Bridge(err)
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

/// Standard result type for Visor APIs.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_convert_and_display() {
        let err: Error = PanelError::AlreadyBound.into();
        assert!(format!("{err}").contains("already set"));
        let err: Error = BridgeError::SurfaceGone.into();
        assert!(format!("{err}").contains("gone"));
        let err: Error = SessionError::UnknownSession(SessionId(4)).into();
        assert!(format!("{err}").contains("unknown session 4"));
    }
}
