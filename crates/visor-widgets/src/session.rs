#![forbid(unsafe_code)]

//! The session-multiplexer boundary.
//!
//! Sessions, displays, and text-input binding are owned by the content
//! engine's multiplexer; this module defines only the interface the
//! window core consumes. Engine-side callbacks do not call into windows
//! directly — they queue [`SessionEvent`]s that the owner thread drains
//! through [`SessionMultiplexer::drain_events`] and dispatches from the
//! widget registry, keeping all window state single-threaded.

use std::fmt;

use visor_core::event::{HoverEvent, PointerEvent};
use visor_core::handle::PanelHandle;

use visor_render::surface::TextureHandle;

/// Identifier of a window, minted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window {}", self.0)
    }
}

/// Identifier of a content session, minted by the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Identifier of an acquired display, minted by the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u64);

/// Identifier of a pending prompt, minted by the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptId(pub u64);

/// The region of a surface a display renders into, in texture pixels.
///
/// Windows inset the viewport by their transparent border so content
/// never paints under the fade margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Full-surface viewport inset by a uniform border.
    pub fn inset(surface_width: u32, surface_height: u32, border: u32) -> Self {
        Self {
            x: border.min(surface_width / 2),
            y: border.min(surface_height / 2),
            width: surface_width.saturating_sub(border * 2).max(1),
            height: surface_height.saturating_sub(border * 2).max(1),
        }
    }
}

/// Errors surfaced by the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The session id does not resolve (already destroyed).
    UnknownSession(SessionId),
    /// The display id does not resolve (already released).
    UnknownDisplay(DisplayId),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSession(id) => write!(f, "unknown session {}", id.0),
            Self::UnknownDisplay(id) => write!(f, "unknown display {}", id.0),
        }
    }
}

impl std::error::Error for SessionError {}

/// Content of a prompt requested by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    /// Informational alert with a single dismiss action.
    Alert { title: String, message: String },
    /// Confirmation with caller-provided button labels.
    Confirm {
        title: String,
        message: String,
        buttons: Vec<String>,
    },
    /// Single-line text entry.
    Text {
        title: String,
        message: String,
        default_text: String,
    },
    /// Credential entry.
    Auth { title: String, message: String },
    /// Selection from a list of choices.
    Choice {
        title: String,
        message: String,
        choices: Vec<String>,
    },
}

/// The user's resolution of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// Dismissed without a choice.
    Dismissed,
    /// A button index from a confirm prompt.
    Button(usize),
    /// Entered text.
    Text(String),
    /// Entered credentials.
    Credentials { username: String, password: String },
    /// A choice index.
    Choice(usize),
}

/// Engine-side callback, funneled onto the owner thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The multiplexer promoted a different session to current.
    CurrentSessionChanged {
        window: WindowId,
        session: SessionId,
    },
    /// A session requested a prompt.
    Prompt {
        window: WindowId,
        prompt: PromptId,
        request: PromptRequest,
    },
    /// A session requested a context menu at the last pointer position.
    ContextMenu {
        window: WindowId,
        link_uri: Option<String>,
    },
    /// The first frame of content was composited.
    FirstComposite { window: WindowId },
    /// The session navigated.
    LocationChanged { window: WindowId, uri: String },
    /// Playable video appeared or disappeared.
    VideoAvailabilityChanged { window: WindowId, available: bool },
    /// Network connectivity changed for a window's session.
    ConnectivityChanged { window: WindowId, online: bool },
}

/// The multiplexer interface consumed by windows.
///
/// Implementations live outside this core (the content engine); the
/// in-memory double used by the test suites is in [`crate::testing`].
pub trait SessionMultiplexer {
    /// Create the initial session for a window.
    fn create_session(&mut self, window: WindowId, private_mode: bool) -> SessionId;

    /// The session a window currently shows.
    fn current_session(&mut self, window: WindowId) -> Option<SessionId>;

    /// Tear down every session belonging to a window.
    fn destroy_sessions(&mut self, window: WindowId);

    /// Acquire a display from a session.
    fn acquire_display(&mut self, session: SessionId) -> Result<DisplayId, SessionError>;

    /// Release a previously acquired display.
    fn release_display(
        &mut self,
        session: SessionId,
        display: DisplayId,
    ) -> Result<(), SessionError>;

    /// Attach a display to a texture surface viewport.
    fn surface_changed(
        &mut self,
        display: DisplayId,
        surface: &TextureHandle,
        viewport: Viewport,
    ) -> Result<(), SessionError>;

    /// Detach a display from its surface, pausing compositor output.
    fn surface_destroyed(&mut self, display: DisplayId);

    /// Route the session's text input to a panel, or to nowhere.
    fn bind_text_input(&mut self, session: SessionId, target: Option<PanelHandle>);

    /// Mark a session active or inactive.
    fn set_active(&mut self, session: SessionId, active: bool);

    /// Whether a session runs in private mode.
    fn is_private(&self, session: SessionId) -> bool;

    /// Whether a session can navigate back.
    fn can_go_back(&self, session: SessionId) -> bool;

    /// Navigate a session back.
    fn go_back(&mut self, session: SessionId);

    /// Load a URI in a session.
    fn load_uri(&mut self, session: SessionId, uri: &str);

    /// Forward a pointer event into a session's content.
    fn forward_pointer(
        &mut self,
        session: SessionId,
        event: &PointerEvent,
    ) -> Result<(), SessionError>;

    /// Forward a hover event into a session's content.
    fn forward_hover(
        &mut self,
        session: SessionId,
        event: &HoverEvent,
    ) -> Result<(), SessionError>;

    /// Report a prompt's resolution back to the engine.
    fn complete_prompt(&mut self, prompt: PromptId, response: PromptResponse);

    /// Drain queued engine events; called from the owner thread only.
    fn drain_events(&mut self) -> Vec<SessionEvent>;
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn viewport_inset_subtracts_border_on_all_sides() {
        let vp = Viewport::inset(1280, 720, 10);
        assert_eq!(
            vp,
            Viewport {
                x: 10,
                y: 10,
                width: 1260,
                height: 700
            }
        );
    }

    #[test]
    fn viewport_inset_survives_oversized_borders() {
        let vp = Viewport::inset(20, 10, 50);
        assert!(vp.width >= 1);
        assert!(vp.height >= 1);
        assert!(vp.x <= 10);
    }
}
