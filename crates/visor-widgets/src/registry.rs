#![forbid(unsafe_code)]

//! The window registry: an arena of windows addressed by handle.
//!
//! The registry owns every window, mints panel handles, tracks focus,
//! and pumps queued session events onto their target windows. External
//! services — the session multiplexer and the 3D compositor — are owned
//! by the embedder and threaded through every mutating operation as a
//! [`WindowContext`]; there is no global registry singleton.
//!
//! Event dispatch is per concern: a window receives only the event
//! categories its [`SinkInterest`] registration covers, replacing the
//! source design's many-callback-interfaces-on-one-object pattern.

use std::fmt;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use visor_core::handle::{HandleAllocator, PanelHandle};

use crate::compositor::{CompositorSink, WidgetSnapshot};
use crate::panel::ShowFocus;
use crate::session::{SessionEvent, SessionMultiplexer, WindowId};
use crate::settings::WindowSettings;
use crate::window::Window;

bitflags! {
    /// Event concerns a window can register for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SinkInterest: u8 {
        /// Current-session promotion.
        const SESSION_CHANGE = 1 << 0;
        /// Prompt requests.
        const PROMPTS = 1 << 1;
        /// Content events (context menu, first composite, connectivity).
        const CONTENT = 1 << 2;
        /// Navigation events.
        const NAVIGATION = 1 << 3;
        /// Media events (video availability).
        const MEDIA = 1 << 4;
    }
}

/// Input focus holder, tracked by panel handle.
#[derive(Debug, Default)]
pub struct FocusTracker {
    focused: Option<PanelHandle>,
}

impl FocusTracker {
    /// Move focus to a panel.
    pub fn request(&mut self, handle: PanelHandle) {
        self.focused = Some(handle);
    }

    /// Drop focus if this panel holds it.
    pub fn clear(&mut self, handle: PanelHandle) {
        if self.focused == Some(handle) {
            self.focused = None;
        }
    }

    /// The focused panel, if any.
    pub fn focused(&self) -> Option<PanelHandle> {
        self.focused
    }
}

/// The services a window operation runs against.
///
/// Both trait objects are owned by the embedder, constructed once at
/// process start, and borrowed per call.
pub struct WindowContext<'a> {
    pub sessions: &'a mut dyn SessionMultiplexer,
    pub compositor: &'a mut dyn CompositorSink,
    pub focus: &'a mut FocusTracker,
    pub handles: &'a mut HandleAllocator,
}

/// Registry-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The window-count cap was reached.
    WindowLimit {
        /// The configured maximum.
        max_windows: usize,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowLimit { max_windows } => {
                write!(f, "window limit of {max_windows} reached")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Default window-count cap.
pub const DEFAULT_MAX_WINDOWS: usize = 3;

/// Arena of windows, indexed by window id and panel handle.
pub struct Windows {
    windows: FxHashMap<WindowId, Window>,
    handles: HandleAllocator,
    focus: FocusTracker,
    settings: WindowSettings,
    next_window_id: u32,
    max_windows: usize,
}

impl fmt::Debug for Windows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Windows")
            .field("count", &self.windows.len())
            .field("focused", &self.focus.focused())
            .field("max_windows", &self.max_windows)
            .finish()
    }
}

impl Windows {
    /// Create an empty registry with the given construction settings.
    pub fn new(settings: WindowSettings) -> Self {
        Self {
            windows: FxHashMap::default(),
            handles: HandleAllocator::new(),
            focus: FocusTracker::default(),
            settings,
            next_window_id: 1,
            max_windows: DEFAULT_MAX_WINDOWS,
        }
    }

    /// Override the window-count cap.
    pub fn set_max_windows(&mut self, max_windows: usize) {
        self.max_windows = max_windows.max(1);
    }

    /// Number of live windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether the registry holds no windows.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The focused panel, if any.
    pub fn focused(&self) -> Option<PanelHandle> {
        self.focus.focused()
    }

    /// Request focus for a panel handle.
    pub fn request_focus(&mut self, handle: PanelHandle) {
        self.focus.request(handle);
    }

    /// A window by id.
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    /// A window by id, mutably.
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    /// Find the window owning a panel handle (window panel or top bar).
    pub fn window_by_handle(&self, handle: PanelHandle) -> Option<&Window> {
        self.windows
            .values()
            .find(|w| w.handle() == handle || w.top_bar().handle() == handle)
    }

    /// Open a new window, showing it with focus.
    ///
    /// At the cap, the front-most window gets the limit dialog instead
    /// and an error is returned.
    pub fn open_window(
        &mut self,
        sessions: &mut dyn SessionMultiplexer,
        compositor: &mut dyn CompositorSink,
        private_mode: bool,
    ) -> Result<WindowId, RegistryError> {
        if self.windows.len() >= self.max_windows {
            let max_windows = self.max_windows;
            let front = self.windows.keys().min().copied();
            if let Some(window) = front.and_then(|id| self.windows.get_mut(&id)) {
                let mut ctx = WindowContext {
                    sessions,
                    compositor,
                    focus: &mut self.focus,
                    handles: &mut self.handles,
                };
                window.show_max_windows_dialog(&mut ctx, max_windows);
            }
            return Err(RegistryError::WindowLimit { max_windows });
        }
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        let mut ctx = WindowContext {
            sessions,
            compositor,
            focus: &mut self.focus,
            handles: &mut self.handles,
        };
        let mut window = Window::new(id, &mut ctx, &self.settings, private_mode);
        window.show(&mut ctx, ShowFocus::Request);
        self.windows.insert(id, window);
        Ok(id)
    }

    /// Close and remove a window.
    pub fn close_window(
        &mut self,
        sessions: &mut dyn SessionMultiplexer,
        compositor: &mut dyn CompositorSink,
        id: WindowId,
    ) {
        let Some(mut window) = self.windows.remove(&id) else {
            tracing::debug!(%id, "close of unknown window ignored");
            return;
        };
        let mut ctx = WindowContext {
            sessions,
            compositor,
            focus: &mut self.focus,
            handles: &mut self.handles,
        };
        window.close(&mut ctx);
    }

    /// Run an operation on one window with a full service context.
    pub fn with_window<R>(
        &mut self,
        sessions: &mut dyn SessionMultiplexer,
        compositor: &mut dyn CompositorSink,
        id: WindowId,
        op: impl FnOnce(&mut Window, &mut WindowContext<'_>) -> R,
    ) -> Option<R> {
        let window = self.windows.get_mut(&id)?;
        let mut ctx = WindowContext {
            sessions,
            compositor,
            focus: &mut self.focus,
            handles: &mut self.handles,
        };
        Some(op(window, &mut ctx))
    }

    /// Drain engine events and dispatch them on the owner thread.
    ///
    /// Each event reaches its window only if the window registered the
    /// matching concern. Events for unknown windows are logged no-ops.
    pub fn pump_session_events(
        &mut self,
        sessions: &mut dyn SessionMultiplexer,
        compositor: &mut dyn CompositorSink,
    ) {
        for event in sessions.drain_events() {
            let id = match &event {
                SessionEvent::CurrentSessionChanged { window, .. }
                | SessionEvent::Prompt { window, .. }
                | SessionEvent::ContextMenu { window, .. }
                | SessionEvent::FirstComposite { window }
                | SessionEvent::LocationChanged { window, .. }
                | SessionEvent::VideoAvailabilityChanged { window, .. }
                | SessionEvent::ConnectivityChanged { window, .. } => *window,
            };
            let Some(window) = self.windows.get_mut(&id) else {
                tracing::debug!(%id, ?event, "event for unknown window dropped");
                continue;
            };
            let interests = window.interests();
            let mut ctx = WindowContext {
                sessions: &mut *sessions,
                compositor: &mut *compositor,
                focus: &mut self.focus,
                handles: &mut self.handles,
            };
            match event {
                SessionEvent::CurrentSessionChanged { session, .. } => {
                    if interests.contains(SinkInterest::SESSION_CHANGE) {
                        window.on_current_session_changed(&mut ctx, session);
                    }
                }
                SessionEvent::Prompt {
                    prompt, request, ..
                } => {
                    if interests.contains(SinkInterest::PROMPTS) {
                        window.on_prompt(&mut ctx, prompt, request);
                    }
                }
                SessionEvent::ContextMenu { link_uri, .. } => {
                    if interests.contains(SinkInterest::CONTENT) {
                        window.on_context_menu(&mut ctx, link_uri);
                    }
                }
                SessionEvent::FirstComposite { .. } => {
                    if interests.contains(SinkInterest::CONTENT) {
                        window.on_first_composite();
                    }
                }
                SessionEvent::LocationChanged { uri, .. } => {
                    if interests.contains(SinkInterest::NAVIGATION) {
                        window.on_location_changed(&mut ctx, &uri);
                    }
                }
                SessionEvent::VideoAvailabilityChanged { available, .. } => {
                    if interests.contains(SinkInterest::MEDIA) {
                        window.on_video_availability_changed(&mut ctx, available);
                    }
                }
                SessionEvent::ConnectivityChanged { online, .. } => {
                    if interests.contains(SinkInterest::CONTENT) {
                        window.on_connectivity_changed(&mut ctx, online);
                    }
                }
            }
        }
    }

    /// Per-frame {handle, placement, texture} tuples for every visible
    /// panel: windows, their top bars, and live overlays.
    pub fn visible_snapshots(&self) -> Vec<WidgetSnapshot> {
        let mut out = Vec::new();
        let mut ids: Vec<WindowId> = self.windows.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let window = &self.windows[&id];
            if window.placement().visible {
                out.push(window.snapshot());
            }
            if window.top_bar().placement().visible {
                out.push(window.top_bar().snapshot());
            }
            for overlay in window.overlays().filter(|overlay| overlay.is_visible()) {
                out.push(overlay.snapshot());
            }
        }
        out
    }
}
