#![forbid(unsafe_code)]

//! Panels, windows, and session multiplexing.
//!
//! # Role in Visor
//! `visor-widgets` is the stateful coordination layer: the
//! [`PanelCore`](panel::PanelCore) base abstraction, the
//! [`Window`](window::Window) that multiplexes one texture between a
//! content session and a local overlay view, the transient
//! [`OverlayPanel`](overlay::OverlayPanel)s, and the
//! [`Windows`](registry::Windows) arena that dispatches engine events
//! and feeds the 3D compositor.
//!
//! # Threading
//! Everything in this crate runs on a single owner thread. The two
//! cross-thread handoffs (frame publication, engine event delivery) are
//! handled in `visor-render` and at the
//! [`drain_events`](session::SessionMultiplexer::drain_events) funnel.

pub mod compositor;
pub mod overlay;
pub mod panel;
pub mod registry;
pub mod session;
pub mod settings;
pub mod topbar;
pub mod view;
pub mod window;

pub mod testing;

pub use compositor::{CompositorSink, PerformanceHint, WidgetSnapshot};
pub use overlay::{OverlayContent, OverlayKind, OverlayPanel};
pub use panel::{PanelCore, PanelError, PanelState, ShowFocus};
pub use registry::{
    DEFAULT_MAX_WINDOWS, FocusTracker, RegistryError, SinkInterest, WindowContext, Windows,
};
pub use session::{
    DisplayId, PromptId, PromptRequest, PromptResponse, SessionError, SessionEvent, SessionId,
    SessionMultiplexer, Viewport, WindowId,
};
pub use settings::{PRIVATE_HOME_URI, WindowSettings};
pub use topbar::{TopBar, TopBarAction};
pub use view::{BookmarksView, ViewError, ViewHost};
pub use window::{BookmarkObserver, SurfaceOwner, Window, WindowPlacement};
