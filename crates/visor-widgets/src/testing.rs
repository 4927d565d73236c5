#![forbid(unsafe_code)]

//! In-memory doubles for the external collaborators.
//!
//! [`StubMultiplexer`] records every session/display/text-input
//! transition so protocol tests can assert ordering and ownership;
//! [`RecordingCompositor`] counts widget-update notifications. Both are
//! plain single-threaded state machines, matching the owner-thread
//! discipline of the real collaborators' adapters.

use rustc_hash::FxHashMap;

use visor_core::event::{HoverEvent, PointerEvent};
use visor_core::handle::PanelHandle;

use visor_render::surface::TextureHandle;

use crate::compositor::{CompositorSink, PerformanceHint, WidgetSnapshot};
use crate::session::{
    DisplayId, PromptId, PromptResponse, SessionError, SessionEvent, SessionId,
    SessionMultiplexer, Viewport, WindowId,
};

/// Recorded state of one stub session.
#[derive(Debug, Default)]
pub struct SessionRecord {
    pub window: Option<WindowId>,
    pub private_mode: bool,
    pub active: bool,
    pub displays: Vec<DisplayId>,
    pub text_input: Option<PanelHandle>,
    pub loaded: Vec<String>,
    pub back_entries: usize,
    pub pointer_events: usize,
    pub hover_events: usize,
}

/// Recorded state of one acquired display.
#[derive(Debug)]
pub struct DisplayRecord {
    pub session: SessionId,
    pub attached: Option<Viewport>,
    pub surface_changes: usize,
    pub destroys: usize,
}

/// In-memory session multiplexer.
#[derive(Debug, Default)]
pub struct StubMultiplexer {
    next_session: u64,
    next_display: u64,
    sessions: FxHashMap<SessionId, SessionRecord>,
    displays: FxHashMap<DisplayId, DisplayRecord>,
    current: FxHashMap<WindowId, SessionId>,
    queued: Vec<SessionEvent>,
    completed: Vec<(PromptId, PromptResponse)>,
    /// When set, input forwarding fails; exercises error containment.
    pub fail_input: bool,
}

impl StubMultiplexer {
    /// Create an empty stub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an extra session for a window without promoting it.
    pub fn add_session(&mut self, window: WindowId, private_mode: bool) -> SessionId {
        self.next_session += 1;
        let id = SessionId(self.next_session);
        self.sessions.insert(
            id,
            SessionRecord {
                window: Some(window),
                private_mode,
                ..SessionRecord::default()
            },
        );
        id
    }

    /// Promote a session to current and queue the change event.
    pub fn promote(&mut self, window: WindowId, session: SessionId) {
        self.current.insert(window, session);
        self.queued
            .push(SessionEvent::CurrentSessionChanged { window, session });
    }

    /// Queue an arbitrary engine event.
    pub fn push_event(&mut self, event: SessionEvent) {
        self.queued.push(event);
    }

    /// A session's recorded state.
    pub fn session(&self, id: SessionId) -> Option<&SessionRecord> {
        self.sessions.get(&id)
    }

    /// Mutable access to a session's recorded state.
    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut SessionRecord> {
        self.sessions.get_mut(&id)
    }

    /// Number of displays a session currently has acquired.
    pub fn display_count(&self, session: SessionId) -> usize {
        self.sessions
            .get(&session)
            .map_or(0, |record| record.displays.len())
    }

    /// A display's recorded state.
    pub fn display(&self, id: DisplayId) -> Option<&DisplayRecord> {
        self.displays.get(&id)
    }

    /// Prompt resolutions reported back so far.
    pub fn completed_prompts(&self) -> &[(PromptId, PromptResponse)] {
        &self.completed
    }
}

impl SessionMultiplexer for StubMultiplexer {
    fn create_session(&mut self, window: WindowId, private_mode: bool) -> SessionId {
        let id = self.add_session(window, private_mode);
        self.current.insert(window, id);
        id
    }

    fn current_session(&mut self, window: WindowId) -> Option<SessionId> {
        self.current.get(&window).copied()
    }

    fn destroy_sessions(&mut self, window: WindowId) {
        self.sessions
            .retain(|_, record| record.window != Some(window));
        self.current.remove(&window);
    }

    fn acquire_display(&mut self, session: SessionId) -> Result<DisplayId, SessionError> {
        let record = self
            .sessions
            .get_mut(&session)
            .ok_or(SessionError::UnknownSession(session))?;
        self.next_display += 1;
        let id = DisplayId(self.next_display);
        record.displays.push(id);
        self.displays.insert(
            id,
            DisplayRecord {
                session,
                attached: None,
                surface_changes: 0,
                destroys: 0,
            },
        );
        Ok(id)
    }

    fn release_display(
        &mut self,
        session: SessionId,
        display: DisplayId,
    ) -> Result<(), SessionError> {
        let record = self
            .sessions
            .get_mut(&session)
            .ok_or(SessionError::UnknownSession(session))?;
        let Some(index) = record.displays.iter().position(|d| *d == display) else {
            return Err(SessionError::UnknownDisplay(display));
        };
        record.displays.remove(index);
        self.displays.remove(&display);
        Ok(())
    }

    fn surface_changed(
        &mut self,
        display: DisplayId,
        _surface: &TextureHandle,
        viewport: Viewport,
    ) -> Result<(), SessionError> {
        let record = self
            .displays
            .get_mut(&display)
            .ok_or(SessionError::UnknownDisplay(display))?;
        record.attached = Some(viewport);
        record.surface_changes += 1;
        Ok(())
    }

    fn surface_destroyed(&mut self, display: DisplayId) {
        if let Some(record) = self.displays.get_mut(&display) {
            record.attached = None;
            record.destroys += 1;
        }
    }

    fn bind_text_input(&mut self, session: SessionId, target: Option<PanelHandle>) {
        if let Some(record) = self.sessions.get_mut(&session) {
            record.text_input = target;
        }
    }

    fn set_active(&mut self, session: SessionId, active: bool) {
        if let Some(record) = self.sessions.get_mut(&session) {
            record.active = active;
        }
    }

    fn is_private(&self, session: SessionId) -> bool {
        self.sessions
            .get(&session)
            .is_some_and(|record| record.private_mode)
    }

    fn can_go_back(&self, session: SessionId) -> bool {
        self.sessions
            .get(&session)
            .is_some_and(|record| record.back_entries > 0)
    }

    fn go_back(&mut self, session: SessionId) {
        if let Some(record) = self.sessions.get_mut(&session) {
            record.back_entries = record.back_entries.saturating_sub(1);
        }
    }

    fn load_uri(&mut self, session: SessionId, uri: &str) {
        if let Some(record) = self.sessions.get_mut(&session) {
            record.loaded.push(uri.to_owned());
        }
    }

    fn forward_pointer(
        &mut self,
        session: SessionId,
        _event: &PointerEvent,
    ) -> Result<(), SessionError> {
        if self.fail_input {
            return Err(SessionError::UnknownSession(session));
        }
        let record = self
            .sessions
            .get_mut(&session)
            .ok_or(SessionError::UnknownSession(session))?;
        record.pointer_events += 1;
        Ok(())
    }

    fn forward_hover(
        &mut self,
        session: SessionId,
        _event: &HoverEvent,
    ) -> Result<(), SessionError> {
        if self.fail_input {
            return Err(SessionError::UnknownSession(session));
        }
        let record = self
            .sessions
            .get_mut(&session)
            .ok_or(SessionError::UnknownSession(session))?;
        record.hover_events += 1;
        Ok(())
    }

    fn complete_prompt(&mut self, prompt: PromptId, response: PromptResponse) {
        self.completed.push((prompt, response));
    }

    fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.queued)
    }
}

/// Compositor double that records notifications.
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    pub updates: Vec<WidgetSnapshot>,
    pub update_all_calls: usize,
    pub hints: Vec<PerformanceHint>,
}

impl RecordingCompositor {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of update notifications for one panel.
    pub fn updates_for(&self, handle: PanelHandle) -> usize {
        self.updates.iter().filter(|s| s.handle == handle).count()
    }

    /// The latest snapshot recorded for a panel.
    pub fn last_update_for(&self, handle: PanelHandle) -> Option<&WidgetSnapshot> {
        self.updates.iter().rev().find(|s| s.handle == handle)
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.updates.clear();
        self.update_all_calls = 0;
        self.hints.clear();
    }
}

impl CompositorSink for RecordingCompositor {
    fn update_widget(&mut self, snapshot: &WidgetSnapshot) {
        self.updates.push(snapshot.clone());
    }

    fn update_all_visible(&mut self) {
        self.update_all_calls += 1;
    }

    fn set_performance_hint(&mut self, hint: PerformanceHint) {
        self.hints.push(hint);
    }
}
