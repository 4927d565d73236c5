#![forbid(unsafe_code)]

//! The window panel: one content session, one texture, two consumers.
//!
//! A window owns exactly one *current* session at a time and multiplexes
//! its texture surface between that session's display and a local
//! overlay view (the bookmarks list). Exactly one of the two holds the
//! surface claim at any instant; the swap protocol releases one side
//! before attaching the other, in a fixed order.
//!
//! Everything here runs on the single owner thread. Engine callbacks
//! arrive pre-funneled as [`SessionEvent`](crate::session::SessionEvent)s
//! through the registry's pump.

use visor_core::event::{HoverPhase, PointerButtons, PointerPhase, RayHit};
use visor_core::geometry::{PixelSize, Point};
use visor_core::handle::PanelHandle;
use visor_placement::{Placement, SizeReference, clamp_aspect, clamp_extent, size_for_area_scale};
use visor_render::surface::{ClaimKind, SurfaceClaim, TextureHandle};

use rustc_hash::FxHashMap;

use crate::compositor::{PerformanceHint, WidgetSnapshot};
use crate::overlay::{OverlayContent, OverlayKind, OverlayPanel};
use crate::panel::{PanelCore, PanelError, ShowFocus};
use crate::registry::{SinkInterest, WindowContext};
use crate::session::{
    DisplayId, PromptId, PromptRequest, PromptResponse, SessionId, Viewport, WindowId,
};
use crate::settings::{PRIVATE_HOME_URI, WindowSettings};
use crate::topbar::TopBar;
use crate::view::BookmarksView;

/// Slot a window occupies in the external layout manager's arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPlacement {
    #[default]
    Front,
    Left,
    Right,
}

/// Which consumer holds the window's texture claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOwner {
    /// The current session's display.
    Session,
    /// The local overlay view's bridge.
    Overlay,
    /// No consumer (no texture yet, or mid-teardown).
    None,
}

/// Observer of the bookmarks overlay's visibility.
pub trait BookmarkObserver {
    fn on_bookmarks_shown(&mut self, window: WindowId);
    fn on_bookmarks_hidden(&mut self, window: WindowId);
}

/// Snapshot of pre-immersive geometry, restored on exit.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ImmersiveBackup {
    width: f32,
    height: f32,
}

/// A browsing window panel.
pub struct Window {
    id: WindowId,
    core: PanelCore,
    session: SessionId,
    display: Option<DisplayId>,
    display_claim: Option<SurfaceClaim>,
    bookmarks: BookmarksView,
    view_active: bool,
    private_mode: bool,
    border_width: u32,
    immersive: Option<ImmersiveBackup>,
    window_placement: WindowPlacement,
    max_scale: f32,
    settings: WindowSettings,
    reference: SizeReference,
    overlays: FxHashMap<OverlayKind, OverlayPanel>,
    last_pointer_down: Point,
    first_draw_callback: Option<Box<dyn FnOnce()>>,
    bookmark_observers: Vec<Box<dyn BookmarkObserver>>,
    top_bar: TopBar,
    interests: SinkInterest,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("core", &self.core)
            .field("session", &self.session)
            .field("display", &self.display)
            .field("view_active", &self.view_active)
            .field("private_mode", &self.private_mode)
            .field("border_width", &self.border_width)
            .field("window_placement", &self.window_placement)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Build a window, creating its initial session.
    pub fn new(
        id: WindowId,
        ctx: &mut WindowContext<'_>,
        settings: &WindowSettings,
        private_mode: bool,
    ) -> Self {
        let reference = settings.size_reference();
        let border = settings.border_width;
        let session = ctx.sessions.create_session(id, private_mode);

        let content_w = settings.window_width as f32;
        let content_h = settings.window_height as f32;
        let mut placement = Placement::new(
            content_w + (border * 2) as f32,
            content_h + (border * 2) as f32,
            &reference,
        );
        // World width tracks content, not the transparent border.
        placement.world_width = reference.world_width_for_pixels(content_w);
        placement.curvature_radius = settings.cylinder_radius;
        placement.visible = true;

        let handle = ctx.handles.allocate();
        let mut top_bar = TopBar::new(ctx.handles.allocate(), &reference);
        top_bar.attach_to_window(handle, private_mode);

        Self {
            id,
            core: PanelCore::new(handle, placement),
            session,
            display: None,
            display_claim: None,
            bookmarks: BookmarksView::new(content_w, content_h),
            view_active: false,
            private_mode,
            border_width: border,
            immersive: None,
            window_placement: WindowPlacement::Front,
            max_scale: settings.max_window_scale,
            settings: settings.clone(),
            reference,
            overlays: FxHashMap::default(),
            last_pointer_down: Point::default(),
            first_draw_callback: None,
            bookmark_observers: Vec::new(),
            top_bar,
            interests: SinkInterest::all(),
        }
    }

    // --- Accessors ---------------------------------------------------------

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn handle(&self) -> PanelHandle {
        self.core.handle()
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn display(&self) -> Option<DisplayId> {
        self.display
    }

    pub fn placement(&self) -> &Placement {
        self.core.placement()
    }

    pub fn placement_mut(&mut self) -> &mut Placement {
        self.core.placement_mut()
    }

    pub fn private_mode(&self) -> bool {
        self.private_mode
    }

    pub fn border_width(&self) -> u32 {
        self.border_width
    }

    pub fn is_local_view_visible(&self) -> bool {
        self.view_active
    }

    pub fn is_immersive(&self) -> bool {
        self.immersive.is_some()
    }

    pub fn window_placement(&self) -> WindowPlacement {
        self.window_placement
    }

    pub fn set_window_placement(&mut self, placement: WindowPlacement) {
        self.window_placement = placement;
    }

    pub fn max_window_scale(&self) -> f32 {
        self.max_scale
    }

    pub fn top_bar(&self) -> &TopBar {
        &self.top_bar
    }

    pub fn top_bar_mut(&mut self) -> &mut TopBar {
        &mut self.top_bar
    }

    /// Event concerns this window is registered for.
    pub fn interests(&self) -> SinkInterest {
        self.interests
    }

    /// A live overlay of the given kind, if one exists.
    pub fn overlay(&self, kind: OverlayKind) -> Option<&OverlayPanel> {
        self.overlays.get(&kind)
    }

    /// Every live overlay hosted by this window.
    pub fn overlays(&self) -> impl Iterator<Item = &OverlayPanel> {
        self.overlays.values()
    }

    /// Number of visible overlays of the given kind (0 or 1).
    pub fn visible_overlay_count(&self, kind: OverlayKind) -> usize {
        usize::from(self.overlays.get(&kind).is_some_and(OverlayPanel::is_visible))
    }

    /// The consumer currently holding the texture claim.
    pub fn surface_owner(&self) -> SurfaceOwner {
        match self
            .core
            .texture()
            .and_then(TextureHandle::surface)
            .and_then(|surface| surface.claimant())
        {
            Some(ClaimKind::SessionDisplay) => SurfaceOwner::Session,
            Some(ClaimKind::UiBridge) => SurfaceOwner::Overlay,
            None => SurfaceOwner::None,
        }
    }

    /// The {handle, placement, texture} tuple for the compositor.
    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            handle: self.core.handle(),
            placement: self.core.placement().clone(),
            texture: self.core.texture().cloned(),
        }
    }

    /// Register a bookmarks-visibility observer.
    pub fn add_bookmark_observer(&mut self, observer: Box<dyn BookmarkObserver>) {
        self.bookmark_observers.push(observer);
    }

    /// Run `callback` once the session composites its first frame.
    pub fn set_first_draw_callback(&mut self, callback: Box<dyn FnOnce()>) {
        self.first_draw_callback = Some(callback);
    }

    // --- Surface plumbing --------------------------------------------------

    /// Supply the externally allocated texture for this window.
    ///
    /// Routed by surface owner: with the overlay view active the panel
    /// bridge claims the texture; otherwise the current session's display
    /// is attached to it.
    pub fn set_surface(
        &mut self,
        ctx: &mut WindowContext<'_>,
        handle: TextureHandle,
        size: PixelSize,
    ) -> Result<(), PanelError> {
        if self.view_active {
            self.core.set_surface(handle, size)?;
        } else {
            self.core.adopt_surface(handle, size)?;
            self.attach_session_display(ctx);
        }
        Ok(())
    }

    /// Resize the already-bound surface, pushing dimensions to whichever
    /// consumer owns it.
    pub fn resize_surface(&mut self, ctx: &mut WindowContext<'_>, size: PixelSize) {
        self.core.resize_surface(size);
        if !self.view_active {
            self.push_surface_viewport(ctx);
        }
    }

    fn attach_session_display(&mut self, ctx: &mut WindowContext<'_>) {
        let Some(surface) = self.core.texture().and_then(TextureHandle::surface) else {
            return;
        };
        if self.display.is_none() {
            match ctx.sessions.acquire_display(self.session) {
                Ok(display) => self.display = Some(display),
                Err(err) => {
                    tracing::warn!(window = %self.id, %err, "display acquisition failed");
                    return;
                }
            }
        } else {
            tracing::error!(window = %self.id, "display already acquired when surface arrived");
        }
        match surface.try_claim(ClaimKind::SessionDisplay) {
            Ok(claim) => self.display_claim = Some(claim),
            Err(busy) => {
                // Previous binding wins; the caller must release it first.
                tracing::warn!(window = %self.id, %busy, "surface claim rejected");
                return;
            }
        }
        self.push_surface_viewport(ctx);
    }

    fn push_surface_viewport(&mut self, ctx: &mut WindowContext<'_>) {
        let (Some(display), Some(texture)) = (self.display, self.core.texture()) else {
            return;
        };
        let size = self.core.surface_size();
        let viewport = Viewport::inset(size.width, size.height, self.border_width);
        if let Err(err) = ctx.sessions.surface_changed(display, texture, viewport) {
            tracing::debug!(window = %self.id, %err, "surface push to stale display ignored");
        }
    }

    /// Detach the session display from the surface, pausing its output.
    pub fn pause_compositor(&mut self, ctx: &mut WindowContext<'_>) {
        let Some(display) = self.display else {
            return;
        };
        ctx.sessions.surface_destroyed(display);
        self.display_claim = None;
    }

    /// Re-attach the session display to the surface and resume output.
    pub fn resume_compositor(&mut self, ctx: &mut WindowContext<'_>) {
        if self.display.is_none() || self.core.texture().is_none() {
            return;
        }
        let Some(surface) = self.core.texture().and_then(TextureHandle::surface) else {
            return;
        };
        match surface.try_claim(ClaimKind::SessionDisplay) {
            Ok(claim) => self.display_claim = Some(claim),
            Err(busy) => {
                tracing::warn!(window = %self.id, %busy, "resume blocked; surface still claimed");
                return;
            }
        }
        self.push_surface_viewport(ctx);
    }

    // --- Session ⇄ overlay multiplexing ------------------------------------

    /// Toggle the bookmarks view over the session content.
    ///
    /// Session → overlay pauses the display and hands the texture to the
    /// panel bridge; overlay → session releases the bridge and re-attaches
    /// the display to the same texture.
    pub fn toggle_local_view(&mut self, ctx: &mut WindowContext<'_>) {
        if !self.view_active {
            self.pause_compositor(ctx);
            self.view_active = true;
            if self.core.texture().is_some()
                && let Err(err) = self.core.bind_view_bridge()
            {
                tracing::warn!(window = %self.id, %err, "overlay bridge bind failed");
            }
            let content = self.content_size();
            self.bookmarks.set_logical_size(content.0, content.1);
            for observer in &mut self.bookmark_observers {
                observer.on_bookmarks_shown(self.id);
            }
        } else {
            self.core.release_view_bridge();
            self.view_active = false;
            self.resume_compositor(ctx);
            for observer in &mut self.bookmark_observers {
                observer.on_bookmarks_hidden(self.id);
            }
        }
        ctx.compositor.update_widget(&self.snapshot());
    }

    /// Repaint the local view if it owns the surface and is dirty.
    pub fn draw(&mut self) {
        if self.view_active {
            self.core.draw(&mut self.bookmarks);
        }
    }

    /// Handle the multiplexer promoting a different session to current.
    ///
    /// Detach is completed before attach, in this order: surface binding
    /// destroyed and display released, text input unbound, new display
    /// acquired, dimensions pushed, text input bound, private mode
    /// propagated to chrome.
    pub fn on_current_session_changed(
        &mut self,
        ctx: &mut WindowContext<'_>,
        new_session: SessionId,
    ) {
        if new_session == self.session {
            tracing::debug!(window = %self.id, "current session unchanged; nothing to do");
            return;
        }
        let old_session = self.session;
        if let Some(display) = self.display.take() {
            ctx.sessions.surface_destroyed(display);
            self.display_claim = None;
            if let Err(err) = ctx.sessions.release_display(old_session, display) {
                tracing::debug!(window = %self.id, %err, "stale display release ignored");
            }
        }
        ctx.sessions.bind_text_input(old_session, None);

        self.session = new_session;
        if !self.view_active && self.core.texture().is_some() {
            self.attach_session_display(ctx);
        }
        ctx.sessions
            .bind_text_input(new_session, Some(self.core.handle()));

        let private = ctx.sessions.is_private(new_session);
        self.set_private_mode(private);
    }

    fn set_private_mode(&mut self, private_mode: bool) {
        self.private_mode = private_mode;
        self.top_bar.set_private_mode(private_mode);
    }

    // --- Geometry ----------------------------------------------------------

    fn content_size(&self) -> (f32, f32) {
        let p = self.core.placement();
        let border = (self.border_width * 2) as f32;
        (
            clamp_extent(p.width - border),
            clamp_extent(p.height - border),
        )
    }

    /// Resize to a target world size.
    ///
    /// Pixel width comes from the reference ratio, height from the
    /// requested aspect; the border is added back on top. Consumer
    /// dimensions are pushed within this call — a deferred push would
    /// leave one frame of stretched content. Resizing to the current
    /// effective size fires no notifications.
    pub fn handle_resize(
        &mut self,
        ctx: &mut WindowContext<'_>,
        world_width: f32,
        world_height: f32,
    ) {
        let world_width = clamp_extent(world_width);
        let world_height = clamp_extent(world_height);
        let aspect = clamp_aspect(world_width / world_height);
        let content_w = self.reference.pixels_for_world_width(world_width);
        let content_h = ((content_w as f32 / aspect).round() as u32).max(1);
        let border = self.border_width * 2;
        let new_w = (content_w + border) as f32;
        let new_h = (content_h + border) as f32;

        let p = self.core.placement();
        if p.width == new_w && p.height == new_h && (p.world_width - world_width).abs() < 1e-4 {
            return;
        }

        {
            let p = self.core.placement_mut();
            p.width = new_w;
            p.height = new_h;
            p.world_width = world_width;
        }
        let texture_size = self.core.placement().texture_size();
        self.core.resize_surface(texture_size);
        if self.view_active {
            self.bookmarks.set_logical_size(content_w as f32, content_h as f32);
        } else {
            self.push_surface_viewport(ctx);
        }
        ctx.compositor.update_widget(&self.snapshot());
        ctx.compositor.update_all_visible();
    }

    /// Resize by a world-area multiplier at the given aspect.
    pub fn resize_by_multiplier(
        &mut self,
        ctx: &mut WindowContext<'_>,
        aspect: f32,
        multiplier: f32,
    ) {
        let (w, h) = self.size_for_scale(multiplier, aspect);
        self.handle_resize(ctx, w, h);
    }

    /// World size of this window at an area multiplier and aspect.
    pub fn size_for_scale(&self, scale: f32, aspect: f32) -> (f32, f32) {
        size_for_area_scale(scale, aspect, self.settings.reference_world_width)
    }

    /// Bound the window's area multiplier, shrinking it if it is already
    /// beyond the new maximum.
    pub fn set_max_window_scale(&mut self, ctx: &mut WindowContext<'_>, scale: f32) {
        if self.max_scale == scale {
            return;
        }
        self.max_scale = scale;
        let (max_world_w, _) = self.size_for_scale(scale, self.settings.aspect());
        let p = self.core.placement();
        if p.world_width <= max_world_w {
            return;
        }
        let current_aspect = clamp_aspect(p.width / p.height);
        let border = self.border_width * 2;
        let content_w = self.reference.pixels_for_world_width(max_world_w);
        let content_h = ((content_w as f32 / current_aspect).ceil() as u32).max(1);
        {
            let p = self.core.placement_mut();
            p.world_width = max_world_w;
            p.width = (content_w + border) as f32;
            p.height = (content_h + border) as f32;
        }
        ctx.compositor.update_widget(&self.snapshot());
    }

    // --- Immersive submode -------------------------------------------------

    /// Enter the immersive (fullscreen-video) submode.
    ///
    /// The current pixel size is snapshotted once per entry;
    /// `reset_border` collapses the transparent border for edge-to-edge
    /// video. Re-entering with the same dimensions is a no-op.
    pub fn enable_immersive(
        &mut self,
        ctx: &mut WindowContext<'_>,
        video_width: u32,
        video_height: u32,
        reset_border: bool,
    ) {
        if self.immersive.is_none() {
            let p = self.core.placement();
            self.immersive = Some(ImmersiveBackup {
                width: p.width,
                height: p.height,
            });
        }
        let border_changes = reset_border && self.border_width > 0;
        let target_w = (video_width + self.border_width * 2) as f32;
        let target_h = (video_height + self.border_width * 2) as f32;
        let p = self.core.placement();
        if p.width == target_w && p.height == target_h && !border_changes {
            return;
        }
        if reset_border {
            self.border_width = 0;
        }
        let border = self.border_width * 2;
        {
            let p = self.core.placement_mut();
            p.width = (video_width + border) as f32;
            p.height = (video_height + border) as f32;
        }
        ctx.compositor.update_widget(&self.snapshot());
    }

    /// Leave the immersive submode, restoring the backed-up geometry.
    ///
    /// Restores only when the current values actually differ from the
    /// backup; an unchanged window skips the redundant relayout.
    pub fn disable_immersive(&mut self, ctx: &mut WindowContext<'_>) {
        let Some(backup) = self.immersive.take() else {
            return;
        };
        let settings_border = self.settings.border_width;
        let p = self.core.placement();
        if backup.width == p.width
            && backup.height == p.height
            && settings_border == self.border_width
        {
            return;
        }
        self.border_width = settings_border;
        {
            let p = self.core.placement_mut();
            p.width = backup.width;
            p.height = backup.height;
        }
        ctx.compositor.update_widget(&self.snapshot());
    }

    // --- Visibility and focus ----------------------------------------------

    /// Show the window, optionally taking focus, and mark the session
    /// active.
    pub fn show(&mut self, ctx: &mut WindowContext<'_>, focus: ShowFocus) {
        if !self.core.placement().visible {
            self.core.placement_mut().visible = true;
        }
        ctx.compositor.update_widget(&self.snapshot());
        match focus {
            ShowFocus::Request => ctx.focus.request(self.core.handle()),
            ShowFocus::Keep => ctx.focus.clear(self.core.handle()),
        }
        ctx.sessions.set_active(self.session, true);
    }

    /// Hide the window and mark the session inactive.
    pub fn hide(&mut self, ctx: &mut WindowContext<'_>) {
        if self.core.placement().visible {
            self.core.placement_mut().visible = false;
        }
        ctx.compositor.update_widget(&self.snapshot());
        ctx.focus.clear(self.core.handle());
        ctx.sessions.set_active(self.session, false);
    }

    /// Set compositor visibility without touching session activity.
    pub fn set_visible(&mut self, ctx: &mut WindowContext<'_>, visible: bool) {
        if self.core.placement().visible == visible {
            return;
        }
        self.core.placement_mut().visible = visible;
        ctx.compositor.update_widget(&self.snapshot());
        if !visible {
            ctx.focus.clear(self.core.handle());
        }
    }

    // --- Navigation --------------------------------------------------------

    /// Load the home page appropriate to the window's privacy mode.
    pub fn load_home(&mut self, ctx: &mut WindowContext<'_>) {
        let uri = if self.private_mode {
            PRIVATE_HOME_URI
        } else {
            self.settings.homepage.as_str()
        };
        ctx.sessions.load_uri(self.session, uri);
    }

    /// Back-dismiss: close the bookmarks view if it is up, otherwise
    /// navigate the session back when possible.
    pub fn dismiss(&mut self, ctx: &mut WindowContext<'_>) {
        if self.view_active {
            self.toggle_local_view(ctx);
        } else if ctx.sessions.can_go_back(self.session) {
            ctx.sessions.go_back(self.session);
        }
    }

    // --- Input -------------------------------------------------------------

    /// Route a ray-cast pointer hit into the surface's current consumer.
    ///
    /// Never propagates consumer failures; a broken consumer is logged
    /// and contained so sibling panels keep receiving input.
    pub fn handle_pointer_event(
        &mut self,
        ctx: &mut WindowContext<'_>,
        hit: RayHit,
        phase: PointerPhase,
        buttons: PointerButtons,
    ) {
        let event = self.core.pointer_from_hit(hit, phase, buttons);
        if phase == PointerPhase::Down {
            self.last_pointer_down = event.position;
            ctx.focus.request(self.core.handle());
        }
        if self.view_active {
            self.core.deliver_pointer_to_view(&mut self.bookmarks, &event);
        } else if let Err(err) = ctx.sessions.forward_pointer(self.session, &event) {
            tracing::warn!(window = %self.id, %err, "pointer forward to session failed");
        }
    }

    /// Route a ray-cast hover hit into the surface's current consumer.
    pub fn handle_hover_event(
        &mut self,
        ctx: &mut WindowContext<'_>,
        hit: RayHit,
        phase: HoverPhase,
    ) {
        let event = self.core.hover_from_hit(hit, phase);
        if self.view_active {
            self.core.deliver_hover_to_view(&mut self.bookmarks, &event);
        } else if let Err(err) = ctx.sessions.forward_hover(self.session, &event) {
            tracing::warn!(window = %self.id, %err, "hover forward to session failed");
        }
    }

    // --- Session event handlers (dispatched by the registry pump) ----------

    /// The session composited its first frame.
    pub fn on_first_composite(&mut self) {
        self.core.placement_mut().first_draw_done = true;
        if let Some(callback) = self.first_draw_callback.take() {
            callback();
        }
    }

    /// The session navigated; a visible bookmarks view folds away.
    pub fn on_location_changed(&mut self, ctx: &mut WindowContext<'_>, _uri: &str) {
        if self.view_active {
            self.toggle_local_view(ctx);
        }
    }

    /// Video availability toggles the compositor performance level.
    pub fn on_video_availability_changed(&mut self, ctx: &mut WindowContext<'_>, available: bool) {
        ctx.compositor.set_performance_hint(if available {
            PerformanceHint::High
        } else {
            PerformanceHint::Normal
        });
    }

    /// Connectivity drives the offline toast.
    pub fn on_connectivity_changed(&mut self, ctx: &mut WindowContext<'_>, online: bool) {
        self.set_connectivity_toast_visible(ctx, !online);
    }

    /// A session prompt arrived; spawn its overlay.
    pub fn on_prompt(
        &mut self,
        ctx: &mut WindowContext<'_>,
        prompt: PromptId,
        request: PromptRequest,
    ) {
        self.spawn_overlay(
            ctx,
            OverlayContent::Prompt {
                id: prompt,
                request,
            },
            ShowFocus::Request,
        );
    }

    /// A context menu was requested at the last pointer-down position.
    pub fn on_context_menu(&mut self, ctx: &mut WindowContext<'_>, link_uri: Option<String>) {
        self.spawn_overlay(
            ctx,
            OverlayContent::ContextMenu {
                anchor: self.last_pointer_down,
                link_uri,
            },
            ShowFocus::Request,
        );
    }

    // --- Overlay management ------------------------------------------------

    /// Spawn an overlay, discarding any live overlay of the same kind.
    pub fn spawn_overlay(
        &mut self,
        ctx: &mut WindowContext<'_>,
        content: OverlayContent,
        focus: ShowFocus,
    ) {
        let kind = content.kind();
        if let Some(mut old) = self.overlays.remove(&kind) {
            // Last request wins.
            old.hide(ctx);
        }
        let mut overlay = OverlayPanel::new(
            ctx.handles.allocate(),
            self.core.handle(),
            self.content_size(),
            content,
            &self.reference,
        );
        overlay.show(ctx, focus);
        self.overlays.insert(kind, overlay);
    }

    /// Resolve and discard a prompt overlay, reporting the response.
    pub fn resolve_prompt(
        &mut self,
        ctx: &mut WindowContext<'_>,
        kind: OverlayKind,
        response: PromptResponse,
    ) {
        let Some(mut overlay) = self.overlays.remove(&kind) else {
            tracing::debug!(window = %self.id, ?kind, "no live overlay to resolve");
            return;
        };
        if let OverlayContent::Prompt { id, .. } = overlay.content() {
            ctx.sessions.complete_prompt(*id, response);
        }
        overlay.hide(ctx);
    }

    /// Discard an overlay without resolving it (navigation, timeout).
    pub fn discard_overlay(&mut self, ctx: &mut WindowContext<'_>, kind: OverlayKind) {
        if let Some(mut overlay) = self.overlays.remove(&kind) {
            overlay.hide(ctx);
        }
    }

    /// Show or hide the connectivity toast.
    pub fn set_connectivity_toast_visible(&mut self, ctx: &mut WindowContext<'_>, visible: bool) {
        let present = self
            .overlays
            .get(&OverlayKind::ConnectivityToast)
            .is_some_and(OverlayPanel::is_visible);
        if visible && !present {
            self.spawn_overlay(
                ctx,
                OverlayContent::Toast {
                    message: String::from("No internet connection"),
                },
                ShowFocus::Request,
            );
        } else if !visible && present {
            self.discard_overlay(ctx, OverlayKind::ConnectivityToast);
        }
    }

    /// Show the window-count limit dialog.
    pub fn show_max_windows_dialog(&mut self, ctx: &mut WindowContext<'_>, max_windows: usize) {
        self.spawn_overlay(
            ctx,
            OverlayContent::MaxWindows {
                message: format!("A maximum of {max_windows} windows is supported"),
            },
            ShowFocus::Request,
        );
    }

    // --- Teardown ----------------------------------------------------------

    /// Detach from the session and release every surface binding.
    ///
    /// Safe to call more than once.
    pub fn release(&mut self, ctx: &mut WindowContext<'_>) {
        let kinds: Vec<OverlayKind> = self.overlays.keys().copied().collect();
        for kind in kinds {
            self.discard_overlay(ctx, kind);
        }
        if let Some(display) = self.display.take() {
            ctx.sessions.surface_destroyed(display);
            self.display_claim = None;
            if let Err(err) = ctx.sessions.release_display(self.session, display) {
                tracing::debug!(window = %self.id, %err, "stale display release ignored");
            }
        }
        ctx.sessions.bind_text_input(self.session, None);
        ctx.focus.clear(self.core.handle());
        self.top_bar.release();
        self.core.release();
    }

    /// Release and destroy the window's sessions.
    pub fn close(&mut self, ctx: &mut WindowContext<'_>) {
        self.release(ctx);
        ctx.sessions.destroy_sessions(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FocusTracker;
    use crate::testing::{RecordingCompositor, StubMultiplexer};
    use visor_core::handle::HandleAllocator;

    struct Rig {
        mux: StubMultiplexer,
        scene: RecordingCompositor,
        focus: FocusTracker,
        handles: HandleAllocator,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                mux: StubMultiplexer::new(),
                scene: RecordingCompositor::new(),
                focus: FocusTracker::default(),
                handles: HandleAllocator::new(),
            }
        }

        fn ctx(&mut self) -> WindowContext<'_> {
            WindowContext {
                sessions: &mut self.mux,
                compositor: &mut self.scene,
                focus: &mut self.focus,
                handles: &mut self.handles,
            }
        }

        fn window(&mut self, settings: &WindowSettings) -> Window {
            let mut ctx = self.ctx();
            Window::new(WindowId(1), &mut ctx, settings, false)
        }
    }

    #[test]
    fn size_for_scale_matches_the_area_solver() {
        let mut rig = Rig::new();
        let settings = WindowSettings::default();
        let window = rig.window(&settings);
        let (w, h) = window.size_for_scale(2.0, 1.5);
        let expected = size_for_area_scale(2.0, 1.5, settings.reference_world_width);
        assert_eq!((w, h), expected);
    }

    #[test]
    fn lowering_the_max_scale_shrinks_an_oversized_window() {
        let mut rig = Rig::new();
        let settings = WindowSettings::default();
        let mut window = rig.window(&settings);
        let mut ctx = rig.ctx();
        window.resize_by_multiplier(&mut ctx, settings.aspect(), 3.0);
        let oversized = window.placement().world_width;

        window.set_max_window_scale(&mut ctx, 1.0);
        let (max_world_w, _) = window.size_for_scale(1.0, settings.aspect());
        assert!(window.placement().world_width <= oversized);
        assert!((window.placement().world_width - max_world_w).abs() < 1e-4);
        assert_eq!(window.max_window_scale(), 1.0);
    }

    #[test]
    fn raising_the_max_scale_leaves_geometry_alone() {
        let mut rig = Rig::new();
        let settings = WindowSettings::default();
        let mut window = rig.window(&settings);
        let before = window.placement().clone();
        let mut ctx = rig.ctx();
        window.set_max_window_scale(&mut ctx, 5.0);
        assert_eq!(window.placement(), &before);
    }

    #[test]
    fn window_placement_slot_round_trips() {
        let mut rig = Rig::new();
        let mut window = rig.window(&WindowSettings::default());
        assert_eq!(window.window_placement(), WindowPlacement::Front);
        window.set_window_placement(WindowPlacement::Left);
        assert_eq!(window.window_placement(), WindowPlacement::Left);
    }
}
