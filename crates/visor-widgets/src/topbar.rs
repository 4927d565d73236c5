#![forbid(unsafe_code)]

//! The window top bar.
//!
//! A chrome sub-panel docked above its window: close and move-left /
//! move-right controls. Button widgets themselves are opaque content;
//! what matters here is placement, private-mode restyling, and action
//! fan-out to registered observers.

use visor_core::handle::PanelHandle;
use visor_placement::{Placement, SizeReference};

use crate::compositor::WidgetSnapshot;
use crate::panel::PanelCore;

const TOP_BAR_WIDTH: f32 = 340.0;
const TOP_BAR_HEIGHT: f32 = 40.0;
/// Vertical gap between the bar and the window's top edge, world units.
const TOP_BAR_WINDOW_MARGIN: f32 = 0.02;

/// Actions emitted by the top bar's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarAction {
    CloseWindow,
    MoveWindowLeft,
    MoveWindowRight,
}

/// Observer callback for top-bar actions.
pub type TopBarObserver = Box<dyn FnMut(TopBarAction)>;

/// The bar itself.
pub struct TopBar {
    core: PanelCore,
    private_mode: bool,
    attached_to: Option<PanelHandle>,
    observers: Vec<TopBarObserver>,
}

impl std::fmt::Debug for TopBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopBar")
            .field("core", &self.core)
            .field("private_mode", &self.private_mode)
            .field("attached_to", &self.attached_to)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TopBar {
    /// Create a detached top bar.
    pub fn new(handle: PanelHandle, reference: &SizeReference) -> Self {
        let mut placement = Placement::new(TOP_BAR_WIDTH, TOP_BAR_HEIGHT, reference);
        // Docked above the parent: bar bottom-center on window top-center.
        placement.anchor_x = 0.5;
        placement.anchor_y = 1.0;
        placement.parent_anchor_x = 0.5;
        placement.parent_anchor_y = 0.0;
        placement.translation.y = -TOP_BAR_WINDOW_MARGIN;
        placement.opaque = false;
        Self {
            core: PanelCore::new(handle, placement),
            private_mode: false,
            attached_to: None,
            observers: Vec::new(),
        }
    }

    /// The bar's handle.
    pub fn handle(&self) -> PanelHandle {
        self.core.handle()
    }

    /// The bar's placement.
    pub fn placement(&self) -> &Placement {
        self.core.placement()
    }

    /// The window this bar is attached to, if any.
    pub fn attached_to(&self) -> Option<PanelHandle> {
        self.attached_to
    }

    /// Whether the bar is restyled for private browsing.
    pub fn private_mode(&self) -> bool {
        self.private_mode
    }

    /// Attach to a window by handle, adopting its private mode.
    pub fn attach_to_window(&mut self, window: PanelHandle, private_mode: bool) {
        if self.attached_to == Some(window) {
            return;
        }
        self.core.placement_mut().parent = Some(window);
        self.attached_to = Some(window);
        self.set_private_mode(private_mode);
    }

    /// Detach from the current window.
    pub fn detach_from_window(&mut self) {
        self.attached_to = None;
        self.core.placement_mut().parent = None;
    }

    /// Restyle the buttons for private browsing.
    pub fn set_private_mode(&mut self, private_mode: bool) {
        self.private_mode = private_mode;
    }

    /// Show or hide the bar.
    pub fn set_visible(&mut self, visible: bool) {
        self.core.placement_mut().visible = visible;
    }

    /// Register an action observer.
    pub fn add_observer(&mut self, observer: TopBarObserver) {
        self.observers.push(observer);
    }

    /// Report a button press to every observer.
    pub fn press(&mut self, action: TopBarAction) {
        for observer in &mut self.observers {
            observer(action);
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

    /// Release the bar's surface binding.
    pub fn release(&mut self) {
        self.core.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bar() -> TopBar {
        TopBar::new(PanelHandle::new(2).unwrap(), &SizeReference::default())
    }

    #[test]
    fn attach_adopts_parent_and_private_mode() {
        let mut bar = bar();
        let window = PanelHandle::new(1).unwrap();
        bar.attach_to_window(window, true);
        assert_eq!(bar.attached_to(), Some(window));
        assert_eq!(bar.placement().parent, Some(window));
        assert!(bar.private_mode());
        bar.detach_from_window();
        assert_eq!(bar.attached_to(), None);
        assert_eq!(bar.placement().parent, None);
    }

    #[test]
    fn reattaching_the_same_window_is_a_no_op() {
        let mut bar = bar();
        let window = PanelHandle::new(1).unwrap();
        bar.attach_to_window(window, true);
        // A second attach must not clobber externally updated styling.
        bar.set_private_mode(false);
        bar.attach_to_window(window, true);
        assert!(!bar.private_mode());
    }

    #[test]
    fn press_notifies_every_observer() {
        let mut bar = bar();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let seen = Rc::clone(&seen);
            bar.add_observer(Box::new(move |action| seen.borrow_mut().push(action)));
        }
        bar.press(TopBarAction::MoveWindowLeft);
        assert_eq!(
            *seen.borrow(),
            vec![TopBarAction::MoveWindowLeft, TopBarAction::MoveWindowLeft]
        );
    }

    #[test]
    fn docked_above_the_window() {
        let bar = bar();
        let p = bar.placement();
        assert_eq!((p.anchor_x, p.anchor_y), (0.5, 1.0));
        assert_eq!((p.parent_anchor_x, p.parent_anchor_y), (0.5, 0.0));
        assert!(!p.opaque);
    }
}
