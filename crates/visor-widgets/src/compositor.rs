#![forbid(unsafe_code)]

//! The 3D scene/compositor boundary.
//!
//! The scene graph consumes one {handle, placement, texture} tuple per
//! panel, refreshed by [`CompositorSink::update_widget`] whenever
//! placement or visibility changes, plus a batch signal after cascading
//! geometry changes. The compositor also accepts a coarse performance
//! hint (raised while video plays).

use visor_core::handle::PanelHandle;
use visor_placement::Placement;
use visor_render::surface::TextureHandle;

/// The per-panel tuple the 3D compositor samples each frame.
#[derive(Debug, Clone)]
pub struct WidgetSnapshot {
    /// The panel's handle.
    pub handle: PanelHandle,
    /// The panel's placement at notification time.
    pub placement: Placement,
    /// The texture the compositor samples, if one is bound.
    pub texture: Option<TextureHandle>,
}

/// Coarse renderer performance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceHint {
    /// Normal interactive load.
    #[default]
    Normal,
    /// Sustained load (video playback).
    High,
}

/// Interface the widget layer drives the 3D compositor through.
pub trait CompositorSink {
    /// A single panel's placement or visibility changed.
    fn update_widget(&mut self, snapshot: &WidgetSnapshot);

    /// Re-evaluate every visible widget after a batch geometry change.
    fn update_all_visible(&mut self);

    /// Raise or lower the renderer performance level.
    fn set_performance_hint(&mut self, hint: PerformanceHint);
}
