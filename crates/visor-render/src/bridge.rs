#![forbid(unsafe_code)]

//! The render bridge: claims a texture surface and carries whole frames
//! into it.
//!
//! A bridge is bound to one texture handle at a time. Each frame is a
//! [`begin_frame`](RenderBridge::begin_frame) → paint →
//! [`finish`](FramePaint::finish) cycle; the [`FramePaint`] guard commits
//! on drop, so a paint path that returns early (or unwinds) still
//! publishes exactly once. Invalidation is whole-target: any dirt anywhere
//! schedules one full repaint on the next frame opportunity.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use visor_core::geometry::PixelSize;

use crate::pixels::PixelBuffer;
use crate::surface::{ClaimKind, SurfaceClaim, TextureHandle, TextureSurface};

/// Errors from bridge binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// The bridge is already bound to a live handle; `release()` first.
    AlreadyBound,
    /// Another consumer holds the surface claim.
    SurfaceBusy {
        /// The consumer currently holding the claim.
        held_by: ClaimKind,
    },
    /// The texture handle no longer upgrades to a live surface.
    SurfaceGone,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBound => write!(f, "bridge already bound; release it first"),
            Self::SurfaceBusy { held_by } => {
                write!(f, "surface already claimed by {held_by:?}")
            }
            Self::SurfaceGone => write!(f, "texture surface is gone"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Redirects a 2D view hierarchy's paint output into a texture surface.
#[derive(Debug, Default)]
pub struct RenderBridge {
    handle: Option<TextureHandle>,
    claim: Option<SurfaceClaim>,
    target: PixelSize,
    logical_width: f32,
    back: Option<PixelBuffer>,
    needs_paint: bool,
}

impl RenderBridge {
    /// Create an unbound bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a texture handle with the given target pixel size.
    ///
    /// Fails with [`BridgeError::AlreadyBound`] while bound to a live
    /// handle, and with [`BridgeError::SurfaceBusy`] when another
    /// consumer holds the surface. The logical source width starts equal
    /// to the target width (scale factor 1).
    pub fn bind(&mut self, handle: TextureHandle, target: PixelSize) -> Result<(), BridgeError> {
        if self.claim.is_some() && self.handle.as_ref().is_some_and(TextureHandle::is_live) {
            return Err(BridgeError::AlreadyBound);
        }
        let surface = handle.surface().ok_or(BridgeError::SurfaceGone)?;
        let claim = surface
            .try_claim(ClaimKind::UiBridge)
            .map_err(|busy| BridgeError::SurfaceBusy {
                held_by: busy.held_by,
            })?;
        surface.set_default_size(target);
        self.handle = Some(handle);
        self.claim = Some(claim);
        self.target = target;
        self.logical_width = target.width as f32;
        self.back = Some(PixelBuffer::new(target.width, target.height));
        self.needs_paint = true;
        Ok(())
    }

    /// Whether the bridge currently holds a surface claim.
    pub fn is_bound(&self) -> bool {
        self.claim.is_some()
    }

    /// The handle this bridge is bound to, if any.
    pub fn bound_handle(&self) -> Option<&TextureHandle> {
        self.handle.as_ref()
    }

    /// Current target size in texture pixels.
    pub fn target_size(&self) -> PixelSize {
        self.target
    }

    /// Declare the logical pixel width of the source view hierarchy.
    ///
    /// Content is uniformly scaled by `target_width / logical_width`, so
    /// the full hierarchy maps onto the texture without distortion.
    pub fn set_logical_width(&mut self, logical_width: f32) {
        if logical_width.is_finite() && logical_width > 0.0 {
            self.logical_width = logical_width;
        }
    }

    /// The uniform scale factor applied to source coordinates.
    pub fn scale_factor(&self) -> f32 {
        if self.logical_width > 0.0 {
            self.target.width as f32 / self.logical_width
        } else {
            1.0
        }
    }

    /// Retarget the bridge to new pixel dimensions.
    ///
    /// Pushes the size to the surface immediately and schedules a full
    /// repaint; the back buffer reallocates on the next frame.
    pub fn resize(&mut self, target: PixelSize) {
        if target == self.target {
            return;
        }
        let width_ratio = self.target.width as f32 / self.logical_width.max(1.0);
        self.target = target;
        self.logical_width = target.width as f32 / width_ratio.max(f32::MIN_POSITIVE);
        if let Some(surface) = self.handle.as_ref().and_then(TextureHandle::surface) {
            surface.set_default_size(target);
        }
        self.needs_paint = true;
    }

    /// Schedule one whole-target repaint.
    pub fn invalidate(&mut self) {
        self.needs_paint = true;
    }

    /// Consume the pending-repaint flag.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_paint)
    }

    /// Open a frame against the bound surface.
    ///
    /// Returns `None` when unbound or when the consumer side tore the
    /// surface down; the caller must skip painting in that case. The
    /// returned guard commits the frame exactly once, on drop or via
    /// [`FramePaint::finish`].
    pub fn begin_frame(&mut self) -> Option<FramePaint<'_>> {
        self.claim.as_ref()?;
        let surface = match self.handle.as_ref().and_then(TextureHandle::surface) {
            Some(surface) => surface,
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("begin_frame on a torn-down surface; skipping paint");
                return None;
            }
        };
        let mut buffer = self
            .back
            .take()
            .unwrap_or_else(|| PixelBuffer::new(self.target.width, self.target.height));
        buffer.reset(self.target.width, self.target.height);
        Some(FramePaint {
            bridge: self,
            surface,
            buffer: Some(buffer),
            committed: false,
        })
    }

    /// Detach from the texture handle. Idempotent; safe when never bound.
    pub fn release(&mut self) {
        if let Some(mut claim) = self.claim.take() {
            claim.release();
        }
        self.handle = None;
        self.back = None;
        self.needs_paint = false;
    }
}

/// An open frame: a drawable target that commits on drop.
///
/// Derefs to the back-buffer [`PixelBuffer`]. Paint code runs at source
/// logical coordinates scaled by [`scale_factor`](Self::scale_factor).
#[derive(Debug)]
pub struct FramePaint<'a> {
    bridge: &'a mut RenderBridge,
    surface: Arc<TextureSurface>,
    buffer: Option<PixelBuffer>,
    committed: bool,
}

impl FramePaint<'_> {
    /// The uniform source-to-target scale factor for this frame.
    pub fn scale_factor(&self) -> f32 {
        self.bridge.scale_factor()
    }

    /// Commit the frame to the surface now.
    pub fn finish(mut self) {
        self.commit();
    }

    fn commit(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;
        let buffer = self.buffer.take().expect("frame buffer held until commit");
        if let Some(recycled) = self.surface.publish(buffer) {
            self.bridge.back = Some(recycled);
        }
        self.bridge.needs_paint = false;
    }
}

impl Deref for FramePaint<'_> {
    type Target = PixelBuffer;

    fn deref(&self) -> &PixelBuffer {
        self.buffer.as_ref().expect("frame buffer held until commit")
    }
}

impl DerefMut for FramePaint<'_> {
    fn deref_mut(&mut self) -> &mut PixelBuffer {
        self.buffer.as_mut().expect("frame buffer held until commit")
    }
}

impl Drop for FramePaint<'_> {
    fn drop(&mut self) {
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::Argb;

    fn bound_bridge(surface: &Arc<TextureSurface>) -> RenderBridge {
        let mut bridge = RenderBridge::new();
        bridge
            .bind(surface.handle(), surface.size())
            .expect("fresh surface binds");
        bridge
    }

    #[test]
    fn rebinding_without_release_fails() {
        let surface = TextureSurface::new(32, 32);
        let other = TextureSurface::new(32, 32);
        let mut bridge = bound_bridge(&surface);
        assert_eq!(
            bridge.bind(other.handle(), other.size()),
            Err(BridgeError::AlreadyBound)
        );
        bridge.release();
        bridge.bind(other.handle(), other.size()).unwrap();
    }

    #[test]
    fn second_bridge_on_same_surface_is_rejected() {
        let surface = TextureSurface::new(32, 32);
        let _first = bound_bridge(&surface);
        let mut second = RenderBridge::new();
        assert_eq!(
            second.bind(surface.handle(), surface.size()),
            Err(BridgeError::SurfaceBusy {
                held_by: ClaimKind::UiBridge
            })
        );
    }

    #[test]
    fn dead_handle_unblocks_rebinding() {
        let surface = TextureSurface::new(16, 16);
        let mut bridge = bound_bridge(&surface);
        drop(surface);
        let replacement = TextureSurface::new(16, 16);
        bridge
            .bind(replacement.handle(), replacement.size())
            .expect("stale binding does not block a dead handle");
    }

    #[test]
    fn each_begin_finish_cycle_commits_exactly_once() {
        let surface = TextureSurface::new(8, 8);
        let mut bridge = bound_bridge(&surface);
        for _ in 0..5 {
            let frame = bridge.begin_frame().unwrap();
            frame.finish();
        }
        assert_eq!(surface.frames_committed(), 5);
        bridge.release();
        assert_eq!(surface.frames_committed(), 5);
    }

    #[test]
    fn dropping_the_guard_commits_on_early_exit_paths() {
        let surface = TextureSurface::new(8, 8);
        let mut bridge = bound_bridge(&surface);
        {
            let mut frame = bridge.begin_frame().unwrap();
            frame.set(0, 0, Argb::WHITE);
            // No explicit finish; the guard must still publish.
        }
        assert_eq!(surface.frames_committed(), 1);
        assert_eq!(surface.sample().unwrap().get(0, 0), Some(Argb::WHITE));
    }

    #[test]
    fn begin_frame_after_surface_teardown_returns_none() {
        let surface = TextureSurface::new(8, 8);
        let mut bridge = bound_bridge(&surface);
        drop(surface);
        assert!(bridge.begin_frame().is_none());
    }

    #[test]
    fn begin_frame_when_never_bound_returns_none() {
        let mut bridge = RenderBridge::new();
        assert!(bridge.begin_frame().is_none());
    }

    #[test]
    fn release_is_idempotent_and_frees_the_claim() {
        let surface = TextureSurface::new(8, 8);
        let mut bridge = bound_bridge(&surface);
        bridge.release();
        bridge.release();
        assert_eq!(surface.claimant(), None);
        surface.try_claim(ClaimKind::SessionDisplay).unwrap();
    }

    #[test]
    fn scale_factor_follows_width_ratio() {
        let surface = TextureSurface::new(1280, 720);
        let mut bridge = bound_bridge(&surface);
        assert_eq!(bridge.scale_factor(), 1.0);
        bridge.set_logical_width(640.0);
        assert_eq!(bridge.scale_factor(), 2.0);
        let frame = bridge.begin_frame().unwrap();
        assert_eq!(frame.scale_factor(), 2.0);
        frame.finish();
    }

    #[test]
    fn resize_pushes_dimensions_and_schedules_repaint() {
        let surface = TextureSurface::new(100, 50);
        let mut bridge = bound_bridge(&surface);
        let _ = bridge.take_repaint();
        bridge.resize(PixelSize::new(200, 100));
        assert_eq!(surface.size(), PixelSize::new(200, 100));
        assert!(bridge.take_repaint());
        let frame = bridge.begin_frame().unwrap();
        assert_eq!(frame.width(), 200);
        assert_eq!(frame.height(), 100);
    }

    #[test]
    fn resize_preserves_the_scale_ratio() {
        let surface = TextureSurface::new(1000, 500);
        let mut bridge = bound_bridge(&surface);
        bridge.set_logical_width(500.0); // 2x
        bridge.resize(PixelSize::new(2000, 1000));
        assert!((bridge.scale_factor() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn invalidation_coalesces_into_one_repaint() {
        let surface = TextureSurface::new(8, 8);
        let mut bridge = bound_bridge(&surface);
        let _ = bridge.take_repaint();
        bridge.invalidate();
        bridge.invalidate();
        bridge.invalidate();
        assert!(bridge.take_repaint());
        assert!(!bridge.take_repaint());
    }
}
