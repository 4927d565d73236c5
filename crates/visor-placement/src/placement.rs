#![forbid(unsafe_code)]

//! The [`Placement`] record and its resolution math.

use serde::{Deserialize, Serialize};

use visor_core::geometry::{PixelSize, Vec3, WorldRect};
use visor_core::handle::PanelHandle;

use crate::scale::{SizeReference, clamp_aspect, clamp_extent};

/// Axis-angle rotation applied to a resolved panel quad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation axis in world space.
    pub axis: Vec3,
    /// Rotation angle in radians.
    pub angle: f32,
}

impl Rotation {
    /// No rotation, around the world Y axis.
    pub const IDENTITY: Rotation = Rotation {
        axis: Vec3::new(0.0, 1.0, 0.0),
        angle: 0.0,
    };
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Where a panel sits in 3D space, relative to a parent panel.
///
/// Surface size (`width`/`height`) is in device-independent pixels; world
/// size is in scene units. The world width is *derived* from the pixel
/// width through a [`SizeReference`] ratio — mutate both together through
/// [`set_surface_size`](Self::set_surface_size) or
/// [`set_world_width`](Self::set_world_width), never one alone. World
/// height always derives from the pixel aspect and is not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Surface width in device-independent pixels.
    pub width: f32,
    /// Surface height in device-independent pixels.
    pub height: f32,
    /// World width in scene units. Keep consistent with `width`.
    pub world_width: f32,
    /// Anchor within self, x ∈ [0, 1].
    pub anchor_x: f32,
    /// Anchor within self, y ∈ [0, 1].
    pub anchor_y: f32,
    /// Anchor within the parent rect, x ∈ [0, 1].
    pub parent_anchor_x: f32,
    /// Anchor within the parent rect, y ∈ [0, 1].
    pub parent_anchor_y: f32,
    /// World-space offset from the resolved anchor position.
    pub translation: Vec3,
    /// Axis-angle rotation of the panel quad.
    pub rotation: Rotation,
    /// Curvature radius of this panel's own surface; 0 renders flat.
    pub curvature_radius: f32,
    /// Per-panel curvature override. `Some(0.0)` forces flat rendering
    /// even under a cylindrical parent; `None` inherits.
    pub cylinder_map_radius: Option<f32>,
    /// Texture pixels per device-independent pixel.
    pub density: f32,
    /// Whether the compositor should draw this panel.
    pub visible: bool,
    /// Whether the panel's texture is fully opaque.
    pub opaque: bool,
    /// Set once the first frame has been composited.
    pub first_draw_done: bool,
    /// Parent panel, by handle. `None` for root panels.
    pub parent: Option<PanelHandle>,
}

impl Placement {
    /// Create a placement with the given surface size, deriving the world
    /// width from the reference ratio.
    pub fn new(width: f32, height: f32, reference: &SizeReference) -> Self {
        let width = clamp_extent(width);
        let height = clamp_extent(height);
        Self {
            width,
            height,
            world_width: reference.world_width_for_pixels(width),
            anchor_x: 0.5,
            anchor_y: 0.5,
            parent_anchor_x: 0.5,
            parent_anchor_y: 0.5,
            translation: Vec3::ZERO,
            rotation: Rotation::IDENTITY,
            curvature_radius: 0.0,
            cylinder_map_radius: None,
            density: 1.0,
            visible: false,
            opaque: true,
            first_draw_done: false,
            parent: None,
        }
    }

    /// Surface aspect ratio (width / height), clamped away from zero.
    #[inline]
    pub fn aspect(&self) -> f32 {
        clamp_aspect(self.width / clamp_extent(self.height))
    }

    /// World size in scene units; height derives from the pixel aspect.
    #[inline]
    pub fn world_size(&self) -> (f32, f32) {
        let width = clamp_extent(self.world_width);
        (width, width / self.aspect())
    }

    /// Backing texture size: surface pixels scaled by density, rounded up.
    pub fn texture_size(&self) -> PixelSize {
        let density = if self.density.is_finite() && self.density > 0.0 {
            self.density
        } else {
            1.0
        };
        PixelSize::new(
            (self.width * density).ceil().max(1.0) as u32,
            (self.height * density).ceil().max(1.0) as u32,
        )
    }

    /// Set the surface pixel size and re-derive the world width.
    pub fn set_surface_size(&mut self, width: f32, height: f32, reference: &SizeReference) {
        self.width = clamp_extent(width);
        self.height = clamp_extent(height);
        self.world_width = reference.world_width_for_pixels(self.width);
    }

    /// Set the world width and re-derive the surface pixel size at the
    /// current aspect.
    pub fn set_world_width(&mut self, world_width: f32, reference: &SizeReference) {
        let aspect = self.aspect();
        self.world_width = clamp_extent(world_width);
        self.width = reference.pixels_for_world_width(self.world_width) as f32;
        self.height = clamp_extent((self.width / aspect).floor());
    }

    /// Resolve this placement against a parent's resolved rectangle.
    ///
    /// Pure: same inputs always produce the same output, and neither the
    /// placement nor the parent rect is mutated. The panel's top-left
    /// lands so that its own anchor point coincides with the parent's
    /// parent-anchor point, offset by the translation.
    pub fn world_rect(&self, parent: &WorldRect) -> WorldRect {
        let (world_w, world_h) = self.world_size();
        let at = parent.anchor_point(self.parent_anchor_x, self.parent_anchor_y);
        WorldRect::new(
            at.x - self.anchor_x * world_w + self.translation.x,
            at.y - self.anchor_y * world_h + self.translation.y,
            at.z + self.translation.z,
            world_w,
            world_h,
        )
    }

    /// Curvature radius this panel renders with, given the radius it
    /// would inherit from its owning window.
    ///
    /// The override wins outright: `Some(0.0)` pins a sub-panel flat under
    /// a curved window (projection menus rely on this).
    pub fn effective_cylinder_radius(&self, inherited: f32) -> f32 {
        if let Some(radius) = self.cylinder_map_radius {
            return radius.max(0.0);
        }
        if self.curvature_radius > 0.0 {
            self.curvature_radius
        } else {
            inherited.max(0.0)
        }
    }

    /// Arc angle (radians) subtended when wrapped on a cylinder of the
    /// given radius. Zero means flat rendering.
    pub fn cylinder_arc_angle(&self, radius: f32) -> f32 {
        if radius <= 0.0 {
            return 0.0;
        }
        let (world_w, _) = self.world_size();
        world_w / radius
    }
}
