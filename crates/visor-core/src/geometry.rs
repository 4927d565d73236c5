#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Two coordinate spaces coexist in Visor: *surface space* (device-
//! independent pixels on a panel's texture, origin at top-left) and
//! *world space* (3D scene units, origin at the scene anchor). Types here
//! are plain data; the placement math lives in `visor-placement`.

/// A 2D point in surface space (device-independent pixels).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale both coordinates by a uniform factor.
    #[inline]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// A 3D vector in world space.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Component-wise addition.
    #[inline]
    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

/// Integer pixel dimensions of a texture target.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelSize {
    /// Width in physical texture pixels.
    pub width: u32,
    /// Height in physical texture pixels.
    pub height: u32,
}

impl PixelSize {
    /// Create a new pixel size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check for a zero-area target.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Total pixel count.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A resolved rectangle in world space.
///
/// `x`/`y`/`z` locate the rectangle's top-left corner; `width`/`height`
/// are scene-unit extents. Produced by the placement resolver and consumed
/// by the 3D compositor each frame.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldRect {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Width in scene units.
    pub width: f32,
    /// Height in scene units.
    pub height: f32,
}

impl WorldRect {
    /// Create a new world rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            z,
            width,
            height,
        }
    }

    /// Create a rectangle at the world origin with the given extents.
    #[inline]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, width, height)
    }

    /// Area in square scene units.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// The point at the given normalized anchor within the rectangle.
    ///
    /// `(0, 0)` is the top-left corner, `(1, 1)` the bottom-right.
    #[inline]
    pub fn anchor_point(&self, anchor_x: f32, anchor_y: f32) -> Vec3 {
        Vec3::new(
            self.x + self.width * anchor_x,
            self.y + self.height * anchor_y,
            self.z,
        )
    }
}
