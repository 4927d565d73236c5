#![forbid(unsafe_code)]

//! Size solving and pixel/world conversion.
//!
//! Window resizing is expressed as an *area multiplier*: "make this window
//! twice as large" means twice the world-space area at a requested aspect
//! ratio, not twice the width. [`size_for_area_scale`] solves that system.
//! Pixel widths and world widths convert through a [`SizeReference`] ratio
//! fixed at construction time from settings.

/// Smallest accepted surface extent in device-independent pixels.
pub const MIN_SURFACE_DIP: f32 = 1.0;

/// Smallest accepted aspect ratio.
pub const MIN_ASPECT: f32 = 0.01;

/// Clamp a surface extent to the drawable minimum.
///
/// Degenerate input (zero, negative, NaN, infinite) clamps instead of
/// failing: layout must always produce a drawable rectangle.
#[inline]
pub fn clamp_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_SURFACE_DIP)
    } else {
        MIN_SURFACE_DIP
    }
}

/// Clamp an aspect ratio to the accepted minimum.
#[inline]
pub fn clamp_aspect(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_ASPECT)
    } else {
        MIN_ASPECT
    }
}

/// The fixed ratio between window surface pixels and world units.
///
/// A window of `default_window_width` pixels spans `reference_world_width`
/// scene units; all pixel/world conversions scale linearly from there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeReference {
    /// Default window width in device-independent pixels.
    pub default_window_width: u32,
    /// World width of a default-size window, in scene units.
    pub reference_world_width: f32,
}

impl SizeReference {
    /// Create a reference ratio.
    pub fn new(default_window_width: u32, reference_world_width: f32) -> Self {
        Self {
            default_window_width: default_window_width.max(1),
            reference_world_width: clamp_extent(reference_world_width),
        }
    }

    /// World width spanned by a window of `pixel_width` surface pixels.
    #[inline]
    pub fn world_width_for_pixels(&self, pixel_width: f32) -> f32 {
        self.reference_world_width * clamp_extent(pixel_width) / self.default_window_width as f32
    }

    /// Surface pixel width of a window spanning `world_width` scene units.
    #[inline]
    pub fn pixels_for_world_width(&self, world_width: f32) -> u32 {
        let px =
            (self.default_window_width as f32 * world_width / self.reference_world_width).floor();
        (px.max(MIN_SURFACE_DIP)) as u32
    }

    /// World area of a default-size window at the given aspect.
    #[inline]
    pub fn reference_area(&self, aspect: f32) -> f32 {
        let aspect = clamp_aspect(aspect);
        self.reference_world_width * (self.reference_world_width / aspect)
    }
}

impl Default for SizeReference {
    /// 800 px ↔ 4 scene units, the stock window ratio.
    fn default() -> Self {
        Self::new(800, 4.0)
    }
}

/// Solve `(width, height)` such that `width * height == reference_area * scale`
/// and `width / height == aspect`.
///
/// `reference_area` derives from `reference_world_width` at the given
/// aspect. Inputs are clamped to positive minimums first, so the result
/// is always a drawable size.
pub fn size_for_area_scale(scale: f32, aspect: f32, reference_world_width: f32) -> (f32, f32) {
    let aspect = clamp_aspect(aspect);
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    let reference_world_width = clamp_extent(reference_world_width);
    let area = reference_world_width * (reference_world_width / aspect) * scale;
    let width = (area * aspect).sqrt();
    let height = width / aspect;
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOLERANCE: f32 = 1e-3;

    #[test]
    fn unit_scale_returns_reference_size() {
        let (w, h) = size_for_area_scale(1.0, 2.0, 4.0);
        assert!((w - 4.0).abs() < TOLERANCE, "w = {w}");
        assert!((h - 2.0).abs() < TOLERANCE, "h = {h}");
    }

    #[test]
    fn doubling_area_scales_width_by_sqrt_two() {
        let (w1, _) = size_for_area_scale(1.0, 1.5, 4.0);
        let (w2, _) = size_for_area_scale(2.0, 1.5, 4.0);
        assert!((w2 / w1 - 2.0_f32.sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn degenerate_inputs_clamp_to_drawable() {
        let (w, h) = size_for_area_scale(f32::NAN, 0.0, -5.0);
        assert!(w > 0.0 && h > 0.0);
        assert!(w.is_finite() && h.is_finite());
    }

    #[test]
    fn reference_ratio_round_trips() {
        let reference = SizeReference::default();
        let world = reference.world_width_for_pixels(800.0);
        assert!((world - 4.0).abs() < TOLERANCE);
        assert_eq!(reference.pixels_for_world_width(4.0), 800);
        assert_eq!(reference.pixels_for_world_width(2.0), 400);
    }

    #[test]
    fn pixels_for_world_width_never_returns_zero() {
        let reference = SizeReference::default();
        assert!(reference.pixels_for_world_width(0.0) >= 1);
        assert!(reference.pixels_for_world_width(-3.0) >= 1);
    }

    proptest! {
        #[test]
        fn solved_size_preserves_aspect_and_area(
            scale in 0.01f32..16.0,
            aspect in 0.1f32..8.0,
            reference in 0.5f32..10.0,
        ) {
            let (w, h) = size_for_area_scale(scale, aspect, reference);
            let expected_area = reference * (reference / aspect) * scale;
            prop_assert!((w / h - aspect).abs() < aspect * 1e-3);
            prop_assert!((w * h - expected_area).abs() < expected_area * 1e-3);
        }
    }
}
