#![forbid(unsafe_code)]

//! Controller-driven panel moving.
//!
//! While a controller trigger holds a panel, ray-cast hit deltas become
//! placement updates. Movement is constrained to a comfortable band in
//! front of the viewer: X and Y clamp to fixed bounds, depth eases back
//! as the panel rises, and the panel tilts toward the viewer as it
//! drops below eye level.

use visor_core::geometry::Vec3;

use crate::placement::Placement;

const MAX_X: f32 = 3.0;
const MIN_X: f32 = -2.0;
const MAX_Y: f32 = 2.0;
const MIN_Y: f32 = -1.0;
/// Tilt reached at the bottom of the travel band, radians.
const MAX_ANGLE: f32 = -35.0 * std::f32::consts::PI / 180.0;
/// Height below which the panel starts tilting toward the viewer.
const ANGLE_START_Y: f32 = 0.8;
const MIN_Z: f32 = -2.5;
const MAX_Z: f32 = -3.2;
/// Height above which the panel sits at its farthest depth.
const THRESHOLD_Z: f32 = 1.45;

/// An in-progress move of one panel by one controller.
#[derive(Debug, Clone)]
pub struct PlacementMover {
    controller: Option<usize>,
    initial_point: Vec3,
    initial_translation: Vec3,
}

impl PlacementMover {
    /// Create an idle mover.
    pub fn new() -> Self {
        Self {
            controller: None,
            initial_point: Vec3::ZERO,
            initial_translation: Vec3::ZERO,
        }
    }

    /// Whether the given controller is currently moving a panel.
    pub fn is_moving(&self, controller: usize) -> bool {
        self.controller == Some(controller)
    }

    /// Begin moving: record the grab point and the placement's
    /// translation at grab time.
    pub fn start_moving(&mut self, placement: &Placement, controller: usize, hit_point: Vec3) {
        self.controller = Some(controller);
        self.initial_point = hit_point;
        self.initial_translation = placement.translation;
    }

    /// Stop moving and release the panel.
    pub fn end_moving(&mut self) {
        self.controller = None;
    }

    /// Apply a new hit point, producing the translation and tilt for the
    /// moved placement. Returns `None` while idle.
    pub fn handle_move(&self, hit_point: Vec3) -> Option<MoveUpdate> {
        self.controller?;
        let delta = Vec3::new(
            hit_point.x - self.initial_point.x,
            hit_point.y - self.initial_point.y,
            0.0,
        );
        let x = (self.initial_translation.x + delta.x).clamp(MIN_X, MAX_X);
        let y = (self.initial_translation.y + delta.y).clamp(MIN_Y, MAX_Y);

        let angle = if y < ANGLE_START_Y {
            let t = 1.0 - (y - MIN_Y) / (ANGLE_START_Y - MIN_Y);
            t * MAX_ANGLE
        } else {
            0.0
        };

        let t = if y > THRESHOLD_Z {
            1.0
        } else {
            (y - MIN_Y) / (THRESHOLD_Z - MIN_Y)
        };
        let z = MIN_Z + t * (MAX_Z - MIN_Z);

        Some(MoveUpdate {
            translation: Vec3::new(x, y, z),
            tilt_angle: angle,
        })
    }
}

impl Default for PlacementMover {
    fn default() -> Self {
        Self::new()
    }
}

/// The placement delta produced by a move step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveUpdate {
    /// New translation for the moved placement.
    pub translation: Vec3,
    /// Tilt toward the viewer around the X axis, radians.
    pub tilt_angle: f32,
}

impl MoveUpdate {
    /// Apply this update to a placement.
    pub fn apply(&self, placement: &mut Placement) {
        placement.translation = self.translation;
        placement.rotation.axis = Vec3::new(1.0, 0.0, 0.0);
        placement.rotation.angle = self.tilt_angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::SizeReference;

    fn placement() -> Placement {
        Placement::new(800.0, 450.0, &SizeReference::default())
    }

    #[test]
    fn idle_mover_produces_no_updates() {
        let mover = PlacementMover::new();
        assert!(!mover.is_moving(0));
        assert!(mover.handle_move(Vec3::new(1.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn movement_clamps_to_the_travel_band() {
        let mut mover = PlacementMover::new();
        mover.start_moving(&placement(), 0, Vec3::ZERO);
        let update = mover.handle_move(Vec3::new(100.0, 100.0, 0.0)).unwrap();
        assert_eq!(update.translation.x, MAX_X);
        assert_eq!(update.translation.y, MAX_Y);
        let update = mover.handle_move(Vec3::new(-100.0, -100.0, 0.0)).unwrap();
        assert_eq!(update.translation.x, MIN_X);
        assert_eq!(update.translation.y, MIN_Y);
    }

    #[test]
    fn low_panels_tilt_toward_the_viewer() {
        let mut mover = PlacementMover::new();
        mover.start_moving(&placement(), 0, Vec3::ZERO);
        let high = mover.handle_move(Vec3::new(0.0, 1.5, 0.0)).unwrap();
        assert_eq!(high.tilt_angle, 0.0);
        let low = mover.handle_move(Vec3::new(0.0, MIN_Y, 0.0)).unwrap();
        assert!((low.tilt_angle - MAX_ANGLE).abs() < 1e-5);
    }

    #[test]
    fn depth_eases_back_as_the_panel_rises() {
        let mut mover = PlacementMover::new();
        mover.start_moving(&placement(), 0, Vec3::ZERO);
        let low = mover.handle_move(Vec3::new(0.0, MIN_Y, 0.0)).unwrap();
        let high = mover.handle_move(Vec3::new(0.0, MAX_Y, 0.0)).unwrap();
        assert_eq!(low.translation.z, MIN_Z);
        assert_eq!(high.translation.z, MAX_Z);
    }

    #[test]
    fn apply_writes_translation_and_tilt() {
        let mut mover = PlacementMover::new();
        let mut p = placement();
        mover.start_moving(&p, 1, Vec3::ZERO);
        assert!(mover.is_moving(1));
        let update = mover.handle_move(Vec3::new(0.5, -0.5, 0.0)).unwrap();
        update.apply(&mut p);
        assert_eq!(p.translation, update.translation);
        assert_eq!(p.rotation.angle, update.tilt_angle);
        mover.end_moving();
        assert!(!mover.is_moving(1));
    }
}
