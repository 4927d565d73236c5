#![forbid(unsafe_code)]

//! Placement model: where a panel sits in 3D space.
//!
//! # Role in Visor
//! A [`Placement`] describes a panel's surface-pixel size, its world-space
//! size, and how it hangs off a parent panel (anchor points, translation,
//! rotation, curvature). Resolution against a parent rectangle is pure
//! math with no side effects, so the same placement resolved twice against
//! the same parent yields the same world rectangle.
//!
//! # How it fits in the system
//! Every panel owns one `Placement`, mutated by its owner and by layout
//! recompute routines, and the 3D compositor consumes the resolved
//! {handle, placement, texture} tuples once per frame.

pub mod mover;
pub mod placement;
pub mod scale;

pub use mover::{MoveUpdate, PlacementMover};
pub use placement::{Placement, Rotation};
pub use scale::{
    MIN_ASPECT, MIN_SURFACE_DIP, SizeReference, clamp_aspect, clamp_extent, size_for_area_scale,
};
