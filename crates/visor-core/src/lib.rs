#![forbid(unsafe_code)]

//! Core primitives shared by every Visor crate.
//!
//! # Role in Visor
//! `visor-core` is the leaf crate of the workspace. It defines the
//! geometric vocabulary (points, rectangles, world-space vectors), the
//! synthetic input events produced from 3D ray-cast hits, and the opaque
//! panel handles used for all cross-panel references.
//!
//! # How it fits in the system
//! `visor-placement` builds the 3D placement math on these primitives,
//! `visor-render` sizes texture surfaces with them, and `visor-widgets`
//! routes the input events defined here into panels and sessions.

pub mod event;
pub mod geometry;
pub mod handle;

pub use event::{HoverEvent, HoverPhase, PointerButtons, PointerEvent, PointerPhase, RayHit};
pub use geometry::{PixelSize, Point, Vec3, WorldRect};
pub use handle::{HandleAllocator, PanelHandle};
