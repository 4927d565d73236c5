#![forbid(unsafe_code)]

//! Render bridge: 2D paint output redirected into off-screen textures.
//!
//! # Role in Visor
//! `visor-render` carries pixels from a panel's 2D content to the 3D
//! compositor. A [`TextureSurface`](surface::TextureSurface) is the
//! consumer-owned target; a [`RenderBridge`](bridge::RenderBridge) claims
//! it, paints whole frames into a software back buffer, and publishes
//! each committed frame through a lock-free front-buffer swap.
//!
//! # Primary responsibilities
//! - **PixelBuffer**: the software canvas frames are painted into.
//! - **TextureSurface / TextureHandle**: externally owned texture target,
//!   weakly referenced by panels, with single-consumer claim tracking.
//! - **RenderBridge / FramePaint**: the begin/commit frame protocol with
//!   exactly-once commit on every exit path.
//!
//! # How it fits in the system
//! Panels in `visor-widgets` own one bridge per bound texture. The 3D
//! compositor thread calls [`TextureSurface::sample`](surface::TextureSurface::sample)
//! once per frame; the publish-then-sample contract is carried entirely
//! by the front-buffer swap, never by ad hoc flags.

pub mod bridge;
pub mod pixels;
pub mod surface;

pub use bridge::{BridgeError, FramePaint, RenderBridge};
pub use pixels::{Argb, PixelBuffer};
pub use surface::{ClaimKind, SurfaceClaim, TextureHandle, TextureSurface};
