#![forbid(unsafe_code)]

//! Texture surfaces and their single-consumer claim protocol.
//!
//! The hardware texture behind a panel is allocated and freed by the 3D
//! compositor side, never by this crate. Panels hold a [`TextureHandle`]
//! (a weak reference); the surface outliving the panel or the panel
//! outliving the surface are both ordinary conditions.
//!
//! At most one consumer — a UI render bridge or a session display — may
//! hold a surface's claim at any instant. Claims are tokens: releasing a
//! stale token is a logged no-op, so teardown ordering across
//! collaborators cannot corrupt the slot.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;

use visor_core::geometry::PixelSize;

use crate::pixels::PixelBuffer;

/// Which kind of consumer holds a surface claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    /// A panel's 2D render bridge.
    UiBridge,
    /// A content session's display.
    SessionDisplay,
}

impl ClaimKind {
    const fn encode(self) -> u64 {
        match self {
            ClaimKind::UiBridge => 1,
            ClaimKind::SessionDisplay => 2,
        }
    }

    const fn decode(raw: u64) -> Option<Self> {
        match raw {
            1 => Some(ClaimKind::UiBridge),
            2 => Some(ClaimKind::SessionDisplay),
            _ => None,
        }
    }
}

/// Attempt to claim a surface that another consumer already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceBusy {
    /// The consumer currently holding the claim.
    pub held_by: ClaimKind,
}

impl fmt::Display for SurfaceBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface already claimed by {:?}", self.held_by)
    }
}

impl std::error::Error for SurfaceBusy {}

/// An off-screen texture target owned by the consumer side.
///
/// The front buffer is published with a lock-free swap: a frame committed
/// on the UI thread is fully visible to the next compositor
/// [`sample`](Self::sample), which is the entire cross-thread contract.
#[derive(Debug)]
pub struct TextureSurface {
    width: AtomicU32,
    height: AtomicU32,
    /// Packed claim slot: `token << 8 | kind`, 0 when unclaimed.
    claim: AtomicU64,
    next_token: AtomicU32,
    front: ArcSwapOption<PixelBuffer>,
    commits: AtomicU64,
}

impl TextureSurface {
    /// Allocate a surface record for an externally owned texture.
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            claim: AtomicU64::new(0),
            next_token: AtomicU32::new(1),
            front: ArcSwapOption::const_empty(),
            commits: AtomicU64::new(0),
        })
    }

    /// A weak handle suitable for storing in a panel.
    pub fn handle(self: &Arc<Self>) -> TextureHandle {
        TextureHandle(Arc::downgrade(self))
    }

    /// Current target size in texture pixels.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(
            self.width.load(Ordering::Acquire),
            self.height.load(Ordering::Acquire),
        )
    }

    /// Update the target size (the consumer reallocates storage lazily).
    pub fn set_default_size(&self, size: PixelSize) {
        self.width.store(size.width, Ordering::Release);
        self.height.store(size.height, Ordering::Release);
    }

    /// Claim the surface for one consumer.
    ///
    /// Fails with the current holder when the slot is taken; the previous
    /// binding always wins.
    pub fn try_claim(self: &Arc<Self>, kind: ClaimKind) -> Result<SurfaceClaim, SurfaceBusy> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let packed = (token as u64) << 8 | kind.encode();
        match self
            .claim
            .compare_exchange(0, packed, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(SurfaceClaim {
                surface: Arc::downgrade(self),
                token,
                kind,
                released: false,
            }),
            Err(current) => Err(SurfaceBusy {
                held_by: ClaimKind::decode(current & 0xFF).unwrap_or(kind),
            }),
        }
    }

    /// The consumer currently holding the claim, if any.
    pub fn claimant(&self) -> Option<ClaimKind> {
        ClaimKind::decode(self.claim.load(Ordering::Acquire) & 0xFF)
    }

    fn release_token(&self, token: u32, kind: ClaimKind) {
        let packed = (token as u64) << 8 | kind.encode();
        if self
            .claim
            .compare_exchange(packed, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // Stale release after the slot moved on; ignore.
            #[cfg(feature = "tracing")]
            tracing::debug!(token, "stale surface claim release ignored");
        }
    }

    /// Publish a committed frame as the new front buffer.
    ///
    /// Returns the previous front buffer for reuse when the compositor is
    /// no longer holding it.
    pub fn publish(&self, frame: PixelBuffer) -> Option<PixelBuffer> {
        let previous = self.front.swap(Some(Arc::new(frame)));
        self.commits.fetch_add(1, Ordering::AcqRel);
        previous.and_then(|arc| Arc::try_unwrap(arc).ok())
    }

    /// Compositor side: the most recently published frame.
    pub fn sample(&self) -> Option<Arc<PixelBuffer>> {
        self.front.load_full()
    }

    /// Number of frames committed since creation.
    pub fn frames_committed(&self) -> u64 {
        self.commits.load(Ordering::Acquire)
    }
}

/// Weak reference to a [`TextureSurface`].
#[derive(Debug, Clone)]
pub struct TextureHandle(Weak<TextureSurface>);

impl TextureHandle {
    /// A handle that never upgrades; useful as a placeholder.
    pub fn dangling() -> Self {
        Self(Weak::new())
    }

    /// Upgrade to the surface, if the consumer side still owns it.
    pub fn surface(&self) -> Option<Arc<TextureSurface>> {
        self.0.upgrade()
    }

    /// Whether the underlying surface is still alive.
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether two handles refer to the same surface.
    pub fn same_surface(&self, other: &TextureHandle) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

/// RAII claim on a texture surface; released on drop.
#[derive(Debug)]
pub struct SurfaceClaim {
    surface: Weak<TextureSurface>,
    token: u32,
    kind: ClaimKind,
    released: bool,
}

impl SurfaceClaim {
    /// The consumer kind this claim was taken for.
    pub fn kind(&self) -> ClaimKind {
        self.kind
    }

    /// Release the claim now. Idempotent; a dead surface is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(surface) = self.surface.upgrade() {
            surface.release_token(self.token, self.kind);
        }
    }
}

impl Drop for SurfaceClaim {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::Argb;

    #[test]
    fn claim_is_exclusive_and_previous_binding_wins() {
        let surface = TextureSurface::new(64, 64);
        let first = surface.try_claim(ClaimKind::SessionDisplay).unwrap();
        let err = surface.try_claim(ClaimKind::UiBridge).unwrap_err();
        assert_eq!(err.held_by, ClaimKind::SessionDisplay);
        assert_eq!(surface.claimant(), Some(ClaimKind::SessionDisplay));
        drop(first);
        assert_eq!(surface.claimant(), None);
        surface.try_claim(ClaimKind::UiBridge).unwrap();
    }

    #[test]
    fn release_is_idempotent() {
        let surface = TextureSurface::new(8, 8);
        let mut claim = surface.try_claim(ClaimKind::UiBridge).unwrap();
        claim.release();
        claim.release();
        assert_eq!(surface.claimant(), None);
    }

    #[test]
    fn stale_release_does_not_clobber_new_claim() {
        let surface = TextureSurface::new(8, 8);
        let mut old = surface.try_claim(ClaimKind::UiBridge).unwrap();
        old.release();
        let _new = surface.try_claim(ClaimKind::SessionDisplay).unwrap();
        // Dropping the long-released claim must not free the new one.
        drop(old);
        assert_eq!(surface.claimant(), Some(ClaimKind::SessionDisplay));
    }

    #[test]
    fn publish_then_sample_sees_the_committed_frame() {
        let surface = TextureSurface::new(2, 2);
        assert!(surface.sample().is_none());
        let mut frame = PixelBuffer::new(2, 2);
        frame.set(1, 1, Argb::WHITE);
        surface.publish(frame);
        let sampled = surface.sample().unwrap();
        assert_eq!(sampled.get(1, 1), Some(Argb::WHITE));
        assert_eq!(surface.frames_committed(), 1);
    }

    #[test]
    fn publish_recycles_previous_front_when_unsampled() {
        let surface = TextureSurface::new(2, 2);
        assert!(surface.publish(PixelBuffer::new(2, 2)).is_none());
        // Nobody holds the first front buffer, so it comes back.
        assert!(surface.publish(PixelBuffer::new(2, 2)).is_some());
        // A compositor still holding the front prevents reuse.
        let held = surface.sample().unwrap();
        assert!(surface.publish(PixelBuffer::new(2, 2)).is_none());
        drop(held);
    }

    #[test]
    fn handle_reports_liveness() {
        let surface = TextureSurface::new(4, 4);
        let handle = surface.handle();
        assert!(handle.is_live());
        assert!(handle.same_surface(&surface.handle()));
        drop(surface);
        assert!(!handle.is_live());
        assert!(handle.surface().is_none());
    }

    #[test]
    fn set_default_size_updates_dimensions() {
        let surface = TextureSurface::new(100, 50);
        surface.set_default_size(PixelSize::new(200, 100));
        assert_eq!(surface.size(), PixelSize::new(200, 100));
    }
}
