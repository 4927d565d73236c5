#![forbid(unsafe_code)]

//! Opaque panel handles.
//!
//! Panels refer to each other (parent links, focus targets, overlay
//! parenting) by integer handle, never by reference. A handle outliving
//! its panel is an expected condition: lookups against a dead handle
//! resolve to nothing instead of dangling.

use std::fmt;

/// Opaque identifier for a panel. Zero is reserved as invalid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelHandle(u32);

impl PanelHandle {
    /// Lowest valid handle.
    pub const MIN: Self = Self(1);

    /// Create a handle from a raw value, rejecting 0.
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PanelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic handle allocator.
///
/// Handles are never reused within a process, so a stale parent link can
/// only miss, never alias a newer panel.
#[derive(Debug, Clone)]
pub struct HandleAllocator {
    next: u32,
}

impl HandleAllocator {
    /// Create an allocator starting at [`PanelHandle::MIN`].
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next handle.
    ///
    /// # Panics
    ///
    /// Panics on `u32` exhaustion; four billion panels in one process is
    /// out of scope.
    pub fn allocate(&mut self) -> PanelHandle {
        let handle = PanelHandle::new(self.next).expect("allocator skips zero");
        self.next = self.next.checked_add(1).expect("panel handle overflow");
        handle
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{HandleAllocator, PanelHandle};

    #[test]
    fn zero_is_rejected() {
        assert!(PanelHandle::new(0).is_none());
        assert_eq!(PanelHandle::new(7).map(PanelHandle::get), Some(7));
    }

    #[test]
    fn allocator_is_monotonic_from_min() {
        let mut alloc = HandleAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();
        assert_eq!(a, PanelHandle::MIN);
        assert!(b.get() > a.get());
        assert!(c.get() > b.get());
    }

    #[test]
    fn display_formats_with_hash_prefix() {
        let h = PanelHandle::new(42).unwrap();
        assert_eq!(format!("{h}"), "#42");
    }
}
