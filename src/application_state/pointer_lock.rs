//! Browser pointer lock tracking.
//!
//! Browsers grant pointer lock asynchronously and take it back on their own when the
//! user presses Escape, without forwarding the key to the page. The tracker compares
//! what the engine believes with what the document reports each frame and detects
//! when a lock the browser had granted is gone.

/// Follows the browser's view of the pointer lock across frames.
#[derive(Debug, Default)]
pub struct PointerLockTracker {
    /// The browser has confirmed the current lock
    granted: bool,
}

impl PointerLockTracker {
    /// Creates a tracker with no lock granted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the browser has confirmed the current lock.
    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Records the state seen this frame.
    ///
    /// A lock that was requested but not yet granted is still pending, not lost.
    ///
    /// # Arguments
    /// * `engine_locked` - Whether the engine is applying input
    /// * `document_locked` - Whether the document currently holds a pointer lock element
    ///
    /// # Returns
    /// `true` once when a granted lock has been released by the browser.
    pub fn observe(&mut self, engine_locked: bool, document_locked: bool) -> bool {
        if !engine_locked {
            self.granted = false;
            return false;
        }
        if document_locked {
            self.granted = true;
            return false;
        }
        std::mem::take(&mut self.granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_lock_is_not_lost() {
        let mut tracker = PointerLockTracker::new();
        assert!(!tracker.observe(true, false));
        assert!(!tracker.observe(true, false));
        assert!(!tracker.is_granted());
    }

    #[test]
    fn browser_release_is_reported_once() {
        let mut tracker = PointerLockTracker::new();
        assert!(!tracker.observe(true, true));
        assert!(tracker.is_granted());

        assert!(tracker.observe(true, false));
        assert!(!tracker.is_granted());
        assert!(!tracker.observe(true, false));
    }

    #[test]
    fn engine_release_forgets_the_grant() {
        let mut tracker = PointerLockTracker::new();
        tracker.observe(true, true);
        assert!(!tracker.observe(false, true));
        assert!(!tracker.is_granted());
        assert!(!tracker.observe(true, false));
    }
}
