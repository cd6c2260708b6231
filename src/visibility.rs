//! One-shot visibility tracking.
//!
//! Plays the role of the browser's visibility observer: each cell may trigger
//! at most one lazy-load registration, and the registration is dropped after
//! it fires. Replacing the item list resets the tracker.

#[derive(Debug, Default)]
pub struct VisibilityTracker {
    fired: Vec<bool>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all registrations, e.g. when the first page replaces the list.
    pub fn reset(&mut self, item_count: usize) {
        self.fired.clear();
        self.fired.resize(item_count, false);
    }

    /// Accommodate newly appended items without touching existing state.
    pub fn grow(&mut self, item_count: usize) {
        if item_count > self.fired.len() {
            self.fired.resize(item_count, false);
        }
    }

    /// Report which of `indices` enter the viewport for the first time.
    /// Each index fires at most once over the tracker's lifetime.
    pub fn newly_visible(&mut self, indices: impl IntoIterator<Item = usize>) -> Vec<usize> {
        let mut fresh = Vec::new();
        for idx in indices {
            if let Some(slot) = self.fired.get_mut(idx)
                && !*slot
            {
                *slot = true;
                fresh.push(idx);
            }
        }
        fresh
    }
}
