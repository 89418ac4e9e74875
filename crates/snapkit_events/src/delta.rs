//! Scroll delta tracking
//!
//! Turns "the container scrolled" into "the container moved by (dx, dy) since
//! the last time we looked". The answer is memoized per event, so every
//! consumer of one scroll event sees the same delta even though the first
//! query already advanced the stored offset.

use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHashMap;
use snapkit_core::{ElementId, EventSerial, Point, StyleAndGeometryProvider};

/// Memoized deltas kept per tracker
const MEMO_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(63);

/// Signed offset change between two observations
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollDelta {
    pub dx: f32,
    pub dy: f32,
}

impl ScrollDelta {
    pub fn moved_x(&self) -> bool {
        self.dx != 0.0
    }

    pub fn moved_y(&self) -> bool {
        self.dy != 0.0
    }
}

/// Per-container last offsets plus a per-event memo
pub struct ScrollDeltaTracker {
    last_offsets: FxHashMap<ElementId, Point>,
    memo: LruCache<EventSerial, ScrollDelta>,
}

impl Default for ScrollDeltaTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScrollDeltaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollDeltaTracker")
            .field("last_offsets", &self.last_offsets)
            .field("memoized", &self.memo.len())
            .finish()
    }
}

impl ScrollDeltaTracker {
    pub fn new() -> Self {
        Self {
            last_offsets: FxHashMap::default(),
            memo: LruCache::new(MEMO_CAPACITY),
        }
    }

    /// Delta of `container` for the event identified by `serial`
    ///
    /// The first observation of a container measures from offset 0. A
    /// container that can no longer be measured reports no movement.
    pub fn observe<P>(&mut self, provider: &P, container: ElementId, serial: EventSerial) -> ScrollDelta
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        if let Some(delta) = self.memo.get(&serial) {
            return *delta;
        }

        let delta = match provider.scroll_metrics(container) {
            Some(metrics) => {
                let current = metrics.offset();
                let last = self
                    .last_offsets
                    .insert(container, current)
                    .unwrap_or(Point::ZERO);
                ScrollDelta {
                    dx: current.x - last.x,
                    dy: current.y - last.y,
                }
            }
            None => ScrollDelta::default(),
        };

        self.memo.put(serial, delta);
        delta
    }

    /// Last recorded offset of a container
    pub fn last_offset(&self, container: ElementId) -> Option<Point> {
        self.last_offsets.get(&container).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapkit_core::{Rect, SnapStyle, SnapTree};

    fn scroller() -> (SnapTree, ElementId) {
        let mut tree = SnapTree::new();
        let root = tree.create_root(Rect::new(0.0, 0.0, 100.0, 100.0), SnapStyle::default());
        tree.append_child(root, Rect::new(0.0, 0.0, 300.0, 300.0), SnapStyle::default())
            .unwrap();
        (tree, root)
    }

    #[test]
    fn test_deltas_sum_to_total_offset() {
        let (mut tree, root) = scroller();
        let mut tracker = ScrollDeltaTracker::new();

        let mut total = 0.0;
        for (serial, x) in [30.0, 70.0, 100.0].into_iter().enumerate() {
            tree.set_scroll_offset(root, Point::new(x, 0.0));
            total += tracker.observe(&tree, root, EventSerial(serial as u64)).dx;
        }
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_same_event_returns_memoized_delta() {
        let (mut tree, root) = scroller();
        let mut tracker = ScrollDeltaTracker::new();

        tree.set_scroll_offset(root, Point::new(0.0, 40.0));
        let first = tracker.observe(&tree, root, EventSerial(7));
        let again = tracker.observe(&tree, root, EventSerial(7));
        assert_eq!(first, ScrollDelta { dx: 0.0, dy: 40.0 });
        assert_eq!(again, first);

        // a different event sees no further movement
        let next = tracker.observe(&tree, root, EventSerial(8));
        assert!(!next.moved_x() && !next.moved_y());
    }

    #[test]
    fn test_memo_does_not_reread_mutated_state() {
        let (mut tree, root) = scroller();
        let mut tracker = ScrollDeltaTracker::new();

        tree.set_scroll_offset(root, Point::new(10.0, 0.0));
        tracker.observe(&tree, root, EventSerial(1));
        tree.set_scroll_offset(root, Point::new(50.0, 0.0));
        assert_eq!(tracker.observe(&tree, root, EventSerial(1)).dx, 10.0);
        assert_eq!(tracker.last_offset(root), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_dead_container_reports_no_movement() {
        let (mut tree, root) = scroller();
        let mut tracker = ScrollDeltaTracker::new();
        tree.remove(root);
        assert_eq!(
            tracker.observe(&tree, root, EventSerial(1)),
            ScrollDelta::default()
        );
    }
}
