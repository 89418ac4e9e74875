//! Settle detection for hosts without a native scroll-end signal
//!
//! ```text
//!            movement                    quiet period elapsed
//!   Idle ───────────────▶ Pending ─────────────────────────────▶ Idle + settle
//!                          │  ▲    (no pointer down)
//!                movement  │  │
//!          or pointer down └──┘ reschedule
//! ```

use std::time::Duration;

use smallvec::SmallVec;
use snapkit_core::{Event, EventTarget, EventType, PointerId, SettleConfig, TimerId, TimerQueue};

/// Touch points currently in contact
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    active: SmallVec<[PointerId; 4]>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, pointers: &[PointerId]) {
        for pointer in pointers {
            if !self.active.contains(pointer) {
                self.active.push(*pointer);
            }
        }
    }

    pub fn release(&mut self, pointers: &[PointerId]) {
        self.active.retain(|p| !pointers.contains(p));
    }

    pub fn any_active(&self) -> bool {
        !self.active.is_empty()
    }
}

/// Shortest delay a settle check is scheduled with
///
/// A re-armed check must land strictly after the instant it fired at.
const MIN_QUIET_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SettleState {
    Idle,
    Pending { timer: TimerId },
}

/// Debounced settle check for one container
#[derive(Debug)]
pub struct SettleDetector {
    quiet_period: Duration,
    state: SettleState,
    /// Target and current target of the movement that armed the check
    origin: Option<(EventTarget, EventTarget)>,
}

impl SettleDetector {
    pub fn new(config: SettleConfig) -> Self {
        Self {
            quiet_period: config.quiet_period().max(MIN_QUIET_PERIOD),
            state: SettleState::Idle,
            origin: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SettleState::Pending { .. })
    }

    /// A raw movement arrived: restart the quiet period
    pub fn on_movement<T>(&mut self, event: &Event, timers: &mut TimerQueue<T>, owner: T) {
        self.cancel(timers);
        self.origin = Some((event.target, event.current_target));
        self.arm(timers, owner);
    }

    /// A timer fired; returns the synthesized settle signal when scrolling
    /// has come to rest
    pub fn on_timer<T>(
        &mut self,
        fired: TimerId,
        timers: &mut TimerQueue<T>,
        pointers: &PointerTracker,
        owner: T,
    ) -> Option<Event> {
        match self.state {
            SettleState::Pending { timer, .. } if timer == fired => {}
            _ => return None,
        }

        if pointers.any_active() {
            tracing::trace!("pointer still down, postponing settle check");
            self.arm(timers, owner);
            return None;
        }

        self.state = SettleState::Idle;
        let (target, current_target) = self.origin.take()?;
        let mut event = Event::new(EventType::ScrollEnd, target);
        event.current_target = current_target;
        Some(event)
    }

    /// Drop the pending check, if any
    pub fn cancel<T>(&mut self, timers: &mut TimerQueue<T>) {
        if let SettleState::Pending { timer, .. } = self.state {
            timers.cancel(timer);
        }
        self.state = SettleState::Idle;
    }

    fn arm<T>(&mut self, timers: &mut TimerQueue<T>, owner: T) {
        let timer = timers.schedule(self.quiet_period, owner);
        self.state = SettleState::Pending { timer };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement() -> Event {
        Event::new(EventType::Scroll, EventTarget::Document)
    }

    /// Fire everything due up to `until`, collecting settle signals with their times
    fn run(
        detector: &mut SettleDetector,
        timers: &mut TimerQueue<()>,
        pointers: &PointerTracker,
        until: Duration,
    ) -> Vec<Duration> {
        let mut settled = Vec::new();
        while let Some((id, ())) = timers.pop_due(until) {
            if detector.on_timer(id, timers, pointers, ()).is_some() {
                settled.push(timers.now());
            }
        }
        timers.advance_to(until);
        settled
    }

    #[test]
    fn test_debounce_settles_once() {
        let mut detector = SettleDetector::new(SettleConfig::default());
        let mut timers = TimerQueue::new();
        let pointers = PointerTracker::new();

        let mut settled = Vec::new();
        for at in [0, 40, 80] {
            settled.extend(run(&mut detector, &mut timers, &pointers, Duration::from_millis(at)));
            detector.on_movement(&movement(), &mut timers, ());
        }
        settled.extend(run(&mut detector, &mut timers, &pointers, Duration::from_millis(1000)));

        assert_eq!(settled, vec![Duration::from_millis(180)]);
        assert!(!detector.is_pending());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_pointer_down_postpones_settle() {
        let mut detector = SettleDetector::new(SettleConfig::default());
        let mut timers = TimerQueue::new();
        let mut pointers = PointerTracker::new();

        pointers.press(&[PointerId(1)]);
        detector.on_movement(&movement(), &mut timers, ());

        let settled = run(&mut detector, &mut timers, &pointers, Duration::from_millis(300));
        assert!(settled.is_empty());
        assert!(detector.is_pending());

        pointers.release(&[PointerId(1)]);
        let settled = run(&mut detector, &mut timers, &pointers, Duration::from_millis(1000));
        assert_eq!(settled, vec![Duration::from_millis(400)]);
    }

    #[test]
    fn test_zero_quiet_period_still_advances_while_held() {
        let mut detector = SettleDetector::new(SettleConfig { quiet_period_ms: 0 });
        let mut timers = TimerQueue::new();
        let mut pointers = PointerTracker::new();

        pointers.press(&[PointerId(1)]);
        detector.on_movement(&movement(), &mut timers, ());
        assert_eq!(timers.len(), 1);

        let settled = run(&mut detector, &mut timers, &pointers, Duration::from_millis(5));
        assert!(settled.is_empty());
        assert!(detector.is_pending());
        assert_eq!(timers.now(), Duration::from_millis(5));

        pointers.release(&[PointerId(1)]);
        let settled = run(&mut detector, &mut timers, &pointers, Duration::from_millis(50));
        assert_eq!(settled, vec![Duration::from_millis(6)]);
    }

    #[test]
    fn test_settle_carries_origin_targets() {
        let mut detector = SettleDetector::new(SettleConfig::default());
        let mut timers = TimerQueue::new();
        let pointers = PointerTracker::new();

        let mut scroll = Event::new(EventType::Scroll, EventTarget::Document);
        scroll.current_target = EventTarget::Window;
        detector.on_movement(&scroll, &mut timers, ());

        let (id, ()) = timers.pop_due(Duration::from_millis(100)).unwrap();
        let settle = detector.on_timer(id, &mut timers, &pointers, ()).unwrap();
        assert_eq!(settle.event_type, EventType::ScrollEnd);
        assert_eq!(settle.target, EventTarget::Document);
        assert_eq!(settle.current_target, EventTarget::Window);
    }

    #[test]
    fn test_cancel_drops_pending_timer() {
        let mut detector = SettleDetector::new(SettleConfig::default());
        let mut timers = TimerQueue::new();
        let pointers = PointerTracker::new();

        detector.on_movement(&movement(), &mut timers, ());
        detector.cancel(&mut timers);
        assert!(timers.is_empty());
        assert!(run(&mut detector, &mut timers, &pointers, Duration::from_millis(500)).is_empty());
    }

    #[test]
    fn test_pointer_tracker_set_semantics() {
        let mut pointers = PointerTracker::new();
        pointers.press(&[PointerId(1), PointerId(2)]);
        pointers.press(&[PointerId(1)]);
        pointers.release(&[PointerId(1)]);
        assert!(pointers.any_active());
        pointers.release(&[PointerId(2)]);
        assert!(!pointers.any_active());
    }
}
