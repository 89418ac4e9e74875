//! Per-(host, kind) emulators
//!
//! An emulator owns the raw-signal observers it registers on its host and
//! turns what they see into snap notifications:
//!
//! - `scrollsnapchanging` resolves on every movement.
//! - `scrollsnapchange` resolves on the host's native scroll-end signal, or on
//!   a settle signal synthesized by [`SettleDetector`] when there is none.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use snapkit_core::{
    EngineConfig, Event, EventSerial, EventTarget, EventType, SnapEventKind,
    StyleAndGeometryProvider, TimerId, TimerQueue,
};

use crate::change::SnapChangeDetector;
use crate::listeners::{ListenerHandler, ListenerId, ListenerOptions, ListenerTable};
use crate::resolver::SnapTargetResolver;
use crate::settle::{PointerTracker, SettleDetector};

new_key_type! {
    pub struct EmulatorId;
}

/// How an emulator learns that it should resolve
#[derive(Debug)]
pub enum SettleMode {
    /// Every raw scroll
    OnMovement,
    /// The host's own scroll-end signal
    Native,
    /// Debounced scrolls, held off while a pointer is down
    Heuristic {
        settle: SettleDetector,
        pointers: PointerTracker,
    },
}

#[derive(Debug)]
pub struct Emulator {
    host: EventTarget,
    kind: SnapEventKind,
    detector: SnapChangeDetector,
    mode: SettleMode,
    observers: SmallVec<[ListenerId; 4]>,
}

impl Emulator {
    pub fn mode(&self) -> &SettleMode {
        &self.mode
    }

    /// Feed a raw signal seen by one of this emulator's observers
    pub fn on_event<P>(
        &mut self,
        provider: &P,
        resolver: &SnapTargetResolver,
        event: &Event,
        timers: &mut TimerQueue<EmulatorId>,
        id: EmulatorId,
    ) -> Option<Event>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        match (&mut self.mode, &event.event_type) {
            (SettleMode::OnMovement, EventType::Scroll) | (SettleMode::Native, EventType::ScrollEnd) => {
                self.detector.check(provider, resolver, event, self.kind)
            }
            (SettleMode::Heuristic { settle, .. }, EventType::Scroll) => {
                settle.on_movement(event, timers, id);
                None
            }
            (SettleMode::Heuristic { pointers, .. }, EventType::TouchStart) => {
                pointers.press(&event.changed_touches);
                None
            }
            (SettleMode::Heuristic { pointers, .. }, EventType::TouchEnd | EventType::TouchCancel) => {
                pointers.release(&event.changed_touches);
                None
            }
            _ => None,
        }
    }

    /// A timer owned by this emulator fired
    ///
    /// `serial` identifies the synthesized settle signal for delta tracking.
    pub fn on_timer<P>(
        &mut self,
        provider: &P,
        resolver: &SnapTargetResolver,
        fired: TimerId,
        timers: &mut TimerQueue<EmulatorId>,
        id: EmulatorId,
        serial: EventSerial,
    ) -> Option<Event>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        let SettleMode::Heuristic { settle, pointers } = &mut self.mode else {
            return None;
        };
        let mut settled = settle.on_timer(fired, timers, pointers, id)?;
        settled.serial = serial;
        self.detector.check(provider, resolver, &settled, self.kind)
    }
}

/// Create the emulator for (host, kind) and register its observers
pub(crate) fn install(
    emulators: &mut SlotMap<EmulatorId, Emulator>,
    listeners: &mut ListenerTable,
    config: &EngineConfig,
    host: EventTarget,
    kind: SnapEventKind,
) -> EmulatorId {
    let mode = match kind {
        SnapEventKind::Changing => SettleMode::OnMovement,
        SnapEventKind::Change if config.features.scroll_end => SettleMode::Native,
        SnapEventKind::Change => SettleMode::Heuristic {
            settle: SettleDetector::new(config.settle),
            pointers: PointerTracker::new(),
        },
    };

    let observed: SmallVec<[(EventTarget, EventType, ListenerOptions); 4]> = match &mode {
        SettleMode::OnMovement => {
            smallvec::smallvec![(host, EventType::Scroll, ListenerOptions::default())]
        }
        SettleMode::Native => {
            smallvec::smallvec![(host, EventType::ScrollEnd, ListenerOptions::capture())]
        }
        SettleMode::Heuristic { .. } => smallvec::smallvec![
            (host, EventType::Scroll, ListenerOptions::capture().passive()),
            (EventTarget::Document, EventType::TouchStart, ListenerOptions::default().passive()),
            (EventTarget::Document, EventType::TouchEnd, ListenerOptions::default().passive()),
            (EventTarget::Document, EventType::TouchCancel, ListenerOptions::default().passive()),
        ],
    };

    let id = emulators.insert(Emulator {
        host,
        kind,
        detector: SnapChangeDetector::new(),
        mode,
        observers: SmallVec::new(),
    });

    let observers = observed
        .into_iter()
        .map(|(target, event_type, options)| {
            listeners.add(target, event_type, ListenerHandler::Emulator(id), options)
        })
        .collect();
    if let Some(emulator) = emulators.get_mut(id) {
        emulator.observers = observers;
    }
    id
}

/// Remove an emulator, its observers and its pending timer
pub(crate) fn teardown(
    emulators: &mut SlotMap<EmulatorId, Emulator>,
    listeners: &mut ListenerTable,
    timers: &mut TimerQueue<EmulatorId>,
    id: EmulatorId,
) {
    let Some(mut emulator) = emulators.remove(id) else {
        return;
    };
    tracing::debug!(
        "removing {} emulator on {:?}",
        emulator.kind.event_type(),
        emulator.host
    );
    for observer in emulator.observers.drain(..) {
        listeners.remove(observer);
    }
    if let SettleMode::Heuristic { settle, .. } = &mut emulator.mode {
        settle.cancel(timers);
    }
}
