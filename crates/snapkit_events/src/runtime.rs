//! Host-facing event runtime
//!
//! Owns the listener table, the activation manager and every emulator.
//! The host feeds it raw signals; subscribers to `scrollsnapchange` and
//! `scrollsnapchanging` receive emulated notifications.
//!
//! # Architecture
//!
//! ```text
//! Host signals (scroll, scrollend, touches, time)
//!     ↓
//! SnapEventRuntime::dispatch_event (capture → target → bubble)
//!     ↓
//! user callbacks            emulator observers
//!                               ↓ resolve + compare
//!                           queued snap notification
//!                               ↓ dispatched once the raw signal is done
//!                           user callbacks
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use snapkit_core::{EngineConfig, EventType, Point, Rect, SnapAlign, SnapStyle, SnapTree, SnapType};
//! use snapkit_events::{ListenerOptions, SnapEventRuntime};
//!
//! let mut tree = SnapTree::new();
//! let scroller = tree.create_root(Rect::new(0.0, 0.0, 200.0, 100.0), SnapStyle::container(SnapType::X));
//! for i in 0..3 {
//!     tree.append_child(
//!         scroller,
//!         Rect::new(i as f32 * 200.0, 0.0, 200.0, 100.0),
//!         SnapStyle::aligned(SnapAlign::parse("start")),
//!     )
//!     .unwrap();
//! }
//!
//! let mut runtime = SnapEventRuntime::new(tree, EngineConfig::default());
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! runtime.add_event_listener(
//!     scroller.into(),
//!     EventType::ScrollSnapChanging,
//!     ListenerOptions::default(),
//!     move |e| sink.borrow_mut().push(e.snap_target_inline),
//! );
//!
//! runtime.provider_mut().set_scroll_offset(scroller, Point::new(205.0, 0.0));
//! runtime.scroll(scroller.into());
//! assert_eq!(seen.borrow().len(), 1);
//! ```

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use slotmap::SlotMap;
use smallvec::SmallVec;
use snapkit_core::{
    ElementId, EngineConfig, Event, EventSerial, EventTarget, EventType, PhysicalAxis, PointerId,
    SnapEventKind, StyleAndGeometryProvider, TimerQueue,
};

use crate::activation::{ActivationManager, ActivationOutcome};
use crate::emulator::{self, Emulator, EmulatorId};
use crate::listeners::{ListenerHandler, ListenerId, ListenerOptions, ListenerTable, Phase};
use crate::resolver::SnapTargetResolver;

/// Event runtime over a style and geometry provider
pub struct SnapEventRuntime<P> {
    provider: P,
    config: EngineConfig,
    resolver: SnapTargetResolver,
    listeners: ListenerTable,
    activation: ActivationManager<EmulatorId>,
    emulators: SlotMap<EmulatorId, Emulator>,
    timers: TimerQueue<EmulatorId>,
    next_serial: u64,
    /// Events waiting for the current dispatch to finish
    queue: VecDeque<Event>,
    dispatching: bool,
}

impl<P: StyleAndGeometryProvider> SnapEventRuntime<P> {
    pub fn new(provider: P, config: EngineConfig) -> Self {
        Self {
            provider,
            resolver: SnapTargetResolver::new(config.resolver),
            activation: ActivationManager::for_host(&config.features),
            config,
            listeners: ListenerTable::new(),
            emulators: SlotMap::with_key(),
            timers: TimerQueue::new(),
            next_serial: 0,
            queue: VecDeque::new(),
            dispatching: false,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Mutable access for layout and scroll changes between signals
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current host time
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register `callback` for `event_type` on `target`
    ///
    /// Subscribing to an emulated notification kind installs its emulator on
    /// `target` the first time.
    pub fn add_event_listener<F>(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        options: ListenerOptions,
        callback: F,
    ) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        let id = self.listeners.add(
            target,
            event_type.clone(),
            ListenerHandler::Callback(Rc::new(callback)),
            options,
        );

        let emulators = &mut self.emulators;
        let listeners = &mut self.listeners;
        let config = &self.config;
        let outcome = self.activation.subscribe(target, &event_type, |host, kind| {
            emulator::install(emulators, listeners, config, host, kind)
        });
        if let ActivationOutcome::Retained { subscribers } = outcome {
            tracing::trace!("{} on {:?}: {} subscribers", event_type, target, subscribers);
        }
        id
    }

    /// Remove a listener added with [`add_event_listener`](Self::add_event_listener)
    ///
    /// Returns false if `id` is not a listener for `event_type` on `target`.
    pub fn remove_event_listener(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        id: ListenerId,
    ) -> bool {
        if !self.listeners.remove_callback(target, &event_type, id) {
            tracing::debug!("no {} listener {:?} on {:?}", event_type, id, target);
            return false;
        }

        let emulators = &mut self.emulators;
        let listeners = &mut self.listeners;
        let timers = &mut self.timers;
        self.activation.unsubscribe(target, &event_type, |handle| {
            emulator::teardown(emulators, listeners, timers, handle)
        });
        true
    }

    // =========================================================================
    // Raw signals
    // =========================================================================

    /// The host scrolled `target`
    ///
    /// Document scrolls bubble to the window; element scrolls do not bubble.
    pub fn scroll(&mut self, target: EventTarget) {
        let bubbles = target == EventTarget::Document;
        self.dispatch_event(Event::new(EventType::Scroll, target).with_bubbles(bubbles));
    }

    /// The host's native scroll-end signal
    ///
    /// Ignored unless the host is configured as supporting it.
    pub fn scroll_end(&mut self, target: EventTarget) {
        if !self.config.features.scroll_end {
            tracing::debug!("scrollend on {:?} ignored, host has no native scroll end", target);
            return;
        }
        let bubbles = target == EventTarget::Document;
        self.dispatch_event(Event::new(EventType::ScrollEnd, target).with_bubbles(bubbles));
    }

    pub fn touch_start(&mut self, pointers: &[PointerId]) {
        self.dispatch_event(Event::touch(EventType::TouchStart, pointers));
    }

    pub fn touch_end(&mut self, pointers: &[PointerId]) {
        self.dispatch_event(Event::touch(EventType::TouchEnd, pointers));
    }

    pub fn touch_cancel(&mut self, pointers: &[PointerId]) {
        self.dispatch_event(Event::touch(EventType::TouchCancel, pointers));
    }

    /// Move the clock to `now`, firing every timer due by then in deadline order
    pub fn advance_time(&mut self, now: Duration) {
        while let Some((timer, owner)) = self.timers.pop_due(now) {
            let serial = self.next_serial();
            let Some(emulator) = self.emulators.get_mut(owner) else {
                tracing::trace!("dropping timer of removed emulator {:?}", owner);
                continue;
            };
            if let Some(event) = emulator.on_timer(
                &self.provider,
                &self.resolver,
                timer,
                &mut self.timers,
                owner,
                serial,
            ) {
                self.dispatch_event(event);
            }
        }
        self.timers.advance_to(now);
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Deliver `event` to listeners along its propagation path
    ///
    /// Notifications raised while an event is being delivered are queued and
    /// delivered after it, in order.
    pub fn dispatch_event(&mut self, event: Event) {
        self.queue.push_back(event);
        if self.dispatching {
            return;
        }

        self.dispatching = true;
        while let Some(event) = self.queue.pop_front() {
            self.propagate(event);
        }
        self.dispatching = false;
    }

    fn next_serial(&mut self) -> EventSerial {
        self.next_serial += 1;
        EventSerial(self.next_serial)
    }

    /// Window, document, then element ancestors from the root down
    fn propagation_path(&self, target: EventTarget) -> SmallVec<[EventTarget; 8]> {
        let mut path = SmallVec::new();
        match target {
            EventTarget::Window => {}
            EventTarget::Document => path.push(EventTarget::Window),
            EventTarget::Element(id) => {
                path.push(EventTarget::Window);
                path.push(EventTarget::Document);
                path.extend(
                    self.provider
                        .ancestors(id)
                        .into_iter()
                        .rev()
                        .map(EventTarget::Element),
                );
            }
        }
        path
    }

    fn propagate(&mut self, mut event: Event) {
        event.serial = self.next_serial();
        event.time_stamp = self.timers.now();
        let path = self.propagation_path(event.target);

        for current in path.iter().copied() {
            self.invoke(current, &mut event, Phase::Capturing);
        }
        self.invoke(event.target, &mut event, Phase::AtTarget);
        if event.bubbles {
            for current in path.iter().rev().copied() {
                self.invoke(current, &mut event, Phase::Bubbling);
            }
        }
    }

    fn invoke(&mut self, current: EventTarget, event: &mut Event, phase: Phase) {
        event.current_target = current;
        for (id, handler, once) in self.listeners.collect(current, &event.event_type, phase) {
            if !self.listeners.contains(id) {
                continue;
            }
            if once {
                self.listeners.mark_spent(id);
            }
            match handler {
                ListenerHandler::Callback(callback) => callback(event),
                ListenerHandler::Emulator(owner) => {
                    let Some(emulator) = self.emulators.get_mut(owner) else {
                        continue;
                    };
                    if let Some(raised) = emulator.on_event(
                        &self.provider,
                        &self.resolver,
                        event,
                        &mut self.timers,
                        owner,
                    ) {
                        self.queue.push_back(raised);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Element the container snaps to along the physical y axis
    pub fn get_snap_target_vertical(&self, container: ElementId) -> Option<ElementId> {
        self.resolver
            .resolve_physical(&self.provider, container, PhysicalAxis::Y)
    }

    /// Element the container snaps to along the physical x axis
    pub fn get_snap_target_horizontal(&self, container: ElementId) -> Option<ElementId> {
        self.resolver
            .resolve_physical(&self.provider, container, PhysicalAxis::X)
    }

    /// Whether an emulator is installed for `kind` on `target`
    pub fn is_emulating(&self, target: EventTarget, kind: SnapEventKind) -> bool {
        self.activation.handle(target, kind).is_some()
    }

    pub fn subscriber_count(&self, target: EventTarget, kind: SnapEventKind) -> usize {
        self.activation.subscribers(target, kind)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
