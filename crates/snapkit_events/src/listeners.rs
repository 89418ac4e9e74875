//! Listener storage
//!
//! Listeners are registered per (host object, event type) and delivered in
//! registration order. A listener is either a user callback or one of the
//! raw-signal observers an emulator installs on its host.
//!
//! ```text
//! add_event_listener(target, type, cb)
//!     ↓
//! ListenerTable (indexed by target + type)
//!     ↓ SnapEventRuntime::dispatch_event walks the propagation path
//! callback invoked / emulator fed
//! ```

use std::rc::Rc;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use snapkit_core::{Event, EventTarget, EventType};

use crate::emulator::EmulatorId;

new_key_type! {
    /// Handle returned by `add_event_listener`
    pub struct ListenerId;
}

/// Callback for handling events
///
/// Uses Rc since dispatch is single-threaded.
pub type EventCallback = Rc<dyn Fn(&Event)>;

#[derive(Clone)]
pub enum ListenerHandler {
    Callback(EventCallback),
    /// Raw-signal observer owned by an emulator
    Emulator(EmulatorId),
}

impl std::fmt::Debug for ListenerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerHandler::Callback(_) => f.write_str("Callback(..)"),
            ListenerHandler::Emulator(id) => f.debug_tuple("Emulator").field(id).finish(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Run during the capture phase instead of the bubble phase
    pub capture: bool,
    /// The listener never cancels the event
    pub passive: bool,
    /// Run at most once
    pub once: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }

    pub fn passive(mut self) -> Self {
        self.passive = true;
        self
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

/// Propagation phase a listener is collected for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Capturing,
    AtTarget,
    Bubbling,
}

struct ListenerEntry {
    target: EventTarget,
    event_type: EventType,
    handler: ListenerHandler,
    options: ListenerOptions,
    /// A `once` listener that already ran
    spent: bool,
}

/// All registered listeners
#[derive(Default)]
pub struct ListenerTable {
    entries: SlotMap<ListenerId, ListenerEntry>,
    index: FxHashMap<(EventTarget, EventType), IndexSet<ListenerId>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        handler: ListenerHandler,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = self.entries.insert(ListenerEntry {
            target,
            event_type: event_type.clone(),
            handler,
            options,
            spent: false,
        });
        self.index.entry((target, event_type)).or_default().insert(id);
        id
    }

    /// Remove a user callback registered on `target` for `event_type`
    ///
    /// Returns false when `id` is unknown, belongs to another target or type,
    /// or is an emulator observer.
    pub fn remove_callback(&mut self, target: EventTarget, event_type: &EventType, id: ListenerId) -> bool {
        let matches = self.entries.get(id).is_some_and(|entry| {
            entry.target == target
                && &entry.event_type == event_type
                && matches!(entry.handler, ListenerHandler::Callback(_))
        });
        matches && self.remove(id)
    }

    /// Remove any listener by id
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };
        let key = (entry.target, entry.event_type);
        if let Some(ids) = self.index.get_mut(&key) {
            ids.shift_remove(&id);
            if ids.is_empty() {
                self.index.remove(&key);
            }
        }
        true
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.contains_key(id)
    }

    /// Listeners on `target` that run in `phase`, in registration order
    ///
    /// At the target, capturing listeners run before the others.
    pub fn collect(
        &self,
        target: EventTarget,
        event_type: &EventType,
        phase: Phase,
    ) -> SmallVec<[(ListenerId, ListenerHandler, bool); 8]> {
        let Some(ids) = self.index.get(&(target, event_type.clone())) else {
            return SmallVec::new();
        };

        let mut capturing: SmallVec<[_; 8]> = SmallVec::new();
        let mut bubbling: SmallVec<[_; 8]> = SmallVec::new();
        for id in ids {
            let Some(entry) = self.entries.get(*id) else {
                continue;
            };
            if entry.spent {
                continue;
            }
            let item = (*id, entry.handler.clone(), entry.options.once);
            if entry.options.capture {
                capturing.push(item);
            } else {
                bubbling.push(item);
            }
        }

        match phase {
            Phase::Capturing => capturing,
            Phase::Bubbling => bubbling,
            Phase::AtTarget => {
                capturing.extend(bubbling);
                capturing
            }
        }
    }

    /// Stop a `once` listener from running again
    ///
    /// The entry stays registered until it is explicitly removed.
    pub fn mark_spent(&mut self, id: ListenerId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.spent = true;
        }
    }

    /// Number of registered listeners, spent ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether anything listens for `event_type` on `target`
    pub fn has_listeners(&self, target: EventTarget, event_type: &EventType) -> bool {
        self.index.contains_key(&(target, event_type.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> ListenerHandler {
        let log = log.clone();
        ListenerHandler::Callback(Rc::new(move |_: &Event| log.borrow_mut().push(name)))
    }

    fn run(table: &ListenerTable, target: EventTarget, phase: Phase) {
        let event = Event::new(EventType::Scroll, target);
        for (_, handler, _) in table.collect(target, &EventType::Scroll, phase) {
            if let ListenerHandler::Callback(cb) = handler {
                cb(&event);
            }
        }
    }

    #[test]
    fn test_phases_and_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = ListenerTable::new();
        let doc = EventTarget::Document;
        table.add(doc, EventType::Scroll, recording(&log, "bubble-a"), ListenerOptions::default());
        table.add(doc, EventType::Scroll, recording(&log, "capture"), ListenerOptions::capture());
        table.add(doc, EventType::Scroll, recording(&log, "bubble-b"), ListenerOptions::default());

        run(&table, doc, Phase::Capturing);
        assert_eq!(*log.borrow(), vec!["capture"]);

        log.borrow_mut().clear();
        run(&table, doc, Phase::AtTarget);
        assert_eq!(*log.borrow(), vec!["capture", "bubble-a", "bubble-b"]);

        log.borrow_mut().clear();
        run(&table, doc, Phase::Bubbling);
        assert_eq!(*log.borrow(), vec!["bubble-a", "bubble-b"]);
    }

    #[test]
    fn test_remove_callback_checks_target_and_type() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = ListenerTable::new();
        let id = table.add(
            EventTarget::Window,
            EventType::ScrollSnapChange,
            recording(&log, "cb"),
            ListenerOptions::default(),
        );

        assert!(!table.remove_callback(EventTarget::Document, &EventType::ScrollSnapChange, id));
        assert!(!table.remove_callback(EventTarget::Window, &EventType::Scroll, id));
        assert!(table.remove_callback(EventTarget::Window, &EventType::ScrollSnapChange, id));
        assert!(!table.remove_callback(EventTarget::Window, &EventType::ScrollSnapChange, id));
        assert!(!table.has_listeners(EventTarget::Window, &EventType::ScrollSnapChange));
        assert!(table.is_empty());
    }

    #[test]
    fn test_emulator_observer_not_removable_as_callback() {
        let mut table = ListenerTable::new();
        let id = table.add(
            EventTarget::Document,
            EventType::Scroll,
            ListenerHandler::Emulator(EmulatorId::default()),
            ListenerOptions::capture().passive(),
        );
        assert!(!table.remove_callback(EventTarget::Document, &EventType::Scroll, id));
        assert!(table.remove(id));
    }

    #[test]
    fn test_spent_once_listener_stays_registered() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = ListenerTable::new();
        let id = table.add(
            EventTarget::Document,
            EventType::Scroll,
            recording(&log, "once"),
            ListenerOptions::default().once(),
        );

        table.mark_spent(id);
        run(&table, EventTarget::Document, Phase::AtTarget);
        assert!(log.borrow().is_empty());
        assert!(table.contains(id));
        assert_eq!(table.len(), 1);
    }
}
