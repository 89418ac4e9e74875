//! Event model
//!
//! Host objects ([`EventTarget`]) receive subscriptions and events. Raw
//! signals from the host (scroll, scroll end, touches) and emulated snap
//! notifications share the same [`Event`] shape.

use std::fmt;
use std::time::Duration;

use smallvec::SmallVec;

use crate::tree::ElementId;

/// An object that accepts event subscriptions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Document,
    Element(ElementId),
}

impl EventTarget {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            EventTarget::Element(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<ElementId> for EventTarget {
    fn from(id: ElementId) -> Self {
        EventTarget::Element(id)
    }
}

/// Event type names
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Scroll,
    ScrollEnd,
    TouchStart,
    TouchEnd,
    TouchCancel,
    ScrollSnapChange,
    ScrollSnapChanging,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Scroll => "scroll",
            EventType::ScrollEnd => "scrollend",
            EventType::TouchStart => "touchstart",
            EventType::TouchEnd => "touchend",
            EventType::TouchCancel => "touchcancel",
            EventType::ScrollSnapChange => "scrollsnapchange",
            EventType::ScrollSnapChanging => "scrollsnapchanging",
            EventType::Other(name) => name,
        }
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "scroll" => EventType::Scroll,
            "scrollend" => EventType::ScrollEnd,
            "touchstart" => EventType::TouchStart,
            "touchend" => EventType::TouchEnd,
            "touchcancel" => EventType::TouchCancel,
            "scrollsnapchange" => EventType::ScrollSnapChange,
            "scrollsnapchanging" => EventType::ScrollSnapChanging,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The emulated notification kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapEventKind {
    /// `scrollsnapchange`: raised once scrolling has settled
    Change,
    /// `scrollsnapchanging`: raised while scrolling moves
    Changing,
}

impl SnapEventKind {
    pub const ALL: [SnapEventKind; 2] = [SnapEventKind::Change, SnapEventKind::Changing];

    pub fn event_type(self) -> EventType {
        match self {
            SnapEventKind::Change => EventType::ScrollSnapChange,
            SnapEventKind::Changing => EventType::ScrollSnapChanging,
        }
    }

    pub fn from_event_type(event_type: &EventType) -> Option<Self> {
        match event_type {
            EventType::ScrollSnapChange => Some(SnapEventKind::Change),
            EventType::ScrollSnapChanging => Some(SnapEventKind::Changing),
            _ => None,
        }
    }
}

/// Identity of one dispatched event instance
///
/// Assigned by the runtime at dispatch; two deliveries of the same event
/// to different listeners share a serial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventSerial(pub u64);

/// Identifier of a touch point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

/// An event delivered to listeners
#[derive(Clone, Debug)]
pub struct Event {
    pub serial: EventSerial,
    pub event_type: EventType,
    /// Where the event originated
    pub target: EventTarget,
    /// Whose listener is currently running
    pub current_target: EventTarget,
    pub bubbles: bool,
    /// Host time at dispatch
    pub time_stamp: Duration,
    /// Block-axis snap target (snap notifications only)
    pub snap_target_block: Option<ElementId>,
    /// Inline-axis snap target (snap notifications only)
    pub snap_target_inline: Option<ElementId>,
    /// Touch points that changed (touch events only)
    pub changed_touches: SmallVec<[PointerId; 4]>,
}

impl Event {
    /// Create a non-bubbling event aimed at `target`
    pub fn new(event_type: EventType, target: EventTarget) -> Self {
        Self {
            serial: EventSerial::default(),
            event_type,
            target,
            current_target: target,
            bubbles: false,
            time_stamp: Duration::ZERO,
            snap_target_block: None,
            snap_target_inline: None,
            changed_touches: SmallVec::new(),
        }
    }

    /// Create a snap notification carrying both resolved targets
    pub fn snap(
        kind: SnapEventKind,
        target: EventTarget,
        block: Option<ElementId>,
        inline: Option<ElementId>,
    ) -> Self {
        let mut event = Self::new(kind.event_type(), target);
        event.snap_target_block = block;
        event.snap_target_inline = inline;
        event
    }

    /// Create a touch event at the document
    pub fn touch(event_type: EventType, pointers: &[PointerId]) -> Self {
        let mut event = Self::new(event_type, EventTarget::Document);
        event.bubbles = true;
        event.changed_touches = pointers.iter().copied().collect();
        event
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Whether the listener runs on the element the event originated from
    pub fn is_at_target(&self) -> bool {
        self.target == self.current_target
    }
}
