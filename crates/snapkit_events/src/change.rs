//! Change detection
//!
//! Each emulator remembers the block/inline targets it last announced and
//! only raises a notification when the freshly resolved pair differs.
//! Remembered targets are weak: once the element leaves the tree the slot
//! reads as empty.

use snapkit_core::{
    ElementId, Event, EventTarget, LogicalAxis, PhysicalAxis, SnapEventKind,
    StyleAndGeometryProvider,
};

use crate::delta::ScrollDeltaTracker;
use crate::resolver::{writing_mode_of, SnapTargetResolver};

/// A non-owning reference to an element
///
/// Upgrading checks liveness against the provider, so a removed element is
/// never handed back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeakElement(Option<ElementId>);

impl WeakElement {
    pub fn new(id: Option<ElementId>) -> Self {
        Self(id)
    }

    pub fn upgrade<P>(&self, provider: &P) -> Option<ElementId>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        self.0.filter(|id| provider.is_alive(*id))
    }
}

/// The last announced target pair
#[derive(Clone, Copy, Debug, Default)]
pub struct LastSnapped {
    block: WeakElement,
    inline: WeakElement,
}

impl LastSnapped {
    pub fn block<P>(&self, provider: &P) -> Option<ElementId>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        self.block.upgrade(provider)
    }

    pub fn inline<P>(&self, provider: &P) -> Option<ElementId>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        self.inline.upgrade(provider)
    }

    pub fn store(&mut self, block: Option<ElementId>, inline: Option<ElementId>) {
        self.block = WeakElement::new(block);
        self.inline = WeakElement::new(inline);
    }
}

/// The scrolling container a raw signal on `target` refers to
pub fn container_element<P>(provider: &P, target: EventTarget) -> Option<ElementId>
where
    P: StyleAndGeometryProvider + ?Sized,
{
    match target {
        EventTarget::Element(id) => Some(id),
        EventTarget::Document => provider.scrolling_element(),
        EventTarget::Window => None,
    }
}

/// Delta tracking plus last-announced state for one emulator
#[derive(Debug, Default)]
pub struct SnapChangeDetector {
    tracker: ScrollDeltaTracker,
    last: LastSnapped,
}

impl SnapChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> &LastSnapped {
        &self.last
    }

    /// Resolve the targets for a raw scroll or settle signal
    ///
    /// Returns the notification to raise, if the pair changed. Signals that
    /// reached this listener from a nested scroller are ignored.
    pub fn check<P>(
        &mut self,
        provider: &P,
        resolver: &SnapTargetResolver,
        event: &Event,
        kind: SnapEventKind,
    ) -> Option<Event>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        if !event.is_at_target() {
            return None;
        }
        let container = container_element(provider, event.target)?;

        let delta = self.tracker.observe(provider, container, event.serial);
        let writing_mode = writing_mode_of(provider, container);

        let previous_block = self.last.block(provider);
        let previous_inline = self.last.inline(provider);
        let mut block = previous_block;
        let mut inline = previous_inline;

        for (axis, moved) in [
            (PhysicalAxis::X, delta.moved_x()),
            (PhysicalAxis::Y, delta.moved_y()),
        ] {
            if !moved {
                continue;
            }
            let target = resolver.resolve_physical(provider, container, axis);
            match writing_mode.logical_axis(axis) {
                LogicalAxis::Block => block = target,
                LogicalAxis::Inline => inline = target,
            }
        }

        if block == previous_block && inline == previous_inline {
            return None;
        }

        self.last.store(block, inline);
        tracing::debug!(
            "{} on {:?}: block={:?} inline={:?}",
            kind.event_type(),
            container,
            block,
            inline
        );
        Some(Event::snap(kind, event.target, block, inline))
    }
}
