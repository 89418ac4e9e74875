//! Activation manager
//!
//! Emulation for a (host object, kind) pair is installed lazily on the first
//! subscription and torn down when the last one goes away. The manager only
//! counts; what "install" and "teardown" mean is supplied by the caller.

use rustc_hash::FxHashMap;
use snapkit_core::{EventTarget, EventType, HostFeatures, SnapEventKind};
use smallvec::SmallVec;

/// Result of a subscribe or unsubscribe call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// First subscriber; the emulator was installed
    Installed,
    /// Emulator already present; subscriber count after the call
    Retained { subscribers: usize },
    /// Last subscriber left; the emulator was torn down
    TornDown,
    /// Not an emulated event type
    PassThrough,
    /// Unsubscribe for a pair that has no emulator
    NotSubscribed,
}

struct ActivationRecord<H> {
    handle: H,
    subscribers: usize,
}

/// Reference-counted emulator registry keyed by (host, kind)
pub struct ActivationManager<H> {
    kinds: SmallVec<[SnapEventKind; 2]>,
    records: FxHashMap<(EventTarget, SnapEventKind), ActivationRecord<H>>,
}

impl<H> ActivationManager<H> {
    /// Manage the given kinds
    pub fn new(kinds: impl IntoIterator<Item = SnapEventKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            records: FxHashMap::default(),
        }
    }

    /// Manage every kind the host lacks natively
    pub fn for_host(features: &HostFeatures) -> Self {
        let manager = Self::new(
            SnapEventKind::ALL
                .into_iter()
                .filter(|kind| !features.supports_natively(*kind)),
        );
        tracing::debug!("emulating {:?}", manager.kinds);
        manager
    }

    /// The emulated kind behind `event_type`, if it is one
    pub fn emulates(&self, event_type: &EventType) -> Option<SnapEventKind> {
        SnapEventKind::from_event_type(event_type).filter(|kind| self.kinds.contains(kind))
    }

    pub fn subscribe<F>(&mut self, target: EventTarget, event_type: &EventType, install: F) -> ActivationOutcome
    where
        F: FnOnce(EventTarget, SnapEventKind) -> H,
    {
        let Some(kind) = self.emulates(event_type) else {
            return ActivationOutcome::PassThrough;
        };

        match self.records.get_mut(&(target, kind)) {
            Some(record) => {
                record.subscribers += 1;
                ActivationOutcome::Retained {
                    subscribers: record.subscribers,
                }
            }
            None => {
                tracing::debug!("installing {} emulation on {:?}", event_type, target);
                let handle = install(target, kind);
                self.records.insert(
                    (target, kind),
                    ActivationRecord {
                        handle,
                        subscribers: 1,
                    },
                );
                ActivationOutcome::Installed
            }
        }
    }

    pub fn unsubscribe<F>(&mut self, target: EventTarget, event_type: &EventType, teardown: F) -> ActivationOutcome
    where
        F: FnOnce(H),
    {
        let Some(kind) = self.emulates(event_type) else {
            return ActivationOutcome::PassThrough;
        };
        let Some(record) = self.records.get_mut(&(target, kind)) else {
            return ActivationOutcome::NotSubscribed;
        };

        record.subscribers -= 1;
        if record.subscribers > 0 {
            return ActivationOutcome::Retained {
                subscribers: record.subscribers,
            };
        }

        match self.records.remove(&(target, kind)) {
            Some(record) => {
                tracing::debug!("tearing down {} emulation on {:?}", event_type, target);
                teardown(record.handle);
                ActivationOutcome::TornDown
            }
            None => ActivationOutcome::NotSubscribed,
        }
    }

    pub fn subscribers(&self, target: EventTarget, kind: SnapEventKind) -> usize {
        self.records
            .get(&(target, kind))
            .map_or(0, |record| record.subscribers)
    }

    pub fn handle(&self, target: EventTarget, kind: SnapEventKind) -> Option<&H> {
        self.records.get(&(target, kind)).map(|record| &record.handle)
    }

    /// Number of installed emulators
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
