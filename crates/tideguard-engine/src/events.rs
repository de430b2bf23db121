//! Event fan-out: durable outbox plus live broadcast, and idempotent apply
//! for consumers.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{HazardEvent, HazardEventKind};
use tideguard_core::traits::IHazardStorage;

/// Appends every event to the storage event log, then broadcasts it.
///
/// Delivery is at-least-once: a subscriber that lags or reconnects catches
/// up from [`IHazardStorage::events_since`] and dedups with [`EventApplier`].
/// An event whose append fails is held in a pending queue and appended
/// before any newer event, either by the next publish or by
/// [`EventBus::flush_pending`].
pub struct EventBus {
    storage: Arc<dyn IHazardStorage>,
    sender: broadcast::Sender<HazardEvent>,
    pending: Mutex<VecDeque<HazardEvent>>,
}

impl EventBus {
    pub fn new(storage: Arc<dyn IHazardStorage>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            storage,
            sender,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Persist, stamp the sequence, and broadcast.
    ///
    /// On error the event is queued, not dropped.
    pub fn publish(&self, event: HazardEvent) -> TideguardResult<HazardEvent> {
        let mut pending = self.lock_pending();
        if let Err(e) = self.drain(&mut pending) {
            pending.push_back(event);
            return Err(e);
        }
        match self.deliver(&event) {
            Ok(delivered) => Ok(delivered),
            Err(e) => {
                pending.push_back(event);
                Err(e)
            }
        }
    }

    /// Append queued events in order. Returns how many were delivered.
    pub fn flush_pending(&self) -> TideguardResult<usize> {
        let mut pending = self.lock_pending();
        self.drain(&mut pending)
    }

    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    /// Broadcast without persisting. Used for keepalives, which carry no state.
    pub fn broadcast_only(&self, event: HazardEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HazardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<HazardEvent>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drain(&self, pending: &mut VecDeque<HazardEvent>) -> TideguardResult<usize> {
        let mut delivered = 0;
        while let Some(front) = pending.front() {
            self.deliver(front)?;
            pending.pop_front();
            delivered += 1;
        }
        Ok(delivered)
    }

    fn deliver(&self, event: &HazardEvent) -> TideguardResult<HazardEvent> {
        let sequence = self.storage.append_event(event)?;
        let mut event = event.clone();
        event.sequence = Some(sequence);
        // No subscribers is fine: the outbox already has the event.
        let _ = self.sender.send(event.clone());
        tracing::trace!(
            kind = %event.kind,
            subject_id = %event.subject_id,
            version = event.version,
            sequence,
            "event published"
        );
        Ok(event)
    }
}

/// Recent event ids an [`EventApplier`] remembers. Older redeliveries are
/// still caught by the version check.
pub const SEEN_WINDOW: usize = 4096;

/// Consumer-side dedup by `event_id` and `(kind, subject, version)`.
///
/// An event is applied once. Redeliveries and events older than the last
/// applied version for the same kind and subject are skipped.
#[derive(Debug)]
pub struct EventApplier {
    seen: HashSet<String>,
    seen_order: VecDeque<String>,
    window: usize,
    latest: HashMap<(HazardEventKind, String), u64>,
    last_sequence: u64,
}

impl Default for EventApplier {
    fn default() -> Self {
        Self::with_window(SEEN_WINDOW)
    }
}

impl EventApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applier that remembers at most `window` event ids.
    pub fn with_window(window: usize) -> Self {
        Self {
            seen: HashSet::new(),
            seen_order: VecDeque::new(),
            window: window.max(1),
            latest: HashMap::new(),
            last_sequence: 0,
        }
    }

    /// Returns `true` when the event is new and should be applied.
    pub fn apply(&mut self, event: &HazardEvent) -> bool {
        if let Some(seq) = event.sequence {
            self.last_sequence = self.last_sequence.max(seq);
        }
        if event.kind == HazardEventKind::Keepalive {
            return false;
        }
        if !self.remember(&event.event_id) {
            return false;
        }
        let key = (event.kind, event.subject_id.clone());
        match self.latest.get(&key) {
            Some(&applied) if applied >= event.version => false,
            _ => {
                self.latest.insert(key, event.version);
                true
            }
        }
    }

    pub fn remembered_ids(&self) -> usize {
        self.seen.len()
    }

    fn remember(&mut self, event_id: &str) -> bool {
        if !self.seen.insert(event_id.to_string()) {
            return false;
        }
        self.seen_order.push_back(event_id.to_string());
        while self.seen_order.len() > self.window {
            if let Some(oldest) = self.seen_order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    /// Highest sequence observed; resume catch-up from here.
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn applied_version(&self, kind: HazardEventKind, subject_id: &str) -> Option<u64> {
        self.latest.get(&(kind, subject_id.to_string())).copied()
    }
}
