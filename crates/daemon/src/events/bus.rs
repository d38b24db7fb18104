// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed publish/subscribe hub behind the SSE endpoint.
//!
//! Each subscriber owns a bounded queue. Publishing never blocks: a full
//! queue inside the attach grace period just drops that event for that
//! subscriber, a full queue after the grace period evicts the subscriber.
//! Eviction closes the subscriber's channel exactly once, which ends its
//! SSE stream. The bus owns subscriber channels exclusively.

use catnip_core::{Clock, Event, EventRecord, SystemClock};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Queue depth per subscriber.
const SUBSCRIBER_QUEUE: usize = 100;

/// Window after attach during which a full queue is tolerated.
const ATTACH_GRACE: Duration = Duration::from_secs(2);

/// Heartbeat cadence on an otherwise idle stream.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<EventRecord>,
    attached_at: Instant,
}

/// The event hub. Cheap to clone via `Arc`.
pub struct EventBus<C: Clock = SystemClock> {
    clock: C,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber_id: AtomicU64,
    next_event_id: AtomicU64,
    last_publish: Mutex<Instant>,
}

impl EventBus<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for EventBus<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> EventBus<C> {
    pub fn with_clock(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(1),
            next_event_id: AtomicU64::new(1),
            last_publish: Mutex::new(now),
        }
    }

    /// Attach a subscriber. The receiver closing means the bus evicted it or
    /// is shutting down.
    pub fn subscribe(&self) -> (u64, mpsc::Receiver<EventRecord>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().push(Subscriber {
            id,
            tx,
            attached_at: self.clock.now(),
        });
        debug!(subscriber = id, "sse subscriber attached");
        (id, rx)
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|s| s.id != id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Publish an event to every subscriber. Returns `false` when the event
    /// was rejected (empty type).
    pub fn publish(&self, event: Event) -> bool {
        if event.event_type().is_empty() {
            warn!("dropping event with empty type");
            return false;
        }
        let record = EventRecord {
            event,
            timestamp_ms: self.clock.epoch_ms(),
            id: self.next_event_id.fetch_add(1, Ordering::SeqCst),
        };
        let now = self.clock.now();
        *self.last_publish.lock() = now;

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sub| {
            match sub.tx.try_send(record.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if now.saturating_duration_since(sub.attached_at) < ATTACH_GRACE {
                        // Still replaying initial state; drop this event for
                        // the subscriber but keep it attached.
                        true
                    } else {
                        warn!(subscriber = sub.id, "evicting slow sse subscriber");
                        false
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
        true
    }

    /// How long since anything was published.
    pub fn idle_for(&self) -> Duration {
        self.clock.now().saturating_duration_since(*self.last_publish.lock())
    }

    /// Next wire id without publishing; used for the per-stream priming
    /// records that are not broadcast.
    pub fn mint_record(&self, event: Event) -> EventRecord {
        EventRecord {
            event,
            timestamp_ms: self.clock.epoch_ms(),
            id: self.next_event_id.fetch_add(1, Ordering::SeqCst),
        }
    }
}

/// Emit a heartbeat whenever the bus has been idle for a full interval.
pub async fn run_heartbeat(bus: Arc<EventBus>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if bus.idle_for() >= HEARTBEAT_INTERVAL {
                    bus.publish(Event::Heartbeat);
                }
            }
            _ = cancel.cancelled() => return,
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
