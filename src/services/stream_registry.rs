//! Per-session live event queues shared by publishers and stream readers.
//!
//! The registry is created once at startup and handed to everything that
//! publishes or streams. Each session gets a FIFO queue plus a wake-up signal.
//! An entry is reclaimed when its `done` event is consumed, or by
//! [`StreamRegistry::reap_idle`] once nobody has touched it for the idle timeout.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::models::{EventType, SessionEvent};

#[derive(Debug)]
struct StreamEntry {
    queue: Mutex<VecDeque<SessionEvent>>,
    notify: Notify,
    touched: Mutex<Instant>,
}

impl StreamEntry {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            touched: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *lock(&self.touched) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        lock(&self.touched).elapsed()
    }
}

/// Queue contents stay consistent even if a holder panicked mid-push.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct StreamRegistry {
    entries: Mutex<HashMap<String, Arc<StreamEntry>>>,
    idle_timeout: Duration,
}

impl StreamRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    fn entry(&self, session_id: &str) -> Arc<StreamEntry> {
        lock(&self.entries)
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(StreamEntry::new()))
            .clone()
    }

    /// Queue an event for the session and wake any waiting reader.
    pub fn publish(&self, event: SessionEvent) {
        let entry = self.entry(&event.session_id);
        debug!(session_id = %event.session_id, event_type = %event.event_type, "Publishing live event");
        lock(&entry.queue).push_back(event);
        entry.touch();
        entry.notify.notify_waiters();
    }

    /// Attach a reader to the session's queue, creating it if needed.
    pub fn subscribe(self: &Arc<Self>, session_id: &str) -> Subscription {
        let entry = self.entry(session_id);
        entry.touch();
        Subscription {
            session_id: session_id.to_string(),
            entry,
            registry: Arc::clone(self),
        }
    }

    /// Drop the session's entry and any events still queued.
    pub fn finish(&self, session_id: &str) {
        if lock(&self.entries).remove(session_id).is_some() {
            debug!(session_id, "Stream entry reclaimed");
        }
    }

    /// Remove entries idle past the timeout that have no attached reader.
    pub fn reap_idle(&self) -> usize {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|_, entry| {
            Arc::strong_count(entry) > 1 || entry.idle_for() < self.idle_timeout
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reap idle entries every `every` until shutdown.
    pub fn spawn_reaper(
        self: &Arc<Self>,
        every: Duration,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let reaped = registry.reap_idle();
                        if reaped > 0 {
                            info!(reaped, "Reclaimed idle stream entries");
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        })
    }
}

/// A reader attached to one session's queue.
#[derive(Debug)]
pub struct Subscription {
    session_id: String,
    entry: Arc<StreamEntry>,
    registry: Arc<StreamRegistry>,
}

impl Subscription {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Reclaim the session's registry entry.
    pub fn close(&self) {
        self.registry.finish(&self.session_id);
    }

    /// Pop the next queued event if one is ready.
    pub fn try_next(&self) -> Option<SessionEvent> {
        let event = lock(&self.entry.queue).pop_front();
        if let Some(event) = &event {
            self.entry.touch();
            if event.event_type == EventType::Done {
                self.close();
            }
        }
        event
    }

    /// Wait for the next event. Cancel-safe: dropping the future loses nothing.
    pub async fn next(&self) -> SessionEvent {
        loop {
            let notified = self.entry.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(event) = self.try_next() {
                return event;
            }
            notified.await;
        }
    }
}
