//! Change notifications raised when a sync cycle imports new remote quotes.
//!
//! A notice carries no payload beyond the number of added records, needs no
//! acknowledgment and expires on its own after a fixed display duration:
//!
//! - `TransientNotifier::notify(added)`: raise a fresh notice and forward it to subscribers.
//! - `TransientNotifier::current()`: the notice, while it is still fresh.
//! - `TransientNotifier::expire()`: drop a stale notice; returns whether one was dropped.
//!
//! Time is measured with `std::time::Instant`, which is monotonic and immune to system
//! clock changes.
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::info;

/// Observer of merge outcomes.
pub trait ChangeNotifier: Send + Sync {
    /// Called once for every sync cycle that added at least one record.
    fn notify(&self, added: usize);
}

impl<T: ChangeNotifier + ?Sized> ChangeNotifier for Arc<T> {
    fn notify(&self, added: usize) {
        (**self).notify(added);
    }
}

/// Writes a log line per notification.
pub struct LogNotifier;

impl ChangeNotifier for LogNotifier {
    fn notify(&self, added: usize) {
        if added > 0 {
            info!("Quotes synced with server: {} new", added);
        }
    }
}

/// A raised notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    /// Number of records the cycle added.
    pub added: usize,
    /// When the notice was raised.
    pub raised_at: Instant,
}

impl Notice {
    /// Whether the notice is older than `ttl` at `now`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.raised_at) > ttl
    }
}

/// Holds the latest notice for a fixed display duration.
pub struct TransientNotifier {
    current: Mutex<Option<Notice>>,
    subscribers: Mutex<Vec<Sender<Notice>>>,
    ttl: Duration,
}

impl TransientNotifier {
    /// Creates a notifier whose notices stay visible for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            ttl,
        }
    }

    /// Display duration of a notice.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a channel receiving every notice as it is raised.
    pub fn subscribe(&self) -> Receiver<Notice> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// The latest notice if it has not expired yet.
    pub fn current(&self) -> Option<Notice> {
        let now = Instant::now();
        self.current
            .lock()
            .ok()
            .and_then(|current| *current)
            .filter(|notice| !notice.is_expired(now, self.ttl))
    }

    /// Clears the notice once it is stale. Returns `true` when one was cleared.
    pub fn expire(&self) -> bool {
        let now = Instant::now();
        let Ok(mut current) = self.current.lock() else {
            return false;
        };
        match *current {
            Some(notice) if notice.is_expired(now, self.ttl) => {
                *current = None;
                true
            }
            _ => false,
        }
    }
}

impl ChangeNotifier for TransientNotifier {
    fn notify(&self, added: usize) {
        if added == 0 {
            return;
        }
        let notice = Notice {
            added,
            raised_at: Instant::now(),
        };
        if let Ok(mut current) = self.current.lock() {
            *current = Some(notice);
        }
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(notice).is_ok());
        }
    }
}

/// Forwards every notification to each inner notifier.
#[derive(Default)]
pub struct FanoutNotifier {
    notifiers: Vec<Box<dyn ChangeNotifier>>,
}

impl FanoutNotifier {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notifier.
    pub fn with(mut self, notifier: impl ChangeNotifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }
}

impl ChangeNotifier for FanoutNotifier {
    fn notify(&self, added: usize) {
        for notifier in &self.notifiers {
            notifier.notify(added);
        }
    }
}
