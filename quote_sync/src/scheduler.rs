//! Sync scheduler: runs merge cycles on a fixed period and on demand.
//!
//! A cycle fetches the remote batch, merges it into the record store and, when anything
//! was added, persists the merged collection and notifies observers. Only one cycle runs
//! at a time; a trigger arriving while a cycle is in flight is dropped, not queued.
//!
//! Concurrency and shutdown:
//! - The fetch runs without holding the store lock. The merge reads the store contents
//!   under the same lock that persists the result, so a quote added locally while a fetch
//!   is in flight is part of the merge input and cannot be overwritten.
//! - The timer thread multiplexes a `tick` channel, a manual trigger channel and a stop
//!   channel with crossbeam `select!`. Ticks and triggers that arrive during a cycle are
//!   discarded once it ends.
//! - Errors of a scheduled cycle are logged; the loop keeps running.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, select, tick, unbounded};
use log::{debug, error, info};
use quote_common::{Result, SyncError, SyncState};

use crate::gateway::RemoteGateway;
use crate::merge::merge;
use crate::notifier::ChangeNotifier;
use crate::store::SharedStore;

/// What a call to [`SyncScheduler::run_once`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another cycle was running; nothing happened.
    Skipped,
    /// A full cycle ran and added `added` remote records.
    Completed {
        /// Number of records imported.
        added: usize,
    },
}

/// Marks the scheduler as running for its lifetime.
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { running })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Drives merge cycles against one store, gateway and notifier.
pub struct SyncScheduler {
    store: SharedStore,
    gateway: Arc<dyn RemoteGateway>,
    notifier: Arc<dyn ChangeNotifier>,
    period: Duration,
    running: AtomicBool,
}

impl SyncScheduler {
    /// Creates an idle scheduler that will run every `period` once started.
    pub fn new(
        store: SharedStore,
        gateway: Arc<dyn RemoteGateway>,
        notifier: Arc<dyn ChangeNotifier>,
        period: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            period,
            running: AtomicBool::new(false),
        }
    }

    /// Current run state.
    pub fn state(&self) -> SyncState {
        SyncState::from_running(self.running.load(Ordering::Acquire))
    }

    /// Period between scheduled cycles.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs one merge cycle now unless one is already running.
    ///
    /// The state returns to idle on every exit path.
    pub fn run_once(&self) -> Result<SyncOutcome> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            debug!("Sync already running, trigger dropped");
            return Ok(SyncOutcome::Skipped);
        };

        let batch = self.gateway.fetch_remote_batch();
        let added = {
            let mut store = self.store.lock()?;
            let outcome = merge(store.all(), &batch);
            if outcome.has_additions() {
                store.replace(outcome.records)?;
            }
            outcome.added
        };

        if added > 0 {
            info!("Sync added {} quotes from the server", added);
            self.notifier.notify(added);
        } else {
            debug!("Sync finished, nothing new ({} remote quotes)", batch.len());
        }
        Ok(SyncOutcome::Completed { added })
    }

    /// Starts the timer thread.
    ///
    /// The first scheduled cycle happens one period after start; call
    /// [`SyncScheduler::run_once`] beforehand for an immediate reconciliation.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (trigger_tx, trigger_rx) = bounded::<()>(1);
        let (stop_tx, stop_rx) = unbounded::<()>();
        info!("Sync scheduler started, period {:?}", self.period);
        let thread = thread::spawn(move || self.timer_loop(trigger_rx, stop_rx));
        SchedulerHandle {
            trigger_tx,
            stop_tx,
            thread: Some(thread),
        }
    }

    fn timer_loop(&self, trigger_rx: Receiver<()>, stop_rx: Receiver<()>) {
        let ticker = tick(self.period);
        loop {
            select! {
                recv(stop_rx) -> _ => break,
                recv(trigger_rx) -> msg => {
                    if msg.is_err() {
                        break;
                    }
                    self.run_logged();
                },
                recv(ticker) -> _ => {
                    self.run_logged();
                },
            }
            while trigger_rx.try_recv().is_ok() || ticker.try_recv().is_ok() {}
        }
        info!("Sync scheduler stopping...");
    }

    /// Runs one cycle like [`SyncScheduler::run_once`], logging a failure instead of
    /// returning it.
    pub fn run_logged(&self) -> Option<SyncOutcome> {
        match self.run_once() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Sync cycle failed: {}", e);
                None
            }
        }
    }
}

/// Controls a started scheduler. Dropping the handle stops it.
pub struct SchedulerHandle {
    trigger_tx: Sender<()>,
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Asks for a cycle as soon as the timer thread is free.
    ///
    /// At most one request is kept pending; requests made while a cycle runs are dropped.
    pub fn trigger(&self) -> Result<()> {
        match self.trigger_tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => Ok(()),
            Err(e) => Err(SyncError::ChannelSend(e.to_string())),
        }
    }

    /// A sender that triggers cycles, for components that outlive a borrow of the handle.
    pub fn trigger_sender(&self) -> Sender<()> {
        self.trigger_tx.clone()
    }

    /// Stops the timer thread and waits for the current cycle to finish.
    pub fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.stop_tx.send(());
            if thread.join().is_err() {
                error!("Sync scheduler thread panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
