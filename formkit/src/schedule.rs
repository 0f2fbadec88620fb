//! Deferred invocation.
//!
//! Focus-on-error must not run inside the update that discovered the error,
//! so fields hand the work to a [`Scheduler`]. The host drains the queue on
//! its next tick with [`Scheduler::run_pending`]. Hosts with an async event
//! loop can create the scheduler with [`Scheduler::with_wakeup`] and block on
//! the returned receiver while idle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

use log::trace;
use tokio::sync::mpsc;

type Task = Box<dyn FnOnce() + Send>;

/// Queue of callbacks to run after the current synchronous work completes.
///
/// Cloning yields a handle to the same queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Arc<Mutex<VecDeque<Task>>>,
    wakeup: Option<WakeupSender>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheduler that signals `WakeupReceiver` whenever work is queued.
    pub fn with_wakeup() -> (Self, WakeupReceiver) {
        let (tx, rx) = mpsc::channel(16);
        let scheduler = Self {
            queue: Arc::default(),
            wakeup: Some(WakeupSender { tx }),
        };
        (scheduler, WakeupReceiver { rx })
    }

    /// The process-wide scheduler used when no other scheduler is configured.
    pub fn global() -> Scheduler {
        static GLOBAL: OnceLock<Scheduler> = OnceLock::new();
        GLOBAL.get_or_init(Scheduler::new).clone()
    }

    /// Queue `task` for the next tick. Fire-and-forget.
    pub fn defer<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(Box::new(task));
        trace!("Deferred task queued");
        if let Some(wakeup) = &self.wakeup {
            wakeup.send();
        }
    }

    /// Run every task queued before this call. Returns how many ran.
    ///
    /// Tasks queued while draining wait for the following tick.
    pub fn run_pending(&self) -> usize {
        let tasks: Vec<Task> = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain(..)
            .collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether both handles drain the same queue.
    pub fn same_queue(&self, other: &Scheduler) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .field("wakeup", &self.wakeup.is_some())
            .finish()
    }
}

/// Sender half of the wakeup channel.
#[derive(Clone, Debug)]
struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Non-blocking. Errors are ignored (full = a wakeup is already pending,
    /// closed = the host loop is gone).
    fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiver half of the wakeup channel.
pub struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    /// Wait for a wakeup signal.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Drain all pending wakeup signals.
    ///
    /// Multiple buffered wakeups collapse into a single tick.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}
