//! Polling controller
//!
//! Keeps one refresh task per non-terminal website. A task ticks at a fixed
//! interval, awaits each refresh before the next tick, and ends on its own
//! once the website turns terminal or disappears from the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::WebsiteStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

struct PollTask {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

type TaskMap = Arc<Mutex<HashMap<String, PollTask>>>;

fn lock_tasks(tasks: &Mutex<HashMap<String, PollTask>>) -> MutexGuard<'_, HashMap<String, PollTask>> {
    // A poisoned map is still structurally valid
    tasks.lock().unwrap_or_else(|e| e.into_inner())
}

impl PollTask {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }
}

/// Why a poll task stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Terminal,
    Removed,
    Cancelled,
    TickLimit,
}

pub struct PollingController {
    store: Arc<WebsiteStore>,
    interval: Duration,
    max_ticks: Option<u32>,
    tasks: TaskMap,
    next_generation: AtomicU64,
}

impl PollingController {
    pub fn new(store: Arc<WebsiteStore>) -> Self {
        Self::with_interval(store, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(store: Arc<WebsiteStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            max_ticks: None,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Give up after this many ticks. Unlimited by default.
    pub fn with_max_ticks(mut self, max_ticks: Option<u32>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn store(&self) -> &Arc<WebsiteStore> {
        &self.store
    }

    /// Start polling a website.
    ///
    /// Returns `false` without spawning when the website is unknown, already
    /// terminal, or already being polled.
    pub async fn start(&self, id: &str) -> bool {
        match self.store.get(id).await {
            Some(record) if !record.status.is_terminal() => {}
            Some(_) => {
                debug!("Not polling terminal website {}", id);
                return false;
            }
            None => {
                debug!("Not polling unknown website {}", id);
                return false;
            }
        }

        let mut tasks = self.lock_tasks();
        if tasks.get(id).is_some_and(PollTask::is_live) {
            return false;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_website(
            Arc::clone(&self.store),
            Arc::clone(&self.tasks),
            generation,
            id.to_string(),
            self.interval,
            self.max_ticks,
            cancel.clone(),
        ));

        tasks.insert(
            id.to_string(),
            PollTask {
                generation,
                cancel,
                handle,
            },
        );
        info!("Started polling website {}", id);
        true
    }

    /// Start polling every non-terminal website in the store
    pub async fn track_all(&self) -> usize {
        let mut started = 0;
        for record in self.store.records().await {
            if !record.status.is_terminal() && self.start(&record.id).await {
                started += 1;
            }
        }
        started
    }

    /// Stop polling a website. Safe to call when nothing is running.
    pub fn stop(&self, id: &str) {
        if let Some(task) = self.lock_tasks().remove(id) {
            task.cancel.cancel();
            debug!("Stopped polling website {}", id);
        }
    }

    pub fn stop_all(&self) {
        let mut tasks = self.lock_tasks();
        for (_, task) in tasks.drain() {
            task.cancel.cancel();
        }
    }

    pub fn is_polling(&self, id: &str) -> bool {
        self.lock_tasks().get(id).is_some_and(PollTask::is_live)
    }

    /// Ids with a live poll task
    pub fn polling_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .lock_tasks()
            .iter()
            .filter(|(_, task)| task.is_live())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Wait until a website's poll task has ended or been stopped
    pub async fn wait(&self, id: &str) {
        let token = self.lock_tasks().get(id).map(|task| task.cancel.clone());
        if let Some(token) = token {
            token.cancelled().await;
        }
    }

    /// Number of tasks the controller still holds, live or not
    pub fn tracked(&self) -> usize {
        self.lock_tasks().len()
    }

    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<String, PollTask>> {
        lock_tasks(&self.tasks)
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.stop_all();
    }
}

async fn poll_website(
    store: Arc<WebsiteStore>,
    tasks: TaskMap,
    generation: u64,
    id: String,
    period: Duration,
    max_ticks: Option<u32>,
    cancel: CancellationToken,
) {
    let exit = run_poll_loop(&store, &id, period, max_ticks, &cancel).await;
    debug!("Polling of website {} ended: {:?}", id, exit);

    {
        let mut tasks = lock_tasks(&tasks);
        // A restart may already have replaced this entry
        if tasks.get(&id).is_some_and(|task| task.generation == generation) {
            tasks.remove(&id);
        }
    }
    // Wakes any waiters
    cancel.cancel();
}

async fn run_poll_loop(
    store: &WebsiteStore,
    id: &str,
    period: Duration,
    max_ticks: Option<u32>,
    cancel: &CancellationToken,
) -> PollExit {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // Skip first immediate tick

    let mut ticks = 0u32;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return PollExit::Cancelled,
            _ = interval.tick() => {}
        }

        if max_ticks.is_some_and(|max| ticks >= max) {
            warn!("Giving up polling website {} after {} ticks", id, ticks);
            return PollExit::TickLimit;
        }
        ticks += 1;

        match store.refresh_one(id).await {
            Ok(Some(record)) if record.status.is_terminal() => {
                info!("Website {} reached {}", id, record.status);
                return PollExit::Terminal;
            }
            Ok(Some(_)) => {}
            Ok(None) => return PollExit::Removed,
            Err(e) => {
                warn!("Refresh of website {} failed, retrying next tick: {}", id, e);
            }
        }

        if cancel.is_cancelled() {
            return PollExit::Cancelled;
        }
    }
}
