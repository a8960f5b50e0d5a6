//! Background read-ahead: keeps the active driver's buffer topped up and
//! prefetches the images it yields.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::driver::Driver;
use crate::loader::ImageLoader;

/// Pause when the driver has nothing left to preload.
pub const IDLE_DELAY: Duration = Duration::from_millis(100);

/// Wait before each retry; the failure after the last one stops the worker.
pub const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(5),
];

/// What the worker is doing, as shown in the host's task list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    /// A failure that will be retried.
    Warning(String),
    /// The last retry is pending.
    Error(String),
    Stopped,
}

/// Restartable preload task.
pub struct PreloadWorker {
    loader: Arc<dyn ImageLoader>,
    status: Arc<watch::Sender<TaskStatus>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PreloadWorker {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        let (status, _) = watch::channel(TaskStatus::Idle);
        Self {
            loader,
            status: Arc::new(status),
            handle: Mutex::new(None),
        }
    }

    /// Start preloading from `driver`, replacing any running task.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, driver: Arc<dyn Driver>, amount: usize) {
        self.stop();
        log::debug!("preloading up to {amount} from {}", driver.id());
        let loader = Arc::clone(&self.loader);
        let status = Arc::clone(&self.status);
        let task = tokio::spawn(run(driver, loader, amount, status));
        *self.handle.lock() = Some(task);
    }

    pub fn stop(&self) {
        if let Some(task) = self.handle.lock().take() {
            task.abort();
            self.status.send_replace(TaskStatus::Stopped);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn status(&self) -> TaskStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskStatus> {
        self.status.subscribe()
    }
}

impl Drop for PreloadWorker {
    fn drop(&mut self) {
        if let Some(task) = self.handle.get_mut().take() {
            task.abort();
        }
    }
}

async fn run(
    driver: Arc<dyn Driver>,
    loader: Arc<dyn ImageLoader>,
    amount: usize,
    status: Arc<watch::Sender<TaskStatus>>,
) {
    let mut failures = 0;
    loop {
        status.send_replace(TaskStatus::Running);
        let result = match driver.preload(amount).await {
            Ok(None) => {
                failures = 0;
                tokio::time::sleep(IDLE_DELAY).await;
                continue;
            }
            Ok(Some(item)) => {
                log::trace!(
                    "preload {}/{} ({} buffered)",
                    item.id,
                    item.page,
                    item.amount
                );
                loader
                    .prefetch(&item.url)
                    .await
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        let Err(reason) = result else {
            failures = 0;
            continue;
        };
        let Some(delay) = RETRY_DELAYS.get(failures) else {
            log::warn!("preload stopped after {failures} retries: {reason}");
            status.send_replace(TaskStatus::Stopped);
            return;
        };
        failures += 1;
        let message = format!("Failed to preload ({reason}), retrying in {}s", delay.as_secs());
        log::warn!("{message}");
        status.send_replace(if failures == RETRY_DELAYS.len() {
            TaskStatus::Error(message)
        } else {
            TaskStatus::Warning(message)
        });
        tokio::time::sleep(*delay).await;
    }
}
