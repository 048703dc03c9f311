//! Periodic feed poller with an explicit start/stop lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::services::TrackingService;

/// How long `stop` waits for the timer task before aborting it.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollerStatus {
    pub running: bool,
    pub interval_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub latest_sequence: u64,
}

struct RunningPoller {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    started_at: DateTime<Utc>,
}

pub struct FeedPoller {
    service: Arc<TrackingService>,
    interval: Duration,
    running: Mutex<Option<RunningPoller>>,
}

impl FeedPoller {
    pub fn new(service: Arc<TrackingService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            running: Mutex::new(None),
        }
    }

    /// Start polling. Returns false if the poller was already running.
    pub async fn start(&self) -> bool {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return false;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            Arc::clone(&self.service),
            self.interval,
            shutdown_rx,
        ));

        info!(interval_ms = self.interval.as_millis() as u64, "Feed poller started");
        *running = Some(RunningPoller {
            shutdown_tx,
            handle,
            started_at: Utc::now(),
        });
        true
    }

    /// Stop polling. Returns false if the poller was not running.
    pub async fn stop(&self) -> bool {
        let Some(poller) = self.running.lock().await.take() else {
            return false;
        };

        let _ = poller.shutdown_tx.send(true);
        wait_for_shutdown(poller.handle, STOP_TIMEOUT).await;
        info!("Feed poller stopped");
        true
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    pub async fn status(&self) -> PollerStatus {
        let running = self.running.lock().await;
        let active = running.as_ref().filter(|r| !r.handle.is_finished());
        PollerStatus {
            running: active.is_some(),
            interval_ms: self.interval.as_millis() as u64,
            started_at: active.map(|r| r.started_at),
            latest_sequence: self.service.latest_issued(),
        }
    }
}

/// Wait for the timer task, aborting it if it does not finish in time.
async fn wait_for_shutdown(handle: JoinHandle<()>, timeout: Duration) {
    let abort = handle.abort_handle();
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(())) => debug!("Feed poller task completed"),
        Ok(Err(e)) if e.is_cancelled() => {}
        Ok(Err(e)) => warn!("Feed poller task panicked: {}", e),
        Err(_) => {
            warn!("Feed poller shutdown timed out after {:?}", timeout);
            abort.abort();
        }
    }
}

async fn run(
    service: Arc<TrackingService>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Skip the first immediate tick
    interval.tick().await;

    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let service = Arc::clone(&service);
                in_flight.spawn(async move {
                    // Failures are logged and counted inside the service.
                    let _ = service.poll_once().await;
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        warn!("Feed tick panicked: {}", e);
                    }
                }
            }
            changed = shutdown_rx.changed() => {
                // A dropped sender counts as a shutdown request.
                if changed.is_err() || *shutdown_rx.borrow() {
                    in_flight.abort_all();
                    debug!("Feed poller shutting down");
                    break;
                }
            }
        }
    }
}
