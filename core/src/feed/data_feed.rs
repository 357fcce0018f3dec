use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::source::SeriesSource;
use crate::prelude::CoreResult;
use crate::tabular::{measurements, parse_table, Measurement};
use crate::telemetry::{FeedMetrics, LogManager, MetricsRecorder};

/// Refresh cadence of the published Kp series.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(600);

const MIN_REFRESH_PERIOD: Duration = Duration::from_millis(1);

/// Result of one refresh cycle. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RefreshOutcome {
    Loaded { count: usize, ragged_rows: usize },
    Failed { reason: String },
}

/// Holds the latest Kp series and refreshes it from a [`SeriesSource`].
pub struct DataFeed {
    source: Arc<dyn SeriesSource>,
    series: RwLock<Arc<Vec<Measurement>>>,
    // one fetch-and-replace at a time; the latest started refresh wins
    refresh_lock: AsyncMutex<()>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl DataFeed {
    pub fn new(source: Arc<dyn SeriesSource>) -> Self {
        Self {
            source,
            series: RwLock::new(Arc::new(Vec::new())),
            refresh_lock: AsyncMutex::new(()),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("feed"),
        }
    }

    /// Snapshot of the currently held series.
    pub fn series(&self) -> Arc<Vec<Measurement>> {
        self.series
            .read()
            .map(|series| Arc::clone(&*series))
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> FeedMetrics {
        self.metrics.snapshot()
    }

    pub fn source(&self) -> String {
        self.source.describe()
    }

    /// Fetches and parses the series, replacing the held one wholesale.
    /// Any failure leaves an empty series behind. Concurrent callers queue up
    /// and run in turn.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _serial = self.refresh_lock.lock().await;
        match self.load().await {
            Ok((series, ragged_rows)) => {
                let count = series.len();
                if ragged_rows > 0 {
                    self.logger.warn(&format!(
                        "{} rows from {} did not match the header width",
                        ragged_rows,
                        self.source.describe()
                    ));
                }
                self.replace(series);
                self.metrics.record_refresh(count);
                self.logger.detail(&format!("loaded {} Kp samples", count));
                RefreshOutcome::Loaded { count, ragged_rows }
            }
            Err(err) => {
                self.replace(Vec::new());
                self.metrics.record_failure();
                self.logger.warn(&format!(
                    "refresh from {} failed, series cleared: {}",
                    self.source.describe(),
                    err
                ));
                RefreshOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Refreshes immediately and then once per `period` until the handle is
    /// stopped or dropped. Stopping abandons an in-flight refresh, leaving
    /// the held series as it was.
    pub fn spawn(self: &Arc<Self>, period: Duration) -> FeedHandle {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let feed = Arc::clone(self);
        let period = period.max(MIN_REFRESH_PERIOD);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = feed.refresh() => {}
                }
            }
            feed.logger.detail("refresh loop stopped");
        });

        self.logger.record(&format!(
            "refreshing {} every {}s",
            self.source.describe(),
            period.as_secs_f64()
        ));
        FeedHandle {
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    async fn load(&self) -> CoreResult<(Vec<Measurement>, usize)> {
        let raw = self.source.fetch().await?;
        let table = parse_table(&raw)?;
        let series = measurements(&table.records)?;
        Ok((series, table.ragged_rows))
    }

    fn replace(&self, series: Vec<Measurement>) {
        if let Ok(mut guard) = self.series.write() {
            *guard = Arc::new(series);
        }
    }
}

/// Owner of a running refresh loop. Dropping it aborts the loop.
pub struct FeedHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signals the loop and waits for it to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                log::warn!("[feed] refresh task ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
