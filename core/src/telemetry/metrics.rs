use serde::Serialize;
use std::sync::Mutex;

/// Refresh counters for the data feed.
pub struct MetricsRecorder {
    inner: Mutex<FeedMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedMetrics {
    pub refreshed: usize,
    pub failed: usize,
    pub last_series_len: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FeedMetrics::default()),
        }
    }

    pub fn record_refresh(&self, series_len: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.refreshed += 1;
            metrics.last_series_len = series_len;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
            metrics.last_series_len = 0;
        }
    }

    pub fn snapshot(&self) -> FeedMetrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_clears_last_series_len() {
        let recorder = MetricsRecorder::new();
        recorder.record_refresh(8);
        assert_eq!(recorder.snapshot().last_series_len, 8);
        recorder.record_failure();
        assert_eq!(
            recorder.snapshot(),
            FeedMetrics {
                refreshed: 1,
                failed: 1,
                last_series_len: 0,
            }
        );
    }
}
