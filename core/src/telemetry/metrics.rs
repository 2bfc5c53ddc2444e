use std::sync::Mutex;

/// Counters for collaborator traffic during one aggregation run.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub requests: usize,
    pub failures: usize,
    pub empty: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_request(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.requests += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failures += 1;
        }
    }

    pub fn record_empty(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.empty += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
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
    fn counters_accumulate_independently() {
        let recorder = MetricsRecorder::new();
        recorder.record_request();
        recorder.record_request();
        recorder.record_failure();
        recorder.record_empty();
        assert_eq!(
            recorder.snapshot(),
            Metrics {
                requests: 2,
                failures: 1,
                empty: 1
            }
        );
    }
}
