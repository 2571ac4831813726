use std::sync::Mutex;

/// Counters describing pipeline activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub processed: usize,
    pub errors: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_processed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn record_cache(&self, hit: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            if hit {
                metrics.cache_hits += 1;
            } else {
                metrics.cache_misses += 1;
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
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
    fn recorder_counts_each_event() {
        let recorder = MetricsRecorder::new();
        recorder.record_processed();
        recorder.record_error();
        recorder.record_cache(true);
        recorder.record_cache(false);
        recorder.record_cache(false);
        assert_eq!(
            recorder.snapshot(),
            MetricsSnapshot {
                processed: 1,
                errors: 1,
                cache_hits: 1,
                cache_misses: 2,
            }
        );
    }
}
