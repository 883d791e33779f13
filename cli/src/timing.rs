use std::time::Instant;

/// Logs how long its scope took when dropped.
pub struct LogDuration {
    operation: String,
    start: Instant,
}

impl LogDuration {
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(), start: Instant::now() }
    }
}

impl Drop for LogDuration {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::info!(
            operation = %self.operation,
            took_ms = elapsed.as_millis() as u64,
            took_s = elapsed.as_secs_f64(),
            "operation finished"
        );
    }
}
