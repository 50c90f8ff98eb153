use std::collections::VecDeque;
use std::time::Duration;

/// Bounded window of latency samples with percentile queries.
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    samples_us: VecDeque<u64>,
    capacity: usize,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples_us: VecDeque::with_capacity(capacity.min(4_096)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, latency: Duration) {
        if self.samples_us.len() == self.capacity {
            self.samples_us.pop_front();
        }
        self.samples_us.push_back(latency.as_micros() as u64);
    }

    pub fn len(&self) -> usize {
        self.samples_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_us.is_empty()
    }

    /// Latency at the given percentile (0.0–1.0).
    pub fn percentile(&self, p: f64) -> Duration {
        if self.samples_us.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<u64> = self.samples_us.iter().copied().collect();
        sorted.sort_unstable();
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * (sorted.len() - 1) as f64).round() as usize).min(sorted.len() - 1);
        Duration::from_micros(sorted[idx])
    }

    pub fn mean(&self) -> Duration {
        if self.samples_us.is_empty() {
            return Duration::ZERO;
        }
        let total: u64 = self.samples_us.iter().sum();
        Duration::from_micros(total / self.samples_us.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_drops_oldest() {
        let mut w = LatencyWindow::new(3);
        for ms in [100, 1, 2, 3] {
            w.record(Duration::from_millis(ms));
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.percentile(1.0), Duration::from_millis(3));
    }

    #[test]
    fn percentiles() {
        let mut w = LatencyWindow::new(100);
        for ms in 1..=100 {
            w.record(Duration::from_millis(ms));
        }
        assert_eq!(w.percentile(0.0), Duration::from_millis(1));
        assert_eq!(w.percentile(1.0), Duration::from_millis(100));
        let p50 = w.percentile(0.5);
        assert!(p50 >= Duration::from_millis(50) && p50 <= Duration::from_millis(51));
    }

    #[test]
    fn empty_is_zero() {
        let w = LatencyWindow::new(10);
        assert_eq!(w.percentile(0.99), Duration::ZERO);
        assert_eq!(w.mean(), Duration::ZERO);
    }
}
