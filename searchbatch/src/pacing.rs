use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Minimum spacing between consecutive agent invocations.
///
/// Spacing is measured from the start of one invocation to the start of the
/// next, not from the end of the previous record. An invocation that took
/// longer than the interval is followed without any pause.
///
/// This only spaces requests out; it does not observe rate-limit responses
/// from the backends and guarantees nothing about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min_interval: Duration,
}

impl Pacing {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

    pub fn min_interval(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    pub fn none() -> Self {
        Self::min_interval(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.min_interval
    }

    pub fn pacer(&self) -> Pacer {
        Pacer {
            min_interval: self.min_interval,
            last: None,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::min_interval(Self::DEFAULT_INTERVAL)
    }
}

/// Per-run state of a [`Pacing`] policy.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    /// Waits until `min_interval` has passed since the previous call returned.
    /// The first call never waits.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_wait_is_immediate_then_spaced() {
        let mut pacer = Pacing::min_interval(Duration::from_millis(100)).pacer();
        let start = Instant::now();

        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));

        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_work_is_not_delayed_further() {
        let mut pacer = Pacing::min_interval(Duration::from_millis(100)).pacer();
        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(250)).await;

        let before = Instant::now();
        pacer.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[test]
    fn default_interval_is_ten_millis() {
        assert_eq!(Pacing::default().interval(), Duration::from_millis(10));
        assert_eq!(Pacing::none().interval(), Duration::ZERO);
    }
}
