//! Advisory per-turn countdown.

use std::time::Duration;

use tokio::time::Instant;

/// Wall-clock window for a single exchange.
///
/// The timer never cancels an in-flight provider call. Drivers start a
/// window, await the generation, then sleep out whatever remains before
/// moving on; a window that elapses mid-request simply means the next turn
/// starts as soon as the call settles.
#[derive(Debug)]
pub struct TurnTimer {
    deadline: Instant,
    duration: Duration,
}

impl TurnTimer {
    /// Open a window of the given length starting now.
    pub fn start(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
            duration,
        }
    }

    /// Time left in the window; zero once elapsed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn elapsed(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Sleep until the window closes; returns immediately if already past.
    pub async fn wait_remaining(&self) {
        tokio::time::sleep_until(self.deadline).await;
    }

    /// Fresh window of the same length for the next exchange.
    pub fn restart(&self) -> Self {
        Self::start(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses_after_its_duration() {
        let timer = TurnTimer::start(Duration::from_secs(30));
        assert!(!timer.elapsed());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(timer.elapsed());
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_remaining_returns_at_the_deadline() {
        let timer = TurnTimer::start(Duration::from_secs(30));
        timer.wait_remaining().await;
        assert!(timer.elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_opens_a_fresh_window() {
        let timer = TurnTimer::start(Duration::from_secs(30));
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(timer.elapsed());

        let next = timer.restart();
        assert!(!next.elapsed());
    }
}
