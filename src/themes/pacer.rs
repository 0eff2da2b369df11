// Minimum-interval pacing for provider calls.
//
// Categorization issues one call per batch, back to back. Free-tier LLM
// keys are rate limited, so providers can be told to leave a fixed gap
// between calls. A zero interval disables pacing.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Clone)]
pub struct Pacer {
    interval: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait until at least `interval` has passed since the previous call.
    ///
    /// The next slot is reserved under the lock and the lock is released
    /// before sleeping, so concurrent callers queue up one interval apart.
    pub async fn wait_turn(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = self.last_call.lock().await;
        let now = Instant::now();
        let ready_at = match *last {
            Some(prev) if prev + self.interval > now => prev + self.interval,
            _ => now,
        };
        *last = Some(ready_at);
        // Drop the lock before sleeping so other callers can reserve their slot
        drop(last);

        if ready_at > now {
            tokio::time::sleep_until(ready_at).await;
        }
    }
}
