use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Token bucket in front of the remote markdown API.
///
/// Holds up to `rps` tokens and refills continuously at `rps` per second. A denied
/// call is not queued; the preview simply renders locally.
#[derive(Clone)]
pub struct RateLimiter {
    rps: u32,
    bucket: Arc<Mutex<Bucket>>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, rps: f64) {
        let elapsed = now.duration_since(self.refilled_at).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rps).min(rps);
        self.refilled_at = now;
    }
}

impl RateLimiter {
    /// `None` when `rps` is zero.
    pub fn new(rps: u32) -> Option<Self> {
        (rps > 0).then(|| Self {
            rps,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: rps as f64,
                refilled_at: Instant::now(),
            })),
        })
    }

    /// Reads `RENDER_RATE_LIMIT_RPS`; unset, zero or unparsable disables limiting.
    pub fn from_env() -> Option<Self> {
        std::env::var("RENDER_RATE_LIMIT_RPS")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .and_then(Self::new)
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }

    /// Take one token, or report how long until the next one is available.
    pub async fn try_acquire(&self) -> Result<(), Duration> {
        let rps = self.rps as f64;
        let mut bucket = self.bucket.lock().await;
        bucket.refill(Instant::now(), rps);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - bucket.tokens) / rps))
        }
    }
}
