//! Rate Limiter (Token Bucket Algorithm)
//!
//! Throttles the public mutating calls (join / leave) so one client cannot
//! flood the queue. Tokens are tracked in thousandths so slow refill rates
//! still accumulate between calls.

use std::sync::Mutex;
use std::time::Instant;

const MILLI: u64 = 1000;

pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    max_milli_tokens: u64,
    refill_rate: u64, // tokens per second
    created: Instant,
}

struct Bucket {
    milli_tokens: u64,
    last_refill_ms: u64,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_tokens` - Maximum burst size
    /// * `refill_rate` - Tokens added per second
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        let max_milli_tokens = max_tokens as u64 * MILLI;
        Self {
            bucket: Mutex::new(Bucket {
                milli_tokens: max_milli_tokens,
                last_refill_ms: 0,
            }),
            max_milli_tokens,
            refill_rate: refill_rate as u64,
            created: Instant::now(),
        }
    }

    /// Consume one token; false when the caller should be throttled
    pub fn check(&self) -> bool {
        let now_ms = self.created.elapsed().as_millis() as u64;
        self.try_acquire_at(now_ms)
    }

    fn try_acquire_at(&self, now_ms: u64) -> bool {
        // Poisoning only means another caller panicked mid-update; the counters stay valid
        let mut bucket = self
            .bucket
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let delta_ms = now_ms.saturating_sub(bucket.last_refill_ms);
        // tokens/s * ms == milli-tokens
        let refill = delta_ms.saturating_mul(self.refill_rate);
        bucket.milli_tokens = bucket
            .milli_tokens
            .saturating_add(refill)
            .min(self.max_milli_tokens);
        bucket.last_refill_ms = bucket.last_refill_ms.max(now_ms);

        if bucket.milli_tokens >= MILLI {
            bucket.milli_tokens -= MILLI;
            true
        } else {
            false
        }
    }
}
