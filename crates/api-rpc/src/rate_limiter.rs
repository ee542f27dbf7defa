//! Rate Limiter (Token Bucket Algorithm)
//!
//! Prevents a single noisy client from starving the RPC server. Uses a
//! single packed `AtomicU64` so concurrent requests never block each
//! other on a lock, only retry the CAS.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub struct RateLimiter {
    state: Arc<AtomicState>,
    max_tokens: u32,
    refill_rate: u32, // tokens per second
}

struct AtomicState {
    // Upper 32 bits: tokens remaining. Lower 32 bits: last refill time,
    // in milliseconds since `creation_time`.
    packed: AtomicU64,
    creation_time: Instant,
}

impl RateLimiter {
    /// `max_tokens` is the burst size, `refill_rate` tokens/sec.
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        let tokens_fixed = (max_tokens as u64) << 32;
        Self {
            state: Arc::new(AtomicState {
                packed: AtomicU64::new(tokens_fixed),
                creation_time: Instant::now(),
            }),
            max_tokens,
            refill_rate,
        }
    }

    /// Attempt to consume one token. Returns `true` if allowed.
    pub async fn check(&self) -> bool {
        loop {
            let packed = self.state.packed.load(Ordering::Acquire);
            let tokens = (packed >> 32) as u32;
            let last_refill_ms = (packed & 0xFFFF_FFFF) as u32;

            let elapsed_ms = Instant::now()
                .duration_since(self.state.creation_time)
                .as_millis() as u32;
            let delta_ms = elapsed_ms.saturating_sub(last_refill_ms);

            let tokens_to_add = (delta_ms as u64 * self.refill_rate as u64) / 1000;
            let new_tokens = ((tokens as u64 + tokens_to_add).min(self.max_tokens as u64)) as u32;

            if new_tokens >= 1 {
                let consumed = new_tokens - 1;
                let new_packed = ((consumed as u64) << 32) | (elapsed_ms as u64);
                match self.state.packed.compare_exchange(
                    packed,
                    new_packed,
                    Ordering::Release,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return true,
                    Err(_) => continue,
                }
            } else {
                let new_packed = ((new_tokens as u64) << 32) | (elapsed_ms as u64);
                let _ = self.state.packed.compare_exchange(
                    packed,
                    new_packed,
                    Ordering::Release,
                    Ordering::Acquire,
                );
                return false;
            }
        }
    }
}
