// ABOUTME: Seedable source for synthesized ratings used when a site reports none.
// ABOUTME: Values are uniform in [3.5, 4.9] and rounded to one decimal place.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const FALLBACK_RATING_MIN: f64 = 3.5;
pub const FALLBACK_RATING_MAX: f64 = 4.9;

/// Draws fallback ratings from its own generator, never from thread-local state.
#[derive(Debug)]
pub struct RatingFallback {
    rng: Mutex<StdRng>,
}

impl RatingFallback {
    /// Seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sequence for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draws one rating in `[FALLBACK_RATING_MIN, FALLBACK_RATING_MAX]` with one decimal digit.
    pub fn draw(&self) -> f64 {
        let raw = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.random_range(FALLBACK_RATING_MIN..=FALLBACK_RATING_MAX)
        };
        round_one_decimal(raw).clamp(FALLBACK_RATING_MIN, FALLBACK_RATING_MAX)
    }
}

impl Default for RatingFallback {
    fn default() -> Self {
        Self::from_os()
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
