use std::time::Duration;

use crate::error::{NonceError, Result};
use crate::verify::Action;

/// Ticks in one nonce lifespan. The verifier scans one more than this.
pub const TICKS_PER_NONCE_LIFE: u32 = 8;

pub const DAY_IN_SECONDS: i64 = 86_400;

/// `ceil(now / (lifespan / 8))`, computed as `ceil(now * 8 / lifespan)` so that
/// lifespans not divisible by 8 still round like real division.
///
/// Panics if `lifespan_secs` is zero.
pub fn tick_at(now_secs: u64, lifespan_secs: u64) -> i64 {
    let scaled = u128::from(now_secs) * u128::from(TICKS_PER_NONCE_LIFE);
    i64::try_from(scaled.div_ceil(u128::from(lifespan_secs))).unwrap_or(i64::MAX)
}

/// Rejects non-positive lifespans reported by a hook.
pub(crate) fn checked_lifespan(lifespan: i64, action: &Action) -> Result<u64> {
    if lifespan <= 0 {
        return Err(NonceError::InvalidLifespan {
            lifespan,
            action: action.to_string(),
        });
    }
    Ok(lifespan as u64)
}

/// Acceptance window implied by a lifespan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub lifespan_secs: u64,
}

impl Window {
    pub fn new(lifespan_secs: i64, action: &Action) -> Result<Self> {
        Ok(Self {
            lifespan_secs: checked_lifespan(lifespan_secs, action)?,
        })
    }

    /// Length of one tick, `lifespan / 8`.
    pub fn bucket(&self) -> Duration {
        // 1e9 ns is a multiple of 8, so this is exact
        Duration::from_secs(self.lifespan_secs) / TICKS_PER_NONCE_LIFE
    }

    /// Number of ticks the verifier tries, current one included.
    pub fn ticks_scanned(&self) -> u32 {
        TICKS_PER_NONCE_LIFE + 1
    }

    /// A nonce is accepted for at least this long after it was issued.
    pub fn guaranteed(&self) -> Duration {
        Duration::from_secs(self.lifespan_secs)
    }

    /// Upper bound on the age of an accepted nonce.
    pub fn max_age(&self) -> Duration {
        self.bucket().saturating_mul(self.ticks_scanned())
    }

    /// Upper bound on the age of a nonce still reported as fresh.
    pub fn fresh_max_age(&self) -> Duration {
        self.bucket().saturating_mul(TICKS_PER_NONCE_LIFE / 2 + 1)
    }
}
