use crate::{Result as VendingErrorResult, VendingError};

use std::num::NonZeroU32;
use std::panic::Location;

use error_location::ErrorLocation;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

/// Process-wide cap on session-token exchanges per second
pub struct ExchangeRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl ExchangeRateLimiter {
    /// A rate of zero is treated as one per second
    pub fn per_second(exchanges_per_second: u32) -> Self {
        let rate = NonZeroU32::new(exchanges_per_second).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: RateLimiter::direct(Quota::per_second(rate)),
        }
    }

    #[track_caller]
    pub fn check(&self) -> VendingErrorResult<()> {
        self.limiter.check().map_err(|_| VendingError::Throttled {
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
