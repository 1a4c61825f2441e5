//! Virtual clock implementing [`Environment`].
//!
//! Time only moves when a test advances it or when code sleeps. Sleeping
//! completes immediately and advances the clock by the requested duration, so
//! polling loops finish instantly while still observing elapsed time.

use std::{
    ops::Sub,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use neuroviz_core::Environment;

/// Point on the virtual clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Time since the clock started.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

/// Shared virtual clock. Clones observe the same time.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    micros: Arc<AtomicU64>,
}

impl SimEnv {
    /// Clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }

    /// Time since the clock started.
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.elapsed())
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }
}
