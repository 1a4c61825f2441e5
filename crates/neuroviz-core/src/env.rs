//! Environment abstraction for deterministic testing.
//!
//! Decouples time-dependent logic (cache expiry, job polling) from the system
//! clock. Production code uses real time; simulation uses a virtual clock that
//! only moves when the test says so.

use std::time::Duration;

/// Abstract environment providing time and async sleeping.
///
/// # Invariants
///
/// - `now()` never goes backwards within one environment instance
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; simulations may use
    /// any monotonic type that supports subtraction.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; state machines take time as a parameter.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
