//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during session execution.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across all possible operation sequences.
//!
//! # Architecture
//!
//! The invariant system extracts observable state from a `StreamSession` into
//! a [`SessionSnapshot`], then runs registered [`Invariant`] checks against
//! it. Violations carry the invariant name and enough context to debug.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = SessionSnapshot::from_session(&session);
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{
    BandsNonNegative, HistoryBounded, OutboxOnlyWhileConnecting, SequencesIncreasing,
    SnapshotWithinSelection, StreamingImpliesConnected, TimerTracksStreaming,
};
pub use snapshot::SessionSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against session state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &SessionSnapshot) -> InvariantResult;

    /// Build a violation of this invariant.
    fn violation(&self, message: String) -> Violation {
        Violation { invariant: self.name(), message }
    }
}

/// Registry of invariants to check.
///
/// Use [`InvariantRegistry::standard()`] for every session invariant.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard session invariants.
    ///
    /// Includes:
    /// - [`HistoryBounded`]: history never exceeds its capacity
    /// - [`SequencesIncreasing`]: history is in arrival order
    /// - [`StreamingImpliesConnected`]: no streaming without a socket
    /// - [`TimerTracksStreaming`]: a timer runs exactly while streaming
    /// - [`OutboxOnlyWhileConnecting`]: queued messages never outlive the
    ///   connect
    /// - [`SnapshotWithinSelection`]: band power only for channels the latest
    ///   sample carried
    /// - [`BandsNonNegative`]: band power is a non-negative quantity
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(HistoryBounded);
        registry.add(SequencesIncreasing);
        registry.add(StreamingImpliesConnected);
        registry.add(TimerTracksStreaming);
        registry.add(OutboxOnlyWhileConnecting);
        registry.add(SnapshotWithinSelection);
        registry.add(BandsNonNegative);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SessionSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation.
    ///
    /// Use this in tests where you want immediate failure with context.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SessionSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
