//! Deterministic simulation harness for NeuroViz.
//!
//! In-memory implementations of the socket [`Driver`](neuroviz_app::Driver),
//! the [`HttpTransport`](neuroviz_client::HttpTransport) and the
//! [`Environment`](neuroviz_core::Environment) so the production runtime and
//! client run unchanged under test, with a scripted backend and a virtual
//! clock.
//!
//! # Model-Based Testing
//!
//! [`SessionOp`] is a closed set of operations on a session (user commands and
//! socket events). Sequences of them come from `proptest` or `arbitrary` and
//! are applied with [`apply_op`].
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties of a
//! [`SessionSnapshot`] after every step. Use [`InvariantRegistry::standard()`]
//! for the session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod signal;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_http;

pub use invariants::{
    BandsNonNegative, HistoryBounded, Invariant, InvariantRegistry, InvariantResult,
    OutboxOnlyWhileConnecting, SequencesIncreasing, SessionSnapshot, SnapshotWithinSelection,
    StreamingImpliesConnected, TimerTracksStreaming, Violation,
};
pub use model::{ObservedState, SessionModel, SessionOp, apply_op, channel_at};
pub use signal::SignalGenerator;
pub use sim_driver::{SimDriver, SimDriverError, SimRemote};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_http::{SimHttp, SimHttpError};
