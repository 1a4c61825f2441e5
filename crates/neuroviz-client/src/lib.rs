//! REST client for NeuroViz
//!
//! Typed access to the auth, session and processing endpoints that sit next
//! to the live stream: login and token handling, session listing and upload,
//! and server-side analysis with job polling.
//!
//! # Architecture
//!
//! [`ApiClient`] builds transport-neutral [`HttpRequest`]s and interprets
//! [`HttpResponse`]s. The [`HttpTransport`] trait moves them over the wire:
//! `ReqwestTransport` in production (feature `transport`), a scripted
//! transport in tests. Time comes from an [`Environment`](neuroviz_core::Environment)
//! so cache expiry and job polling run on a virtual clock in simulation.
//!
//! # Components
//!
//! - [`ApiClient`]: endpoints, bearer auth, 401 eviction
//! - [`QueryCache`]: TTL cache with scope invalidation
//! - [`TokenStore`]: token persistence ([`MemoryTokenStore`], [`FileTokenStore`])
//! - [`ApiResponse`] / [`Page`]: response envelopes

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cache;
mod client;
pub mod config;
mod envelope;
mod error;
pub mod http;
#[cfg(feature = "transport")]
mod system_env;
mod token;
#[cfg(feature = "transport")]
mod transport;
mod types;

pub use cache::{CacheKey, CacheScope, QueryCache};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use envelope::{ApiResponse, Page};
pub use error::{ApiError, TokenError};
pub use http::{FormPart, HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};
#[cfg(feature = "transport")]
pub use system_env::SystemEnv;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
#[cfg(feature = "transport")]
pub use transport::ReqwestTransport;
pub use types::{
    BandPowerAnalysis, ChannelData, ClassificationResult, CreateSessionForm, JobStatus, JobType,
    LoginRequest, LoginResponse, PreprocessRequest, ProcessingJob, PsdAnalysis, Session,
    SignupRequest, SourceType, UploadFile, User,
};
