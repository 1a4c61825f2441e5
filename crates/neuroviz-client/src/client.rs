//! REST client for the auth, session and processing APIs.
//!
//! # Authentication
//!
//! The stored bearer token is attached to every request. A 401 from any
//! endpoint evicts the token and clears the cache before the error reaches
//! the caller, so the next call starts logged out.
//!
//! # Caching
//!
//! Reads of the current user and of sessions go through [`QueryCache`]; see
//! [`crate::cache`] for the invalidation contract.

use std::time::Duration;

use neuroviz_core::Environment;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    ApiError, BandPowerAnalysis, CacheKey, CacheScope, ClassificationResult, ClientConfig,
    CreateSessionForm, FormPart, HttpRequest, HttpTransport, LoginRequest, LoginResponse, Page,
    PreprocessRequest, ProcessingJob, PsdAnalysis, QueryCache, Session, SignupRequest, TokenStore,
    User,
    envelope::{Framing, error_message},
};

/// Cache signature of the current-user lookup.
const CURRENT_USER: &str = "/auth/me";

/// REST client.
///
/// # Type Parameters
///
/// - `T`: HTTP transport
/// - `S`: bearer token storage
/// - `E`: environment providing the clock for cache expiry and job polling
pub struct ApiClient<T, S, E>
where
    T: HttpTransport,
    S: TokenStore,
    E: Environment,
{
    transport: T,
    tokens: S,
    env: E,
    config: ClientConfig,
    cache: QueryCache<E::Instant>,
}

impl<T, S, E> ApiClient<T, S, E>
where
    T: HttpTransport,
    S: TokenStore,
    E: Environment,
{
    /// Create a client with an empty cache.
    pub fn new(transport: T, tokens: S, env: E, config: ClientConfig) -> Self {
        let cache = QueryCache::new(config.cache_ttl);
        Self { transport, tokens, env, config, cache }
    }

    /// Log in and store the returned token.
    ///
    /// The returned user replaces the cached current user.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let credentials = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let request = HttpRequest::post("/auth/login").json(serde_json::to_value(&credentials)?);
        let response: LoginResponse = decode(self.call(request, Framing::Bare).await?)?;

        self.tokens.store(&response.token)?;
        let now = self.env.now();
        self.cache.insert(current_user_key(), serde_json::to_value(&response.user)?, now);

        tracing::info!(user = %response.user.email, "logged in");
        Ok(response)
    }

    /// Create an account. Does not log in.
    pub async fn signup(&mut self, request: &SignupRequest) -> Result<User, ApiError> {
        let request = HttpRequest::post("/auth/signup").json(serde_json::to_value(request)?);
        decode(self.call(request, Framing::Enveloped).await?)
    }

    /// Forget the token and every cached response.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.tokens.clear()?;
        self.cache.clear();
        tracing::info!("logged out");
        Ok(())
    }

    /// Returns true if a token is stored.
    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.tokens.load()?.is_some())
    }

    /// The logged-in user.
    ///
    /// Any failure evicts the stored token.
    ///
    /// # Errors
    ///
    /// - `ApiError::NotAuthenticated` if no token is stored
    /// - any request error
    pub async fn current_user(&mut self) -> Result<User, ApiError> {
        if self.tokens.load()?.is_none() {
            return Err(ApiError::NotAuthenticated);
        }

        let request = HttpRequest::get(CURRENT_USER);
        match self.cached(CacheScope::User, request, Framing::Enveloped).await {
            Ok(user) => Ok(user),
            Err(e) => {
                tracing::warn!(error = %e, "current user lookup failed, evicting token");
                self.cache.invalidate(CacheScope::User);
                if let Err(token_err) = self.tokens.clear() {
                    tracing::warn!(error = %token_err, "failed to evict token");
                }
                Err(e)
            },
        }
    }

    /// One page of the user's sessions. `size` defaults to the configured
    /// page size.
    pub async fn sessions(&mut self, page: u32, size: Option<u32>) -> Result<Page<Session>, ApiError> {
        let size = size.unwrap_or(self.config.page_size);
        let request = HttpRequest::get("/sessions").query("page", page).query("size", size);
        self.cached(CacheScope::Sessions, request, Framing::MaybeEnveloped).await
    }

    /// One session with its channels and jobs.
    pub async fn session(&mut self, id: u64) -> Result<Session, ApiError> {
        let request = HttpRequest::get(format!("/sessions/{id}"));
        self.cached(CacheScope::Sessions, request, Framing::Enveloped).await
    }

    /// Sessions whose name matches `name`.
    pub async fn search_sessions(&mut self, name: &str) -> Result<Vec<Session>, ApiError> {
        let request = HttpRequest::get("/sessions/search").query("name", name);
        self.cached(CacheScope::Sessions, request, Framing::Enveloped).await
    }

    /// Create a session, optionally uploading a recording.
    ///
    /// Invalidates every cached session response.
    ///
    /// # Errors
    ///
    /// - `ApiError::Validation` if the name is blank
    /// - any request error
    pub async fn create_session(&mut self, form: CreateSessionForm) -> Result<Session, ApiError> {
        if form.name.trim().is_empty() {
            return Err(ApiError::Validation("session name must not be blank".to_owned()));
        }

        let mut parts = vec![FormPart::Text { name: "name".to_owned(), value: form.name }];
        for (name, value) in [("description", form.description), ("notes", form.notes)] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                parts.push(FormPart::Text { name: name.to_owned(), value });
            }
        }
        if let Some(file) = form.file {
            parts.push(FormPart::File {
                name: "file".to_owned(),
                file_name: file.file_name,
                content_type: file.content_type,
                bytes: file.bytes,
            });
        }

        let request = HttpRequest::post("/sessions").multipart(parts);
        let session: Session = decode(self.call(request, Framing::Enveloped).await?)?;

        self.cache.invalidate(CacheScope::Sessions);
        tracing::info!(session = session.id, name = %session.name, "session created");
        Ok(session)
    }

    /// Start a preprocessing job.
    ///
    /// Invalidates every cached session response, since the session's job
    /// list changed.
    pub async fn preprocess(
        &mut self,
        session_id: u64,
        params: &PreprocessRequest,
    ) -> Result<ProcessingJob, ApiError> {
        let request = HttpRequest::post(format!("/sessions/{session_id}/preprocess"))
            .json(serde_json::to_value(params)?);
        let job: ProcessingJob = decode(self.call(request, Framing::Enveloped).await?)?;

        self.cache.invalidate(CacheScope::Sessions);
        Ok(job)
    }

    /// Power spectral density of `channel`.
    pub async fn psd(&mut self, session_id: u64, channel: &str) -> Result<PsdAnalysis, ApiError> {
        let request = HttpRequest::get(format!("/sessions/{session_id}/analytics/psd"))
            .query("channel", channel);
        decode(self.call(request, Framing::Enveloped).await?)
    }

    /// Server-computed band power of `channel`.
    pub async fn band_power(
        &mut self,
        session_id: u64,
        channel: &str,
    ) -> Result<BandPowerAnalysis, ApiError> {
        let request = HttpRequest::get(format!("/sessions/{session_id}/analytics/bandpower"))
            .query("channel", channel);
        decode(self.call(request, Framing::Enveloped).await?)
    }

    /// Classify a session. Invalidates every cached session response.
    pub async fn classify(&mut self, session_id: u64) -> Result<ClassificationResult, ApiError> {
        let request = HttpRequest::post(format!("/sessions/{session_id}/classify"));
        let result: ClassificationResult = decode(self.call(request, Framing::Enveloped).await?)?;

        self.cache.invalidate(CacheScope::Sessions);
        Ok(result)
    }

    /// Current state of a job.
    pub async fn job(&mut self, job_id: u64) -> Result<ProcessingJob, ApiError> {
        let request = HttpRequest::get(format!("/jobs/{job_id}"));
        decode(self.call(request, Framing::Enveloped).await?)
    }

    /// Poll a job every `interval` until it completes or fails.
    ///
    /// Makes at most `max_polls` requests (at least one) and returns the last
    /// observed state, which is not terminal if polling ran out.
    pub async fn wait_for_job(
        &mut self,
        job_id: u64,
        interval: Duration,
        max_polls: u32,
    ) -> Result<ProcessingJob, ApiError> {
        let mut job = self.job(job_id).await?;
        let mut polls = 1;

        while !job.status.is_terminal() && polls < max_polls {
            self.env.sleep(interval).await;
            job = self.job(job_id).await?;
            polls += 1;
        }

        tracing::debug!(job = job_id, status = ?job.status, polls, "finished polling job");
        Ok(job)
    }

    /// Serve from cache or fetch, decode and cache.
    async fn cached<R: DeserializeOwned>(
        &mut self,
        scope: CacheScope,
        request: HttpRequest,
        framing: Framing,
    ) -> Result<R, ApiError> {
        let key = CacheKey::new(scope, request.signature());

        let hit = self.cache.get(&key, self.env.now()).cloned();
        if let Some(value) = hit {
            match serde_json::from_value(value) {
                Ok(decoded) => {
                    tracing::trace!(signature = %key.signature, "cache hit");
                    return Ok(decoded);
                },
                Err(e) => {
                    tracing::debug!(error = %e, "dropping undecodable cache entry");
                    self.cache.remove(&key);
                },
            }
        }

        let value = self.call(request, framing).await?;
        let decoded = serde_json::from_value(value.clone())?;
        let now = self.env.now();
        let evicted = self.cache.evict_expired(now);
        if evicted > 0 {
            tracing::trace!(evicted, "purged expired cache entries");
        }
        self.cache.insert(key, value, now);
        Ok(decoded)
    }

    /// Send `request` with the stored token and return its payload.
    async fn call(&mut self, mut request: HttpRequest, framing: Framing) -> Result<Value, ApiError> {
        request.bearer = self.tokens.load()?;
        let signature = request.signature();
        tracing::debug!(%signature, "api request");

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport(Box::new(e)))?;

        if response.status == 401 {
            tracing::warn!(%signature, "unauthorized, evicting token");
            self.cache.clear();
            self.tokens.clear()?;
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            let message = error_message(&response.body);
            tracing::debug!(%signature, status = response.status, %message, "api request failed");
            return Err(ApiError::Status { status: response.status, message });
        }

        framing.open(&response.body)
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Response cache.
    pub fn cache(&self) -> &QueryCache<E::Instant> {
        &self.cache
    }

    /// Token storage.
    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    /// HTTP transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

fn current_user_key() -> CacheKey {
    CacheKey::new(CacheScope::User, HttpRequest::get(CURRENT_USER).signature())
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    Ok(serde_json::from_value(value)?)
}
