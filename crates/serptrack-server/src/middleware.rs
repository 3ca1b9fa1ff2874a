use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The authenticated user's id, resolved from the bearer token and stored as
/// a request extension on protected routes.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// Bearer auth settings: each accepted token maps to the owning user's id.
#[derive(Debug, Clone)]
pub struct AuthState {
    tokens: Arc<HashMap<String, Uuid>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth config from `SERPTRACK_API_TOKENS`, a comma-separated
    /// list of `token:user-uuid` pairs.
    ///
    /// In development, an empty/missing list disables auth for local
    /// iteration; requests then act as the nil dev user. In non-development
    /// envs, an empty/missing list fails startup.
    ///
    /// # Errors
    ///
    /// Returns an error outside development when no tokens are configured,
    /// or whenever an entry is malformed.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("SERPTRACK_API_TOKENS").unwrap_or_default();
        Self::from_raw(&raw, is_development)
    }

    /// Parses the raw token list. Decoupled from the environment so tests
    /// can exercise it without `set_var`.
    ///
    /// # Errors
    ///
    /// See [`AuthState::from_env`].
    pub fn from_raw(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut tokens = HashMap::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (token, user) = entry.split_once(':').ok_or_else(|| {
                anyhow::anyhow!("malformed SERPTRACK_API_TOKENS entry; expected token:user-uuid")
            })?;
            let user_id = Uuid::parse_str(user.trim()).map_err(|e| {
                anyhow::anyhow!("invalid user uuid in SERPTRACK_API_TOKENS entry: {e}")
            })?;
            tokens.insert(token.trim().to_owned(), user_id);
        }

        if tokens.is_empty() {
            if is_development {
                tracing::warn!(
                    "SERPTRACK_API_TOKENS not set; bearer auth disabled in development environment"
                );
                return Ok(Self {
                    tokens: Arc::new(HashMap::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "SERPTRACK_API_TOKENS is required outside development; provide comma-separated token:user-uuid pairs"
            );
        }

        Ok(Self {
            tokens: Arc::new(tokens),
            enabled: true,
        })
    }

    fn resolve(&self, token: &str) -> Option<Uuid> {
        self.tokens.get(token).copied()
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Sliding fixed-window limiter for simple API protection.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    success: bool,
    error: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing bearer auth and resolving the calling user.
///
/// When auth is disabled (development, no tokens configured) every request
/// acts as the nil dev user so per-user scoping still applies.
pub async fn require_bearer_user(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        req.extensions_mut().insert(AuthUser(Uuid::nil()));
        return next.run(req).await;
    }

    let user = extract_bearer_token(req.headers().get(AUTHORIZATION))
        .and_then(|token| auth.resolve(token));

    match user {
        Some(user_id) => {
            req.extensions_mut().insert(AuthUser(user_id));
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                success: false,
                error: "missing or invalid bearer token",
            }),
        )
            .into_response(),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                success: false,
                error: "rate limit exceeded",
            }),
        )
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
