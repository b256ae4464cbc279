// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the public write endpoints.
//!
//! Every write passes through the gate in the same order: derive the client
//! identity, verify the CAPTCHA where the endpoint requires one, then count
//! the request against the endpoint's window. Rejected requests get a 429
//! with `Retry-After`; admitted ones carry `X-RateLimit-Remaining`.

use crate::captcha::CaptchaVerifier;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::identity::ClientIdentity;
use crate::limiter::{FixedWindowLimiter, RateLimitDecision};
use crate::metrics::GateMetrics;
use crate::models::{
    CommentRequest, CommentView, ContactRequest, HealthResponse, InterestRequest, LikeStatus,
    NewComment, SubmissionResponse,
};
use crate::policy::Endpoint;
use crate::store::ContentStore;
use crate::validator::{validate_comment, validate_contact, validate_interest};
use axum::{
    extract::{FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// JSON body whose rejections render as [`AppError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Shared application state.
pub struct AppState {
    pub limiter: FixedWindowLimiter,
    pub captcha: CaptchaVerifier,
    pub store: ContentStore,
    pub metrics: Arc<GateMetrics>,
    pub config: Config,
}

impl AppState {
    /// Build state from configuration with an empty store.
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> std::result::Result<Self, prometheus::Error> {
        Ok(Self {
            limiter: FixedWindowLimiter::new(clock),
            captcha: CaptchaVerifier::new(&config.captcha),
            store: ContentStore::new(),
            metrics: Arc::new(GateMetrics::new()?),
            config,
        })
    }

    /// Count the request against the endpoint's window.
    pub fn admit(&self, endpoint: Endpoint, identity: &ClientIdentity) -> Result<RateLimitDecision> {
        let policy = self.config.policies.for_endpoint(endpoint);
        let decision = self.limiter.check(&endpoint.key(&identity.key), policy);
        self.metrics.record_decision(endpoint, decision.allowed);

        if decision.allowed {
            debug!(
                %endpoint,
                client = %identity.hashed,
                remaining = decision.remaining,
                "Request admitted"
            );
            return Ok(decision);
        }

        let retry_after_secs = decision.retry_after_secs(self.limiter.now_ms());
        info!(
            %endpoint,
            client = %identity.hashed,
            retry_after_secs,
            "Request rate limited"
        );
        Err(AppError::RateLimited { retry_after_secs })
    }

    /// Require and verify a CAPTCHA token.
    pub async fn require_captcha(&self, token: Option<&str>) -> Result<()> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::CaptchaRequired)?;

        if self.captcha.verify(token).await {
            Ok(())
        } else {
            Err(AppError::CaptchaFailed)
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/contact", post(submit_contact))
        .route("/api/products/:id/interest", post(submit_interest))
        .route(
            "/api/blog/:slug/comments",
            get(list_comments).post(create_comment),
        )
        .route("/api/blog/:slug/likes", get(like_status).post(toggle_like));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router.with_state(state)
}

fn admitted(status: StatusCode, decision: RateLimitDecision, body: impl IntoResponse) -> Response {
    (
        status,
        [(RATE_LIMIT_REMAINING, decision.remaining.to_string())],
        body,
    )
        .into_response()
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "site-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<String> {
    state.metrics.set_entries(state.limiter.len());
    state
        .metrics
        .render()
        .map_err(|e| AppError::Internal(format!("metrics encoding failed: {e}")))
}

/// Contact form submission.
///
/// CAPTCHA is enforced only when a verification secret is configured.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    identity: ClientIdentity,
    AppJson(req): AppJson<ContactRequest>,
) -> Result<Response> {
    if state.captcha.is_configured() {
        state.require_captcha(req.captcha_token.as_deref()).await?;
    }

    let decision = state.admit(Endpoint::Contact, &identity)?;
    validate_contact(&req)?;

    let submission = state
        .store
        .create_contact_submission(
            req.name.as_deref().unwrap_or_default(),
            req.email.as_deref().unwrap_or_default(),
            req.subject.as_deref(),
            req.message.as_deref().unwrap_or_default(),
        )
        .await;
    info!(submission_id = %submission.id, "Contact submission stored");

    Ok(admitted(
        StatusCode::CREATED,
        decision,
        Json(SubmissionResponse {
            success: true,
            message: "Thank you for your message!",
        }),
    ))
}

/// Product interest submission.
pub async fn submit_interest(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    identity: ClientIdentity,
    AppJson(req): AppJson<InterestRequest>,
) -> Result<Response> {
    state.require_captcha(req.captcha_token.as_deref()).await?;

    let decision = state.admit(Endpoint::ProductInterest, &identity)?;
    validate_interest(&req)?;

    let product_id = Uuid::parse_str(&id).map_err(|_| AppError::ProductNotFound)?;
    let product = state
        .store
        .find_product(product_id)
        .await
        .ok_or(AppError::ProductNotFound)?;

    let interest = state
        .store
        .create_interest(
            product.id,
            req.name.as_deref().unwrap_or_default(),
            req.email.as_deref().unwrap_or_default(),
            req.message.as_deref(),
        )
        .await;
    info!(interest_id = %interest.id, product = %product.slug, "Product interest stored");

    Ok(admitted(
        StatusCode::CREATED,
        decision,
        Json(SubmissionResponse {
            success: true,
            message: "Thank you for your interest! We will get back to you soon.",
        }),
    ))
}

/// Approved comments for a post, threaded one level deep.
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<CommentView>>> {
    let post = state
        .store
        .find_post(&slug)
        .await
        .ok_or(AppError::PostNotFound)?;

    Ok(Json(state.store.approved_comments(post.id).await))
}

/// New comment or reply.
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    identity: ClientIdentity,
    AppJson(req): AppJson<CommentRequest>,
) -> Result<Response> {
    state.require_captcha(req.captcha_token.as_deref()).await?;

    let decision = state.admit(Endpoint::Comment, &identity)?;
    validate_comment(&req)?;

    let post = state
        .store
        .find_post(&slug)
        .await
        .ok_or(AppError::PostNotFound)?;

    let comment = state
        .store
        .create_comment(NewComment {
            post_id: post.id,
            parent_id: req.parent_id,
            content: req.content.unwrap_or_default(),
            author_name: req.author_name,
            email: req.email,
            is_anonymous: req.is_anonymous,
            user_identifier: identity.hashed,
            approved: state.config.comments.auto_approve,
        })
        .await?;

    Ok(admitted(
        StatusCode::CREATED,
        decision,
        Json(CommentView::from(&comment)),
    ))
}

/// Like count and whether the caller has liked the post.
pub async fn like_status(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    identity: ClientIdentity,
) -> Result<Json<LikeStatus>> {
    let post = state
        .store
        .find_post(&slug)
        .await
        .ok_or(AppError::PostNotFound)?;

    Ok(Json(state.store.like_status(post.id, &identity.hashed).await))
}

/// Like or unlike a post.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    identity: ClientIdentity,
) -> Result<Response> {
    let decision = state.admit(Endpoint::Like, &identity)?;

    let post = state
        .store
        .find_post(&slug)
        .await
        .ok_or(AppError::PostNotFound)?;

    let status = state.store.toggle_like(post.id, &identity.hashed).await;
    debug!(post = %post.slug, count = status.count, has_liked = status.has_liked, "Like toggled");

    Ok(admitted(StatusCode::OK, decision, Json(status)))
}
