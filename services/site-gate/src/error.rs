// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the site gate HTTP surface.

use crate::validator::ValidationError;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after_secs: u64 },

    #[error("CAPTCHA verification required")]
    CaptchaRequired,

    #[error("CAPTCHA verification failed")]
    CaptchaFailed,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Post not found")]
    PostNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Parent comment not found")]
    ParentCommentNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::CaptchaRequired
            | Self::CaptchaFailed
            | Self::Validation(_)
            | Self::InvalidBody
            | Self::ParentCommentNotFound => StatusCode::BAD_REQUEST,
            Self::PostNotFound | Self::ProductNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::CaptchaRequired => "CAPTCHA_REQUIRED",
            Self::CaptchaFailed => "CAPTCHA_FAILED",
            Self::Validation(_) => "INVALID_INPUT",
            Self::InvalidBody => "INVALID_BODY",
            Self::PostNotFound => "POST_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::ParentCommentNotFound => "PARENT_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, retry_after_secs) = match &self {
            Self::RateLimited { retry_after_secs } => (self.to_string(), Some(*retry_after_secs)),
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: message,
                code,
                retry_after_secs,
            }),
        )
            .into_response();

        if let Some(secs) = retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "Rejected request body");
        Self::InvalidBody
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
