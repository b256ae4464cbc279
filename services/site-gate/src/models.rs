// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Records and wire types for the public write endpoints.
//!
//! Request bodies use the site's camelCase JSON field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Published blog post (only what the gate needs to know).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

/// Catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// Stored blog comment.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author_name: String,
    pub email: Option<String>,
    pub is_anonymous: bool,
    /// Hashed client identifier of the author
    pub user_identifier: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for a comment about to be stored.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author_name: Option<String>,
    pub email: Option<String>,
    pub is_anonymous: bool,
    pub user_identifier: String,
    pub approved: bool,
}

/// Stored contact form submission.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Follow-up state of a product interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestStatus {
    Pending,
}

/// Stored product interest submission.
#[derive(Debug, Clone)]
pub struct ProductInterest {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
}

/// Contact form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub captcha_token: Option<String>,
}

/// Product interest body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub captcha_token: Option<String>,
}

/// New comment body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: Option<String>,
    pub author_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub parent_id: Option<Uuid>,
    pub captcha_token: Option<String>,
}

/// Acknowledgement for accepted submissions.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Comment as shown to readers. Email and identifier stay private.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author_name: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentView>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            parent_id: comment.parent_id,
            content: comment.content.clone(),
            author_name: comment.author_name.clone(),
            is_anonymous: comment.is_anonymous,
            created_at: comment.created_at,
            replies: Vec::new(),
        }
    }
}

/// Like count and the caller's own like state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub count: usize,
    pub has_liked: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}
