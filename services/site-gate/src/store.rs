// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory content store for posts, products and visitor submissions.
//!
//! All tables sit behind one lock so that multi-step writes (like toggles,
//! reply re-parenting) are atomic.

use crate::error::{AppError, Result};
use crate::models::{
    BlogPost, Comment, CommentView, ContactSubmission, InterestStatus, LikeStatus, NewComment,
    Product, ProductInterest,
};
use chrono::Utc;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Author name shown for anonymous comments.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Initial catalog content.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub posts: Vec<BlogPost>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Seed {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Default)]
struct Tables {
    posts: HashMap<Uuid, BlogPost>,
    post_slugs: HashMap<String, Uuid>,
    products: HashMap<Uuid, Product>,
    comments: Vec<Comment>,
    /// (post, hashed identifier)
    likes: HashSet<(Uuid, String)>,
    contact_submissions: Vec<ContactSubmission>,
    interests: Vec<ProductInterest>,
}

impl Tables {
    fn comment(&self, post_id: Uuid, id: Uuid) -> Option<&Comment> {
        self.comments
            .iter()
            .find(|c| c.id == id && c.post_id == post_id)
    }

    fn like_count(&self, post_id: Uuid) -> usize {
        self.likes.iter().filter(|(post, _)| *post == post_id).count()
    }
}

/// Shared content store.
#[derive(Default)]
pub struct ContentStore {
    tables: RwLock<Tables>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert seed posts and products. Returns `(posts, products)` added.
    pub async fn load_seed(&self, seed: Seed) -> (usize, usize) {
        let counts = (seed.posts.len(), seed.products.len());
        let mut tables = self.tables.write().await;
        for post in seed.posts {
            tables.post_slugs.insert(post.slug.clone(), post.id);
            tables.posts.insert(post.id, post);
        }
        for product in seed.products {
            tables.products.insert(product.id, product);
        }
        counts
    }

    pub async fn insert_post(&self, slug: &str, title: &str) -> BlogPost {
        let post = BlogPost {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
        };
        let mut tables = self.tables.write().await;
        tables.post_slugs.insert(post.slug.clone(), post.id);
        tables.posts.insert(post.id, post.clone());
        post
    }

    pub async fn insert_product(&self, slug: &str, name: &str) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: name.to_string(),
        };
        self.tables
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        product
    }

    pub async fn find_post(&self, slug: &str) -> Option<BlogPost> {
        let tables = self.tables.read().await;
        let id = tables.post_slugs.get(slug)?;
        tables.posts.get(id).cloned()
    }

    pub async fn find_product(&self, id: Uuid) -> Option<Product> {
        self.tables.read().await.products.get(&id).cloned()
    }

    pub async fn find_comment(&self, post_id: Uuid, id: Uuid) -> Option<Comment> {
        self.tables.read().await.comment(post_id, id).cloned()
    }

    /// Approved comments for a post: top-level newest first, each carrying
    /// its approved replies oldest first.
    pub async fn approved_comments(&self, post_id: Uuid) -> Vec<CommentView> {
        let tables = self.tables.read().await;
        let comments = &tables.comments;
        let visible = || {
            comments
                .iter()
                .filter(move |c| c.post_id == post_id && c.approved)
        };

        let mut roots: Vec<&Comment> = visible().filter(|c| c.parent_id.is_none()).collect();
        roots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        roots
            .into_iter()
            .map(|root| {
                let mut replies: Vec<&Comment> = visible()
                    .filter(|c| c.parent_id == Some(root.id))
                    .collect();
                replies.sort_by_key(|c| c.created_at);

                let mut view = CommentView::from(root);
                view.replies = replies.into_iter().map(CommentView::from).collect();
                view
            })
            .collect()
    }

    /// Store a comment.
    ///
    /// Threading is one level deep: a reply to a reply is attached to the
    /// top-level comment it belongs to.
    pub async fn create_comment(&self, new: NewComment) -> Result<Comment> {
        let mut tables = self.tables.write().await;

        let parent_id = match new.parent_id {
            None => None,
            Some(parent_id) => {
                let parent = tables
                    .comment(new.post_id, parent_id)
                    .ok_or(AppError::ParentCommentNotFound)?;
                Some(parent.parent_id.unwrap_or(parent.id))
            }
        };

        let email = new
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let author_name = match new.author_name.as_deref().map(str::trim) {
            Some(name) if !new.is_anonymous && !name.is_empty() => name.to_string(),
            _ => ANONYMOUS_AUTHOR.to_string(),
        };

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new.post_id,
            parent_id,
            content: new.content.trim().to_string(),
            author_name,
            is_anonymous: new.is_anonymous || email.is_none(),
            email,
            user_identifier: new.user_identifier,
            approved: new.approved,
            created_at: Utc::now(),
        };

        debug!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            reply = comment.parent_id.is_some(),
            "Comment stored"
        );
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    pub async fn like_status(&self, post_id: Uuid, hashed_identifier: &str) -> LikeStatus {
        let tables = self.tables.read().await;
        LikeStatus {
            count: tables.like_count(post_id),
            has_liked: tables
                .likes
                .contains(&(post_id, hashed_identifier.to_string())),
        }
    }

    /// Like the post for this identifier, or remove an existing like.
    pub async fn toggle_like(&self, post_id: Uuid, hashed_identifier: &str) -> LikeStatus {
        let mut tables = self.tables.write().await;
        let key = (post_id, hashed_identifier.to_string());

        let has_liked = if tables.likes.remove(&key) {
            false
        } else {
            tables.likes.insert(key);
            true
        };

        LikeStatus {
            count: tables.like_count(post_id),
            has_liked,
        }
    }

    pub async fn create_contact_submission(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> ContactSubmission {
        let submission = ContactSubmission {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            subject: subject
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            message: message.trim().to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .contact_submissions
            .push(submission.clone());
        submission
    }

    pub async fn create_interest(
        &self,
        product_id: Uuid,
        name: &str,
        email: &str,
        message: Option<&str>,
    ) -> ProductInterest {
        let interest = ProductInterest {
            id: Uuid::new_v4(),
            product_id,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            status: InterestStatus::Pending,
            created_at: Utc::now(),
        };
        self.tables.write().await.interests.push(interest.clone());
        interest
    }

    pub async fn contact_submissions(&self) -> Vec<ContactSubmission> {
        self.tables.read().await.contact_submissions.clone()
    }

    pub async fn interests(&self) -> Vec<ProductInterest> {
        self.tables.read().await.interests.clone()
    }
}
