// PostService - assembles nested post views on top of the repositories
//
// Error policy: the primary read or write of every operation propagates its
// error. Secondary enrichment (category, comments) is best-effort: a failure
// is logged and recorded in Composed::missing, never returned.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    database::BlogDatabase,
    error::{AppError, AppResult},
    models::{Category, Comment, Composed, Enrichment, Post},
    repository::{CategoryRepository, CommentRepository, LikeRepository, PostRepository},
    validation::{require_text, validate_slug},
};

#[derive(Clone)]
pub struct PostService {
    posts: PostRepository,
    categories: CategoryRepository,
    comments: CommentRepository,
    likes: LikeRepository,
    default_category_id: i64,
}

impl PostService {
    pub fn new(db: Arc<BlogDatabase>, default_category_id: i64) -> Self {
        Self {
            posts: PostRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            likes: LikeRepository::new(db),
            default_category_id,
        }
    }

    /// Every post, newest first, each with its category when that lookup succeeds.
    pub async fn get_all_with_categories(&self) -> AppResult<Vec<Composed<Post>>> {
        let posts = self.posts.list_all().await?;
        let composed = join_all(posts.into_iter().map(|post| async move {
            let mut composed = Composed::complete(post);
            self.attach_category(&mut composed).await;
            composed
        }))
        .await;
        Ok(composed)
    }

    /// A post with its category and ordered comments, or None if it does not exist.
    pub async fn get_full_by_id(&self, id: i64) -> AppResult<Option<Composed<Post>>> {
        let Some(post) = self.posts.get_by_id(id).await? else {
            return Ok(None);
        };

        let mut composed = Composed::complete(post);
        self.attach_category(&mut composed).await;
        self.attach_comments(&mut composed).await;
        Ok(Some(composed))
    }

    pub async fn posts_by_category(&self, category_id: i64) -> AppResult<Vec<Post>> {
        self.posts.list_by_category(category_id).await
    }

    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        self.categories.list_all().await
    }

    /// Validate, insert, then re-read the composed view so callers see
    /// zero counts and the attached category.
    /// A missing `category_id` falls back to the configured default.
    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        category_id: Option<i64>,
    ) -> AppResult<Composed<Post>> {
        let title = require_text("title", title)?;
        let content = require_text("content", content)?;
        let category_id = category_id.unwrap_or(self.default_category_id);

        let id = match self.posts.create(title, content, category_id).await {
            Ok(id) => id,
            Err(AppError::ConstraintViolation(msg)) => {
                warn!("Post rejected for category {}: {}", category_id, msg);
                return Err(AppError::CategoryNotFound(category_id));
            }
            Err(e) => return Err(e),
        };
        info!("Created post {} in category {}", id, category_id);

        self.get_full_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} vanished after creation", id)))
    }

    pub async fn delete_post(&self, id: i64) -> AppResult<bool> {
        let deleted = self.posts.delete(id).await?;
        if deleted {
            info!("Deleted post {}", id);
        }
        Ok(deleted)
    }

    /// Insert a comment and return it as stored, with its assigned id and timestamp.
    pub async fn add_comment(&self, post_id: i64, author: &str, content: &str) -> AppResult<Comment> {
        let author = require_text("author", author)?;
        let content = require_text("content", content)?;

        let id = self.comments.create(post_id, author, content).await?;
        self.comments
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} vanished after creation", id)))
    }

    pub async fn add_like(&self, post_id: i64) -> AppResult<i64> {
        self.likes.add(post_id).await
    }

    pub async fn create_category(&self, name: &str, slug: &str) -> AppResult<Category> {
        let name = require_text("name", name)?;
        let slug = validate_slug(slug)?;

        let id = self.categories.create(name, slug).await?;
        self.categories
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} vanished after creation", id)))
    }

    /// Categories still referenced by posts are kept; the store refuses the delete.
    pub async fn delete_category(&self, id: i64) -> AppResult<bool> {
        self.categories.delete(id).await
    }

    async fn attach_category(&self, composed: &mut Composed<Post>) {
        let category_id = composed.value.category_id;
        match self.categories.get_by_id(category_id).await {
            Ok(Some(category)) => composed.value.category = Some(category),
            Ok(None) => {
                warn!("Post {} references missing category {}", composed.value.id, category_id);
                composed.mark_missing(Enrichment::Category);
            }
            Err(e) => {
                warn!("Category lookup for post {} failed: {}", composed.value.id, e);
                composed.mark_missing(Enrichment::Category);
            }
        }
    }

    async fn attach_comments(&self, composed: &mut Composed<Post>) {
        match self.comments.list_by_post(composed.value.id).await {
            Ok(comments) => composed.value.comments = Some(comments),
            Err(e) => {
                warn!("Comment lookup for post {} failed: {}", composed.value.id, e);
                composed.value.comments = Some(Vec::new());
                composed.mark_missing(Enrichment::Comments);
            }
        }
    }
}
