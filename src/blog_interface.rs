// Blog HTTP interface - form input in, JSON out
// Handlers only parse input, delegate to PostService and serialize the result

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::warn;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{Category, Comment, Composed, Post},
    middleware::request_logging,
    validation::{parse_id, parse_optional_id},
};

#[derive(Debug, Deserialize)]
pub struct CreatePostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentForm {
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLikeForm {
    #[serde(default)]
    pub post_id: String,
}

/// Front page: posts plus the category list. The category list is
/// decoration, so its failure leaves it empty rather than failing the page.
async fn home(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let posts = state.service.get_all_with_categories().await?;
    let categories = state.service.categories().await.unwrap_or_else(|e| {
        warn!("Category list unavailable: {}", e);
        Vec::new()
    });
    Ok(Json(json!({"posts": posts, "categories": categories})))
}

async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let posts = state.service.get_all_with_categories().await?;
    Ok(Json(json!({"posts": posts})))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Composed<Post>>> {
    let id = parse_id("id", &id)?;
    match state.service.get_full_by_id(id).await? {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::NotFound(format!("Post {} not found", id))),
    }
}

async fn create_post(
    State(state): State<AppState>,
    Form(form): Form<CreatePostForm>,
) -> AppResult<(StatusCode, Json<Composed<Post>>)> {
    let category_id = parse_optional_id("category_id", form.category_id.as_deref())?;
    let post = state
        .service
        .create_post(&form.title, &form.content, category_id)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn delete_post(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Value>> {
    let id = parse_id("id", &id)?;
    let deleted = state.service.delete_post(id).await?;
    Ok(Json(json!({"id": id, "deleted": deleted})))
}

async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let categories = state.service.categories().await?;
    Ok(Json(json!({"categories": categories})))
}

async fn create_category(
    State(state): State<AppState>,
    Form(form): Form<CreateCategoryForm>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state.service.create_category(&form.name, &form.slug).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn posts_in_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let category_id = parse_id("category_id", &id)?;
    let posts = state.service.posts_by_category(category_id).await?;
    Ok(Json(json!({"category_id": category_id, "posts": posts})))
}

async fn add_comment(
    State(state): State<AppState>,
    Form(form): Form<AddCommentForm>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let post_id = parse_id("post_id", &form.post_id)?;
    let comment = state
        .service
        .add_comment(post_id, &form.author, &form.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn add_like(
    State(state): State<AppState>,
    Form(form): Form<AddLikeForm>,
) -> AppResult<Json<Value>> {
    let post_id = parse_id("post_id", &form.post_id)?;
    let like_id = state.service.add_like(post_id).await?;
    Ok(Json(json!({"id": like_id, "post_id": post_id})))
}

/// Build the blog router with logging, CORS and static file serving.
pub fn create_blog_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/", get(home))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}/posts", get(posts_in_category))
        .route("/comments", post(add_comment))
        .route("/likes", post(add_like))
        .nest_service("/static", static_dir)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_logging))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
