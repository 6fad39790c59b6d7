//! Post routes
//!
//! - POST   /api/posts                          (auth) create a post
//! - GET    /api/posts/get-all-posts            (auth) list posts, newest first
//! - GET    /api/posts/get-post/:id             (auth) one post
//! - DELETE /api/posts/delete-post/:id          (auth) author only
//! - POST   /api/posts/like/:id                 (auth) like once
//! - POST   /api/posts/unlike/:id               (auth) remove own like
//! - POST   /api/posts/comment/:id              (auth) add a comment
//! - DELETE /api/posts/delete-comment/:id       (auth) remove own comment
//!
//! Every operation runs behind the token gate; posts are not public.

use bson::{doc, oid::ObjectId};
use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{authenticate, ensure_owner};
use crate::db::schemas::{Comment, PostDoc, UserDoc, POST_COLLECTION, USER_COLLECTION};
use crate::db::MongoCollection;
use crate::routes::validation::Validator;
use crate::routes::{
    json_response, method_not_allowed, normalize_path, not_found_response, parse_json_body,
    respond, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::ApiError;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LikeView {
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: String,
    pub user: String,
    pub name: String,
    pub avatar: String,
    pub text: String,
    pub date: String,
}

impl CommentView {
    fn from_doc(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_hex(),
            user: comment.user.to_hex(),
            name: comment.name.clone(),
            avatar: comment.avatar.clone(),
            text: comment.text.clone(),
            date: comment.date.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: String,
    pub user: String,
    pub name: String,
    pub avatar: String,
    pub text: String,
    pub likes: Vec<LikeView>,
    pub comments: Vec<CommentView>,
    pub date: String,
}

impl PostView {
    pub fn from_doc(doc: &PostDoc) -> Self {
        Self {
            id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
            user: doc.user.to_hex(),
            name: doc.name.clone(),
            avatar: doc.avatar.clone(),
            text: doc.text.clone(),
            likes: doc
                .likes
                .iter()
                .map(|like| LikeView {
                    user: like.user.to_hex(),
                })
                .collect(),
            comments: doc.comments.iter().map(CommentView::from_doc).collect(),
            date: doc.date.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Route /api/posts requests
pub async fn handle_posts_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let path = normalize_path(req.uri().path()).to_string();
    let method = req.method().clone();

    let result = match (&method, path.as_str()) {
        (&Method::POST, "/api/posts") => handle_create(req, state).await,
        (&Method::GET, "/api/posts/get-all-posts") => handle_list(req, state).await,
        (_, "/api/posts") | (_, "/api/posts/get-all-posts") => return method_not_allowed(),
        _ => {
            if let Some(post_id) = path.strip_prefix("/api/posts/get-post/") {
                if method != Method::GET {
                    return method_not_allowed();
                }
                let post_id = post_id.to_string();
                handle_get(req, state, &post_id).await
            } else if let Some(post_id) = path.strip_prefix("/api/posts/delete-post/") {
                if method != Method::DELETE {
                    return method_not_allowed();
                }
                let post_id = post_id.to_string();
                handle_delete(req, state, &post_id).await
            } else if let Some(post_id) = path.strip_prefix("/api/posts/like/") {
                if method != Method::POST {
                    return method_not_allowed();
                }
                let post_id = post_id.to_string();
                handle_like(req, state, &post_id).await
            } else if let Some(post_id) = path.strip_prefix("/api/posts/unlike/") {
                if method != Method::POST {
                    return method_not_allowed();
                }
                let post_id = post_id.to_string();
                handle_unlike(req, state, &post_id).await
            } else if let Some(post_id) = path.strip_prefix("/api/posts/delete-comment/") {
                if method != Method::DELETE {
                    return method_not_allowed();
                }
                let post_id = post_id.to_string();
                handle_delete_comment(req, state, &post_id).await
            } else if let Some(post_id) = path.strip_prefix("/api/posts/comment/") {
                if method != Method::POST {
                    return method_not_allowed();
                }
                let post_id = post_id.to_string();
                handle_add_comment(req, state, &post_id).await
            } else {
                return not_found_response(&path);
            }
        }
    };

    respond(result)
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/posts
///
/// Creates a post carrying the author's name and avatar as snapshots.
async fn handle_create(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;
    let body: PostRequest = parse_json_body(req).await?;

    Validator::new()
        .require("text", &body.text, "Text is required")
        .finish()?;

    let users = state.mongo.collection::<UserDoc>(USER_COLLECTION).await?;
    let author = users
        .find_one(doc! { "_id": auth.user_id })
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let posts = state.mongo.collection::<PostDoc>(POST_COLLECTION).await?;
    let mut post = PostDoc::new(auth.user_id, author.name, author.avatar, body.text);
    let id = posts.insert_one(post.clone()).await?;
    post._id = Some(id);

    debug!("New post {} by {}", id.to_hex(), auth.user_id.to_hex());

    Ok(json_response(StatusCode::OK, &PostView::from_doc(&post)))
}

/// GET /api/posts/get-all-post
async fn handle_list(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    authenticate(req.headers(), &state.jwt)?;

    let posts = state.mongo.collection::<PostDoc>(POST_COLLECTION).await?;
    let all = posts.find_many(doc! {}, Some(doc! { "date": -1 })).await?;

    let views: Vec<PostView> = all.iter().map(PostView::from_doc).collect();
    Ok(json_response(StatusCode::OK, &views))
}

/// GET /api/posts/get-post/:id
async fn handle_get(
    req: Request<Incoming>,
    state: Arc<AppState>,
    post_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    authenticate(req.headers(), &state.jwt)?;

    let posts = state.mongo.collection::<PostDoc>(POST_COLLECTION).await?;
    let post = find_post(&posts, post_id).await?;
    Ok(json_response(StatusCode::OK, &PostView::from_doc(&post)))
}

/// DELETE /api/posts/delete-post/:id
///
/// Only the author may delete; anyone else gets a 401.
async fn handle_delete(
    req: Request<Incoming>,
    state: Arc<AppState>,
    post_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;

    let posts = state.mongo.collection::<PostDoc>(POST_COLLECTION).await?;
    let post = find_post(&posts, post_id).await?;
    ensure_owner(&post.user, &auth)?;

    let post_oid = post
        ._id
        .ok_or_else(|| ApiError::Internal("Post document missing _id".into()))?;

    posts.delete_one(doc! { "_id": post_oid }).await?;

    Ok(json_response(
        StatusCode::OK,
        &MessageResponse::new("Post Deleted"),
    ))
}

/// POST /api/posts/like/:id
///
/// Responds with the updated likes list, not the whole post.
async fn handle_like(
    req: Request<Incoming>,
    state: Arc<AppState>,
    post_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;

    let post = mutate_post(&state, post_id, |post| post.add_like(auth.user_id)).await?;

    let likes: Vec<LikeView> = post
        .likes
        .iter()
        .map(|like| LikeView {
            user: like.user.to_hex(),
        })
        .collect();
    Ok(json_response(StatusCode::OK, &likes))
}

/// POST /api/posts/unlike/:id
async fn handle_unlike(
    req: Request<Incoming>,
    state: Arc<AppState>,
    post_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;

    let post = mutate_post(&state, post_id, |post| post.remove_like(&auth.user_id)).await?;

    let likes: Vec<LikeView> = post
        .likes
        .iter()
        .map(|like| LikeView {
            user: like.user.to_hex(),
        })
        .collect();
    Ok(json_response(StatusCode::OK, &likes))
}

/// POST /api/posts/comment/:id
///
/// Responds with the whole updated post.
async fn handle_add_comment(
    req: Request<Incoming>,
    state: Arc<AppState>,
    post_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;
    let body: CommentRequest = parse_json_body(req).await?;

    Validator::new()
        .require("text", &body.text, "Text is required")
        .finish()?;

    let users = state.mongo.collection::<UserDoc>(USER_COLLECTION).await?;
    let author = users
        .find_one(doc! { "_id": auth.user_id })
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let comment = Comment::new(auth.user_id, author.name, author.avatar, body.text);
    let post = mutate_post(&state, post_id, move |post| {
        post.add_comment(comment);
        Ok(())
    })
    .await?;

    Ok(json_response(StatusCode::OK, &PostView::from_doc(&post)))
}

/// DELETE /api/posts/delete-comment/:id
///
/// Removes the caller's earliest-listed comment on the post. Selection is by
/// author, not by comment id.
async fn handle_delete_comment(
    req: Request<Incoming>,
    state: Arc<AppState>,
    post_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;

    let post = mutate_post(&state, post_id, |post| {
        // Ownership check against the comment itself, then remove it
        let comment = post
            .first_comment_by(&auth.user_id)
            .ok_or_else(|| ApiError::NotFound("Comment does not exits".into()))?;
        ensure_owner(&comment.user, &auth)?;
        post.remove_first_comment_by(&auth.user_id)?;
        Ok(())
    })
    .await?;

    let comments: Vec<CommentView> = post.comments.iter().map(CommentView::from_doc).collect();
    Ok(json_response(StatusCode::OK, &comments))
}

// =============================================================================
// Helpers
// =============================================================================

/// Look up a post by its id path segment. An unparseable id is the same miss
/// as an unknown one.
async fn find_post(
    posts: &MongoCollection<PostDoc>,
    post_id: &str,
) -> Result<PostDoc, ApiError> {
    let post_oid =
        ObjectId::parse_str(post_id).map_err(|_| ApiError::NotFound("Post not found".into()))?;

    posts
        .find_one(doc! { "_id": post_oid })
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))
}

/// Fetch a post, apply a mutation, save it back. Read-modify-write;
/// concurrent mutations of the same post race and the later save wins.
async fn mutate_post<F>(state: &AppState, post_id: &str, mutate: F) -> Result<PostDoc, ApiError>
where
    F: FnOnce(&mut PostDoc) -> Result<(), ApiError>,
{
    let posts = state.mongo.collection::<PostDoc>(POST_COLLECTION).await?;
    let mut post = find_post(&posts, post_id).await?;
    mutate(&mut post)?;

    let post_oid = post
        ._id
        .ok_or_else(|| ApiError::Internal("Post document missing _id".into()))?;

    posts
        .save(doc! { "_id": post_oid }, post.clone(), false)
        .await?;

    Ok(post)
}
