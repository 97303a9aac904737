use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::Json;
use chirp_types::{validate_username, Post, User, UserId};
use serde::{Deserialize, Serialize};

use crate::binder::Store;
use crate::error::{ServerError, ServerResult};

// Requests

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct UserIdRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub username: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub username: String,
}

// Responses

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserResponse {
    pub user_id: UserId,
}

/// `{"data": ...}` envelope for successful reads.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Data<T> {
    pub data: T,
}

/// `{"message": ...}` envelope for errors.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub users: usize,
    pub posts: usize,
}

// Handlers

pub async fn root_handler() -> &'static str {
    "Hello, world!"
}

/// Health check handler. Also proves the store is reachable.
pub async fn health_handler(store: Store) -> ServerResult<Json<HealthResponse>> {
    let (users, posts) = store
        .run(|s| Ok((s.user_count()?, s.post_count()?)))
        .await?;
    Ok(Json(HealthResponse {
        status: "ok".into(),
        users,
        posts,
    }))
}

pub async fn create_user_handler(
    store: Store,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<CreateUserResponse>)> {
    let Json(body) = body?;
    validate_username(&body.username)
        .map_err(|_| ServerError::BadRequest("username can't be empty".into()))?;

    let user = store.run(move |s| s.create_user(&body.username)).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "created user");
    Ok((
        StatusCode::ACCEPTED,
        Json(CreateUserResponse { user_id: user.id }),
    ))
}

pub async fn get_user_handler(
    store: Store,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> ServerResult<Json<Data<User>>> {
    let Query(UserIdQuery { id }) = query?;
    let user = store.run(move |s| s.retrieve_user(id)).await?;
    Ok(Json(Data { data: user }))
}

/// Delete a user and hand the record back one last time.
pub async fn delete_user_handler(
    store: Store,
    body: Result<Json<UserIdRequest>, JsonRejection>,
) -> ServerResult<Json<Data<User>>> {
    let Json(UserIdRequest { user_id }) = body?;
    let user = store.run(move |s| s.delete_user(user_id)).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "deleted user");
    Ok(Json(Data { data: user }))
}

pub async fn create_post_handler(
    store: Store,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ServerResult<StatusCode> {
    let Json(body) = body?;
    if body.username.is_empty() {
        return Err(ServerError::BadRequest("username can't be empty".into()));
    }
    store
        .run(move |s| s.create_post(&body.username, &body.content))
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn list_posts_handler(
    store: Store,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> ServerResult<Json<Data<Vec<Post>>>> {
    let Query(PostsQuery { username }) = query?;
    if username.is_empty() {
        return Err(ServerError::BadRequest(
            "missing username parameter in URL query".into(),
        ));
    }
    let posts = store
        .run(move |s| s.list_posts_by_author(&username))
        .await?;
    Ok(Json(Data { data: posts }))
}
