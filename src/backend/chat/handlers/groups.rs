/**
 * Group Handlers
 *
 * - `POST /v1/group` - create (caller becomes creator and first member)
 * - `PUT /v1/group` - full update
 * - `GET /v1/group/{id}`
 * - `PATCH /v1/group/{id}` - update whitelisted columns
 * - `DELETE /v1/group/{id}` - soft delete
 * - `GET /v1/group/user-groups/{id}` - groups a user belongs to
 * - `POST /v1/group/{id}/users/{user_id}` - add member
 * - `DELETE /v1/group/{id}/users/{user_id}` - remove member
 */

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::backend::server::state::AppState;
use crate::shared::chat::{
    CreateGroupRequest, Group, ResponseWithMessage, UpdateGroupColumns, UpdateGroupRequest, UserId,
};

fn require_names(name: &str, username: &str) -> Result<(), BackendError> {
    if name.trim().is_empty() {
        return Err(BackendError::bad_request("group name cannot be empty"));
    }
    if username.trim().is_empty() {
        return Err(BackendError::bad_request("group username cannot be empty"));
    }
    Ok(())
}

pub async fn create_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), BackendError> {
    require_names(&request.name, &request.username)?;
    let group = state.chat()?.repo().create_group(&request, user_id).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<UpdateGroupRequest>,
) -> Result<Json<Group>, BackendError> {
    require_names(&request.name, &request.username)?;
    let group = state.chat()?.repo().update_group(&request, user_id).await?;
    Ok(Json(group))
}

pub async fn get_group(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(group_id): ApiPath<i64>,
) -> Result<Json<Group>, BackendError> {
    Ok(Json(state.chat()?.repo().get_group(group_id).await?))
}

pub async fn update_group_columns(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateGroupColumns>,
) -> Result<Json<Group>, BackendError> {
    let group = state
        .chat()?
        .repo()
        .update_group_columns(group_id, &request.fields, user_id)
        .await?;
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(group_id): ApiPath<i64>,
) -> Result<Json<ResponseWithMessage>, BackendError> {
    state.chat()?.repo().delete_group(group_id, user_id).await?;
    tracing::info!(group_id, deleted_by = user_id, "Group deleted");
    Ok(Json(ResponseWithMessage::success()))
}

pub async fn user_groups(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<Group>>, BackendError> {
    Ok(Json(state.chat()?.repo().user_groups(user_id).await?))
}

pub async fn add_member(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath((group_id, user_id)): ApiPath<(i64, UserId)>,
) -> Result<Json<ResponseWithMessage>, BackendError> {
    state.chat()?.repo().add_user_to_group(group_id, user_id).await?;
    Ok(Json(ResponseWithMessage::success()))
}

pub async fn remove_member(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath((group_id, user_id)): ApiPath<(i64, UserId)>,
) -> Result<Json<ResponseWithMessage>, BackendError> {
    state.chat()?.repo().remove_user_from_group(group_id, user_id).await?;
    Ok(Json(ResponseWithMessage::success()))
}
