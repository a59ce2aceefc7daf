use crate::error::ApiResult;
use authz_service::AuthzService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use policy_engine::{Attribute, Group};
use relation_store::Contract;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Deserialize)]
pub struct GroupForSubjectsRequest {
    pub subject_ids: Vec<Uuid>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
pub struct GroupForSubjectsResponse {
    pub group: Group,
    pub contracts: Vec<Contract>,
}

pub async fn create_group(
    State(service): State<AuthzService>,
    Json(request): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let group = service
        .manager()
        .create_group(Group::with_attributes(request.attributes))
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_group(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Group>> {
    let group = service.manager().get_group(id).await?;
    Ok(Json(group))
}

pub async fn update_group(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGroupRequest>,
) -> ApiResult<Json<Group>> {
    let group = service
        .manager()
        .update_group(Group::new(id, request.attributes))
        .await?;
    Ok(Json(group))
}

/// Delete a group together with every contract referencing it
pub async fn delete_group(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service.manager().delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Copy a group's attributes into a new group under a fresh identifier
pub async fn duplicate_group(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let copy = service.manager().duplicate_group(id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Create one group and bind every resolved subject to it in one transaction
pub async fn create_group_for_subjects(
    State(service): State<AuthzService>,
    Json(request): Json<GroupForSubjectsRequest>,
) -> ApiResult<(StatusCode, Json<GroupForSubjectsResponse>)> {
    let (group, contracts) = service
        .manager()
        .create_group_for_subjects(request.subject_ids, request.attributes)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(GroupForSubjectsResponse { group, contracts }),
    ))
}
