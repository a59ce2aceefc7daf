use crate::error::ApiResult;
use authz_service::AuthzService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use policy_engine::{Condition, Policy};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    pub condition: Condition,
}

pub async fn create_policy(
    State(service): State<AuthzService>,
    Json(request): Json<CreatePolicyRequest>,
) -> ApiResult<(StatusCode, Json<Policy>)> {
    let policy = service
        .manager()
        .create_policy(Policy::with_condition(request.condition))
        .await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

pub async fn get_policy(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Policy>> {
    let policy = service.manager().get_policy(id).await?;
    Ok(Json(policy))
}

pub async fn update_policy(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreatePolicyRequest>,
) -> ApiResult<Json<Policy>> {
    let policy = service
        .manager()
        .update_policy(Policy::new(id, request.condition))
        .await?;
    Ok(Json(policy))
}

pub async fn delete_policy(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service.manager().delete_policy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
