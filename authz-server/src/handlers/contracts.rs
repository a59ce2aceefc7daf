use crate::error::ApiResult;
use authz_service::AuthzService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use relation_store::Contract;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub subject_id: Uuid,
    pub group_id: Uuid,
}

/// Bind a subject to a group; a second identical binding is rejected
pub async fn create_contract(
    State(service): State<AuthzService>,
    Json(request): Json<CreateContractRequest>,
) -> ApiResult<(StatusCode, Json<Contract>)> {
    let contract = service
        .manager()
        .add_contract(request.subject_id, request.group_id)
        .await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

pub async fn delete_contract(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service.manager().delete_contract(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
