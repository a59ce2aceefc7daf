use crate::error::ApiResult;
use authz_service::AuthzService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use policy_engine::{Attribute, Group};
use relation_store::{Contract, Subject};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubjectWithAttributesRequest {
    pub user_id: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
pub struct SubjectWithAttributesResponse {
    pub subject: Subject,
    pub group: Group,
    pub contract: Contract,
}

#[derive(Debug, Deserialize)]
pub struct SubjectQuery {
    pub user_id: String,
}

pub async fn create_subject(
    State(service): State<AuthzService>,
    Json(request): Json<CreateSubjectRequest>,
) -> ApiResult<(StatusCode, Json<Subject>)> {
    let subject = service.manager().add_subject(&request.user_id).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn get_subject(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Subject>> {
    let subject = service.manager().get_subject(id).await?;
    Ok(Json(subject))
}

/// All subjects registered under a user identifier
pub async fn find_subjects(
    State(service): State<AuthzService>,
    Query(query): Query<SubjectQuery>,
) -> ApiResult<Json<Vec<Subject>>> {
    let subjects = service
        .manager()
        .find_subjects_by_user(&query.user_id)
        .await?;
    Ok(Json(subjects))
}

/// Delete a subject, its contracts, and any groups left unreferenced
pub async fn delete_subject(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service.manager().delete_subject(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a subject pre-bound to a fresh group holding the given attributes
pub async fn create_subject_with_attributes(
    State(service): State<AuthzService>,
    Json(request): Json<CreateSubjectWithAttributesRequest>,
) -> ApiResult<(StatusCode, Json<SubjectWithAttributesResponse>)> {
    let (subject, group, contract) = service
        .manager()
        .add_subject_with_attributes(&request.user_id, request.attributes)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubjectWithAttributesResponse {
            subject,
            group,
            contract,
        }),
    ))
}

/// All groups the subject is bound to via contracts
pub async fn get_subject_groups(
    State(service): State<AuthzService>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Group>>> {
    let groups = service.manager().groups_by_subject(id).await?;
    Ok(Json(groups))
}
