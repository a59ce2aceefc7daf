use crate::error::ApiResult;
use authz_service::AuthzService;
use axum::{extract::State, Json};
use policy_engine::ContextProperty;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub subject_id: Uuid,
    pub policy_id: Uuid,
    #[serde(default)]
    pub context: Option<ContextProperty>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub verdict: String,
}

/// Decide whether a subject is permitted under a policy
pub async fn authorize(
    State(service): State<AuthzService>,
    Json(request): Json<AuthorizeRequest>,
) -> ApiResult<Json<AuthorizeResponse>> {
    let verdict = service
        .authorize(
            request.subject_id,
            request.policy_id,
            request.context.as_ref(),
        )
        .await?;
    Ok(Json(AuthorizeResponse {
        verdict: verdict.to_string(),
    }))
}
