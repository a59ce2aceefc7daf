use crate::handlers::{authorize, contracts, groups, health, policies, subjects};
use authz_service::AuthzService;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Health check routes
pub fn health_routes() -> Router<AuthzService> {
    Router::new().route("/health", get(health::health_check))
}

/// Authorization decision routes
pub fn authorize_routes() -> Router<AuthzService> {
    Router::new().route("/authorize", post(authorize::authorize))
}

/// Subject lifecycle routes
pub fn subject_routes() -> Router<AuthzService> {
    Router::new()
        .route("/subjects", post(subjects::create_subject))
        .route("/subjects", get(subjects::find_subjects))
        .route("/subjects/with-attributes", post(subjects::create_subject_with_attributes))
        .route("/subjects/:id", get(subjects::get_subject))
        .route("/subjects/:id", delete(subjects::delete_subject))
        .route("/subjects/:id/groups", get(subjects::get_subject_groups))
}

/// Group lifecycle routes
pub fn group_routes() -> Router<AuthzService> {
    Router::new()
        .route("/groups", post(groups::create_group))
        .route("/groups/for-subjects", post(groups::create_group_for_subjects))
        .route("/groups/:id", get(groups::get_group))
        .route("/groups/:id", put(groups::update_group))
        .route("/groups/:id", delete(groups::delete_group))
        .route("/groups/:id/duplicate", post(groups::duplicate_group))
}

/// Policy lifecycle routes
pub fn policy_routes() -> Router<AuthzService> {
    Router::new()
        .route("/policies", post(policies::create_policy))
        .route("/policies/:id", get(policies::get_policy))
        .route("/policies/:id", put(policies::update_policy))
        .route("/policies/:id", delete(policies::delete_policy))
}

/// Contract lifecycle routes
pub fn contract_routes() -> Router<AuthzService> {
    Router::new()
        .route("/contracts", post(contracts::create_contract))
        .route("/contracts/:id", delete(contracts::delete_contract))
}
