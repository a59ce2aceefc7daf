//! HTTP API server for the authorization engine
//!
//! Exposes the relationship consistency manager and the policy engine over a
//! JSON REST surface. Routing, state and error mapping live here; all domain
//! behavior belongs to the `authz-service` crate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

use authz_service::AuthzService;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router over a configured service
pub fn create_app(service: AuthzService) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::authorize_routes())
        .merge(routes::subject_routes())
        .merge(routes::group_routes())
        .merge(routes::policy_routes())
        .merge(routes::contract_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}
