use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{DeploymentImpl, routes};

pub fn router(deployment: DeploymentImpl) -> Router {
    let api_routes = Router::new()
        .merge(routes::pendientes::router(&deployment))
        .merge(routes::notifications::router())
        .merge(routes::clientes::router(&deployment))
        .merge(routes::client_tasks::router(&deployment))
        .merge(routes::support_notes::router(&deployment))
        .merge(routes::ai::router());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
