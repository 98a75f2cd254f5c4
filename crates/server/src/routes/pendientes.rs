use axum::{
    Extension, Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{Html, IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::pendiente::{Pendiente, PendienteInput};
use services::services::completion::{CompletionError, complete_all_tasks};
use utils::{date::today, response::MessageResponse};

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::Json,
    middleware::load_pendiente_middleware,
    pages,
};

pub async fn get_pendientes(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<Pendiente>>, ApiError> {
    let pendientes = Pendiente::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(pendientes))
}

pub async fn get_pendiente(
    Extension(pendiente): Extension<Pendiente>,
) -> Result<ResponseJson<Pendiente>, ApiError> {
    Ok(ResponseJson(pendiente))
}

pub async fn create_pendiente(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<PendienteInput>,
) -> Result<(StatusCode, ResponseJson<Pendiente>), ApiError> {
    let fields = payload.resolve(today())?;
    let pendiente = Pendiente::create(&deployment.db().pool, &fields).await?;
    tracing::info!(pendiente_id = pendiente.id, "pendiente created");
    Ok((StatusCode::CREATED, ResponseJson(pendiente)))
}

pub async fn update_pendiente(
    Extension(existing): Extension<Pendiente>,
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<PendienteInput>,
) -> Result<ResponseJson<Pendiente>, ApiError> {
    let fields = payload.resolve(today())?;
    let pendiente = Pendiente::update(&deployment.db().pool, existing.id, &fields).await?;
    Ok(ResponseJson(pendiente))
}

pub async fn delete_pendiente(
    Extension(pendiente): Extension<Pendiente>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    let rows_affected = Pendiente::delete(&deployment.db().pool, pendiente.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("Pendiente no encontrado".to_string()));
    }
    tracing::info!(pendiente_id = pendiente.id, "pendiente deleted");
    Ok(ResponseJson(MessageResponse::new("Pendiente eliminado")))
}

/// Target of the button inside reminder emails. Always answers with a page,
/// never with JSON.
pub async fn complete_all_tasks_page(
    State(deployment): State<DeploymentImpl>,
    pendiente_id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let Ok(Path(pendiente_id)) = pendiente_id else {
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::completion_error("Enlace inválido")),
        );
    };
    match complete_all_tasks(&deployment.db().pool, pendiente_id).await {
        Ok(outcome) => (
            StatusCode::OK,
            Html(pages::completion_success(
                &outcome.pendiente.actividad,
                outcome.client_id.is_some(),
            )),
        ),
        Err(CompletionError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Html(pages::completion_error("Pendiente no encontrado")),
        ),
        Err(err) => {
            tracing::error!(pendiente_id, error = %err, "failed to complete pendiente");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::completion_error(&format!(
                    "Error al completar las tareas: {err}"
                ))),
            )
        }
    }
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let pendiente_id_router = Router::new()
        .route(
            "/pendientes/{pendiente_id}",
            get(get_pendiente)
                .put(update_pendiente)
                .delete(delete_pendiente),
        )
        .layer(from_fn_with_state(
            deployment.clone(),
            load_pendiente_middleware::<DeploymentImpl>,
        ));

    Router::new()
        .route("/pendientes", get(get_pendientes).post(create_pendiente))
        .route(
            "/pendientes/{pendiente_id}/complete-all-tasks",
            get(complete_all_tasks_page),
        )
        .merge(pendiente_id_router)
}
