use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::{client_task::ClientTask, pendiente::Pendiente};
use serde::Serialize;
use services::services::task_aggregation::{
    self, BulkTasks, ConvertToPendiente, GlobalTask, NewTask, TaskStatusUpdate,
};
use ts_rs::TS;
use utils::{date::today, response::MessageResponse};

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{Json, Path},
    middleware::load_cliente_middleware,
};

#[derive(Debug, Serialize, TS)]
pub struct TasksCreated {
    pub message: String,
    #[ts(type = "number")]
    pub count: u64,
    pub tasks: Vec<ClientTask>,
}

#[derive(Debug, Serialize, TS)]
pub struct GlobalTaskOutcome {
    pub message: String,
    #[ts(type = "number")]
    pub count: u64,
}

#[derive(Debug, Serialize, TS)]
pub struct PendienteGenerated {
    pub message: String,
    pub pendiente: Pendiente,
}

pub async fn get_client_tasks(
    State(deployment): State<DeploymentImpl>,
    Path(client_id): Path<i64>,
) -> Result<ResponseJson<Vec<ClientTask>>, ApiError> {
    let tasks = ClientTask::find_by_client(&deployment.db().pool, client_id).await?;
    Ok(ResponseJson(tasks))
}

pub async fn create_client_task(
    State(deployment): State<DeploymentImpl>,
    Path(client_id): Path<i64>,
    Json(payload): Json<NewTask>,
) -> Result<(StatusCode, ResponseJson<ClientTask>), ApiError> {
    let task =
        task_aggregation::add_task(&deployment.db().pool, client_id, &payload.description).await?;
    Ok((StatusCode::CREATED, ResponseJson(task)))
}

pub async fn create_client_tasks_bulk(
    State(deployment): State<DeploymentImpl>,
    Path(client_id): Path<i64>,
    Json(payload): Json<BulkTasks>,
) -> Result<(StatusCode, ResponseJson<TasksCreated>), ApiError> {
    let descriptions = payload.descriptions();
    if descriptions.is_empty() {
        return Err(ApiError::BadRequest(
            "No se proporcionaron tareas".to_string(),
        ));
    }

    let tasks =
        task_aggregation::add_bulk(&deployment.db().pool, client_id, &descriptions).await?;
    let count = tasks.len() as u64;
    Ok((
        StatusCode::CREATED,
        ResponseJson(TasksCreated {
            message: format!("{count} tareas agregadas"),
            count,
            tasks,
        }),
    ))
}

pub async fn create_global_task(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<GlobalTask>,
) -> Result<ResponseJson<GlobalTaskOutcome>, ApiError> {
    let count = task_aggregation::add_global(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(GlobalTaskOutcome {
        message: format!("Tarea agregada a {count} clientes"),
        count,
    }))
}

pub async fn update_task_status(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<i64>,
    Json(payload): Json<TaskStatusUpdate>,
) -> Result<ResponseJson<ClientTask>, ApiError> {
    let task =
        task_aggregation::set_task_completed(&deployment.db().pool, task_id, payload.completed)
            .await?;
    Ok(ResponseJson(task))
}

pub async fn delete_task(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<i64>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    task_aggregation::delete_task(&deployment.db().pool, task_id).await?;
    Ok(ResponseJson(MessageResponse::new("Tarea eliminada")))
}

pub async fn create_pending_from_tasks(
    State(deployment): State<DeploymentImpl>,
    Path(client_id): Path<i64>,
    Json(payload): Json<ConvertToPendiente>,
) -> Result<(StatusCode, ResponseJson<PendienteGenerated>), ApiError> {
    let pendiente =
        task_aggregation::convert_to_pendiente(&deployment.db().pool, client_id, &payload, today())
            .await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(PendienteGenerated {
            message: "Pendiente generado correctamente".to_string(),
            pendiente,
        }),
    ))
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let client_router = Router::new()
        .route(
            "/clients/{client_id}/tasks",
            get(get_client_tasks).post(create_client_task),
        )
        .route(
            "/clients/{client_id}/tasks/bulk",
            post(create_client_tasks_bulk),
        )
        .route(
            "/clients/{client_id}/create-pending-tasks",
            post(create_pending_from_tasks),
        )
        .layer(from_fn_with_state(
            deployment.clone(),
            load_cliente_middleware::<DeploymentImpl>,
        ));

    Router::new()
        .route("/tasks/global", post(create_global_task))
        .route("/tasks/{task_id}", put(update_task_status).delete(delete_task))
        .merge(client_router)
}
