use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::cliente::{Cliente, ClienteInput};
use services::services::status::ClienteOverview;
use utils::response::MessageResponse;

use crate::{
    DeploymentImpl, error::ApiError, extract::Json, middleware::load_cliente_middleware,
};

pub async fn get_clientes(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<ClienteOverview>>, ApiError> {
    let summaries = Cliente::summaries(&deployment.db().pool).await?;
    Ok(ResponseJson(
        summaries
            .into_iter()
            .map(ClienteOverview::from_summary)
            .collect(),
    ))
}

pub async fn get_cliente(
    Extension(cliente): Extension<Cliente>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ClienteOverview>, ApiError> {
    let summary = Cliente::summary(&deployment.db().pool, cliente.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cliente no encontrado".to_string()))?;
    Ok(ResponseJson(ClienteOverview::from_summary(summary)))
}

pub async fn create_cliente(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<ClienteInput>,
) -> Result<(StatusCode, ResponseJson<Cliente>), ApiError> {
    let cliente = Cliente::create(&deployment.db().pool, &payload).await?;
    tracing::info!(client_id = cliente.id, empresa = %cliente.empresa, "cliente created");
    Ok((StatusCode::CREATED, ResponseJson(cliente)))
}

pub async fn update_cliente(
    Extension(existing): Extension<Cliente>,
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<ClienteInput>,
) -> Result<ResponseJson<Cliente>, ApiError> {
    let cliente = Cliente::update(&deployment.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(cliente))
}

pub async fn delete_cliente(
    Extension(cliente): Extension<Cliente>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    let rows_affected = Cliente::delete(&deployment.db().pool, cliente.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("Cliente no encontrado".to_string()));
    }
    tracing::info!(client_id = cliente.id, "cliente deleted");
    Ok(ResponseJson(MessageResponse::new("Cliente eliminado")))
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let cliente_id_router = Router::new()
        .route(
            "/clientes/{client_id}",
            get(get_cliente).put(update_cliente).delete(delete_cliente),
        )
        .layer(from_fn_with_state(
            deployment.clone(),
            load_cliente_middleware::<DeploymentImpl>,
        ));

    Router::new()
        .route("/clientes", get(get_clientes).post(create_cliente))
        .merge(cliente_id_router)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn new_cliente_defaults_to_sin_tareas() {
        let app = TestApp::new().await;

        let (status, body) = app
            .call("POST", "/api/clientes", Some(json!({ "empresa": "Acme" })))
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["estado"], "Sin Tareas");
        assert_eq!(body["check_estado"], false);
    }

    #[tokio::test]
    async fn empresa_is_required() {
        let app = TestApp::new().await;

        let (status, body) = app
            .call("POST", "/api/clientes", Some(json!({ "empresa": "   " })))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn list_is_augmented_with_task_counters() {
        let app = TestApp::new().await;
        let (_, beta) = app
            .call("POST", "/api/clientes", Some(json!({ "empresa": "Beta" })))
            .await;
        app.call("POST", "/api/clientes", Some(json!({ "empresa": "Acme" })))
            .await;

        let tasks_uri = format!("/api/clients/{}/tasks", beta["id"]);
        let (_, first) = app
            .call("POST", &tasks_uri, Some(json!({ "description": "Backup" })))
            .await;
        app.call("POST", &tasks_uri, Some(json!({ "description": "Facturar" })))
            .await;
        app.call(
            "PUT",
            &format!("/api/tasks/{}", first["id"]),
            Some(json!({ "completed": 1 })),
        )
        .await;

        let (status, list) = app.call("GET", "/api/clientes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["empresa"], "Acme");
        assert_eq!(list[0]["total_tasks"], 0);
        assert_eq!(list[0]["estado_calculado"], "Sin Tareas");

        let beta = &list[1];
        assert_eq!(beta["empresa"], "Beta");
        assert_eq!(beta["total_tasks"], 2);
        assert_eq!(beta["completed_tasks"], 1);
        assert_eq!(beta["task_list"], "Facturar");
        assert_eq!(beta["tasks"], json!(["Facturar"]));
        assert_eq!(beta["estado"], "En Proceso");
        assert_eq!(beta["estado_calculado"], "En Proceso");
    }

    #[tokio::test]
    async fn delete_removes_the_cliente_and_its_tasks() {
        let app = TestApp::new().await;
        let (_, cliente) = app
            .call("POST", "/api/clientes", Some(json!({ "empresa": "Acme" })))
            .await;
        let uri = format!("/api/clientes/{}", cliente["id"]);
        app.call(
            "POST",
            &format!("/api/clients/{}/tasks", cliente["id"]),
            Some(json!({ "description": "Backup" })),
        )
        .await;

        let (status, body) = app.call("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cliente eliminado");

        let (status, body) = app.call("GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Cliente no encontrado");
    }

    #[tokio::test]
    async fn update_keeps_estado_when_absent() {
        let app = TestApp::new().await;
        let (_, cliente) = app
            .call(
                "POST",
                "/api/clientes",
                Some(json!({ "empresa": "Acme", "estado": "Finalizado" })),
            )
            .await;

        let (status, body) = app
            .call(
                "PUT",
                &format!("/api/clientes/{}", cliente["id"]),
                Some(json!({ "empresa": "Acme SA", "checkEstado": 1 })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["empresa"], "Acme SA");
        assert_eq!(body["estado"], "Finalizado");
        assert_eq!(body["check_estado"], true);
    }
}
