use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::support_note::{CreateSupportNote, SupportNote, UpdateSupportNote};
use utils::response::MessageResponse;

use crate::{
    DeploymentImpl, error::ApiError, extract::Json, middleware::load_support_note_middleware,
};

fn ensure_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("El título es obligatorio".to_string()));
    }
    Ok(())
}

pub async fn get_support_notes(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<SupportNote>>, ApiError> {
    let notes = SupportNote::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(notes))
}

pub async fn get_support_note(
    Extension(note): Extension<SupportNote>,
) -> Result<ResponseJson<SupportNote>, ApiError> {
    Ok(ResponseJson(note))
}

pub async fn create_support_note(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateSupportNote>,
) -> Result<(StatusCode, ResponseJson<SupportNote>), ApiError> {
    ensure_title(&payload.title)?;
    let note = SupportNote::create(&deployment.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(note)))
}

pub async fn update_support_note(
    Extension(existing): Extension<SupportNote>,
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<UpdateSupportNote>,
) -> Result<ResponseJson<SupportNote>, ApiError> {
    if let Some(title) = &payload.title {
        ensure_title(title)?;
    }
    let note = SupportNote::update(&deployment.db().pool, existing.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Nota no encontrada".to_string()))?;
    Ok(ResponseJson(note))
}

pub async fn delete_support_note(
    Extension(note): Extension<SupportNote>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    let rows_affected = SupportNote::delete(&deployment.db().pool, note.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("Nota no encontrada".to_string()));
    }
    Ok(ResponseJson(MessageResponse::new("Nota eliminada")))
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let note_id_router = Router::new()
        .route(
            "/supportnotes/{note_id}",
            get(get_support_note)
                .put(update_support_note)
                .delete(delete_support_note),
        )
        .layer(from_fn_with_state(
            deployment.clone(),
            load_support_note_middleware::<DeploymentImpl>,
        ));

    Router::new()
        .route(
            "/supportnotes",
            get(get_support_notes).post(create_support_note),
        )
        .merge(note_id_router)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn notes_crud() {
        let app = TestApp::new().await;

        let (status, note) = app
            .call(
                "POST",
                "/api/supportnotes",
                Some(json!({ "title": "VPN", "content": "Reiniciar el cliente" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/supportnotes/{}", note["id"]);

        let (status, updated) = app
            .call("PUT", &uri, Some(json!({ "content": "Reinstalar el cliente" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "VPN");
        assert_eq!(updated["content"], "Reinstalar el cliente");

        let (_, list) = app.call("GET", "/api/supportnotes", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, body) = app.call("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Nota eliminada");

        let (status, body) = app.call("GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Nota no encontrada");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::new().await;

        let (status, body) = app
            .call("POST", "/api/supportnotes", Some(json!({ "title": " " })))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "El título es obligatorio");
    }
}
