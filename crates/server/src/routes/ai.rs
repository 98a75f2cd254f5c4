use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::ai_chat_message::AiChatMessage;
use services::services::assistant::{AskRequest, AskResponse};
use utils::response::MessageResponse;

use crate::{DeploymentImpl, error::ApiError, extract::Json};

pub async fn ask(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<AskRequest>,
) -> Result<ResponseJson<AskResponse>, ApiError> {
    let query = payload.query.unwrap_or_default();
    let response = deployment
        .assistant()
        .ask(&deployment.db().pool, &query)
        .await?;
    Ok(ResponseJson(AskResponse { response }))
}

pub async fn get_history(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<AiChatMessage>>, ApiError> {
    let history = deployment.assistant().history(&deployment.db().pool).await?;
    Ok(ResponseJson(history))
}

pub async fn clear_history(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    let removed = deployment
        .assistant()
        .clear_history(&deployment.db().pool)
        .await?;
    tracing::info!(removed, "ai chat history cleared");
    Ok(ResponseJson(MessageResponse::new("Historial borrado")))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/ai/ask", post(ask))
        .route("/ai/history", get(get_history).delete(clear_history))
}
