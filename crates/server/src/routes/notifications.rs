use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use services::services::notification::CheckAllOutcome;
use utils::{date::today, response::MessageResponse};

use crate::{DeploymentImpl, error::ApiError, extract::Path};

pub async fn notify_pendiente(
    State(deployment): State<DeploymentImpl>,
    Path(pendiente_id): Path<i64>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    let email = deployment
        .notifications()
        .notify_one(&deployment.db().pool, pendiente_id, today())
        .await?;
    Ok(ResponseJson(MessageResponse::new(format!(
        "Correo enviado a {email}"
    ))))
}

pub async fn check_all_notifications(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<CheckAllOutcome>, ApiError> {
    let outcome = deployment
        .notifications()
        .check_all(&deployment.db().pool, today())
        .await?;
    Ok(ResponseJson(outcome))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/notify/{pendiente_id}", post(notify_pendiente))
        .route("/notifications/check-all", post(check_all_notifications))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn notify_sends_the_reminder_with_cc() {
        let app = TestApp::new().await;
        let (_, pendiente) = app
            .call(
                "POST",
                "/api/pendientes",
                Some(json!({
                    "actividad": "Renovar dominio",
                    "email_notificacion": "ops@example.com",
                    "cc_emails": "a@example.com; b@example.com"
                })),
            )
            .await;

        let (status, body) = app
            .call("POST", &format!("/api/notify/{}", pendiente["id"]), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Correo enviado a ops@example.com");
        let sent = app.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ops@example.com");
        assert_eq!(sent[0].cc, vec!["a@example.com", "b@example.com"]);
        assert!(sent[0].subject.contains("Renovar dominio"));
    }

    #[tokio::test]
    async fn notify_without_email_is_a_validation_error() {
        let app = TestApp::new().await;
        let (_, pendiente) = app
            .call("POST", "/api/pendientes", Some(json!({ "actividad": "X" })))
            .await;

        let (status, body) = app
            .call("POST", &format!("/api/notify/{}", pendiente["id"]), None)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No tiene correo configurado");
        assert!(app.sent().is_empty());
    }

    #[tokio::test]
    async fn notify_unknown_pendiente_is_not_found() {
        let app = TestApp::new().await;

        let (status, body) = app.call("POST", "/api/notify/77", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Pendiente no encontrado");
    }

    #[tokio::test]
    async fn check_all_reports_a_count() {
        let app = TestApp::new().await;

        let (status, body) = app.call("POST", "/api/notifications/check-all", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sent"], 0);
        assert!(body["message"].is_string());
    }
}
