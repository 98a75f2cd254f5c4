use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::{cliente::ClienteError, pendiente::PendienteError},
};
use services::services::{
    assistant::AssistantError, completion::CompletionError, email::EmailError,
    notification::NotificationError, task_aggregation::TaskAggregationError,
};
use thiserror::Error;
use utils::response::ErrorResponse;

const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

#[derive(Debug, Error, ts_rs::TS)]
#[ts(type = "string")]
pub enum ApiError {
    #[error(transparent)]
    Pendiente(#[from] PendienteError),
    #[error(transparent)]
    Cliente(#[from] ClienteError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    TaskAggregation(#[from] TaskAggregationError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Pendiente(err) => match err {
                PendienteError::NotFound(_) => (StatusCode::NOT_FOUND, "PendienteError"),
                PendienteError::Validation(_) => (StatusCode::BAD_REQUEST, "PendienteError"),
                PendienteError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PendienteError"),
            },
            ApiError::Cliente(err) => match err {
                ClienteError::NotFound(_) => (StatusCode::NOT_FOUND, "ClienteError"),
                ClienteError::Validation(_) => (StatusCode::BAD_REQUEST, "ClienteError"),
                ClienteError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ClienteError"),
            },
            ApiError::Notification(err) => match err {
                NotificationError::NotFound(_) => (StatusCode::NOT_FOUND, "NotificationError"),
                NotificationError::MissingEmail(_) => {
                    (StatusCode::BAD_REQUEST, "NotificationError")
                }
                NotificationError::Mailer(_) => (StatusCode::BAD_GATEWAY, "NotificationError"),
                NotificationError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "NotificationError")
                }
            },
            ApiError::TaskAggregation(err) => match err {
                TaskAggregationError::ClientNotFound(_) | TaskAggregationError::TaskNotFound(_) => {
                    (StatusCode::NOT_FOUND, "TaskAggregationError")
                }
                TaskAggregationError::NoTasks(_)
                | TaskAggregationError::MissingEmail
                | TaskAggregationError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "TaskAggregationError")
                }
                TaskAggregationError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "TaskAggregationError")
                }
            },
            ApiError::Completion(err) => match err {
                CompletionError::NotFound(_) => (StatusCode::NOT_FOUND, "CompletionError"),
                CompletionError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "CompletionError")
                }
            },
            ApiError::Assistant(err) => match err {
                AssistantError::NotConfigured | AssistantError::EmptyQuery => {
                    (StatusCode::BAD_REQUEST, "AssistantError")
                }
                AssistantError::Upstream(_) => (StatusCode::BAD_GATEWAY, "AssistantError"),
                AssistantError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AssistantError"),
            },
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        }
    }

    /// The text placed in the `{error}` body.
    fn public_message(&self, status: StatusCode) -> String {
        if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            return INTERNAL_ERROR_MESSAGE.to_string();
        }
        match self {
            ApiError::Pendiente(PendienteError::NotFound(_)) => {
                "Pendiente no encontrado".to_string()
            }
            ApiError::Cliente(ClienteError::NotFound(_)) => "Cliente no encontrado".to_string(),
            ApiError::Notification(NotificationError::Mailer(err)) => match err {
                EmailError::NotConfigured => {
                    "El envío de correos no está configurado".to_string()
                }
                _ => format!("Error al enviar el correo: {err}"),
            },
            ApiError::Assistant(AssistantError::Upstream(detail)) => {
                format!("Error al consultar la IA: {detail}")
            }
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Datos inválidos: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("Ruta inválida: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = self.status_and_type();
        let error_message = self.public_message(status_code);

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        (status_code, Json(ErrorResponse::new(error_message))).into_response()
    }
}
