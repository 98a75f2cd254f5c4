use std::{fmt::Display, future::Future};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use db::{
    DBService,
    models::{cliente::Cliente, pendiente::Pendiente, support_note::SupportNote},
};

use crate::{DeploymentImpl, error::ApiError, extract::Path};

pub trait ModelLoaderDeps {
    fn db_service(&self) -> &DBService;
}

impl ModelLoaderDeps for DeploymentImpl {
    fn db_service(&self) -> &DBService {
        self.db()
    }
}

async fn fetch_model_or_error<M, E, Fut>(
    model_name: &'static str,
    not_found_message: &'static str,
    model_id: i64,
    load_future: Fut,
) -> Result<M, ApiError>
where
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(ApiError::NotFound(not_found_message.to_string()))
        }
        Err(error) => {
            tracing::error!("Failed to fetch {model_name} {model_id}: {error}");
            Err(ApiError::Internal(format!(
                "failed to load {model_name} {model_id}"
            )))
        }
    }
}

async fn load_request_extension<M, E, Fut>(
    request: Request,
    next: Next,
    model_name: &'static str,
    not_found_message: &'static str,
    model_id: i64,
    load_future: Fut,
) -> Result<Response, ApiError>
where
    M: Clone + Send + Sync + 'static,
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    let model = fetch_model_or_error(model_name, not_found_message, model_id, load_future).await?;
    let mut request = request;
    request.extensions_mut().insert(model);
    Ok(next.run(request).await)
}

pub async fn load_pendiente_middleware<S>(
    State(deployment): State<S>,
    Path(pendiente_id): Path<i64>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    load_request_extension(
        request,
        next,
        "Pendiente",
        "Pendiente no encontrado",
        pendiente_id,
        Pendiente::find_by_id(&deployment.db_service().pool, pendiente_id),
    )
    .await
}

pub async fn load_cliente_middleware<S>(
    State(deployment): State<S>,
    Path(client_id): Path<i64>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    load_request_extension(
        request,
        next,
        "Cliente",
        "Cliente no encontrado",
        client_id,
        Cliente::find_by_id(&deployment.db_service().pool, client_id),
    )
    .await
}

pub async fn load_support_note_middleware<S>(
    State(deployment): State<S>,
    Path(note_id): Path<i64>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    load_request_extension(
        request,
        next,
        "SupportNote",
        "Nota no encontrada",
        note_id,
        SupportNote::find_by_id(&deployment.db_service().pool, note_id),
    )
    .await
}
