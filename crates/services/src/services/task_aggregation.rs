use chrono::NaiveDate;
use db::{
    DbErr, DbPool, TransactionTrait,
    models::{
        client_task::ClientTask,
        cliente::Cliente,
        pendiente::{Pendiente, PendienteError, PendienteInput},
    },
    retry_on_sqlite_busy,
    types::PendienteEstado,
};
use serde::Deserialize;
use thiserror::Error;
use ts_rs::TS;
use utils::serde_ext::{flexible_bool, flexible_i32_opt};

use super::status::reconcile_client_status;

#[derive(Debug, Error)]
pub enum TaskAggregationError {
    #[error("Cliente no encontrado")]
    ClientNotFound(i64),
    #[error("Tarea no encontrada")]
    TaskNotFound(i64),
    #[error("No hay tareas pendientes para este cliente")]
    NoTasks(i64),
    #[error("Debe especificar un correo electrónico")]
    MissingEmail,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<PendienteError> for TaskAggregationError {
    fn from(err: PendienteError) -> Self {
        match err {
            PendienteError::Database(err) => TaskAggregationError::Database(err),
            PendienteError::Validation(message) => TaskAggregationError::Validation(message),
            PendienteError::NotFound(id) => {
                TaskAggregationError::Database(DbErr::RecordNotFound(format!("pendiente {id}")))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct NewTask {
    pub description: String,
}

/// Body of the bulk endpoint: either a list of descriptions or a block of
/// text with one description per line.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct BulkTasks {
    #[serde(default)]
    pub tasks: Option<Vec<String>>,
    #[serde(default)]
    pub text: Option<String>,
}

impl BulkTasks {
    pub fn descriptions(&self) -> Vec<String> {
        let mut descriptions = self
            .tasks
            .as_deref()
            .map(normalize_descriptions)
            .unwrap_or_default();
        if let Some(text) = &self.text {
            descriptions.extend(split_task_lines(text));
        }
        descriptions
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct GlobalTask {
    pub description: String,
    #[serde(default, alias = "excludedClientIds")]
    #[ts(type = "number[]")]
    pub excluded_client_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct TaskStatusUpdate {
    #[serde(deserialize_with = "flexible_bool")]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ConvertToPendiente {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "diasAntesNotificacion",
        deserialize_with = "flexible_i32_opt"
    )]
    pub dias_antes_notificacion: Option<i32>,
    #[serde(default, alias = "fechaLimite")]
    pub fecha_limite: Option<String>,
}

fn normalize(description: &str) -> Option<String> {
    let trimmed = description.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn normalize_descriptions(items: &[String]) -> Vec<String> {
    items.iter().filter_map(|item| normalize(item)).collect()
}

/// One description per non-blank line of `text`.
pub fn split_task_lines(text: &str) -> Vec<String> {
    text.lines().filter_map(normalize).collect()
}

fn required(description: &str) -> Result<String, TaskAggregationError> {
    normalize(description)
        .ok_or_else(|| TaskAggregationError::Validation("La descripción es obligatoria".to_string()))
}

async fn ensure_client(db: &DbPool, client_id: i64) -> Result<Cliente, TaskAggregationError> {
    Cliente::find_by_id(db, client_id)
        .await?
        .ok_or(TaskAggregationError::ClientNotFound(client_id))
}

pub async fn add_task(
    db: &DbPool,
    client_id: i64,
    description: &str,
) -> Result<ClientTask, TaskAggregationError> {
    let description = required(description)?;
    ensure_client(db, client_id).await?;

    let description = description.as_str();
    let task = retry_on_sqlite_busy(move || async move {
        let tx = db.begin().await?;
        let task = ClientTask::create(&tx, client_id, description).await?;
        reconcile_client_status(&tx, client_id).await?;
        tx.commit().await?;
        Ok::<_, DbErr>(task)
    })
    .await?;

    tracing::debug!(client_id, task_id = task.id, "task added");
    Ok(task)
}

pub async fn add_bulk(
    db: &DbPool,
    client_id: i64,
    descriptions: &[String],
) -> Result<Vec<ClientTask>, TaskAggregationError> {
    ensure_client(db, client_id).await?;
    let descriptions = normalize_descriptions(descriptions);
    if descriptions.is_empty() {
        return Ok(Vec::new());
    }

    let descriptions = descriptions.as_slice();
    let created = retry_on_sqlite_busy(move || async move {
        let tx = db.begin().await?;
        let created = ClientTask::create_many(&tx, client_id, descriptions).await?;
        reconcile_client_status(&tx, client_id).await?;
        tx.commit().await?;
        Ok::<_, DbErr>(created)
    })
    .await?;

    tracing::info!(client_id, count = created.len(), "bulk tasks added");
    Ok(created)
}

/// Adds `task.description` to every cliente not listed in
/// `task.excluded_client_ids`. Each cliente is written in its own
/// transaction; failures are logged and the number of tasks actually created
/// is returned.
pub async fn add_global(db: &DbPool, task: &GlobalTask) -> Result<u64, TaskAggregationError> {
    let description = required(&task.description)?;
    let description = description.as_str();

    let client_ids = Cliente::all_ids(db).await?;
    let mut created = 0u64;

    for client_id in client_ids
        .into_iter()
        .filter(|id| !task.excluded_client_ids.contains(id))
    {
        let result = retry_on_sqlite_busy(move || async move {
            let tx = db.begin().await?;
            ClientTask::create(&tx, client_id, description).await?;
            reconcile_client_status(&tx, client_id).await?;
            tx.commit().await
        })
        .await;

        match result {
            Ok(()) => created += 1,
            Err(err) => {
                tracing::warn!(client_id, error = %err, "failed to add global task to cliente")
            }
        }
    }

    tracing::info!(created, excluded = task.excluded_client_ids.len(), "global task added");
    Ok(created)
}

/// Marks a task done or open and brings the owning cliente's estado in line
/// with the whole checklist.
pub async fn set_task_completed(
    db: &DbPool,
    task_id: i64,
    completed: bool,
) -> Result<ClientTask, TaskAggregationError> {
    let task = ClientTask::find_by_id(db, task_id)
        .await?
        .ok_or(TaskAggregationError::TaskNotFound(task_id))?;
    let client_id = task.client_id;

    let updated = retry_on_sqlite_busy(move || async move {
        let tx = db.begin().await?;
        let Some(updated) = ClientTask::set_completed(&tx, task_id, completed).await? else {
            return Ok(None);
        };
        reconcile_client_status(&tx, client_id).await?;
        tx.commit().await?;
        Ok::<_, DbErr>(Some(updated))
    })
    .await?;

    updated.ok_or(TaskAggregationError::TaskNotFound(task_id))
}

pub async fn delete_task(db: &DbPool, task_id: i64) -> Result<(), TaskAggregationError> {
    let task = ClientTask::find_by_id(db, task_id)
        .await?
        .ok_or(TaskAggregationError::TaskNotFound(task_id))?;
    let client_id = task.client_id;

    let deleted = retry_on_sqlite_busy(move || async move {
        let tx = db.begin().await?;
        let deleted = ClientTask::delete(&tx, task_id).await?;
        reconcile_client_status(&tx, client_id).await?;
        tx.commit().await?;
        Ok::<_, DbErr>(deleted)
    })
    .await?;

    if deleted == 0 {
        return Err(TaskAggregationError::TaskNotFound(task_id));
    }
    Ok(())
}

/// Snapshots a cliente's open tasks into a new pendiente. The tasks
/// themselves are left as they are.
pub async fn convert_to_pendiente(
    db: &DbPool,
    client_id: i64,
    request: &ConvertToPendiente,
    today: NaiveDate,
) -> Result<Pendiente, TaskAggregationError> {
    let cliente = ensure_client(db, client_id).await?;

    let open_tasks = ClientTask::find_open_by_client(db, client_id).await?;
    if open_tasks.is_empty() {
        return Err(TaskAggregationError::NoTasks(client_id));
    }

    let email = request
        .email
        .as_deref()
        .and_then(normalize)
        .ok_or(TaskAggregationError::MissingEmail)?;

    let descripcion = open_tasks
        .iter()
        .map(|task| format!("- {}", task.description))
        .collect::<Vec<_>>()
        .join("\n");

    let input = PendienteInput {
        fecha: None,
        actividad: Some(format!("Pendientes - {}", cliente.empresa)),
        descripcion: Some(descripcion),
        empresa: Some(cliente.empresa.clone()),
        cc_emails: None,
        estado: Some(PendienteEstado::Pendiente),
        observaciones: Some(
            cliente
                .observaciones
                .clone()
                .unwrap_or_else(|| "Ninguna".to_string()),
        ),
        fecha_limite: request.fecha_limite.clone(),
        email_notificacion: Some(email),
        dias_antes_notificacion: request.dias_antes_notificacion,
    };
    let fields = input.resolve(today)?;
    let pendiente = Pendiente::create(db, &fields).await?;

    tracing::info!(
        client_id,
        pendiente_id = pendiente.id,
        tasks = open_tasks.len(),
        "converted open tasks into a pendiente"
    );
    Ok(pendiente)
}
