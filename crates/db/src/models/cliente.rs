use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utils::serde_ext::flexible_bool_opt;

use crate::{
    entities::{client_task, cliente},
    retry_on_sqlite_busy,
    types::ClienteEstado,
};

/// Separator used when open task descriptions are flattened into `task_list`.
pub const TASK_LIST_SEPARATOR: &str = "|||";

#[derive(Debug, Error)]
pub enum ClienteError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Cliente {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Cliente {
    #[ts(type = "number")]
    pub id: i64,
    pub empresa: String,
    pub observaciones: Option<String>,
    pub estado: ClienteEstado,
    pub check_estado: bool,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ClienteInput {
    #[serde(default)]
    pub empresa: Option<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub estado: Option<ClienteEstado>,
    #[serde(default, alias = "checkEstado", deserialize_with = "flexible_bool_opt")]
    pub check_estado: Option<bool>,
}

impl ClienteInput {
    fn empresa(&self) -> Result<String, ClienteError> {
        self.empresa
            .as_deref()
            .map(str::trim)
            .filter(|empresa| !empresa.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ClienteError::Validation("empresa is required".to_string()))
    }

    fn observaciones(&self) -> Option<String> {
        self.observaciones
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Completed and total task counts for one cliente.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
pub struct TaskCounts {
    #[ts(type = "number")]
    pub total: u64,
    #[ts(type = "number")]
    pub completed: u64,
}

/// A cliente together with its checklist counters and open task descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
pub struct ClienteSummary {
    #[serde(flatten)]
    pub cliente: Cliente,
    #[ts(type = "number")]
    pub total_tasks: u64,
    #[ts(type = "number")]
    pub completed_tasks: u64,
    pub task_list: String,
    pub tasks: Vec<String>,
}

impl ClienteSummary {
    fn build(cliente: Cliente, tasks: &[client_task::Model]) -> Self {
        let completed_tasks = tasks.iter().filter(|task| task.completed).count() as u64;
        let open: Vec<String> = tasks
            .iter()
            .filter(|task| !task.completed)
            .map(|task| task.description.clone())
            .collect();
        Self {
            cliente,
            total_tasks: tasks.len() as u64,
            completed_tasks,
            task_list: open.join(TASK_LIST_SEPARATOR),
            tasks: open,
        }
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            total: self.total_tasks,
            completed: self.completed_tasks,
        }
    }
}

impl Cliente {
    fn from_model(model: cliente::Model) -> Self {
        Self {
            id: model.id,
            empresa: model.empresa,
            observaciones: model.observaciones,
            estado: model.estado,
            check_estado: model.check_estado,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = cliente::Entity::find()
            .order_by_asc(cliente::Column::Empresa)
            .order_by_asc(cliente::Column::Id)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = cliente::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    /// First cliente (lowest id) whose `empresa` equals `empresa` exactly.
    pub async fn find_first_by_empresa<C: ConnectionTrait>(
        db: &C,
        empresa: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = cliente::Entity::find()
            .filter(cliente::Column::Empresa.eq(empresa))
            .order_by_asc(cliente::Column::Id)
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn all_ids<C: ConnectionTrait>(db: &C) -> Result<Vec<i64>, DbErr> {
        cliente::Entity::find()
            .select_only()
            .column(cliente::Column::Id)
            .order_by_asc(cliente::Column::Id)
            .into_tuple()
            .all(db)
            .await
    }

    pub async fn summaries<C: ConnectionTrait>(db: &C) -> Result<Vec<ClienteSummary>, DbErr> {
        let clientes = Self::find_all(db).await?;
        let tasks = client_task::Entity::find()
            .order_by_asc(client_task::Column::Id)
            .all(db)
            .await?;

        let mut by_client: HashMap<i64, Vec<client_task::Model>> = HashMap::new();
        for task in tasks {
            by_client.entry(task.client_id).or_default().push(task);
        }

        Ok(clientes
            .into_iter()
            .map(|cliente| {
                let tasks = by_client.remove(&cliente.id).unwrap_or_default();
                ClienteSummary::build(cliente, &tasks)
            })
            .collect())
    }

    pub async fn summary<C: ConnectionTrait>(
        db: &C,
        id: i64,
    ) -> Result<Option<ClienteSummary>, DbErr> {
        let Some(cliente) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };
        let tasks = client_task::Entity::find()
            .filter(client_task::Column::ClientId.eq(id))
            .order_by_asc(client_task::Column::Id)
            .all(db)
            .await?;
        Ok(Some(ClienteSummary::build(cliente, &tasks)))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &ClienteInput,
    ) -> Result<Self, ClienteError> {
        let active = cliente::ActiveModel {
            empresa: Set(data.empresa()?),
            observaciones: Set(data.observaciones()),
            estado: Set(data.estado.unwrap_or_default()),
            check_estado: Set(data.check_estado.unwrap_or(false)),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    /// Overwrites `empresa` and `observaciones`; `estado` and `check_estado`
    /// keep their stored value when absent from the input.
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        data: &ClienteInput,
    ) -> Result<Self, ClienteError> {
        let empresa = data.empresa()?;
        let record = cliente::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ClienteError::NotFound(id))?;

        let mut active: cliente::ActiveModel = record.into();
        active.empresa = Set(empresa);
        active.observaciones = Set(data.observaciones());
        if let Some(estado) = data.estado {
            active.estado = Set(estado);
        }
        if let Some(check_estado) = data.check_estado {
            active.check_estado = Set(check_estado);
        }

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn set_estado<C: ConnectionTrait>(
        db: &C,
        id: i64,
        estado: ClienteEstado,
    ) -> Result<u64, DbErr> {
        let result = cliente::Entity::update_many()
            .set(cliente::ActiveModel {
                estado: Set(estado),
                ..Default::default()
            })
            .filter(cliente::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn mark_checked<C: ConnectionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        let result = cliente::Entity::update_many()
            .set(cliente::ActiveModel {
                check_estado: Set(true),
                ..Default::default()
            })
            .filter(cliente::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Deletes the cliente and its tasks. The tasks are removed explicitly so
    /// the outcome does not depend on the connection's foreign key pragma.
    /// Removes the cliente and its tasks in one transaction.
    pub async fn delete<C: TransactionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        retry_on_sqlite_busy(move || async move {
            let tx = db.begin().await?;
            client_task::Entity::delete_many()
                .filter(client_task::Column::ClientId.eq(id))
                .exec(&tx)
                .await?;
            let result = cliente::Entity::delete_by_id(id).exec(&tx).await?;
            tx.commit().await?;
            Ok(result.rows_affected)
        })
        .await
    }
}
