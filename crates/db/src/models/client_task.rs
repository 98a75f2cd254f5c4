use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{entities::client_task, models::cliente::TaskCounts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ClientTask {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number")]
    pub client_id: i64,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ClientTask {
    fn from_model(model: client_task::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            description: model.description,
            completed: model.completed,
            created_at: model.created_at,
        }
    }

    /// Tasks of one cliente, newest first.
    pub async fn find_by_client<C: ConnectionTrait>(
        db: &C,
        client_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = client_task::Entity::find()
            .filter(client_task::Column::ClientId.eq(client_id))
            .order_by_desc(client_task::Column::Id)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    /// Incomplete tasks of one cliente in the order they were added.
    pub async fn find_open_by_client<C: ConnectionTrait>(
        db: &C,
        client_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = client_task::Entity::find()
            .filter(client_task::Column::ClientId.eq(client_id))
            .filter(client_task::Column::Completed.eq(false))
            .order_by_asc(client_task::Column::Id)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = client_task::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn counts_for_client<C: ConnectionTrait>(
        db: &C,
        client_id: i64,
    ) -> Result<TaskCounts, DbErr> {
        let flags: Vec<bool> = client_task::Entity::find()
            .select_only()
            .column(client_task::Column::Completed)
            .filter(client_task::Column::ClientId.eq(client_id))
            .into_tuple()
            .all(db)
            .await?;
        Ok(TaskCounts {
            total: flags.len() as u64,
            completed: flags.iter().filter(|completed| **completed).count() as u64,
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        client_id: i64,
        description: &str,
    ) -> Result<Self, DbErr> {
        let active = client_task::ActiveModel {
            client_id: Set(client_id),
            description: Set(description.to_string()),
            completed: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn create_many<C: ConnectionTrait>(
        db: &C,
        client_id: i64,
        descriptions: &[String],
    ) -> Result<Vec<Self>, DbErr> {
        let mut created = Vec::with_capacity(descriptions.len());
        for description in descriptions {
            created.push(Self::create(db, client_id, description).await?);
        }
        Ok(created)
    }

    pub async fn set_completed<C: ConnectionTrait>(
        db: &C,
        id: i64,
        completed: bool,
    ) -> Result<Option<Self>, DbErr> {
        let Some(record) = client_task::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut active: client_task::ActiveModel = record.into();
        active.completed = Set(completed);
        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(updated)))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        let result = client_task::Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_client<C: ConnectionTrait>(
        db: &C,
        client_id: i64,
    ) -> Result<u64, DbErr> {
        let result = client_task::Entity::delete_many()
            .filter(client_task::Column::ClientId.eq(client_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::cliente::{Cliente, ClienteInput},
        test_utils::setup_db,
    };

    async fn cliente(db: &sea_orm::DatabaseConnection) -> Cliente {
        Cliente::create(
            db,
            &ClienteInput {
                empresa: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn find_by_client_returns_newest_first() {
        let db = setup_db().await;
        let acme = cliente(&db).await;
        ClientTask::create_many(&db, acme.id, &["A".to_string(), "B".to_string()])
            .await
            .unwrap();

        let descriptions: Vec<String> = ClientTask::find_by_client(&db, acme.id)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.description)
            .collect();
        assert_eq!(descriptions, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn counts_follow_completion_toggles() {
        let db = setup_db().await;
        let acme = cliente(&db).await;
        let tasks = ClientTask::create_many(&db, acme.id, &["A".to_string(), "B".to_string()])
            .await
            .unwrap();

        ClientTask::set_completed(&db, tasks[0].id, true)
            .await
            .unwrap();
        assert_eq!(
            ClientTask::counts_for_client(&db, acme.id).await.unwrap(),
            TaskCounts {
                total: 2,
                completed: 1
            }
        );

        let open = ClientTask::find_open_by_client(&db, acme.id).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].description, "B");
    }

    #[tokio::test]
    async fn set_completed_on_missing_task_is_none() {
        let db = setup_db().await;
        assert!(
            ClientTask::set_completed(&db, 77, true)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_by_client_clears_the_checklist() {
        let db = setup_db().await;
        let acme = cliente(&db).await;
        ClientTask::create_many(&db, acme.id, &["A".to_string(), "B".to_string()])
            .await
            .unwrap();

        assert_eq!(ClientTask::delete_by_client(&db, acme.id).await.unwrap(), 2);
        assert_eq!(
            ClientTask::counts_for_client(&db, acme.id).await.unwrap(),
            TaskCounts::default()
        );
    }
}
