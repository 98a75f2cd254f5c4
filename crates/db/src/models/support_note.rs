use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entities::support_note;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct SupportNote {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateSupportNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateSupportNote {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl SupportNote {
    fn from_model(model: support_note::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// Every note, newest first.
    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = support_note::Entity::find()
            .order_by_desc(support_note::Column::CreatedAt)
            .order_by_desc(support_note::Column::Id)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = support_note::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateSupportNote,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = support_note::ActiveModel {
            title: Set(data.title.trim().to_string()),
            content: Set(data.content.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        data: &UpdateSupportNote,
    ) -> Result<Option<Self>, DbErr> {
        let Some(record) = support_note::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let mut active: support_note::ActiveModel = record.into();
        if let Some(title) = &data.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(content) = &data.content {
            active.content = Set(content.clone());
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(updated)))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        let result = support_note::Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected)
    }
}
