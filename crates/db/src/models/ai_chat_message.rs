use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{entities::ai_chat_message, types::ChatRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct AiChatMessage {
    #[ts(type = "number")]
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl AiChatMessage {
    fn from_model(model: ai_chat_message::Model) -> Self {
        Self {
            id: model.id,
            role: model.role,
            content: model.content,
            created_at: model.created_at,
        }
    }

    /// The conversation in the order it happened.
    pub async fn history<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = ai_chat_message::Entity::find()
            .order_by_asc(ai_chat_message::Column::Id)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn append<C: ConnectionTrait>(
        db: &C,
        role: ChatRole,
        content: &str,
    ) -> Result<Self, DbErr> {
        let active = ai_chat_message::ActiveModel {
            role: Set(role),
            content: Set(content.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn clear<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        let result = ai_chat_message::Entity::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }
}
