use sea_orm::entity::prelude::*;

use crate::types::ChatRole;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_chat_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
