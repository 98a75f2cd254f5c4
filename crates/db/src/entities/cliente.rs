use sea_orm::entity::prelude::*;

use crate::types::ClienteEstado;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clientes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub empresa: String,
    pub observaciones: Option<String>,
    pub estado: ClienteEstado,
    pub check_estado: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_task::Entity")]
    ClientTask,
}

impl Related<super::client_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientTask.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
