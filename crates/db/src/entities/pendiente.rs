use sea_orm::entity::prelude::*;

use crate::types::PendienteEstado;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pendientes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub fecha: String,
    pub actividad: String,
    pub descripcion: Option<String>,
    pub empresa: Option<String>,
    pub cc_emails: Option<String>,
    pub estado: PendienteEstado,
    pub observaciones: Option<String>,
    pub fecha_limite: Option<String>,
    pub email_notificacion: Option<String>,
    pub dias_antes_notificacion: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
