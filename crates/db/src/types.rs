use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Lifecycle of a pendiente. `En Curso` is accepted on input as an older
/// spelling of `En Proceso`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PendienteEstado {
    #[default]
    #[sea_orm(string_value = "Pendiente")]
    #[serde(rename = "Pendiente")]
    #[strum(to_string = "Pendiente")]
    Pendiente,
    #[sea_orm(string_value = "En Proceso")]
    #[serde(rename = "En Proceso", alias = "En Curso")]
    #[strum(to_string = "En Proceso", serialize = "En Curso")]
    EnProceso,
    #[sea_orm(string_value = "Completado")]
    #[serde(rename = "Completado")]
    #[strum(to_string = "Completado")]
    Completado,
    #[sea_orm(string_value = "Cancelado")]
    #[serde(rename = "Cancelado")]
    #[strum(to_string = "Cancelado")]
    Cancelado,
    #[sea_orm(string_value = "Finalizado")]
    #[serde(rename = "Finalizado")]
    #[strum(to_string = "Finalizado")]
    Finalizado,
}

/// Status of a cliente's task checklist.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ClienteEstado {
    #[default]
    #[sea_orm(string_value = "Sin Tareas")]
    #[serde(rename = "Sin Tareas")]
    #[strum(to_string = "Sin Tareas")]
    SinTareas,
    #[sea_orm(string_value = "Pendiente")]
    #[serde(rename = "Pendiente")]
    #[strum(to_string = "Pendiente")]
    Pendiente,
    #[sea_orm(string_value = "En Proceso")]
    #[serde(rename = "En Proceso")]
    #[strum(to_string = "En Proceso")]
    EnProceso,
    #[sea_orm(string_value = "Finalizado")]
    #[serde(rename = "Finalizado")]
    #[strum(to_string = "Finalizado")]
    Finalizado,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "ai")]
    Ai,
}
