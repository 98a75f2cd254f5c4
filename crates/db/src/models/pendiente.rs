use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
    sea_query::{NullOrdering, Order},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utils::{
    date::{format_iso, parse_iso_date},
    serde_ext::flexible_i32_opt,
};

use crate::{entities::pendiente, types::PendienteEstado};

pub const DEFAULT_ACTIVIDAD: &str = "Sin título";
pub const DEFAULT_DIAS_ANTES_NOTIFICACION: i32 = 3;

#[derive(Debug, Error)]
pub enum PendienteError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Pendiente {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Pendiente {
    #[ts(type = "number")]
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

/// Body of `POST /pendientes` and `PUT /pendientes/{id}`.
///
/// Every field is optional on the wire; [`PendienteInput::resolve`] fills the
/// defaults and rejects malformed dates.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct PendienteInput {
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub actividad: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub empresa: Option<String>,
    #[serde(default, alias = "ccEmails", alias = "CCEmails")]
    pub cc_emails: Option<String>,
    #[serde(default)]
    pub estado: Option<PendienteEstado>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default, alias = "fechaLimite")]
    pub fecha_limite: Option<String>,
    #[serde(default, alias = "emailNotificacion")]
    pub email_notificacion: Option<String>,
    #[serde(
        default,
        alias = "diasAntesNotificacion",
        deserialize_with = "flexible_i32_opt"
    )]
    pub dias_antes_notificacion: Option<i32>,
}

/// A [`PendienteInput`] with defaults applied, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendienteFields {
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

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn resolve_date(field: &str, value: &Option<String>) -> Result<Option<String>, PendienteError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => parse_iso_date(&raw)
            .map(|date| Some(format_iso(date)))
            .ok_or_else(|| {
                PendienteError::Validation(format!("{field} must be a YYYY-MM-DD date, got '{raw}'"))
            }),
    }
}

impl PendienteInput {
    pub fn resolve(&self, today: NaiveDate) -> Result<PendienteFields, PendienteError> {
        let dias_antes_notificacion = self
            .dias_antes_notificacion
            .unwrap_or(DEFAULT_DIAS_ANTES_NOTIFICACION);
        if dias_antes_notificacion < 0 {
            return Err(PendienteError::Validation(
                "dias_antes_notificacion must be zero or greater".to_string(),
            ));
        }

        Ok(PendienteFields {
            fecha: resolve_date("fecha", &self.fecha)?.unwrap_or_else(|| format_iso(today)),
            actividad: non_blank(&self.actividad).unwrap_or_else(|| DEFAULT_ACTIVIDAD.to_string()),
            descripcion: non_blank(&self.descripcion),
            empresa: non_blank(&self.empresa),
            cc_emails: non_blank(&self.cc_emails),
            estado: self.estado.unwrap_or_default(),
            observaciones: non_blank(&self.observaciones),
            fecha_limite: resolve_date("fecha_limite", &self.fecha_limite)?,
            email_notificacion: non_blank(&self.email_notificacion),
            dias_antes_notificacion,
        })
    }
}

impl Pendiente {
    fn from_model(model: pendiente::Model) -> Self {
        Self {
            id: model.id,
            fecha: model.fecha,
            actividad: model.actividad,
            descripcion: model.descripcion,
            empresa: model.empresa,
            cc_emails: model.cc_emails,
            estado: model.estado,
            observaciones: model.observaciones,
            fecha_limite: model.fecha_limite,
            email_notificacion: model.email_notificacion,
            dias_antes_notificacion: model.dias_antes_notificacion,
        }
    }

    /// All pendientes, nearest deadline first. Rows without a deadline sort last.
    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = pendiente::Entity::find()
            .order_by_with_nulls(
                pendiente::Column::FechaLimite,
                Order::Asc,
                NullOrdering::Last,
            )
            .order_by_asc(pendiente::Column::Id)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = pendiente::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    /// Pendientes still waiting on someone, i.e. candidates for a reminder.
    pub async fn find_open<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = pendiente::Entity::find()
            .filter(pendiente::Column::Estado.eq(PendienteEstado::Pendiente))
            .filter(pendiente::Column::FechaLimite.is_not_null())
            .order_by_asc(pendiente::Column::Id)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        fields: &PendienteFields,
    ) -> Result<Self, DbErr> {
        let active = pendiente::ActiveModel {
            fecha: Set(fields.fecha.clone()),
            actividad: Set(fields.actividad.clone()),
            descripcion: Set(fields.descripcion.clone()),
            empresa: Set(fields.empresa.clone()),
            cc_emails: Set(fields.cc_emails.clone()),
            estado: Set(fields.estado),
            observaciones: Set(fields.observaciones.clone()),
            fecha_limite: Set(fields.fecha_limite.clone()),
            email_notificacion: Set(fields.email_notificacion.clone()),
            dias_antes_notificacion: Set(fields.dias_antes_notificacion),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    /// Replaces every field of an existing pendiente.
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        fields: &PendienteFields,
    ) -> Result<Self, PendienteError> {
        let record = pendiente::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(PendienteError::NotFound(id))?;

        let mut active: pendiente::ActiveModel = record.into();
        active.fecha = Set(fields.fecha.clone());
        active.actividad = Set(fields.actividad.clone());
        active.descripcion = Set(fields.descripcion.clone());
        active.empresa = Set(fields.empresa.clone());
        active.cc_emails = Set(fields.cc_emails.clone());
        active.estado = Set(fields.estado);
        active.observaciones = Set(fields.observaciones.clone());
        active.fecha_limite = Set(fields.fecha_limite.clone());
        active.email_notificacion = Set(fields.email_notificacion.clone());
        active.dias_antes_notificacion = Set(fields.dias_antes_notificacion);

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn set_estado<C: ConnectionTrait>(
        db: &C,
        id: i64,
        estado: PendienteEstado,
    ) -> Result<u64, DbErr> {
        let result = pendiente::Entity::update_many()
            .set(pendiente::ActiveModel {
                estado: Set(estado),
                ..Default::default()
            })
            .filter(pendiente::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        let result = pendiente::Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_db;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    #[test]
    fn resolve_applies_defaults() {
        let fields = PendienteInput::default().resolve(today()).unwrap();

        assert_eq!(fields.fecha, "2026-10-14");
        assert_eq!(fields.actividad, DEFAULT_ACTIVIDAD);
        assert_eq!(fields.estado, PendienteEstado::Pendiente);
        assert_eq!(fields.dias_antes_notificacion, 3);
        assert_eq!(fields.fecha_limite, None);
    }

    #[test]
    fn resolve_rejects_negative_lead_time_and_bad_dates() {
        let input = PendienteInput {
            dias_antes_notificacion: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            input.resolve(today()),
            Err(PendienteError::Validation(_))
        ));

        let input = PendienteInput {
            fecha_limite: Some("15/10/2026".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            input.resolve(today()),
            Err(PendienteError::Validation(_))
        ));
    }

    #[test]
    fn input_accepts_camel_case_and_string_numbers() {
        let input: PendienteInput = serde_json::from_str(
            r#"{
                "actividad": "Renovar dominio",
                "fechaLimite": "2026-10-20T00:00:00",
                "emailNotificacion": "ops@example.com",
                "diasAntesNotificacion": "5",
                "estado": "En Curso"
            }"#,
        )
        .unwrap();
        let fields = input.resolve(today()).unwrap();

        assert_eq!(fields.fecha_limite.as_deref(), Some("2026-10-20"));
        assert_eq!(fields.email_notificacion.as_deref(), Some("ops@example.com"));
        assert_eq!(fields.dias_antes_notificacion, 5);
        assert_eq!(fields.estado, PendienteEstado::EnProceso);
    }

    #[tokio::test]
    async fn find_all_orders_by_deadline_with_missing_last() {
        let db = setup_db().await;
        for fecha_limite in [None, Some("2026-10-30"), Some("2026-10-16")] {
            let input = PendienteInput {
                fecha_limite: fecha_limite.map(str::to_string),
                ..Default::default()
            };
            Pendiente::create(&db, &input.resolve(today()).unwrap())
                .await
                .unwrap();
        }

        let deadlines: Vec<Option<String>> = Pendiente::find_all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.fecha_limite)
            .collect();
        assert_eq!(
            deadlines,
            vec![
                Some("2026-10-16".to_string()),
                Some("2026-10-30".to_string()),
                None
            ]
        );
    }

    #[tokio::test]
    async fn update_replaces_fields_and_reports_missing_rows() {
        let db = setup_db().await;
        let created = Pendiente::create(&db, &PendienteInput::default().resolve(today()).unwrap())
            .await
            .unwrap();

        let input = PendienteInput {
            actividad: Some("Llamar a proveedor".to_string()),
            estado: Some(PendienteEstado::Completado),
            ..Default::default()
        };
        let updated = Pendiente::update(&db, created.id, &input.resolve(today()).unwrap())
            .await
            .unwrap();
        assert_eq!(updated.actividad, "Llamar a proveedor");
        assert_eq!(updated.estado, PendienteEstado::Completado);

        let missing = Pendiente::update(&db, 999, &input.resolve(today()).unwrap()).await;
        assert!(matches!(missing, Err(PendienteError::NotFound(999))));
    }

    #[tokio::test]
    async fn find_open_skips_closed_and_undated_rows() {
        let db = setup_db().await;
        let open = PendienteInput {
            fecha_limite: Some("2026-10-16".to_string()),
            ..Default::default()
        };
        let closed = PendienteInput {
            fecha_limite: Some("2026-10-16".to_string()),
            estado: Some(PendienteEstado::Finalizado),
            ..Default::default()
        };
        let open = Pendiente::create(&db, &open.resolve(today()).unwrap())
            .await
            .unwrap();
        Pendiente::create(&db, &closed.resolve(today()).unwrap())
            .await
            .unwrap();
        Pendiente::create(&db, &PendienteInput::default().resolve(today()).unwrap())
            .await
            .unwrap();

        let found = Pendiente::find_open(&db).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, open.id);
    }
}
