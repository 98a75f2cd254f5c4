use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use db::{DbErr, models::pendiente::Pendiente, types::PendienteEstado};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;
use utils::date::parse_iso_date;

use super::email::{EmailError, Mailer, ReminderKind, compose_reminder};

/// Days past the deadline during which a reminder is still sent.
pub const OVERDUE_GRACE_DAYS: i64 = 1;

pub const WEEKEND_MESSAGE: &str = "Fin de semana: No se envían notificaciones.";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Pendiente no encontrado")]
    NotFound(i64),
    #[error("No tiene correo configurado")]
    MissingEmail(i64),
    #[error("Error al enviar el correo: {0}")]
    Mailer(#[from] EmailError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::High => "urgency-high",
            Severity::Medium => "urgency-medium",
            Severity::Low => "urgency-low",
        }
    }
}

/// How close a pendiente is to its deadline. Only used for message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue(i64),
    DueToday,
    DueIn(i64),
    NoDeadline,
}

impl Urgency {
    pub fn from_days(days_remaining: i64) -> Self {
        match days_remaining {
            d if d < 0 => Urgency::Overdue(-d),
            0 => Urgency::DueToday,
            d => Urgency::DueIn(d),
        }
    }

    pub fn for_deadline(fecha_limite: Option<&str>, today: NaiveDate) -> Self {
        fecha_limite
            .and_then(parse_iso_date)
            .map(|deadline| Self::from_days(days_between(today, deadline)))
            .unwrap_or(Urgency::NoDeadline)
    }

    pub fn label(&self) -> String {
        match self {
            Urgency::Overdue(1) => "¡Venció hace un día!".to_string(),
            Urgency::Overdue(days) => format!("¡Venció hace {days} días!"),
            Urgency::DueToday => "¡Vence hoy!".to_string(),
            Urgency::DueIn(days) => format!("Vence en {days} días"),
            Urgency::NoDeadline => "Sin fecha límite".to_string(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Urgency::Overdue(_) | Urgency::DueToday | Urgency::DueIn(1) => Severity::High,
            Urgency::DueIn(2 | 3) => Severity::Medium,
            Urgency::DueIn(_) | Urgency::NoDeadline => Severity::Low,
        }
    }
}

fn days_between(today: NaiveDate, deadline: NaiveDate) -> i64 {
    deadline.signed_duration_since(today).num_days()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder<'a> {
    pub pendiente: &'a Pendiente,
    pub days_remaining: i64,
    pub urgency: Urgency,
}

/// Picks the pendientes that should get a reminder on `today`.
///
/// Nothing is due on weekends. A pendiente is due while it is still open,
/// has a notification address and a readable deadline, and that deadline is
/// at most `dias_antes_notificacion` days away and at most one day past.
pub fn select_due(pendientes: &[Pendiente], today: NaiveDate) -> Vec<DueReminder<'_>> {
    if is_weekend(today) {
        return Vec::new();
    }

    pendientes
        .iter()
        .filter(|pendiente| pendiente.estado == PendienteEstado::Pendiente)
        .filter_map(|pendiente| {
            let raw = pendiente.fecha_limite.as_deref()?;
            let Some(deadline) = parse_iso_date(raw) else {
                tracing::debug!(pendiente_id = pendiente.id, fecha_limite = raw, "skipping unreadable deadline");
                return None;
            };
            let days_remaining = days_between(today, deadline);
            let lead = i64::from(pendiente.dias_antes_notificacion);
            if days_remaining > lead || days_remaining < -OVERDUE_GRACE_DAYS {
                return None;
            }
            pendiente
                .email_notificacion
                .as_deref()
                .filter(|email| !email.trim().is_empty())?;
            Some(DueReminder {
                pendiente,
                days_remaining,
                urgency: Urgency::from_days(days_remaining),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
pub struct CheckAllOutcome {
    pub message: String,
    #[ts(type = "number")]
    pub sent: u64,
}

#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    public_base_url: String,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, public_base_url: impl Into<String>) -> Self {
        Self {
            mailer,
            public_base_url: public_base_url.into(),
        }
    }

    /// Sends the reminder for one pendiente right away, whatever its deadline.
    /// Returns the address the message went to.
    pub async fn notify_one<C: ConnectionTrait>(
        &self,
        db: &C,
        pendiente_id: i64,
        today: NaiveDate,
    ) -> Result<String, NotificationError> {
        let pendiente = Pendiente::find_by_id(db, pendiente_id)
            .await?
            .ok_or(NotificationError::NotFound(pendiente_id))?;

        let urgency = Urgency::for_deadline(pendiente.fecha_limite.as_deref(), today);
        let message = compose_reminder(
            &pendiente,
            &urgency,
            &self.public_base_url,
            ReminderKind::Manual,
        )
        .ok_or(NotificationError::MissingEmail(pendiente_id))?;

        self.mailer.send(&message).await?;
        tracing::info!(pendiente_id, to = %message.to, "reminder sent");
        Ok(message.to)
    }

    /// Sends every reminder due on `today`. Failed sends are logged and not
    /// counted.
    pub async fn check_all<C: ConnectionTrait>(
        &self,
        db: &C,
        today: NaiveDate,
    ) -> Result<CheckAllOutcome, NotificationError> {
        if is_weekend(today) {
            tracing::info!(%today, "weekend, skipping reminder batch");
            return Ok(CheckAllOutcome {
                message: WEEKEND_MESSAGE.to_string(),
                sent: 0,
            });
        }

        let candidates = Pendiente::find_open(db).await?;
        let due = select_due(&candidates, today);
        let mut sent = 0u64;

        for reminder in &due {
            let Some(message) = compose_reminder(
                reminder.pendiente,
                &reminder.urgency,
                &self.public_base_url,
                ReminderKind::Scheduled,
            ) else {
                continue;
            };
            match self.mailer.send(&message).await {
                Ok(()) => sent += 1,
                Err(err) => tracing::warn!(
                    pendiente_id = reminder.pendiente.id,
                    error = %err,
                    "failed to send scheduled reminder"
                ),
            }
        }

        tracing::info!(due = due.len(), sent, "reminder batch finished");
        Ok(CheckAllOutcome {
            message: format!("Verificación completada. Correos enviados: {sent}"),
            sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use db::models::pendiente::PendienteInput;

    use super::*;
    use crate::services::{email::EmailMessage, test_utils::setup_db};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
            if self.reject.contains(&message.to) {
                return Err(EmailError::Rejected {
                    status: 550,
                    body: "mailbox unavailable".to_string(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn pendiente(id: i64, fecha_limite: Option<String>, dias: i32) -> Pendiente {
        Pendiente {
            id,
            fecha: "2026-10-01".to_string(),
            actividad: format!("Pendiente {id}"),
            descripcion: None,
            empresa: None,
            cc_emails: None,
            estado: PendienteEstado::Pendiente,
            observaciones: None,
            fecha_limite,
            email_notificacion: Some("ops@example.com".to_string()),
            dias_antes_notificacion: dias,
        }
    }

    fn offset(days: i64) -> Option<String> {
        Some(
            (wednesday() + chrono::Duration::days(days))
                .format("%Y-%m-%d")
                .to_string(),
        )
    }

    #[test]
    fn lead_time_decides_due() {
        let today = wednesday();
        assert_eq!(select_due(&[pendiente(1, offset(2), 3)], today).len(), 1);
        assert!(select_due(&[pendiente(1, offset(2), 1)], today).is_empty());
    }

    #[test]
    fn one_day_of_grace_after_deadline() {
        let today = wednesday();
        let items = [pendiente(1, offset(-1), 3)];
        let due = select_due(&items, today);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].days_remaining, -1);
        assert_eq!(due[0].urgency.label(), "¡Venció hace un día!");

        assert!(select_due(&[pendiente(1, offset(-2), 3)], today).is_empty());
    }

    #[test]
    fn weekends_never_select_anything() {
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(is_weekend(saturday) && is_weekend(sunday));
        assert!(!is_weekend(wednesday()));

        let items = vec![
            pendiente(1, Some("2026-10-17".to_string()), 3),
            pendiente(2, Some("2026-10-18".to_string()), 3),
        ];
        assert!(select_due(&items, saturday).is_empty());
        assert!(select_due(&items, sunday).is_empty());
    }

    #[test]
    fn unreadable_or_unaddressed_items_are_skipped_individually() {
        let mut closed = pendiente(3, offset(0), 3);
        closed.estado = PendienteEstado::Completado;
        let mut silent = pendiente(4, offset(0), 3);
        silent.email_notificacion = None;

        let items = vec![
            pendiente(1, Some("el martes".to_string()), 3),
            pendiente(2, offset(0), 3),
            closed,
            silent,
            pendiente(5, None, 3),
        ];
        let due = select_due(&items, wednesday());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].pendiente.id, 2);
        assert_eq!(due[0].urgency, Urgency::DueToday);
    }

    #[test]
    fn urgency_labels_and_severity() {
        assert_eq!(Urgency::from_days(0).label(), "¡Vence hoy!");
        assert_eq!(Urgency::from_days(4).label(), "Vence en 4 días");
        assert_eq!(Urgency::from_days(1).severity(), Severity::High);
        assert_eq!(Urgency::from_days(3).severity(), Severity::Medium);
        assert_eq!(Urgency::from_days(5).severity(), Severity::Low);
        assert_eq!(Urgency::from_days(-1).severity(), Severity::High);
    }

    async fn insert(db: &db::DbPool, input: PendienteInput) -> Pendiente {
        Pendiente::create(db, &input.resolve(wednesday()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn notify_one_reports_missing_rows_and_addresses() {
        let db = setup_db().await;
        let mailer = Arc::new(RecordingMailer::default());
        let service = NotificationService::new(mailer.clone(), "http://localhost:5002");

        let result = service.notify_one(&db, 42, wednesday()).await;
        assert!(matches!(result, Err(NotificationError::NotFound(42))));

        let silent = insert(&db, PendienteInput::default()).await;
        let result = service.notify_one(&db, silent.id, wednesday()).await;
        assert!(matches!(result, Err(NotificationError::MissingEmail(_))));

        let addressed = insert(
            &db,
            PendienteInput {
                actividad: Some("Renovar dominio".to_string()),
                email_notificacion: Some("ops@example.com".to_string()),
                ..Default::default()
            },
        )
        .await;
        let to = service
            .notify_one(&db, addressed.id, wednesday())
            .await
            .unwrap();
        assert_eq!(to, "ops@example.com");

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "🔔 Recordatorio: 'Renovar dominio'");
    }

    #[tokio::test]
    async fn notify_one_surfaces_transport_failures() {
        let db = setup_db().await;
        let mailer = Arc::new(RecordingMailer {
            reject: vec!["ops@example.com".to_string()],
            ..Default::default()
        });
        let service = NotificationService::new(mailer, "http://localhost:5002");
        let addressed = insert(
            &db,
            PendienteInput {
                email_notificacion: Some("ops@example.com".to_string()),
                ..Default::default()
            },
        )
        .await;

        let result = service.notify_one(&db, addressed.id, wednesday()).await;
        assert!(matches!(result, Err(NotificationError::Mailer(_))));
    }

    #[tokio::test]
    async fn check_all_counts_only_successful_sends() {
        let db = setup_db().await;
        let mailer = Arc::new(RecordingMailer {
            reject: vec!["bounce@example.com".to_string()],
            ..Default::default()
        });
        let service = NotificationService::new(mailer.clone(), "http://localhost:5002");

        for (email, fecha_limite) in [
            ("ops@example.com", "2026-10-15"),
            ("bounce@example.com", "2026-10-15"),
            ("late@example.com", "2026-10-01"),
            ("far@example.com", "2026-11-30"),
        ] {
            insert(
                &db,
                PendienteInput {
                    email_notificacion: Some(email.to_string()),
                    fecha_limite: Some(fecha_limite.to_string()),
                    ..Default::default()
                },
            )
            .await;
        }

        let outcome = service.check_all(&db, wednesday()).await.unwrap();
        assert_eq!(outcome.sent, 1);
        assert_eq!(
            outcome.message,
            "Verificación completada. Correos enviados: 1"
        );
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].to, "ops@example.com");
        assert!(sent[0].subject.ends_with("vence pronto"));
    }

    #[tokio::test]
    async fn check_all_on_weekend_leaves_mailer_untouched() {
        let db = setup_db().await;
        let mailer = Arc::new(RecordingMailer::default());
        let service = NotificationService::new(mailer.clone(), "http://localhost:5002");
        insert(
            &db,
            PendienteInput {
                email_notificacion: Some("ops@example.com".to_string()),
                fecha_limite: Some("2026-10-17".to_string()),
                ..Default::default()
            },
        )
        .await;

        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let outcome = service.check_all(&db, saturday).await.unwrap();
        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.message, WEEKEND_MESSAGE);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
