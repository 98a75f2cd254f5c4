use std::sync::Arc;

use async_trait::async_trait;
use db::models::pendiente::Pendiente;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use utils::html::escape;

use super::{config::MailConfig, notification::Urgency};

const DEFAULT_FROM: &str = "Pendientes <no-reply@localhost>";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email delivery is not configured")]
    NotConfigured,
    #[error("mail relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Delivers a rendered reminder. Implementations perform a single attempt.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct HttpRelayMailer {
    client: Client,
    url: String,
    token: Option<SecretString>,
    from: String,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    cc: &'a [String],
    subject: &'a str,
    html: &'a str,
}

impl HttpRelayMailer {
    pub fn new(url: impl Into<String>, token: Option<SecretString>, from: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            token,
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let payload = RelayPayload {
            from: &self.from,
            to: &message.to,
            cc: &message.cc,
            subject: &message.subject,
            html: &message.html,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status,
                body: body.trim().to_string(),
            });
        }

        tracing::debug!(to = %message.to, cc = message.cc.len(), "reminder handed to mail relay");
        Ok(())
    }
}

/// Used when no relay is configured; every send fails with `NotConfigured`.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), EmailError> {
        Err(EmailError::NotConfigured)
    }
}

pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.relay_url {
        Some(url) => Arc::new(HttpRelayMailer::new(
            url.clone(),
            config.relay_token(),
            config.from.clone().unwrap_or_else(|| DEFAULT_FROM.to_string()),
        )),
        None => {
            tracing::warn!("No mail relay configured, reminders will not be delivered");
            Arc::new(DisabledMailer)
        }
    }
}

/// Splits a `cc_emails` value on `,` and `;`.
pub fn parse_cc_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split([',', ';'])
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    /// Sent on demand from the UI.
    Manual,
    /// Sent by the batch check.
    Scheduled,
}

pub fn reminder_subject(actividad: &str, kind: ReminderKind) -> String {
    match kind {
        ReminderKind::Manual => format!("🔔 Recordatorio: '{actividad}'"),
        ReminderKind::Scheduled => format!("🔔 Recordatorio: '{actividad}' vence pronto"),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct DescriptionParts {
    observaciones: String,
    tareas: Vec<String>,
}

fn strip_bullet(line: &str) -> &str {
    line.trim().trim_start_matches(['-', '•']).trim()
}

fn starts_with_marker(line: &str, marker: &str) -> bool {
    line.get(..marker.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(marker))
}

/// Splits a description into observations and tasks. Descriptions with an
/// `Observaciones:` or `Tareas:` marker are read section by section; anything
/// else is treated as one task per non-empty line.
fn parse_description(descripcion: &str) -> DescriptionParts {
    enum Section {
        None,
        Observaciones,
        Tareas,
    }

    let mut parts = DescriptionParts::default();
    let mut section = Section::None;
    let mut has_markers = false;

    for line in descripcion.lines() {
        let line = line.trim();
        if starts_with_marker(line, "Observaciones:") {
            section = Section::Observaciones;
            has_markers = true;
            continue;
        }
        if starts_with_marker(line, "Tareas:") {
            section = Section::Tareas;
            has_markers = true;
            continue;
        }
        if line.is_empty() {
            continue;
        }
        match section {
            Section::Observaciones => {
                if !parts.observaciones.is_empty() {
                    parts.observaciones.push('\n');
                }
                parts.observaciones.push_str(line);
            }
            Section::Tareas => {
                let task = line.strip_prefix("- ").unwrap_or(line).trim();
                if !task.is_empty() {
                    parts.tareas.push(task.to_string());
                }
            }
            Section::None => {}
        }
    }

    if !has_markers {
        parts.tareas = descripcion
            .lines()
            .map(strip_bullet)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
    }
    parts
}

fn observaciones_section(observaciones: &str) -> String {
    if observaciones.trim().is_empty() {
        return String::new();
    }
    format!(
        r#"<div class="section-box observaciones-box">
        <div class="section-title">📋 OBSERVACIONES</div>
        <div class="observaciones-content">{}</div>
      </div>"#,
        escape(observaciones)
    )
}

fn tareas_section(tareas: &[String]) -> String {
    if tareas.is_empty() {
        return String::new();
    }
    let items: String = tareas
        .iter()
        .map(|task| format!("<li>{}</li>", escape(task)))
        .collect();
    format!(
        r#"<div class="section-box tareas-box">
        <div class="section-title">✅ TAREAS PENDIENTES</div>
        <ul class="tareas-list">{items}</ul>
      </div>"#
    )
}

/// Renders the HTML reminder for `pendiente`.
pub fn render_reminder(pendiente: &Pendiente, urgency: &Urgency, public_base_url: &str) -> String {
    let parts = parse_description(pendiente.descripcion.as_deref().unwrap_or_default());
    let observaciones = pendiente
        .observaciones
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(&parts.observaciones);

    let complete_url = format!(
        "{}/api/pendientes/{}/complete-all-tasks",
        public_base_url.trim_end_matches('/'),
        pendiente.id
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>
    body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #f4f4f4; margin: 0; padding: 0; }}
    .email-container {{ max-width: 600px; margin: 20px auto; background-color: #ffffff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
    .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: #ffffff; padding: 24px; text-align: center; }}
    .content {{ padding: 24px; }}
    .activity-card {{ border-left: 4px solid #667eea; background-color: #f8f9ff; padding: 16px; border-radius: 4px; margin-bottom: 16px; }}
    .badge {{ display: inline-block; padding: 4px 10px; border-radius: 12px; font-size: 12px; font-weight: 600; margin-right: 6px; }}
    .badge-status {{ background-color: #fff3cd; color: #856404; }}
    .urgency-high {{ background-color: #f8d7da; color: #721c24; }}
    .urgency-medium {{ background-color: #fff3cd; color: #856404; }}
    .urgency-low {{ background-color: #d4edda; color: #155724; }}
    .section-box {{ border-radius: 6px; padding: 14px; margin-bottom: 16px; background-color: #fafafa; }}
    .section-title {{ font-weight: 700; margin-bottom: 8px; }}
    .observaciones-content {{ white-space: pre-wrap; }}
    .button {{ display: inline-block; background-color: #28a745; color: #ffffff; padding: 12px 24px; border-radius: 6px; text-decoration: none; font-weight: 600; }}
    .footer {{ text-align: center; color: #888888; font-size: 12px; padding: 16px; }}
  </style>
</head>
<body>
  <div class="email-container">
    <div class="header"><h1>🔔 Recordatorio de Pendiente</h1></div>
    <div class="content">
      <div class="activity-card">
        <h2>{actividad}</h2>
        <p><strong>Fecha Límite:</strong> {fecha_limite}</p>
        <p><strong>Empresa:</strong> {empresa}</p>
        <span class="badge badge-status">⚠️ {estado}</span>
        <span class="badge {urgency_class}">{urgency_label}</span>
      </div>
      {observaciones_html}
      {tareas_html}
      <div style="text-align: center;">
        <a class="button" href="{complete_url}">✓ Marcar Todas como Completadas</a>
      </div>
    </div>
    <div class="footer">Tu Asistente Virtual</div>
  </div>
</body>
</html>"#,
        actividad = escape(&pendiente.actividad),
        fecha_limite = escape(pendiente.fecha_limite.as_deref().unwrap_or("Sin fecha")),
        empresa = escape(pendiente.empresa.as_deref().unwrap_or("N/A")),
        estado = escape(&pendiente.estado.to_string()),
        urgency_class = urgency.severity().css_class(),
        urgency_label = escape(&urgency.label()),
        observaciones_html = observaciones_section(observaciones),
        tareas_html = tareas_section(&parts.tareas),
        complete_url = escape(&complete_url),
    )
}

/// Builds the full message for `pendiente`. Returns `None` when it has no
/// notification address.
pub fn compose_reminder(
    pendiente: &Pendiente,
    urgency: &Urgency,
    public_base_url: &str,
    kind: ReminderKind,
) -> Option<EmailMessage> {
    let to = pendiente
        .email_notificacion
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())?;
    Some(EmailMessage {
        to: to.to_string(),
        cc: parse_cc_list(pendiente.cc_emails.as_deref()),
        subject: reminder_subject(&pendiente.actividad, kind),
        html: render_reminder(pendiente, urgency, public_base_url),
    })
}
