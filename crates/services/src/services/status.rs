use db::{
    DbErr,
    models::{
        client_task::ClientTask,
        cliente::{Cliente, ClienteSummary, TaskCounts},
    },
    types::ClienteEstado,
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("completed tasks ({completed}) exceed total tasks ({total})")]
    CompletedExceedsTotal { total: u64, completed: u64 },
}

/// Maps checklist counters onto the status a cliente should display.
pub fn derive_client_status(total: u64, completed: u64) -> Result<ClienteEstado, StatusError> {
    if completed > total {
        return Err(StatusError::CompletedExceedsTotal { total, completed });
    }
    Ok(match (total, completed) {
        (0, _) => ClienteEstado::SinTareas,
        (_, 0) => ClienteEstado::Pendiente,
        (total, completed) if completed < total => ClienteEstado::EnProceso,
        _ => ClienteEstado::Finalizado,
    })
}

pub fn derive_from_counts(counts: TaskCounts) -> Result<ClienteEstado, StatusError> {
    derive_client_status(counts.total, counts.completed)
}

/// Recounts every task of `client_id` and stores the derived status when it
/// differs from the stored one. Returns the status that was written, if any.
///
/// Callers run this inside the same transaction as the task mutation.
pub async fn reconcile_client_status<C: ConnectionTrait>(
    db: &C,
    client_id: i64,
) -> Result<Option<ClienteEstado>, DbErr> {
    let Some(cliente) = Cliente::find_by_id(db, client_id).await? else {
        return Ok(None);
    };
    let counts = ClientTask::counts_for_client(db, client_id).await?;
    let derived = derive_from_counts(counts).map_err(|err| DbErr::Custom(err.to_string()))?;

    if derived == cliente.estado {
        return Ok(None);
    }

    Cliente::set_estado(db, client_id, derived).await?;
    tracing::debug!(
        client_id,
        from = %cliente.estado,
        to = %derived,
        "reconciled cliente estado"
    );
    Ok(Some(derived))
}

/// A cliente row as listed by the API: the stored fields, the checklist
/// counters and the status derived from them.
#[derive(Debug, Clone, Serialize, TS)]
pub struct ClienteOverview {
    #[serde(flatten)]
    pub summary: ClienteSummary,
    pub estado_calculado: ClienteEstado,
}

impl ClienteOverview {
    pub fn from_summary(summary: ClienteSummary) -> Self {
        let estado_calculado = match derive_from_counts(summary.counts()) {
            Ok(estado) => estado,
            Err(err) => {
                tracing::warn!(client_id = summary.cliente.id, error = %err, "inconsistent task counters");
                summary.cliente.estado
            }
        };
        Self {
            summary,
            estado_calculado,
        }
    }
}

#[cfg(test)]
mod tests {
    use db::models::cliente::ClienteInput;

    use super::*;
    use crate::services::test_utils::setup_db;

    #[test]
    fn derives_every_label() {
        assert_eq!(derive_client_status(0, 0), Ok(ClienteEstado::SinTareas));
        assert_eq!(derive_client_status(3, 0), Ok(ClienteEstado::Pendiente));
        assert_eq!(derive_client_status(3, 1), Ok(ClienteEstado::EnProceso));
        assert_eq!(derive_client_status(3, 2), Ok(ClienteEstado::EnProceso));
        assert_eq!(derive_client_status(3, 3), Ok(ClienteEstado::Finalizado));
        assert_eq!(derive_client_status(1, 1), Ok(ClienteEstado::Finalizado));
    }

    #[test]
    fn every_valid_pair_has_exactly_one_label() {
        for total in 0..6u64 {
            for completed in 0..=total {
                let estado = derive_client_status(total, completed).unwrap();
                let expected = if total == 0 {
                    ClienteEstado::SinTareas
                } else if completed == 0 {
                    ClienteEstado::Pendiente
                } else if completed < total {
                    ClienteEstado::EnProceso
                } else {
                    ClienteEstado::Finalizado
                };
                assert_eq!(estado, expected, "total={total} completed={completed}");
            }
        }
    }

    #[test]
    fn completed_above_total_is_rejected() {
        assert_eq!(
            derive_client_status(2, 3),
            Err(StatusError::CompletedExceedsTotal {
                total: 2,
                completed: 3
            })
        );
    }

    #[tokio::test]
    async fn reconcile_writes_only_when_status_changes() {
        let db = setup_db().await;
        let acme = Cliente::create(
            &db,
            &ClienteInput {
                empresa: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(reconcile_client_status(&db, acme.id).await.unwrap(), None);

        let task = ClientTask::create(&db, acme.id, "Backup").await.unwrap();
        assert_eq!(
            reconcile_client_status(&db, acme.id).await.unwrap(),
            Some(ClienteEstado::Pendiente)
        );

        ClientTask::set_completed(&db, task.id, true).await.unwrap();
        assert_eq!(
            reconcile_client_status(&db, acme.id).await.unwrap(),
            Some(ClienteEstado::Finalizado)
        );
        assert_eq!(reconcile_client_status(&db, acme.id).await.unwrap(), None);

        assert_eq!(reconcile_client_status(&db, 999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn overview_carries_derived_status_next_to_stored_one() {
        let db = setup_db().await;
        let acme = Cliente::create(
            &db,
            &ClienteInput {
                empresa: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ClientTask::create(&db, acme.id, "Backup").await.unwrap();

        let summary = Cliente::summary(&db, acme.id).await.unwrap().unwrap();
        let json = serde_json::to_value(ClienteOverview::from_summary(summary)).unwrap();

        assert_eq!(json["estado"], "Sin Tareas");
        assert_eq!(json["estado_calculado"], "Pendiente");
        assert_eq!(json["tasks"], serde_json::json!(["Backup"]));
    }
}
