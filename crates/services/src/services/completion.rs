use db::{
    DbErr, DbPool, TransactionTrait,
    models::{client_task::ClientTask, cliente::Cliente, pendiente::Pendiente},
    retry_on_sqlite_busy,
    types::PendienteEstado,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Pendiente no encontrado")]
    NotFound(i64),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub pendiente: Pendiente,
    /// The cliente whose checklist was cleared, when one matched by empresa.
    pub client_id: Option<i64>,
    pub tasks_removed: u64,
}

/// Closes a pendiente from the reminder email link.
///
/// The pendiente becomes `Finalizado`. The first cliente whose `empresa`
/// equals the pendiente's loses all its tasks and gets `check_estado` set.
/// Running it again changes nothing further.
pub async fn complete_all_tasks(
    db: &DbPool,
    pendiente_id: i64,
) -> Result<CompletionOutcome, CompletionError> {
    let outcome = retry_on_sqlite_busy(move || async move {
        let tx = db.begin().await?;

        let Some(pendiente) = Pendiente::find_by_id(&tx, pendiente_id).await? else {
            return Ok(None);
        };
        Pendiente::set_estado(&tx, pendiente_id, PendienteEstado::Finalizado).await?;

        let cliente = match pendiente.empresa.as_deref() {
            Some(empresa) => Cliente::find_first_by_empresa(&tx, empresa).await?,
            None => None,
        };
        let mut tasks_removed = 0;
        if let Some(cliente) = &cliente {
            tasks_removed = ClientTask::delete_by_client(&tx, cliente.id).await?;
            Cliente::mark_checked(&tx, cliente.id).await?;
        }

        tx.commit().await?;
        Ok::<_, DbErr>(Some(CompletionOutcome {
            pendiente: Pendiente {
                estado: PendienteEstado::Finalizado,
                ..pendiente
            },
            client_id: cliente.map(|cliente| cliente.id),
            tasks_removed,
        }))
    })
    .await?;

    let outcome = outcome.ok_or(CompletionError::NotFound(pendiente_id))?;
    tracing::info!(
        pendiente_id,
        client_id = ?outcome.client_id,
        tasks_removed = outcome.tasks_removed,
        "pendiente completed"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use db::models::{cliente::ClienteInput, pendiente::PendienteInput};

    use super::*;
    use crate::services::test_utils::setup_db;

    async fn setup() -> (DbPool, Pendiente, Cliente) {
        let db = setup_db().await;
        let first = Cliente::create(
            &db,
            &ClienteInput {
                empresa: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ClientTask::create(&db, first.id, "Backup").await.unwrap();
        ClientTask::create(&db, first.id, "Facturar").await.unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let pendiente = Pendiente::create(
            &db,
            &PendienteInput {
                empresa: Some("Acme".to_string()),
                ..Default::default()
            }
            .resolve(today)
            .unwrap(),
        )
        .await
        .unwrap();
        (db, pendiente, first)
    }

    #[tokio::test]
    async fn finalizes_and_clears_the_matching_cliente() {
        let (db, pendiente, acme) = setup().await;
        let duplicate = Cliente::create(
            &db,
            &ClienteInput {
                empresa: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ClientTask::create(&db, duplicate.id, "Otra").await.unwrap();

        let outcome = complete_all_tasks(&db, pendiente.id).await.unwrap();

        assert_eq!(outcome.pendiente.estado, PendienteEstado::Finalizado);
        assert_eq!(outcome.client_id, Some(acme.id));
        assert_eq!(outcome.tasks_removed, 2);

        let stored = Pendiente::find_by_id(&db, pendiente.id).await.unwrap().unwrap();
        assert_eq!(stored.estado, PendienteEstado::Finalizado);
        let acme = Cliente::find_by_id(&db, acme.id).await.unwrap().unwrap();
        assert!(acme.check_estado);
        assert!(ClientTask::find_by_client(&db, acme.id).await.unwrap().is_empty());
        assert_eq!(
            ClientTask::find_by_client(&db, duplicate.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn running_twice_matches_running_once() {
        let (db, pendiente, acme) = setup().await;

        complete_all_tasks(&db, pendiente.id).await.unwrap();
        let once = (
            Pendiente::find_by_id(&db, pendiente.id).await.unwrap(),
            Cliente::summary(&db, acme.id).await.unwrap(),
        );

        let second = complete_all_tasks(&db, pendiente.id).await.unwrap();
        assert_eq!(second.tasks_removed, 0);
        let twice = (
            Pendiente::find_by_id(&db, pendiente.id).await.unwrap(),
            Cliente::summary(&db, acme.id).await.unwrap(),
        );
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn pendiente_without_empresa_only_changes_itself() {
        let (db, _, acme) = setup().await;
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let loose = Pendiente::create(&db, &PendienteInput::default().resolve(today).unwrap())
            .await
            .unwrap();

        let outcome = complete_all_tasks(&db, loose.id).await.unwrap();
        assert_eq!(outcome.client_id, None);
        assert_eq!(
            ClientTask::find_by_client(&db, acme.id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn missing_pendiente_is_reported() {
        let db = setup_db().await;
        assert!(matches!(
            complete_all_tasks(&db, 5).await,
            Err(CompletionError::NotFound(5))
        ));
    }
}
