use sea_orm_migration::{prelude::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Pendientes::Table)
                    .col(pk_id_col(manager, Pendientes::Id))
                    .col(ColumnDef::new(Pendientes::Fecha).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Pendientes::Actividad)
                            .string()
                            .not_null()
                            .default(Expr::val("Sin título")),
                    )
                    .col(ColumnDef::new(Pendientes::Descripcion).text())
                    .col(ColumnDef::new(Pendientes::Empresa).string())
                    .col(ColumnDef::new(Pendientes::CcEmails).text())
                    .col(
                        ColumnDef::new(Pendientes::Estado)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("Pendiente")),
                    )
                    .col(ColumnDef::new(Pendientes::Observaciones).text())
                    .col(ColumnDef::new(Pendientes::FechaLimite).string_len(32))
                    .col(ColumnDef::new(Pendientes::EmailNotificacion).string())
                    .col(
                        ColumnDef::new(Pendientes::DiasAntesNotificacion)
                            .integer()
                            .not_null()
                            .default(Expr::val(3)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pendientes_estado")
                    .table(Pendientes::Table)
                    .col(Pendientes::Estado)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pendientes_empresa")
                    .table(Pendientes::Table)
                    .col(Pendientes::Empresa)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Clientes::Table)
                    .col(pk_id_col(manager, Clientes::Id))
                    .col(ColumnDef::new(Clientes::Empresa).string().not_null())
                    .col(ColumnDef::new(Clientes::Observaciones).text())
                    .col(
                        ColumnDef::new(Clientes::Estado)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("Sin Tareas")),
                    )
                    .col(
                        ColumnDef::new(Clientes::CheckEstado)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clientes_empresa")
                    .table(Clientes::Table)
                    .col(Clientes::Empresa)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(ClientTasks::Table)
                    .col(pk_id_col(manager, ClientTasks::Id))
                    .col(fk_id_col(manager, ClientTasks::ClientId))
                    .col(ColumnDef::new(ClientTasks::Description).text().not_null())
                    .col(
                        ColumnDef::new(ClientTasks::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(ClientTasks::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_tasks_client_id")
                            .from(ClientTasks::Table, ClientTasks::ClientId)
                            .to(Clientes::Table, Clientes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_client_tasks_client_id")
                    .table(ClientTasks::Table)
                    .col(ClientTasks::ClientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientTasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clientes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pendientes::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Pendientes {
    Table,
    Id,
    Fecha,
    Actividad,
    Descripcion,
    Empresa,
    CcEmails,
    Estado,
    Observaciones,
    FechaLimite,
    EmailNotificacion,
    DiasAntesNotificacion,
}

#[derive(Iden)]
enum Clientes {
    Table,
    Id,
    Empresa,
    Observaciones,
    Estado,
    CheckEstado,
}

#[derive(Iden)]
enum ClientTasks {
    Table,
    Id,
    ClientId,
    Description,
    Completed,
    CreatedAt,
}
