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
                    .table(SupportNotes::Table)
                    .col(pk_id_col(manager, SupportNotes::Id))
                    .col(ColumnDef::new(SupportNotes::Title).string().not_null())
                    .col(ColumnDef::new(SupportNotes::Content).text().not_null())
                    .col(timestamp_col(SupportNotes::CreatedAt))
                    .col(timestamp_col(SupportNotes::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_support_notes_created_at")
                    .table(SupportNotes::Table)
                    .col(SupportNotes::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(AiChatMessages::Table)
                    .col(pk_id_col(manager, AiChatMessages::Id))
                    .col(ColumnDef::new(AiChatMessages::Role).string_len(16).not_null())
                    .col(ColumnDef::new(AiChatMessages::Content).text().not_null())
                    .col(timestamp_col(AiChatMessages::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiChatMessages::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_support_notes_created_at")
                    .table(SupportNotes::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(SupportNotes::Table).to_owned())
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

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum SupportNotes {
    Table,
    Id,
    Title,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AiChatMessages {
    Table,
    Id,
    Role,
    Content,
    CreatedAt,
}
