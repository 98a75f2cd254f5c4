use sea_orm_migration::prelude::*;

mod m20260121000000_baseline;
mod m20260206000000_support_notes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260121000000_baseline::Migration),
            Box::new(m20260206000000_support_notes::Migration),
        ]
    }
}
