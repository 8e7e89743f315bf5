pub use sea_orm_migration::prelude::*;

mod m20250601_000000_create_email_logs;
mod m20250601_000001_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000000_create_email_logs::Migration),
            Box::new(m20250601_000001_create_notifications::Migration),
        ]
    }
}
