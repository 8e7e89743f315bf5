use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailLogs::Table)
                    .if_not_exists()
                    .col(pk_uuid(EmailLogs::Id))
                    .col(
                        ColumnDef::new(EmailLogs::ToEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmailLogs::ToName).string_len(255).null())
                    .col(text(EmailLogs::Subject))
                    .col(text(EmailLogs::Body))
                    .col(
                        ColumnDef::new(EmailLogs::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(text_null(EmailLogs::ErrorMessage))
                    .col(text_null(EmailLogs::MessageId))
                    .col(ColumnDef::new(EmailLogs::EventType).string_len(64).null())
                    .col(
                        ColumnDef::new(EmailLogs::RelatedUserId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EmailLogs::RelatedProjectId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        timestamp_with_time_zone(EmailLogs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(EmailLogs::SentAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_logs_status")
                    .table(EmailLogs::Table)
                    .col(EmailLogs::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_logs_created_at")
                    .table(EmailLogs::Table)
                    .col(EmailLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EmailLogs {
    Table,
    Id,
    ToEmail,
    ToName,
    Subject,
    Body,
    Status,
    ErrorMessage,
    MessageId,
    EventType,
    RelatedUserId,
    RelatedProjectId,
    CreatedAt,
    SentAt,
}
