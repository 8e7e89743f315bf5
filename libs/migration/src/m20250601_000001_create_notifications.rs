use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(pk_uuid(Notifications::Id))
                    .col(
                        ColumnDef::new(Notifications::UserId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(text(Notifications::Message))
                    .col(boolean(Notifications::IsRead).default(false))
                    .col(
                        ColumnDef::new(Notifications::RelatedProjectId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::RelatedUserId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::RelatedTaskId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        timestamp_with_time_zone(Notifications::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Notifications::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing and unread counts always filter by user
        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_id_is_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_related_project_id")
                    .table(Notifications::Table)
                    .col(Notifications::RelatedProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    NotificationType,
    Title,
    Message,
    IsRead,
    RelatedProjectId,
    RelatedUserId,
    RelatedTaskId,
    CreatedAt,
    UpdatedAt,
}
