use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create inventory_log table. No foreign key on related_request_id:
        // ledger rows must outlive cancelled swap requests.
        manager
            .create_table(
                Table::create()
                    .table(InventoryLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryLog::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryLog::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryLog::PartSku).string().not_null())
                    .col(ColumnDef::new(InventoryLog::Quantity).integer().not_null())
                    .col(ColumnDef::new(InventoryLog::LogType).string().not_null())
                    .col(ColumnDef::new(InventoryLog::Bin).string().not_null())
                    .col(ColumnDef::new(InventoryLog::Notes).string().not_null())
                    .col(
                        ColumnDef::new(InventoryLog::RelatedRequestId)
                            .uuid()
                            .null(),
                    )
                    .col(ColumnDef::new(InventoryLog::PartAcronym).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_inventory_log_part_sku")
                    .table(InventoryLog::Table)
                    .col(InventoryLog::PartSku)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_inventory_log_occurred_at")
                    .table(InventoryLog::Table)
                    .col(InventoryLog::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_inventory_log_related_request_id")
                    .table(InventoryLog::Table)
                    .col(InventoryLog::RelatedRequestId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InventoryLog {
    Table,
    Id,
    OccurredAt,
    PartSku,
    Quantity,
    LogType,
    Bin,
    Notes,
    RelatedRequestId,
    PartAcronym,
}
