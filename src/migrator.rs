use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240201_000001_create_swap_requests_table::Migration),
            Box::new(m20240201_000002_create_inventory_log_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240201_000001_create_swap_requests_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000001_create_swap_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create swap_requests table aligned with entities::swap_request Model
            manager
                .create_table(
                    Table::create()
                        .table(SwapRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SwapRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SwapRequests::Ticket).string().not_null())
                        .col(
                            ColumnDef::new(SwapRequests::PartAbbreviation)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SwapRequests::SerialNum).string().not_null())
                        .col(ColumnDef::new(SwapRequests::OemClaimNum).string().null())
                        .col(
                            ColumnDef::new(SwapRequests::DateRequested)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SwapRequests::Status).string().not_null())
                        .col(
                            ColumnDef::new(SwapRequests::StockPartUsedSku)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(SwapRequests::StockBin).string().null())
                        .col(ColumnDef::new(SwapRequests::InvenAdjust).string().null())
                        .col(
                            ColumnDef::new(SwapRequests::DispatchDoa)
                                .string()
                                .not_null()
                                .default("No"),
                        )
                        .col(
                            ColumnDef::new(SwapRequests::DateDispatched)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SwapRequests::ReceivedPartSku)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(SwapRequests::ReceivedPpid).string().null())
                        .col(ColumnDef::new(SwapRequests::ReceivedBin).string().null())
                        .col(ColumnDef::new(SwapRequests::ReceivedQty).integer().null())
                        .col(
                            ColumnDef::new(SwapRequests::ReceivedDoa)
                                .string()
                                .not_null()
                                .default("No"),
                        )
                        .col(
                            ColumnDef::new(SwapRequests::DateReplenished)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SwapRequests::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            // Useful indexes
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_swap_requests_status")
                        .table(SwapRequests::Table)
                        .col(SwapRequests::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_swap_requests_ticket")
                        .table(SwapRequests::Table)
                        .col(SwapRequests::Ticket)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_swap_requests_date_requested")
                        .table(SwapRequests::Table)
                        .col(SwapRequests::DateRequested)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SwapRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SwapRequests {
        Table,
        Id,
        Ticket,
        PartAbbreviation,
        SerialNum,
        OemClaimNum,
        DateRequested,
        Status,
        StockPartUsedSku,
        StockBin,
        InvenAdjust,
        DispatchDoa,
        DateDispatched,
        ReceivedPartSku,
        ReceivedPpid,
        ReceivedBin,
        ReceivedQty,
        ReceivedDoa,
        DateReplenished,
        Version,
    }
}

mod m20240201_000002_create_inventory_log_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000002_create_inventory_log_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create inventory_log table aligned with entities::inventory_log Model.
            // No foreign key on related_request_id: ledger rows must outlive
            // cancelled swap requests.
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
}
