use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create swap_requests table for the part swap lifecycle
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
