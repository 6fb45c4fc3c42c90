use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movement classes recorded in the inventory ledger.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    /// Replacement part left stock for a swap (-1 per dispatch)
    #[sea_orm(string_value = "DISPATCHED")]
    Dispatched,
    /// Returned part entered stock on receipt
    #[sea_orm(string_value = "STOCK_IN")]
    StockIn,
    /// Compensating entry posted by a lifecycle reversal
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    /// Operator-entered correction, unrelated to any swap
    #[sea_orm(string_value = "MANUAL_ADJUSTMENT")]
    ManualAdjustment,
}

impl LogType {
    /// Entry types whose recorded acronym is authoritative for the detailed
    /// stock display.
    pub fn carries_recorded_category(&self) -> bool {
        matches!(self, LogType::StockIn | LogType::ManualAdjustment)
    }
}

/// One atomic stock movement. Immutable once written: corrections are new
/// compensating entries, never edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub occurred_at: DateTime<Utc>,

    /// Free-text stock-keeping identifier
    pub part_sku: String,

    /// Signed delta: positive = stock in, negative = stock out
    pub quantity: i32,

    pub log_type: LogType,

    /// Storage location; bins containing the configured sentinel hold
    /// unusable (DOA/RMA) stock
    pub bin: String,

    /// Acting user and reason, free text
    pub notes: String,

    pub related_request_id: Option<Uuid>,

    /// Recorded part category; often blank and resolved at read time
    pub part_acronym: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Recorded acronym with surrounding whitespace dropped, or None when
    /// blank.
    pub fn trimmed_acronym(&self) -> Option<&str> {
        self.part_acronym
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}
