use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stages of the swap workflow. Forward order is
/// PENDING_DISPATCH -> PENDING_RECEIPT -> COMPLETED; reopen and cancel are
/// the only ways back out.
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
    strum::Display,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    #[sea_orm(string_value = "PENDING_DISPATCH")]
    PendingDispatch,
    #[sea_orm(string_value = "PENDING_RECEIPT")]
    PendingReceipt,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// Dead-on-arrival marker carried by both the dispatched and the received
/// part. "Yes - Post Install" only ever applies to the received side, set
/// when a completed swap is reopened because the part failed after install.
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
    Default,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum DoaFlag {
    #[default]
    #[sea_orm(string_value = "No")]
    No,
    #[sea_orm(string_value = "Yes")]
    Yes,
    #[sea_orm(string_value = "Yes - Post Install")]
    #[serde(rename = "Yes - Post Install")]
    YesPostInstall,
}

impl DoaFlag {
    pub fn is_doa(&self) -> bool {
        !matches!(self, DoaFlag::No)
    }
}

/// One requested part replacement, from submission through completion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "swap_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Work-order / ticket identifier grouping requests for one job
    pub ticket: String,

    /// Requested part category (e.g. "LCD")
    pub part_abbreviation: String,

    /// Serial number of the unit being repaired
    pub serial_num: String,

    pub oem_claim_num: Option<String>,

    pub date_requested: DateTime<Utc>,

    pub status: SwapStatus,

    // Dispatch fields, populated when status leaves PENDING_DISPATCH
    pub stock_part_used_sku: Option<String>,
    pub stock_bin: Option<String>,
    pub dispatch_doa: DoaFlag,
    /// Free-text inventory adjustment note captured at dispatch
    pub inven_adjust: Option<String>,
    pub date_dispatched: Option<DateTime<Utc>>,

    // Receipt fields, populated when status reaches COMPLETED
    pub received_part_sku: Option<String>,
    /// Unique physical identifier of the returned part
    pub received_ppid: Option<String>,
    pub received_qty: Option<i32>,
    pub received_bin: Option<String>,
    pub received_doa: DoaFlag,
    pub date_replenished: Option<DateTime<Utc>>,

    /// Optimistic-concurrency token, bumped on every mutation
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_active(&self) -> bool {
        !matches!(self.status, SwapStatus::Completed)
    }

    /// Whole days between dispatch and receipt, when both are recorded.
    pub fn days_to_complete(&self) -> Option<i64> {
        match (self.date_dispatched, self.date_replenished) {
            (Some(dispatched), Some(replenished)) => Some((replenished - dispatched).num_days()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn swap_with_dates(
        dispatched: Option<DateTime<Utc>>,
        replenished: Option<DateTime<Utc>>,
    ) -> Model {
        Model {
            id: Uuid::new_v4(),
            ticket: "WO-1001".into(),
            part_abbreviation: "LCD".into(),
            serial_num: "SN123".into(),
            oem_claim_num: None,
            date_requested: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            status: SwapStatus::Completed,
            stock_part_used_sku: Some("LCD-15-HD".into()),
            stock_bin: Some("A1".into()),
            dispatch_doa: DoaFlag::No,
            inven_adjust: None,
            date_dispatched: dispatched,
            received_part_sku: Some("LCD-15-HD".into()),
            received_ppid: Some("PPID-9".into()),
            received_qty: Some(1),
            received_bin: Some("RET-1".into()),
            received_doa: DoaFlag::No,
            date_replenished: replenished,
            version: 1,
        }
    }

    #[test]
    fn days_to_complete_truncates_to_whole_days() {
        let dispatched = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let replenished = Utc.with_ymd_and_hms(2024, 3, 4, 20, 0, 0).unwrap();
        let swap = swap_with_dates(Some(dispatched), Some(replenished));
        assert_eq!(swap.days_to_complete(), Some(3));
    }

    #[test]
    fn days_to_complete_requires_both_timestamps() {
        let dispatched = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(swap_with_dates(Some(dispatched), None).days_to_complete(), None);
        assert_eq!(swap_with_dates(None, None).days_to_complete(), None);
    }

    #[test]
    fn doa_flag_variants() {
        assert!(!DoaFlag::No.is_doa());
        assert!(DoaFlag::Yes.is_doa());
        assert!(DoaFlag::YesPostInstall.is_doa());
    }

    #[test]
    fn status_display_matches_wire_format() {
        assert_eq!(SwapStatus::PendingDispatch.to_string(), "PENDING_DISPATCH");
        assert_eq!(SwapStatus::PendingReceipt.to_string(), "PENDING_RECEIPT");
        assert_eq!(SwapStatus::Completed.to_string(), "COMPLETED");
    }
}
