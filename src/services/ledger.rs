/*!
 * Append-only store for the inventory ledger.
 *
 * Rows are inserted and read, never updated or deleted; corrections are
 * posted as new compensating entries. Lifecycle transitions append within
 * the caller's transaction, so `append` is generic over the connection.
 */

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::inventory_log::{self, Entity as InventoryLog, LogType};
use crate::errors::ServiceError;

/// Payload for one ledger append.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub part_sku: String,
    /// Signed delta; zero is rejected before anything is written
    pub quantity: i32,
    pub log_type: LogType,
    pub bin: String,
    pub notes: String,
    pub related_request_id: Option<Uuid>,
    pub part_acronym: Option<String>,
}

/// Appends one movement to the ledger and returns the stored row.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    entry: NewLedgerEntry,
) -> Result<inventory_log::Model, ServiceError> {
    if entry.quantity == 0 {
        return Err(ServiceError::InvalidInput(
            "ledger entries must carry a non-zero quantity".to_string(),
        ));
    }

    let model = inventory_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        occurred_at: Set(Utc::now()),
        part_sku: Set(entry.part_sku),
        quantity: Set(entry.quantity),
        log_type: Set(entry.log_type),
        bin: Set(entry.bin),
        notes: Set(entry.notes),
        related_request_id: Set(entry.related_request_id),
        part_acronym: Set(entry.part_acronym),
    };

    model.insert(conn).await.map_err(ServiceError::DatabaseError)
}

/// Every ledger entry, oldest first. Stock views recompute from this.
pub async fn all_entries<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<inventory_log::Model>, ServiceError> {
    InventoryLog::find()
        .order_by_asc(inventory_log::Column::OccurredAt)
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

/// The most recent entries, newest first.
pub async fn recent_entries<C: ConnectionTrait>(
    conn: &C,
    limit: u64,
) -> Result<Vec<inventory_log::Model>, ServiceError> {
    InventoryLog::find()
        .order_by_desc(inventory_log::Column::OccurredAt)
        .limit(limit)
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

/// Distinct SKUs that have ever moved, sorted.
pub async fn distinct_skus<C: ConnectionTrait>(conn: &C) -> Result<Vec<String>, ServiceError> {
    InventoryLog::find()
        .select_only()
        .column(inventory_log::Column::PartSku)
        .distinct()
        .order_by_asc(inventory_log::Column::PartSku)
        .into_tuple::<String>()
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}
