use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{register_int_counter, IntCounter};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::inventory_log::LogType;
use crate::entities::swap_request::{self, DoaFlag, Entity as SwapRequests, SwapStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::ledger::{self, NewLedgerEntry};
use crate::stock::StockSettings;

lazy_static! {
    static ref SWAPS_CREATED: IntCounter = register_int_counter!(
        "swap_requests_created_total",
        "Total number of swap requests created"
    )
    .expect("metric can be created");
    static ref SWAP_CREATE_FAILURES: IntCounter = register_int_counter!(
        "swap_request_create_failures_total",
        "Total number of failed swap request creations"
    )
    .expect("metric can be created");
    static ref SWAPS_DISPATCHED: IntCounter = register_int_counter!(
        "swap_dispatches_total",
        "Total number of replacement parts dispatched"
    )
    .expect("metric can be created");
    static ref SWAP_DISPATCH_FAILURES: IntCounter = register_int_counter!(
        "swap_dispatch_failures_total",
        "Total number of failed dispatch attempts"
    )
    .expect("metric can be created");
    static ref SWAPS_RECEIVED: IntCounter = register_int_counter!(
        "swap_receipts_total",
        "Total number of failed parts received back"
    )
    .expect("metric can be created");
    static ref SWAP_RECEIPT_FAILURES: IntCounter = register_int_counter!(
        "swap_receipt_failures_total",
        "Total number of failed receipt attempts"
    )
    .expect("metric can be created");
    static ref SWAPS_CANCELLED: IntCounter = register_int_counter!(
        "swap_cancellations_total",
        "Total number of swap requests cancelled"
    )
    .expect("metric can be created");
    static ref SWAP_CANCEL_FAILURES: IntCounter = register_int_counter!(
        "swap_cancellation_failures_total",
        "Total number of failed cancellation attempts"
    )
    .expect("metric can be created");
    static ref SWAPS_REOPENED: IntCounter = register_int_counter!(
        "swap_reopens_total",
        "Total number of completed swaps reopened"
    )
    .expect("metric can be created");
    static ref SWAP_REOPEN_FAILURES: IntCounter = register_int_counter!(
        "swap_reopen_failures_total",
        "Total number of failed reopen attempts"
    )
    .expect("metric can be created");
}

/// Fields captured when a technician submits a new swap request.
#[derive(Debug, Clone)]
pub struct NewSwapRequest {
    pub ticket: String,
    pub part_abbreviation: String,
    pub serial_num: String,
    pub oem_claim_num: Option<String>,
}

/// Partial update to the request-stage fields; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct SwapRequestEdit {
    pub ticket: Option<String>,
    pub part_abbreviation: Option<String>,
    pub serial_num: Option<String>,
    pub oem_claim_num: Option<String>,
}

/// Stock selection recorded when a replacement part is dispatched.
#[derive(Debug, Clone)]
pub struct DispatchDetails {
    pub stock_part_used_sku: String,
    pub stock_bin: String,
    pub dispatch_doa: bool,
    pub inven_adjust: Option<String>,
}

/// Details of the failed part coming back from the field.
#[derive(Debug, Clone)]
pub struct ReceiptDetails {
    pub received_part_sku: String,
    pub received_ppid: String,
    pub received_qty: i32,
    pub received_bin: String,
    pub received_doa: bool,
}

/// Why a completed swap is being reopened. A post-install failure keeps the
/// dispatch and receipt data on the record; a standard reopen wipes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReopenReason {
    Standard,
    PostInstallFailure,
}

impl ReopenReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReopenReason::Standard => "standard",
            ReopenReason::PostInstallFailure => "post_install_failure",
        }
    }
}

/// Service for the swap-request lifecycle
#[derive(Clone)]
pub struct SwapService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    settings: StockSettings,
}

impl SwapService {
    /// Creates a new swap service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        settings: StockSettings,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            settings,
        }
    }

    /// Submits a new swap request in PENDING_DISPATCH.
    #[instrument(skip(self))]
    pub async fn create_swap(
        &self,
        new_swap: NewSwapRequest,
    ) -> Result<swap_request::Model, ServiceError> {
        let ticket = new_swap.ticket.trim().to_string();
        let part_abbreviation = new_swap.part_abbreviation.trim().to_uppercase();
        let serial_num = new_swap.serial_num.trim().to_string();
        if ticket.is_empty() || part_abbreviation.is_empty() || serial_num.is_empty() {
            SWAP_CREATE_FAILURES.inc();
            return Err(ServiceError::InvalidInput(
                "ticket, part abbreviation and serial number are required".to_string(),
            ));
        }
        let oem_claim_num = trimmed_or_none(new_swap.oem_claim_num.as_deref());

        let swap = swap_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            ticket: Set(ticket),
            part_abbreviation: Set(part_abbreviation),
            serial_num: Set(serial_num),
            oem_claim_num: Set(oem_claim_num),
            date_requested: Set(Utc::now()),
            status: Set(SwapStatus::PendingDispatch),
            stock_part_used_sku: Set(None),
            stock_bin: Set(None),
            dispatch_doa: Set(DoaFlag::No),
            inven_adjust: Set(None),
            date_dispatched: Set(None),
            received_part_sku: Set(None),
            received_ppid: Set(None),
            received_qty: Set(None),
            received_bin: Set(None),
            received_doa: Set(DoaFlag::No),
            date_replenished: Set(None),
            version: Set(1),
        };

        let created = swap.insert(&*self.db_pool).await.map_err(|e| {
            SWAP_CREATE_FAILURES.inc();
            error!("Failed to create swap request: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        SWAPS_CREATED.inc();
        info!(swap_id = %created.id, ticket = %created.ticket, "Created swap request");
        if let Err(e) = self.event_sender.send(Event::SwapRequested(created.id)).await {
            warn!("Failed to publish swap requested event: {}", e);
        }
        Ok(created)
    }

    /// Fetches one swap request by id.
    #[instrument(skip(self))]
    pub async fn get_swap(&self, id: Uuid) -> Result<swap_request::Model, ServiceError> {
        find_swap(&*self.db_pool, id).await
    }

    /// Lists swap requests. Without a filter this returns the active queue
    /// (both pending stages) oldest request first; completed swaps come back
    /// most recently replenished first.
    #[instrument(skip(self))]
    pub async fn list_swaps(
        &self,
        status: Option<SwapStatus>,
    ) -> Result<Vec<swap_request::Model>, ServiceError> {
        let db = &*self.db_pool;
        let query = match status {
            Some(SwapStatus::Completed) => SwapRequests::find()
                .filter(swap_request::Column::Status.eq(SwapStatus::Completed))
                .order_by_desc(swap_request::Column::DateReplenished),
            Some(status) => SwapRequests::find()
                .filter(swap_request::Column::Status.eq(status))
                .order_by_asc(swap_request::Column::DateRequested),
            None => SwapRequests::find()
                .filter(swap_request::Column::Status.is_in([
                    SwapStatus::PendingDispatch,
                    SwapStatus::PendingReceipt,
                ]))
                .order_by_asc(swap_request::Column::DateRequested),
        };
        query.all(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Lists completed swaps, most recently replenished first.
    #[instrument(skip(self))]
    pub async fn list_completed(&self) -> Result<Vec<swap_request::Model>, ServiceError> {
        self.list_swaps(Some(SwapStatus::Completed)).await
    }

    /// Edits the request-stage fields of a swap that has not completed yet.
    /// No ledger entry results; stock only moves on lifecycle transitions.
    #[instrument(skip(self))]
    pub async fn update_request(
        &self,
        id: Uuid,
        edit: SwapRequestEdit,
    ) -> Result<swap_request::Model, ServiceError> {
        let ticket = required_field(edit.ticket, "ticket")?;
        let part_abbreviation =
            required_field(edit.part_abbreviation, "part abbreviation")?.map(|a| a.to_uppercase());
        let serial_num = required_field(edit.serial_num, "serial number")?;

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if !swap.is_active() {
            let msg = format!("Swap request {} is completed and can no longer be edited", id);
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }

        let mut changes = <swap_request::ActiveModel as std::default::Default>::default();
        if let Some(ticket) = ticket {
            changes.ticket = Set(ticket);
        }
        if let Some(part_abbreviation) = part_abbreviation {
            changes.part_abbreviation = Set(part_abbreviation);
        }
        if let Some(serial_num) = serial_num {
            changes.serial_num = Set(serial_num);
        }
        if let Some(oem_claim_num) = edit.oem_claim_num {
            changes.oem_claim_num = Set(trimmed_or_none(Some(&oem_claim_num)));
        }

        apply_versioned_update(&txn, &swap, changes).await?;
        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(swap_id = %id, "Updated swap request fields");
        if let Err(e) = self.event_sender.send(Event::SwapUpdated(id)).await {
            warn!("Failed to publish swap updated event: {}", e);
        }
        self.get_swap(id).await
    }

    /// Dispatches a replacement part from stock and moves the swap to
    /// PENDING_RECEIPT. Unless the part is flagged DOA up front, one unit
    /// leaves the ledger at the selected bin.
    #[instrument(skip(self))]
    pub async fn dispatch_swap(
        &self,
        id: Uuid,
        details: DispatchDetails,
        actor: &str,
    ) -> Result<swap_request::Model, ServiceError> {
        let sku = details.stock_part_used_sku.trim().to_string();
        let bin = details.stock_bin.trim().to_string();
        if sku.is_empty() || bin.is_empty() {
            SWAP_DISPATCH_FAILURES.inc();
            return Err(ServiceError::InvalidInput(
                "a stock SKU and bin are required to dispatch".to_string(),
            ));
        }
        let inven_adjust = trimmed_or_none(details.inven_adjust.as_deref());

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if swap.status != SwapStatus::PendingDispatch {
            SWAP_DISPATCH_FAILURES.inc();
            let msg = format!(
                "Swap request {} cannot be dispatched from status {}",
                id, swap.status
            );
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }

        if !details.dispatch_doa {
            let mut notes = format!("Dispatched replacement part for ticket {}", swap.ticket);
            if let Some(note) = &inven_adjust {
                notes.push_str(&format!(". {}", note));
            }
            notes.push_str(&format!(" (by {})", actor));
            ledger::append(
                &txn,
                NewLedgerEntry {
                    part_sku: sku.clone(),
                    quantity: -1,
                    log_type: LogType::Dispatched,
                    bin: bin.clone(),
                    notes,
                    related_request_id: Some(swap.id),
                    part_acronym: Some(swap.part_abbreviation.clone()),
                },
            )
            .await?;
        }

        let changes = swap_request::ActiveModel {
            status: Set(SwapStatus::PendingReceipt),
            stock_part_used_sku: Set(Some(sku)),
            stock_bin: Set(Some(bin)),
            dispatch_doa: Set(doa_flag(details.dispatch_doa)),
            inven_adjust: Set(inven_adjust),
            date_dispatched: Set(Some(Utc::now())),
            ..Default::default()
        };
        apply_versioned_update(&txn, &swap, changes).await?;
        txn.commit().await.map_err(|e| {
            SWAP_DISPATCH_FAILURES.inc();
            error!("Failed to commit dispatch for swap request {}: {}", id, e);
            ServiceError::DatabaseError(e)
        })?;

        SWAPS_DISPATCHED.inc();
        info!(swap_id = %id, "Dispatched replacement part");
        if let Err(e) = self.event_sender.send(Event::SwapDispatched(id)).await {
            warn!("Failed to publish swap dispatched event: {}", e);
        }
        self.get_swap(id).await
    }

    /// Corrects the stock selection of a swap awaiting receipt. The original
    /// deduction is reversed with a compensating entry at the old bin before
    /// the corrected deduction is appended at the new one.
    #[instrument(skip(self))]
    pub async fn correct_dispatch(
        &self,
        id: Uuid,
        details: DispatchDetails,
        actor: &str,
    ) -> Result<swap_request::Model, ServiceError> {
        let sku = details.stock_part_used_sku.trim().to_string();
        let bin = details.stock_bin.trim().to_string();
        if sku.is_empty() || bin.is_empty() {
            SWAP_DISPATCH_FAILURES.inc();
            return Err(ServiceError::InvalidInput(
                "a stock SKU and bin are required to correct a dispatch".to_string(),
            ));
        }
        let inven_adjust = trimmed_or_none(details.inven_adjust.as_deref());

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if swap.status != SwapStatus::PendingReceipt {
            SWAP_DISPATCH_FAILURES.inc();
            let msg = format!(
                "Dispatch details of swap request {} cannot be edited in status {}",
                id, swap.status
            );
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }

        if swap.dispatch_doa == DoaFlag::No {
            if let (Some(prev_sku), Some(prev_bin)) = (&swap.stock_part_used_sku, &swap.stock_bin)
            {
                ledger::append(
                    &txn,
                    NewLedgerEntry {
                        part_sku: prev_sku.clone(),
                        quantity: 1,
                        log_type: LogType::Adjustment,
                        bin: prev_bin.clone(),
                        notes: format!(
                            "Returned {} to stock; dispatch details corrected for ticket {} (by {})",
                            prev_sku, swap.ticket, actor
                        ),
                        related_request_id: Some(swap.id),
                        part_acronym: Some(swap.part_abbreviation.clone()),
                    },
                )
                .await?;
            }
        }

        if !details.dispatch_doa {
            let mut notes = format!(
                "Dispatched replacement part for ticket {} (corrected)",
                swap.ticket
            );
            if let Some(note) = &inven_adjust {
                notes.push_str(&format!(". {}", note));
            }
            notes.push_str(&format!(" (by {})", actor));
            ledger::append(
                &txn,
                NewLedgerEntry {
                    part_sku: sku.clone(),
                    quantity: -1,
                    log_type: LogType::Dispatched,
                    bin: bin.clone(),
                    notes,
                    related_request_id: Some(swap.id),
                    part_acronym: Some(swap.part_abbreviation.clone()),
                },
            )
            .await?;
        }

        let changes = swap_request::ActiveModel {
            stock_part_used_sku: Set(Some(sku)),
            stock_bin: Set(Some(bin)),
            dispatch_doa: Set(doa_flag(details.dispatch_doa)),
            inven_adjust: Set(inven_adjust),
            ..Default::default()
        };
        apply_versioned_update(&txn, &swap, changes).await?;
        txn.commit().await.map_err(|e| {
            SWAP_DISPATCH_FAILURES.inc();
            error!("Failed to commit dispatch correction for swap request {}: {}", id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(swap_id = %id, "Corrected dispatch details");
        if let Err(e) = self.event_sender.send(Event::DispatchCorrected(id)).await {
            warn!("Failed to publish dispatch corrected event: {}", e);
        }
        self.get_swap(id).await
    }

    /// Records the failed part coming back and completes the swap. Usable
    /// returns stock in at the given bin; DOA returns are quarantined at the
    /// configured DOA bin and never enter usable stock.
    #[instrument(skip(self))]
    pub async fn receive_swap(
        &self,
        id: Uuid,
        details: ReceiptDetails,
        actor: &str,
    ) -> Result<swap_request::Model, ServiceError> {
        let sku = details.received_part_sku.trim().to_string();
        let ppid = details.received_ppid.trim().to_string();
        let bin = details.received_bin.trim().to_string();
        if sku.is_empty() || ppid.is_empty() || bin.is_empty() {
            SWAP_RECEIPT_FAILURES.inc();
            return Err(ServiceError::InvalidInput(
                "a part SKU, PPID and bin are required to receive".to_string(),
            ));
        }
        if details.received_qty < 1 {
            SWAP_RECEIPT_FAILURES.inc();
            return Err(ServiceError::InvalidInput(
                "received quantity must be at least 1".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if swap.status != SwapStatus::PendingReceipt {
            SWAP_RECEIPT_FAILURES.inc();
            let msg = format!(
                "Swap request {} cannot be received in status {}",
                id, swap.status
            );
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }

        let log_bin = if details.received_doa {
            self.settings.doa_bin_sentinel.clone()
        } else {
            bin.clone()
        };
        let mut notes = format!(
            "Received failed part (PPID {}) for ticket {}.",
            ppid, swap.ticket
        );
        if details.received_doa {
            notes.push_str(" Marked as DOA - not added to usable stock.");
        } else {
            notes.push_str(" Replenished to stock.");
        }
        notes.push_str(&format!(" (by {})", actor));

        ledger::append(
            &txn,
            NewLedgerEntry {
                part_sku: sku.clone(),
                quantity: details.received_qty,
                log_type: LogType::StockIn,
                bin: log_bin,
                notes,
                related_request_id: Some(swap.id),
                part_acronym: Some(swap.part_abbreviation.clone()),
            },
        )
        .await?;

        let changes = swap_request::ActiveModel {
            status: Set(SwapStatus::Completed),
            received_part_sku: Set(Some(sku)),
            received_ppid: Set(Some(ppid)),
            received_qty: Set(Some(details.received_qty)),
            received_bin: Set(Some(bin)),
            received_doa: Set(doa_flag(details.received_doa)),
            date_replenished: Set(Some(Utc::now())),
            ..Default::default()
        };
        apply_versioned_update(&txn, &swap, changes).await?;
        txn.commit().await.map_err(|e| {
            SWAP_RECEIPT_FAILURES.inc();
            error!("Failed to commit receipt for swap request {}: {}", id, e);
            ServiceError::DatabaseError(e)
        })?;

        SWAPS_RECEIVED.inc();
        info!(swap_id = %id, "Received failed part and completed swap");
        if let Err(e) = self.event_sender.send(Event::SwapReceived(id)).await {
            warn!("Failed to publish swap received event: {}", e);
        }
        self.get_swap(id).await
    }

    /// Flags the dispatched part DOA after the fact. The earlier deduction
    /// is compensated with +1 at the dispatch bin.
    #[instrument(skip(self))]
    pub async fn flag_dispatch_doa(
        &self,
        id: Uuid,
        actor: &str,
    ) -> Result<swap_request::Model, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if swap.dispatch_doa.is_doa() {
            let msg = format!("Dispatch for swap request {} is already flagged DOA", id);
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }
        let (sku, bin) = dispatch_stock(&swap)?;

        ledger::append(
            &txn,
            NewLedgerEntry {
                part_sku: sku.clone(),
                quantity: 1,
                log_type: LogType::Adjustment,
                bin,
                notes: format!(
                    "Returned {} to stock; dispatched part flagged DOA for ticket {} (by {})",
                    sku, swap.ticket, actor
                ),
                related_request_id: Some(swap.id),
                part_acronym: Some(swap.part_abbreviation.clone()),
            },
        )
        .await?;

        let changes = swap_request::ActiveModel {
            dispatch_doa: Set(DoaFlag::Yes),
            ..Default::default()
        };
        apply_versioned_update(&txn, &swap, changes).await?;
        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(swap_id = %id, "Flagged dispatched part DOA");
        if let Err(e) = self.event_sender.send(Event::DispatchDoaFlagged(id)).await {
            warn!("Failed to publish DOA flagged event: {}", e);
        }
        self.get_swap(id).await
    }

    /// Clears a DOA flag set in error and re-applies the deduction with -1
    /// at the dispatch bin.
    #[instrument(skip(self))]
    pub async fn clear_dispatch_doa(
        &self,
        id: Uuid,
        actor: &str,
    ) -> Result<swap_request::Model, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if !swap.dispatch_doa.is_doa() {
            let msg = format!("Dispatch for swap request {} is not flagged DOA", id);
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }
        let (sku, bin) = dispatch_stock(&swap)?;

        ledger::append(
            &txn,
            NewLedgerEntry {
                part_sku: sku.clone(),
                quantity: -1,
                log_type: LogType::Adjustment,
                bin,
                notes: format!(
                    "Removed {} from stock; DOA flag cleared for ticket {} (by {})",
                    sku, swap.ticket, actor
                ),
                related_request_id: Some(swap.id),
                part_acronym: Some(swap.part_abbreviation.clone()),
            },
        )
        .await?;

        let changes = swap_request::ActiveModel {
            dispatch_doa: Set(DoaFlag::No),
            ..Default::default()
        };
        apply_versioned_update(&txn, &swap, changes).await?;
        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(swap_id = %id, "Cleared DOA flag on dispatched part");
        if let Err(e) = self.event_sender.send(Event::DispatchDoaCleared(id)).await {
            warn!("Failed to publish DOA cleared event: {}", e);
        }
        self.get_swap(id).await
    }

    /// Cancels an active swap and deletes the record. A dispatched-but-not-
    /// DOA part goes back to stock first; its ledger trail stays behind.
    #[instrument(skip(self))]
    pub async fn cancel_swap(&self, id: Uuid, actor: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if !swap.is_active() {
            SWAP_CANCEL_FAILURES.inc();
            let msg = format!("Completed swap request {} cannot be cancelled", id);
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }

        if swap.status == SwapStatus::PendingReceipt && swap.dispatch_doa == DoaFlag::No {
            if let (Some(sku), Some(bin)) = (&swap.stock_part_used_sku, &swap.stock_bin) {
                ledger::append(
                    &txn,
                    NewLedgerEntry {
                        part_sku: sku.clone(),
                        quantity: 1,
                        log_type: LogType::Adjustment,
                        bin: bin.clone(),
                        notes: format!(
                            "Returned {} to stock; swap request for ticket {} cancelled (by {})",
                            sku, swap.ticket, actor
                        ),
                        related_request_id: Some(swap.id),
                        part_acronym: Some(swap.part_abbreviation.clone()),
                    },
                )
                .await?;
            }
        }

        let delete = SwapRequests::delete_many()
            .filter(swap_request::Column::Id.eq(swap.id))
            .filter(swap_request::Column::Version.eq(swap.version))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if delete.rows_affected != 1 {
            SWAP_CANCEL_FAILURES.inc();
            return Err(ServiceError::Conflict(format!(
                "Swap request {} was modified concurrently",
                swap.id
            )));
        }
        txn.commit().await.map_err(|e| {
            SWAP_CANCEL_FAILURES.inc();
            error!("Failed to commit cancellation of swap request {}: {}", id, e);
            ServiceError::DatabaseError(e)
        })?;

        SWAPS_CANCELLED.inc();
        info!(swap_id = %id, "Cancelled swap request");
        if let Err(e) = self.event_sender.send(Event::SwapCancelled(id)).await {
            warn!("Failed to publish swap cancelled event: {}", e);
        }
        Ok(())
    }

    /// Reopens a completed swap back to PENDING_DISPATCH, reversing the
    /// receipt stock-in and returning the dispatched part to stock where
    /// either actually moved usable stock.
    #[instrument(skip(self))]
    pub async fn reopen_swap(
        &self,
        id: Uuid,
        reason: ReopenReason,
        actor: &str,
    ) -> Result<swap_request::Model, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let swap = find_swap(&txn, id).await?;
        if swap.status != SwapStatus::Completed {
            SWAP_REOPEN_FAILURES.inc();
            let msg = format!(
                "Swap request {} cannot be reopened from status {}",
                id, swap.status
            );
            error!("{}", msg);
            return Err(ServiceError::InvalidOperation(msg));
        }

        if swap.received_doa == DoaFlag::No {
            if let (Some(sku), Some(qty), Some(bin)) = (
                &swap.received_part_sku,
                swap.received_qty,
                &swap.received_bin,
            ) {
                if qty > 0 {
                    ledger::append(
                        &txn,
                        NewLedgerEntry {
                            part_sku: sku.clone(),
                            quantity: -qty,
                            log_type: LogType::Adjustment,
                            bin: bin.clone(),
                            notes: format!(
                                "Removed {} from stock; swap for ticket {} reopened (by {})",
                                sku, swap.ticket, actor
                            ),
                            related_request_id: Some(swap.id),
                            part_acronym: Some(swap.part_abbreviation.clone()),
                        },
                    )
                    .await?;
                }
            }
        }

        if swap.dispatch_doa == DoaFlag::No {
            if let (Some(sku), Some(bin)) = (&swap.stock_part_used_sku, &swap.stock_bin) {
                ledger::append(
                    &txn,
                    NewLedgerEntry {
                        part_sku: sku.clone(),
                        quantity: 1,
                        log_type: LogType::Adjustment,
                        bin: bin.clone(),
                        notes: format!(
                            "Returned {} to stock; swap for ticket {} reopened (by {})",
                            sku, swap.ticket, actor
                        ),
                        related_request_id: Some(swap.id),
                        part_acronym: Some(swap.part_abbreviation.clone()),
                    },
                )
                .await?;
            }
        }

        let changes = match reason {
            ReopenReason::PostInstallFailure => swap_request::ActiveModel {
                status: Set(SwapStatus::PendingDispatch),
                received_doa: Set(DoaFlag::YesPostInstall),
                ..Default::default()
            },
            ReopenReason::Standard => swap_request::ActiveModel {
                status: Set(SwapStatus::PendingDispatch),
                stock_part_used_sku: Set(None),
                stock_bin: Set(None),
                dispatch_doa: Set(DoaFlag::No),
                inven_adjust: Set(None),
                date_dispatched: Set(None),
                received_part_sku: Set(None),
                received_ppid: Set(None),
                received_qty: Set(None),
                received_bin: Set(None),
                received_doa: Set(DoaFlag::No),
                date_replenished: Set(None),
                ..Default::default()
            },
        };
        apply_versioned_update(&txn, &swap, changes).await?;
        txn.commit().await.map_err(|e| {
            SWAP_REOPEN_FAILURES.inc();
            error!("Failed to commit reopen of swap request {}: {}", id, e);
            ServiceError::DatabaseError(e)
        })?;

        SWAPS_REOPENED.inc();
        info!(swap_id = %id, reason = reason.as_str(), "Reopened completed swap");
        if let Err(e) = self
            .event_sender
            .send(Event::SwapReopened {
                swap_id: id,
                reason: reason.as_str().to_string(),
            })
            .await
        {
            warn!("Failed to publish swap reopened event: {}", e);
        }
        self.get_swap(id).await
    }
}

async fn find_swap<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<swap_request::Model, ServiceError> {
    SwapRequests::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| ServiceError::NotFound(format!("Swap request {} not found", id)))
}

/// Applies `changes` only if the row version is untouched, bumping it in the
/// same statement. Zero rows affected means a concurrent writer won.
async fn apply_versioned_update<C: ConnectionTrait>(
    conn: &C,
    swap: &swap_request::Model,
    mut changes: swap_request::ActiveModel,
) -> Result<(), ServiceError> {
    changes.version = Set(swap.version + 1);
    let update = SwapRequests::update_many()
        .set(changes)
        .filter(swap_request::Column::Id.eq(swap.id))
        .filter(swap_request::Column::Version.eq(swap.version))
        .exec(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
    if update.rows_affected != 1 {
        return Err(ServiceError::Conflict(format!(
            "Swap request {} was modified concurrently",
            swap.id
        )));
    }
    Ok(())
}

fn dispatch_stock(swap: &swap_request::Model) -> Result<(String, String), ServiceError> {
    match (&swap.stock_part_used_sku, &swap.stock_bin) {
        (Some(sku), Some(bin)) => Ok((sku.clone(), bin.clone())),
        _ => Err(ServiceError::InvalidOperation(format!(
            "Swap request {} has no dispatched stock recorded",
            swap.id
        ))),
    }
}

fn doa_flag(doa: bool) -> DoaFlag {
    if doa {
        DoaFlag::Yes
    } else {
        DoaFlag::No
    }
}

fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn required_field(value: Option<String>, name: &str) -> Result<Option<String>, ServiceError> {
    match value {
        Some(v) => {
            let v = v.trim().to_string();
            if v.is_empty() {
                return Err(ServiceError::InvalidInput(format!(
                    "{} cannot be blank",
                    name
                )));
            }
            Ok(Some(v))
        }
        None => Ok(None),
    }
}
