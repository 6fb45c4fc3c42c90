use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Swap lifecycle events
    SwapRequested(Uuid),
    SwapUpdated(Uuid),
    SwapDispatched(Uuid),
    DispatchCorrected(Uuid),
    SwapReceived(Uuid),
    DispatchDoaFlagged(Uuid),
    DispatchDoaCleared(Uuid),
    SwapCancelled(Uuid),
    SwapReopened {
        swap_id: Uuid,
        reason: String,
    },

    // Inventory events
    StockAdjusted {
        part_sku: String,
        quantity: i32,
        bin: String,
    },
}

// Drains the event channel and records each event for downstream consumers.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::SwapRequested(id) => {
                info!(swap_id = %id, "swap requested");
            }
            Event::SwapUpdated(id) => {
                info!(swap_id = %id, "swap request updated");
            }
            Event::SwapDispatched(id) => {
                info!(swap_id = %id, "replacement part dispatched");
            }
            Event::DispatchCorrected(id) => {
                info!(swap_id = %id, "dispatch details corrected");
            }
            Event::SwapReceived(id) => {
                info!(swap_id = %id, "failed part received");
            }
            Event::DispatchDoaFlagged(id) => {
                info!(swap_id = %id, "dispatched part flagged DOA");
            }
            Event::DispatchDoaCleared(id) => {
                info!(swap_id = %id, "dispatched part DOA flag cleared");
            }
            Event::SwapCancelled(id) => {
                info!(swap_id = %id, "swap cancelled");
            }
            Event::SwapReopened { swap_id, reason } => {
                info!(swap_id = %swap_id, reason = %reason, "swap reopened");
            }
            Event::StockAdjusted {
                part_sku,
                quantity,
                bin,
            } => {
                info!(part_sku = %part_sku, quantity, bin = %bin, "manual stock adjustment");
            }
        }
    }

    info!("Event processing loop stopped");
}
