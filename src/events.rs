use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::models::{Partner, UploadType};

/// Events emitted by the import pipeline for downstream consumers
/// (notification fan-out, cache invalidation). Delivery is best-effort;
/// a send failure is logged, never fatal to the import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PoImported {
        header_id: i64,
        partner: Partner,
        po_number: String,
    },
    ReportImported {
        partner: Partner,
        upload_type: UploadType,
        rows: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a channel pair with a default buffer.
pub fn channel() -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(1024);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event. The external transport
/// collaborator replaces this loop with real fan-out.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::PoImported {
                header_id,
                partner,
                po_number,
            } => {
                info!(header_id, %partner, %po_number, "purchase order imported");
            }
            Event::ReportImported {
                partner,
                upload_type,
                rows,
            } => {
                info!(%partner, %upload_type, rows, "periodic report imported");
            }
        }
    }
}
