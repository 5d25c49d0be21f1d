pub mod imports;
pub mod preview;
pub mod reports;

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config::ImportPolicy;
use crate::db::DbPool;
use crate::events::EventSender;

pub use imports::PoImportService;
pub use preview::{PoPreview, PreviewRequest, PreviewService, PreviewSummary};
pub use reports::{ReportImportService, ReportRequest};

/// Content hash used for upload dedup and for deterministic document-number
/// synthesis.
pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Bundle of the pipeline services, wired once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub preview: Arc<PreviewService>,
    pub imports: Arc<PoImportService>,
    pub reports: Arc<ReportImportService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        policy: ImportPolicy,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            preview: Arc::new(PreviewService::new(policy)),
            imports: Arc::new(PoImportService::new(db.clone(), event_sender.clone())),
            reports: Arc::new(ReportImportService::new(db, event_sender)),
        }
    }
}
