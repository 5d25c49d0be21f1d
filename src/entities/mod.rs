pub mod inventory_snapshot;
pub mod po_header;
pub mod po_ledger;
pub mod po_line;
pub mod secondary_sale;
pub mod upload_tracking;
