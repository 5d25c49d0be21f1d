use sea_orm::error::DbErr;

use crate::models::Partner;

/// Extraction-level failure. Raised when a file cannot be interpreted at all;
/// row-level problems are recovered locally and surface as warnings instead.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("file is empty or contains no tabular rows")]
    Empty,

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("no parsable documents found: {0}")]
    NoDocuments(String),

    #[error("malformed input: {0}")]
    Malformed(String),
}

impl From<csv::Error> for ExtractError {
    fn from(err: csv::Error) -> Self {
        ExtractError::Malformed(err.to_string())
    }
}

/// Service-level error taxonomy.
///
/// Duplicate purchase orders and duplicate report files are NOT errors; they
/// are first-class outcomes (`ImportOutcome::Duplicate`,
/// `ReportOutcome::DuplicateFile`) so batch summaries can distinguish "already
/// imported" from true failure.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No extractor could interpret the file. Rejected before any
    /// persistence attempt.
    #[error("unrecognized format: {0}")]
    UnrecognizedFormat(String),

    /// Caller-supplied parameters failed the pre-parse schema check.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The chosen extractor could not interpret the file body.
    #[error("extraction failed for {partner}: {source}")]
    Extraction {
        partner: Partner,
        #[source]
        source: ExtractError,
    },

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    /// The transactional write failed for a reason other than the expected
    /// duplicate key. All partial writes were rolled back.
    #[error("persistence failure for {partner} PO {po_number}: {source}")]
    Persistence {
        partner: String,
        po_number: String,
        #[source]
        source: DbErr,
    },
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}
