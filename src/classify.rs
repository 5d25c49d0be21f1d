//! Format classifier: picks the extractor for an uploaded file.
//!
//! Selection order: an explicit partner hint wins outright; otherwise the
//! filename is matched case-insensitively against each extractor's keyword
//! list in registry order; otherwise every extractor scores the content and
//! the highest non-zero confidence wins. Confidence scoring, rather than
//! "first extractor that does not throw", keeps a wrong-but-tolerant
//! extractor from silently mis-parsing a file it merely survives.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::extract::{
    freshkart::FreshkartExtractor, swiftmart::SwiftmartExtractor,
    urbanbasket::UrbanbasketExtractor, Confidence, PoExtractor,
};
use crate::models::Partner;
use crate::sheet::Sheet;

pub struct Classifier {
    extractors: Vec<Arc<dyn PoExtractor>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_default_extractors()
    }
}

impl Classifier {
    /// Registry in fixed priority order; order breaks confidence ties.
    pub fn with_default_extractors() -> Self {
        Self {
            extractors: vec![
                Arc::new(SwiftmartExtractor),
                Arc::new(FreshkartExtractor),
                Arc::new(UrbanbasketExtractor),
            ],
        }
    }

    pub fn classify(
        &self,
        sheet: &Sheet,
        filename: &str,
        hint: Option<&str>,
    ) -> Result<Arc<dyn PoExtractor>, ServiceError> {
        if let Some(hint) = hint {
            let partner = Partner::from_str(hint).map_err(|_| {
                ServiceError::UnrecognizedFormat(format!("unknown partner hint '{}'", hint))
            })?;
            return self.by_partner(partner).ok_or_else(|| {
                ServiceError::UnrecognizedFormat(format!(
                    "no purchase-order extractor registered for partner '{}'",
                    partner
                ))
            });
        }

        let lower_name = filename.to_lowercase();
        for extractor in &self.extractors {
            if extractor
                .keywords()
                .iter()
                .any(|keyword| lower_name.contains(keyword))
            {
                info!(partner = %extractor.partner(), filename, "classified by filename keyword");
                return Ok(extractor.clone());
            }
        }

        let mut best: Option<(Confidence, &Arc<dyn PoExtractor>)> = None;
        for extractor in &self.extractors {
            let confidence = extractor.detect(sheet, filename);
            debug!(partner = %extractor.partner(), score = confidence.0, "content probe");
            if confidence.is_none() {
                continue;
            }
            match &best {
                Some((top, _)) if *top >= confidence => {}
                _ => best = Some((confidence, extractor)),
            }
        }

        match best {
            Some((confidence, extractor)) => {
                info!(
                    partner = %extractor.partner(),
                    score = confidence.0,
                    filename,
                    "classified by content probe"
                );
                Ok(extractor.clone())
            }
            None => Err(ServiceError::UnrecognizedFormat(format!(
                "no extractor recognized '{}'",
                filename
            ))),
        }
    }

    pub fn by_partner(&self, partner: Partner) -> Option<Arc<dyn PoExtractor>> {
        self.extractors
            .iter()
            .find(|e| e.partner() == partner)
            .cloned()
    }
}
