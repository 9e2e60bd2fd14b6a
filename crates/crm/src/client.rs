use async_trait::async_trait;
use quoteforge_core::QuoteGenerationError;
use thiserror::Error;

use crate::records::{QueryResult, SObject, SaveResult};

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("crm request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("crm returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("crm response could not be decoded: {0}")]
    Decode(String),
    #[error("crm authentication failed: {0}")]
    Auth(String),
}

/// An authenticated CRM session.
///
/// `create` submits all records in one call and returns one result per
/// record in submission order; per-record failures are reported in the
/// results, not as an `Err`.
#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn query(&self, soql: &str) -> Result<QueryResult, CrmError>;
    async fn create(&self, records: Vec<SObject>) -> Result<Vec<SaveResult>, CrmError>;
}

/// Call-level CRM failures (transport, decode, auth, whole-request
/// rejections) are unexpected conditions; only per-record save failures
/// classify as upstream write failures.
impl From<CrmError> for QuoteGenerationError {
    fn from(error: CrmError) -> Self {
        Self::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use quoteforge_core::QuoteGenerationError;

    use super::CrmError;

    #[test]
    fn call_level_failures_classify_as_internal() {
        let error: QuoteGenerationError =
            CrmError::Api { status: 400, message: "MALFORMED_QUERY".to_string() }.into();

        assert!(matches!(error, QuoteGenerationError::Internal(_)));
        assert!(error.to_string().contains("MALFORMED_QUERY"));
    }
}
