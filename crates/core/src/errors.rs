use thiserror::Error;

/// Classified failure of a quote generation attempt.
///
/// The three variants carry the full diagnostic detail; `user_message`
/// decides how much of it crosses the API boundary.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum QuoteGenerationError {
    #[error("no opportunity line items found for opportunity `{0}`")]
    NoLineItems(String),
    #[error("crm rejected {object} create: {message}")]
    UpstreamWrite { object: &'static str, message: String },
    #[error("quote generation failed: {0}")]
    Internal(String),
}

impl QuoteGenerationError {
    /// Message exposed to API callers. Upstream failures surface the CRM's
    /// own error text; internal failures collapse to a generic message and
    /// keep their detail for the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoLineItems(_) | Self::UpstreamWrite { .. } => self.to_string(),
            Self::Internal(_) => "an unexpected internal error occurred".to_string(),
        }
    }
}

/// Failure while reading a field out of a CRM query row.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record field `{0}` is missing")]
    MissingField(&'static str),
    #[error("record field `{field}` is not numeric: `{value}`")]
    MalformedNumber { field: &'static str, value: String },
}

impl From<RecordError> for QuoteGenerationError {
    fn from(error: RecordError) -> Self {
        Self::Internal(error.to_string())
    }
}
