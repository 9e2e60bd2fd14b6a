pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::opportunity::OpportunityLineItem;
pub use errors::{QuoteGenerationError, RecordError};
