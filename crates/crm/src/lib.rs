//! Salesforce REST collaborator for the quote generation service.
//!
//! The session is established once at bootstrap (client-credentials token
//! exchange) and handed to request handlers as a [`CrmClient`] trait
//! object. The trait covers exactly the two operations the service needs:
//! a SOQL query and an ordered bulk create.

pub mod auth;
pub mod client;
pub mod records;
pub mod rest;

pub use auth::AccessToken;
pub use client::{CrmClient, CrmError};
pub use records::{QueryResult, SObject, SaveError, SaveResult};
pub use rest::RestCrmClient;
