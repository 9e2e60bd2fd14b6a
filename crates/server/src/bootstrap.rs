use std::sync::Arc;

use quoteforge_core::config::{AppConfig, ConfigError, LoadOptions};
use quoteforge_crm::{auth, CrmClient, CrmError, RestCrmClient};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub crm: Arc<dyn CrmClient>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("crm session could not be established: {0}")]
    CrmSession(#[source] CrmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let http = reqwest::Client::new();
    let token = auth::client_credentials_token(
        &http,
        &config.salesforce.login_url,
        &config.salesforce.client_id,
        &config.salesforce.client_secret,
    )
    .await
    .map_err(BootstrapError::CrmSession)?;
    info!(
        event_name = "system.bootstrap.crm_session_established",
        correlation_id = "bootstrap",
        instance_url = %token.instance_url,
        "crm session established"
    );

    let crm = RestCrmClient::new(http, token, config.salesforce.api_version.clone());

    Ok(Application { config, crm: Arc::new(crm) })
}

#[cfg(test)]
mod tests {
    use quoteforge_core::config::LoadOptions;

    use crate::bootstrap::bootstrap;

    #[tokio::test]
    async fn bootstrap_fails_fast_without_salesforce_credentials() {
        // Default config carries no connected-app credentials; validation
        // rejects it before any token exchange is attempted.
        let result = bootstrap(LoadOptions::default()).await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("salesforce.client_id"));
    }
}
