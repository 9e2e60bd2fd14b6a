use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::error;

use crate::client::CrmError;

/// Token material for one CRM session, as returned by the OAuth token
/// endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub instance_url: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Exchanges connected-app credentials for an access token using the OAuth
/// client-credentials grant. Runs once at bootstrap; the resulting session
/// is what request handlers receive.
pub async fn client_credentials_token(
    http: &reqwest::Client,
    login_url: &str,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<AccessToken, CrmError> {
    let token_url = format!("{}/services/oauth2/token", login_url.trim_end_matches('/'));

    let response = http
        .post(&token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
        ])
        .send()
        .await
        .map_err(|source| {
            error!(error = %source, "crm token exchange request failed");
            CrmError::Transport(source)
        })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(CrmError::Auth(format!("token endpoint returned {status}: {body}")));
    }

    let token: AccessToken = response
        .json()
        .await
        .map_err(|source| CrmError::Decode(format!("token response: {source}")))?;

    if token.access_token.is_empty() {
        return Err(CrmError::Auth("token endpoint returned an empty access token".to_string()));
    }

    Ok(token)
}
