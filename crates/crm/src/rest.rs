use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AccessToken;
use crate::client::{CrmClient, CrmError};
use crate::records::{QueryResult, SObject, SaveResult};

/// REST client bound to one authenticated CRM session. Calls are single
/// round trips with no retry or timeout layer of their own.
pub struct RestCrmClient {
    http: Client,
    instance_url: String,
    access_token: SecretString,
    api_version: String,
}

#[derive(Debug, Serialize)]
struct CompositeCreateRequest {
    /// Partial failures stay per-record; the batch is never rolled back as
    /// a unit.
    #[serde(rename = "allOrNone")]
    all_or_none: bool,
    records: Vec<SObject>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl RestCrmClient {
    pub fn new(http: Client, token: AccessToken, api_version: impl Into<String>) -> Self {
        Self {
            http,
            instance_url: token.instance_url.trim_end_matches('/').to_string(),
            access_token: token.access_token.into(),
            api_version: api_version.into(),
        }
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}/services/data/{}/{}", self.instance_url, self.api_version, path)
    }
}

#[async_trait]
impl CrmClient for RestCrmClient {
    async fn query(&self, soql: &str) -> Result<QueryResult, CrmError> {
        debug!(soql = %soql, "running crm query");
        let response = self
            .http
            .get(self.data_url("query"))
            .query(&[("q", soql)])
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response
            .json::<QueryResult>()
            .await
            .map_err(|source| CrmError::Decode(format!("query response: {source}")))
    }

    async fn create(&self, records: Vec<SObject>) -> Result<Vec<SaveResult>, CrmError> {
        debug!(record_count = records.len(), "creating crm records");
        let response = self
            .http
            .post(self.data_url("composite/sobjects"))
            .bearer_auth(self.access_token.expose_secret())
            .json(&CompositeCreateRequest { all_or_none: false, records })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response
            .json::<Vec<SaveResult>>()
            .await
            .map_err(|source| CrmError::Decode(format!("create response: {source}")))
    }
}

/// Folds a non-2xx response body into a `CrmError::Api`. The CRM reports
/// errors as a JSON array of `{ message, errorCode }`; anything else is
/// carried verbatim.
fn api_error(status: u16, body: &str) -> CrmError {
    let message = serde_json::from_str::<Vec<ApiErrorBody>>(body)
        .ok()
        .and_then(|errors| errors.into_iter().next())
        .map(|error| match error.error_code {
            Some(code) => format!("{code}: {}", error.message),
            None => error.message,
        })
        .unwrap_or_else(|| body.to_string());

    CrmError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;

    use crate::auth::AccessToken;
    use crate::client::CrmError;

    use super::{api_error, RestCrmClient};

    fn client() -> RestCrmClient {
        RestCrmClient::new(
            Client::new(),
            AccessToken {
                access_token: "session-token".to_string(),
                instance_url: "https://example.my.salesforce.com/".to_string(),
                token_type: Some("Bearer".to_string()),
            },
            "v61.0",
        )
    }

    #[test]
    fn data_urls_are_rooted_at_the_instance() {
        let client = client();
        assert_eq!(client.instance_url(), "https://example.my.salesforce.com");
        assert_eq!(
            client.data_url("composite/sobjects"),
            "https://example.my.salesforce.com/services/data/v61.0/composite/sobjects"
        );
    }

    #[test]
    fn api_errors_fold_the_error_code_into_the_message() {
        let error = api_error(
            400,
            r#"[{"message": "unexpected token: WHERE", "errorCode": "MALFORMED_QUERY"}]"#,
        );

        match error {
            CrmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "MALFORMED_QUERY: unexpected token: WHERE");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_error_bodies_are_carried_verbatim() {
        let error = api_error(502, "<html>bad gateway</html>");

        match error {
            CrmError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>bad gateway</html>");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
