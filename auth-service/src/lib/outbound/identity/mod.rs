//! Authorization-code exchange against external identity providers.

pub mod facebook;
pub mod google;

pub use facebook::FacebookIdentityExchange;
pub use google::GoogleIdentityExchange;

use reqwest::Client;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::account::errors::ProviderError;
use crate::config::OAuthProviderConfig;

/// Fixed endpoints of one provider's authorization-code flow.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub authorization_url: String,
    pub token_url: String,
    pub profile_url: String,
}

/// Client registration plus endpoints, shared by every provider adapter.
#[derive(Debug, Clone)]
pub(crate) struct OAuthClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    endpoints: ProviderEndpoints,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl OAuthClient {
    pub(crate) fn new(
        http: Client,
        config: &OAuthProviderConfig,
        endpoints: ProviderEndpoints,
    ) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            endpoints,
        }
    }

    /// Authorization URL carrying the client registration, scopes, state
    /// and any provider-specific parameters.
    pub(crate) fn authorization_url(
        &self,
        scope: &str,
        state: &str,
        extra: &[(&str, &str)],
    ) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", scope),
            ("state", state),
        ];

        match Url::parse_with_params(
            &self.endpoints.authorization_url,
            params.iter().chain(extra.iter()),
        ) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::error!(
                    url = %self.endpoints.authorization_url,
                    error = %e,
                    "Invalid authorization endpoint"
                );
                self.endpoints.authorization_url.clone()
            }
        }
    }

    /// Trade an authorization code for an access token.
    pub(crate) async fn exchange_token(&self, code: &str) -> Result<String, ProviderError> {
        let request = self.http.post(&self.endpoints.token_url).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ]);

        let token: TokenResponse = send_json(request).await?;
        Ok(token.access_token)
    }

    /// Fetch the caller's profile with an access token.
    pub(crate) async fn fetch_profile<T: DeserializeOwned>(
        &self,
        access_token: &str,
    ) -> Result<T, ProviderError> {
        let request = self
            .http
            .get(&self.endpoints.profile_url)
            .bearer_auth(access_token);

        send_json(request).await
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Http(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Http(e.to_string()))?;

    if !status.is_success() {
        return Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::MalformedProfile(e.to_string()))
}

/// Empty strings from providers mean "absent".
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
