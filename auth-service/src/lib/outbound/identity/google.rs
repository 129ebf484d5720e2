use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::non_empty;
use super::OAuthClient;
use super::ProviderEndpoints;
use crate::account::errors::ProviderError;
use crate::account::models::ExternalIdentity;
use crate::account::models::Provider;
use crate::account::ports::IdentityProviderExchange;
use crate::config::OAuthProviderConfig;

const SCOPE: &str = "openid profile email";

pub struct GoogleIdentityExchange {
    client: OAuthClient,
}

impl GoogleIdentityExchange {
    pub fn new(http: Client, config: &OAuthProviderConfig) -> Self {
        Self::with_endpoints(http, config, Self::endpoints())
    }

    pub fn with_endpoints(
        http: Client,
        config: &OAuthProviderConfig,
        endpoints: ProviderEndpoints,
    ) -> Self {
        Self {
            client: OAuthClient::new(http, config, endpoints),
        }
    }

    pub fn endpoints() -> ProviderEndpoints {
        ProviderEndpoints {
            authorization_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            profile_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

/// Userinfo v2 response.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleUserInfo {
    fn into_identity(self) -> Result<ExternalIdentity, ProviderError> {
        let email = non_empty(self.email).ok_or(ProviderError::MissingEmail)?;

        Ok(ExternalIdentity {
            provider: Provider::Google,
            external_id: self.id,
            email,
            display_name: self.name.unwrap_or_default(),
            picture_url: non_empty(self.picture),
        })
    }
}

#[async_trait]
impl IdentityProviderExchange for GoogleIdentityExchange {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn authorization_url(&self, state: &str) -> String {
        self.client.authorization_url(SCOPE, state, &[("access_type", "offline")])
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, ProviderError> {
        let access_token = self.client.exchange_token(code).await?;
        let profile: GoogleUserInfo = self.client.fetch_profile(&access_token).await?;
        profile.into_identity()
    }
}
