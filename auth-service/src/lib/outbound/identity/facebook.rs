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

const SCOPE: &str = "email public_profile";

pub struct FacebookIdentityExchange {
    client: OAuthClient,
}

impl FacebookIdentityExchange {
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
            authorization_url: "https://www.facebook.com/v3.2/dialog/oauth".to_string(),
            token_url: "https://graph.facebook.com/v3.2/oauth/access_token".to_string(),
            profile_url: "https://graph.facebook.com/me?fields=id,name,email,picture".to_string(),
        }
    }
}

/// Graph API `me` response with `picture` expanded.
#[derive(Debug, Deserialize)]
struct FacebookUser {
    id: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<FacebookPicture>,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: Option<String>,
}

impl FacebookUser {
    fn into_identity(self) -> Result<ExternalIdentity, ProviderError> {
        let email = non_empty(self.email).ok_or(ProviderError::MissingEmail)?;

        Ok(ExternalIdentity {
            provider: Provider::Facebook,
            external_id: self.id,
            email,
            display_name: self.name.unwrap_or_default(),
            picture_url: non_empty(self.picture.and_then(|p| p.data.url)),
        })
    }
}

#[async_trait]
impl IdentityProviderExchange for FacebookIdentityExchange {
    fn provider(&self) -> Provider {
        Provider::Facebook
    }

    fn authorization_url(&self, state: &str) -> String {
        self.client.authorization_url(SCOPE, state, &[])
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, ProviderError> {
        let access_token = self.client.exchange_token(code).await?;
        let user: FacebookUser = self.client.fetch_profile(&access_token).await?;
        user.into_identity()
    }
}
