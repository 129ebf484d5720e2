use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfig {
    #[serde(default = "default_state_ttl_seconds")]
    pub state_ttl_seconds: u64,
    pub google: Option<OAuthProviderConfig>,
    pub facebook: Option<OAuthProviderConfig>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            state_ttl_seconds: default_state_ttl_seconds(),
            google: None,
            facebook: None,
        }
    }
}

/// Client registration with one identity provider.
#[derive(Debug, Deserialize, Clone)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl OAuthProviderConfig {
    /// A provider without a client id is treated as disabled.
    pub fn is_enabled(&self) -> bool {
        !self.client_id.is_empty()
    }
}

/// Argon2 cost parameters. Defaults match the argon2 crate's.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

fn default_expiration_hours() -> i64 {
    24
}

fn default_state_ttl_seconds() -> u64 {
    300
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, OAUTH__GOOGLE__CLIENT_ID, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: OAUTH__GOOGLE__CLIENT_SECRET=... overrides oauth.google.client_secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_optional_sections_take_defaults() {
        let config = parse(
            r#"
            [database]
            url = "postgres://localhost/auth"

            [server]
            http_port = 8080

            [jwt]
            secret = "secret"
            "#,
        );

        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.oauth.state_ttl_seconds, 300);
        assert!(config.oauth.google.is_none());
        assert_eq!(config.password.memory_kib, 19 * 1024);
    }

    #[test]
    fn test_provider_without_client_id_is_disabled() {
        let config = parse(
            r#"
            [database]
            url = "postgres://localhost/auth"

            [server]
            http_port = 8080

            [jwt]
            secret = "secret"
            expiration_hours = 1

            [oauth.google]
            client_id = ""
            client_secret = ""
            redirect_url = "http://localhost/callback"
            "#,
        );

        assert_eq!(config.jwt.expiration_hours, 1);
        assert!(!config.oauth.google.unwrap().is_enabled());
    }
}
