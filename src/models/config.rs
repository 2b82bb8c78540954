use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use crate::routes::PRODUCTS_PATH;

/// Configuration file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config/default";
/// Prefix of environment variables overriding file values.
pub const ENV_PREFIX: &str = "APP";

/// Configuration options of the catalog admin client.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AdminConfig {
    /// GraphQL endpoint of the admin API.
    #[validate(url)]
    pub graphql_url: String,
    /// Image host endpoint accepting multipart uploads.
    #[validate(url)]
    pub image_upload_url: String,
    /// Unsigned upload preset sent with every image.
    #[validate(length(min = 1))]
    pub image_upload_preset: String,
    /// Bearer token for the GraphQL API.
    pub auth_token: Option<String>,
    pub upload_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Pause between the success notice and navigation.
    pub navigation_delay_ms: u64,
    /// Where to navigate after a product was created.
    pub products_path: String,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

impl AdminConfig {
    /// Loads defaults, then the YAML file, then `APP_*` environment variables.
    ///
    /// Without an explicit `path` the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .set_default("upload_timeout_secs", 30_i64)?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("navigation_delay_ms", 100_i64)?
            .set_default("products_path", PRODUCTS_PATH)?;

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let config: AdminConfig = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn fills_defaults() {
        let file = write_config(
            "graphql_url: https://admin.example.com/graphql\n\
             image_upload_url: https://api.example.com/v1_1/demo/image/upload\n\
             image_upload_preset: products\n",
        );

        let config = AdminConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.upload_timeout(), Duration::from_secs(30));
        assert_eq!(config.navigation_delay(), Duration::from_millis(100));
        assert_eq!(config.products_path, "/products");
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let file = write_config(
            "graphql_url: not a url\n\
             image_upload_url: https://api.example.com/upload\n\
             image_upload_preset: products\n",
        );

        let result = AdminConfig::load(Some(file.path()));

        assert!(matches!(result, Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AdminConfig::load(Some(Path::new("/nonexistent/admin.yaml")));
        assert!(matches!(result, Err(ConfigLoadError::Source(_))));
    }
}
