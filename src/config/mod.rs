use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    jwt: Jwt,
    #[serde(default)]
    cookies: Cookies,
    #[serde(default)]
    storage: Storage,
    #[serde(default)]
    cashfree: Cashfree,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default = "default_cors_origin")]
    cors_origin: String,
    #[serde(default = "default_cors_origin")]
    app_base_url: String,
    #[serde(default = "default_backend_url")]
    public_backend_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Jwt {
    access_secret: String,
    refresh_secret: String,
    #[serde(default = "default_access_ttl")]
    access_ttl_seconds: i64,
    #[serde(default = "default_refresh_ttl")]
    refresh_ttl_seconds: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Cookies {
    #[serde(default)]
    secure: bool,
    domain: Option<String>,
}

/// Key material for provider secrets plus the fallback provider used when the
/// database holds no default one.
#[derive(Debug, Deserialize)]
pub struct Storage {
    providers_enc_key: Option<String>,
    endpoint: Option<String>,
    #[serde(default = "default_region")]
    region: String,
    #[serde(default)]
    bucket: String,
    #[serde(default)]
    access_key_id: String,
    #[serde(default)]
    secret_access_key: String,
    #[serde(default)]
    force_path_style: bool,
}

#[derive(Debug, Deserialize)]
pub struct Cashfree {
    #[serde(default = "default_cashfree_env")]
    environment: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default = "default_cashfree_api_version")]
    api_version: String,
}

fn default_cors_origin() -> String {
    String::from("http://localhost:3000")
}

fn default_backend_url() -> String {
    String::from("http://localhost:5000")
}

fn default_access_ttl() -> i64 {
    3600
}

fn default_refresh_ttl() -> i64 {
    86400
}

fn default_region() -> String {
    String::from("us-east-1")
}

fn default_cashfree_env() -> String {
    String::from("TEST")
}

fn default_cashfree_api_version() -> String {
    String::from("2023-08-01")
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            providers_enc_key: None,
            endpoint: None,
            region: default_region(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            force_path_style: false,
        }
    }
}

impl Default for Cashfree {
    fn default() -> Self {
        Self {
            environment: default_cashfree_env(),
            client_id: String::new(),
            client_secret: String::new(),
            api_version: default_cashfree_api_version(),
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    let config = Self::from_slice(&bytes)?;
                    Ok(config)
                };

                let config = match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                };

                config
            })
            .await
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        Ok(toml::from_slice(bytes)?)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn jwt(&self) -> &Jwt {
        &self.jwt
    }

    #[inline]
    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub fn cashfree(&self) -> &Cashfree {
        &self.cashfree
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn cors_origin(&self) -> &str {
        &self.cors_origin
    }

    #[inline]
    pub fn app_base_url(&self) -> &str {
        &self.app_base_url
    }

    #[inline]
    pub fn public_backend_url(&self) -> &str {
        &self.public_backend_url
    }
}

impl Jwt {
    #[inline]
    pub fn access_secret(&self) -> &str {
        &self.access_secret
    }

    #[inline]
    pub fn refresh_secret(&self) -> &str {
        &self.refresh_secret
    }

    #[inline]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[inline]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}

impl Cookies {
    /// Release builds always send the refresh cookie as `Secure`.
    #[inline]
    pub fn secure(&self) -> bool {
        self.secure || !cfg!(debug_assertions)
    }

    #[inline]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

impl Storage {
    #[inline]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.is_empty())
    }

    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    #[inline]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    #[inline]
    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }

    /// Key material used to encrypt provider secrets. Debug builds fall back to
    /// the refresh-token secret so a local setup works without extra config.
    pub fn providers_enc_key_material<'a>(&'a self, jwt: &'a Jwt) -> Option<&'a str> {
        match self.providers_enc_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Some(key),
            None if cfg!(debug_assertions) => {
                static WARNED: std::sync::Once = std::sync::Once::new();
                WARNED.call_once(|| {
                    tracing::warn!(
                        "storage.providers_enc_key missing, falling back to jwt.refresh_secret (debug only)"
                    );
                });
                Some(jwt.refresh_secret())
            }
            None => None,
        }
    }
}

impl Cashfree {
    #[inline]
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("PRODUCTION")
    }

    #[inline]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[inline]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    #[inline]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn base_url(&self) -> &'static str {
        if self.is_production() {
            "https://api.cashfree.com"
        } else {
            "https://sandbox.cashfree.com"
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MINIMAL: &str = r#"
        [host]
        bindto = "0.0.0.0:8080"

        [app]
        database_uri = "postgres://localhost/test"

        [jwt]
        access_secret = "access"
        refresh_secret = "refresh"
    "#;

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_slice(MINIMAL.as_bytes()).unwrap();
        assert_eq!(config.jwt().access_ttl_seconds(), 3600);
        assert_eq!(config.jwt().refresh_ttl_seconds(), 86400);
        assert_eq!(config.storage().region(), "us-east-1");
        assert!(config.storage().endpoint().is_none());
        assert!(!config.cashfree().is_production());
        assert_eq!(config.cashfree().base_url(), "https://sandbox.cashfree.com");
        assert!(!config.app().docs());
    }

    #[test]
    #[cfg(debug_assertions)]
    fn enc_key_falls_back_to_refresh_secret_in_debug() {
        let config = Config::from_slice(MINIMAL.as_bytes()).unwrap();
        let key = config.storage().providers_enc_key_material(config.jwt());
        assert_eq!(key, Some("refresh"));
    }

    #[test]
    fn production_cashfree_base_url() {
        let raw = format!("{MINIMAL}\n[cashfree]\nenvironment = \"PRODUCTION\"\n");
        let config = Config::from_slice(raw.as_bytes()).unwrap();
        assert_eq!(config.cashfree().base_url(), "https://api.cashfree.com");
    }
}
