use uuid::Uuid;

use crate::{
    Config, auth,
    model::{CrudRepository, ModelManager, entity::StorageProvider},
    storage::{StorageError, StorageResult},
    web::AuthenticatedUser,
};

/// Everything needed to sign requests against one bucket.
#[derive(Clone)]
pub struct ProviderConfig {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub force_path_style: bool,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl ProviderConfig {
    /// Decrypts the stored secret of a database provider.
    pub fn from_entity(provider: &StorageProvider, key_material: &str) -> StorageResult<Self> {
        let secret_access_key = auth::decrypt_secret(provider.secret_enc(), key_material)?;

        Ok(Self {
            id: Some(provider.id()),
            name: Some(provider.name().to_string()),
            access_key_id: provider.access_key_id().to_string(),
            secret_access_key,
            bucket: provider.bucket().to_string(),
            endpoint: provider.endpoint().map(str::to_string),
            region: provider.region().to_string(),
            force_path_style: provider.force_path_style(),
        })
    }

    /// Provider described by the `[storage]` config section.
    pub fn fallback(storage: &crate::config::Storage) -> StorageResult<Self> {
        let missing: Vec<&'static str> = [
            ("storage.access_key_id", storage.access_key_id()),
            ("storage.secret_access_key", storage.secret_access_key()),
            ("storage.bucket", storage.bucket()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(StorageError::NotConfigured(missing));
        }

        Ok(Self {
            id: None,
            name: None,
            access_key_id: storage.access_key_id().to_string(),
            secret_access_key: storage.secret_access_key().to_string(),
            bucket: storage.bucket().to_string(),
            endpoint: storage.endpoint().map(str::to_string),
            region: storage.region().to_string(),
            force_path_style: storage.force_path_style(),
        })
    }
}

fn key_material(config: &Config) -> StorageResult<&str> {
    config
        .storage()
        .providers_enc_key_material(config.jwt())
        .ok_or(StorageError::MissingEncryptionKey)
}

/// Encrypts a provider secret for storage in `storage_providers.secret_enc`.
pub fn seal_secret(config: &Config, secret_access_key: &str) -> StorageResult<String> {
    Ok(auth::encrypt_secret(secret_access_key, key_material(config)?)?)
}

/// Picks the bucket for a request: the explicit provider, else the active
/// default provider, else the config fallback.
#[tracing::instrument(skip(mm, config))]
pub async fn resolve_provider(
    mm: &ModelManager,
    config: &Config,
    provider_id: Option<Uuid>,
) -> StorageResult<ProviderConfig> {
    if let Some(id) = provider_id {
        let provider = StorageProvider::find_by_id(mm, &AuthenticatedUser::admin(), id)
            .await?
            .ok_or(StorageError::ProviderNotFound(id))?;

        if !provider.active() {
            return Err(StorageError::ProviderInactive(id));
        }

        return ProviderConfig::from_entity(&provider, key_material(config)?);
    }

    if let Some(provider) = StorageProvider::find_default_active(mm).await? {
        tracing::debug!("using default storage provider {}", provider.id());
        return ProviderConfig::from_entity(&provider, key_material(config)?);
    }

    ProviderConfig::fallback(config.storage())
}

#[cfg(test)]
mod test {
    use super::*;

    fn storage(raw: &str) -> crate::config::Storage {
        toml::from_str(raw).unwrap()
    }

    #[test]
    fn fallback_reports_every_missing_field() {
        let storage = storage(
            r#"
            bucket = "videos"
            "#,
        );

        match ProviderConfig::fallback(&storage) {
            Err(StorageError::NotConfigured(missing)) => {
                assert_eq!(
                    missing,
                    vec!["storage.access_key_id", "storage.secret_access_key"]
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn fallback_uses_config_values() {
        let storage = storage(
            r#"
            endpoint = "http://127.0.0.1:9000"
            bucket = "videos"
            access_key_id = "key"
            secret_access_key = "secret"
            force_path_style = true
            "#,
        );

        let provider = ProviderConfig::fallback(&storage).unwrap();
        assert_eq!(provider.bucket, "videos");
        assert_eq!(provider.region, "us-east-1");
        assert_eq!(provider.endpoint.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(provider.force_path_style);
        assert!(provider.id.is_none());
    }

    #[test]
    fn debug_output_hides_secret() {
        let provider = ProviderConfig {
            id: None,
            name: None,
            access_key_id: "key".into(),
            secret_access_key: "very-secret".into(),
            bucket: "b".into(),
            endpoint: None,
            region: "us-east-1".into(),
            force_path_style: false,
        };

        assert!(!format!("{provider:?}").contains("very-secret"));
    }
}
