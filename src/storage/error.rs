use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::CryptError, model::DatabaseError};

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage provider {0} not found")]
    ProviderNotFound(Uuid),
    #[error("storage provider {0} is inactive")]
    ProviderInactive(Uuid),
    #[error("storage is not configured, missing: {}", .0.join(", "))]
    NotConfigured(Vec<&'static str>),
    #[error("storage.providers_enc_key is not set")]
    MissingEncryptionKey,
    #[error("provider secret error: {0}")]
    Crypt(#[from] CryptError),
    #[error("presigning config error: {0}")]
    PresigningConfig(#[from] aws_sdk_s3::presigning::PresigningConfigError),
    #[error("presign error: {0}")]
    Presign(String),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProviderNotFound(_) => StatusCode::NOT_FOUND,
            Self::ProviderInactive(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ProviderNotFound(_) => String::from("Storage provider not found"),
            Self::ProviderInactive(_) => String::from("Storage provider is inactive"),
            Self::NotConfigured(missing) => {
                format!("Storage is not configured (missing: {})", missing.join(", "))
            }
            Self::MissingEncryptionKey => String::from(
                "Storage provider encryption key is not set (required for dynamic storage providers)",
            ),
            _ => String::from("Internal server error."),
        }
    }
}
