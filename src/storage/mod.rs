//! Signed URLs over S3-compatible buckets.
//!

mod error;
pub use error::{StorageError, StorageResult};

mod provider;
pub use provider::{ProviderConfig, resolve_provider, seal_secret};

mod signer;
pub use signer::{
    DOWNLOAD_URL_TTL, MAX_UPLOAD_URL_TTL, STREAM_URL_TTL, UPLOAD_URL_TTL, sign_stream_url,
    sign_upload_url,
};
