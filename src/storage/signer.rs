use std::time::Duration;

use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
};

use crate::storage::{ProviderConfig, StorageError, StorageResult};

pub const STREAM_URL_TTL: Duration = Duration::from_secs(60);
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(5 * 60);
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(5 * 60);
pub const MAX_UPLOAD_URL_TTL: Duration = Duration::from_secs(30 * 60);

fn client(cfg: &ProviderConfig) -> Client {
    let credentials = Credentials::new(
        &cfg.access_key_id,
        &cfg.secret_access_key,
        None,
        None,
        "lectern",
    );

    let mut builder = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(cfg.region.clone()))
        .credentials_provider(credentials)
        .force_path_style(cfg.force_path_style);

    if let Some(endpoint) = cfg.endpoint.as_deref() {
        builder = builder.endpoint_url(endpoint);
    }

    Client::from_conf(builder.build())
}

/// Presigned GET for a video or attachment object.
pub async fn sign_stream_url(
    cfg: &ProviderConfig,
    key: &str,
    expires_in: Duration,
) -> StorageResult<String> {
    let request = client(cfg)
        .get_object()
        .bucket(&cfg.bucket)
        .key(key)
        .presigned(PresigningConfig::expires_in(expires_in)?)
        .await
        .map_err(|e| StorageError::Presign(DisplayErrorContext(e).to_string()))?;

    Ok(request.uri().to_string())
}

/// Presigned PUT. The uploader must send the same `Content-Type`.
pub async fn sign_upload_url(
    cfg: &ProviderConfig,
    key: &str,
    content_type: &str,
    expires_in: Duration,
) -> StorageResult<String> {
    let request = client(cfg)
        .put_object()
        .bucket(&cfg.bucket)
        .key(key)
        .content_type(content_type)
        .presigned(PresigningConfig::expires_in(expires_in)?)
        .await
        .map_err(|e| StorageError::Presign(DisplayErrorContext(e).to_string()))?;

    Ok(request.uri().to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    fn minio() -> ProviderConfig {
        ProviderConfig {
            id: None,
            name: None,
            access_key_id: "minioadmin".into(),
            secret_access_key: "minioadmin".into(),
            bucket: "videos".into(),
            endpoint: Some("http://127.0.0.1:9000".into()),
            region: "us-east-1".into(),
            force_path_style: true,
        }
    }

    #[tokio::test]
    async fn stream_url_is_signed_path_style() {
        let url = sign_stream_url(&minio(), "courses/intro.mp4", STREAM_URL_TTL)
            .await
            .unwrap();

        assert!(url.starts_with("http://127.0.0.1:9000/videos/courses/intro.mp4?"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=60"));
    }

    #[tokio::test]
    async fn upload_url_is_signed() {
        let url = sign_upload_url(&minio(), "notes/a.pdf", "application/pdf", UPLOAD_URL_TTL)
            .await
            .unwrap();

        assert!(url.contains("X-Amz-Expires=300"));
        assert!(url.contains("X-Amz-Signature="));
    }
}
