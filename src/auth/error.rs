use thiserror::Error;

pub type CryptResult<T> = std::result::Result<T, CryptError>;

#[derive(Debug, Error)]
pub enum CryptError {
    #[error("argon2 error: {0}")]
    Argon2Error(#[from] argon2::password_hash::Error),
    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("cipher error")]
    CipherError,
    #[error("base64 error: {0}")]
    Base64Error(#[from] base64::DecodeError),
    #[error("unsupported secret format")]
    UnsupportedSecretFormat,
    #[error("decrypted secret is not utf-8")]
    SecretNotUtf8,
}
