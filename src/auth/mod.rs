mod password;
pub use password::{hash_password, verify_password};
mod jwt;
pub use jwt::{
    AccessClaims, RefreshClaims, generate_access_token, generate_refresh_token,
    process_access_token, process_refresh_token,
};
mod token;
pub use token::{generate_token, sha256_hex};
mod secret;
pub use secret::{decrypt_secret, encrypt_secret};
mod error;
pub use error::{CryptError, CryptResult};
