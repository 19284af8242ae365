//! Symmetric encryption for credentials kept in the database.
//!
//! Format: `v1:<iv>:<tag>:<ciphertext>`, each part standard base64, AES-256-GCM
//! with a 12 byte nonce and a key derived as SHA-256 of the key material.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use super::error::{CryptError, CryptResult};

const VERSION: &str = "v1";
const TAG_LEN: usize = 16;
const NONCE_LEN: usize = 12;

fn derive_key(key_material: &str) -> Key<Aes256Gcm> {
    let digest = Sha256::digest(key_material.as_bytes());
    *Key::<Aes256Gcm>::from_slice(&digest)
}

pub fn encrypt_secret(plain: &str, key_material: &str) -> CryptResult<String> {
    let cipher = Aes256Gcm::new(&derive_key(key_material));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // aes-gcm appends the tag to the ciphertext
    let mut sealed = cipher
        .encrypt(&nonce, plain.as_bytes())
        .map_err(|_| CryptError::CipherError)?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(format!(
        "{VERSION}:{}:{}:{}",
        STANDARD.encode(nonce),
        STANDARD.encode(tag),
        STANDARD.encode(sealed)
    ))
}

pub fn decrypt_secret(encoded: &str, key_material: &str) -> CryptResult<String> {
    let mut parts = encoded.split(':');
    let (Some(version), Some(iv), Some(tag), Some(ciphertext), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CryptError::UnsupportedSecretFormat);
    };

    if version != VERSION || iv.is_empty() || tag.is_empty() || ciphertext.is_empty() {
        return Err(CryptError::UnsupportedSecretFormat);
    }

    let iv = STANDARD.decode(iv)?;
    let tag = STANDARD.decode(tag)?;
    let mut sealed = STANDARD.decode(ciphertext)?;
    if iv.len() != NONCE_LEN || tag.len() != TAG_LEN {
        return Err(CryptError::UnsupportedSecretFormat);
    }
    sealed.extend_from_slice(&tag);

    let cipher = Aes256Gcm::new(&derive_key(key_material));
    let plain = cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_slice())
        .map_err(|_| CryptError::CipherError)?;

    String::from_utf8(plain).map_err(|_| CryptError::SecretNotUtf8)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let enc = encrypt_secret("s3cr3t-access-key", "key material").unwrap();
        assert!(enc.starts_with("v1:"));
        assert_eq!(enc.split(':').count(), 4);
        assert_eq!(decrypt_secret(&enc, "key material").unwrap(), "s3cr3t-access-key");
    }

    #[test]
    fn nonce_is_random() {
        let a = encrypt_secret("same", "k").unwrap();
        let b = encrypt_secret("same", "k").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let enc = encrypt_secret("secret", "right").unwrap();
        assert!(matches!(
            decrypt_secret(&enc, "wrong"),
            Err(CryptError::CipherError)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let enc = encrypt_secret("secret", "k").unwrap();
        let mut parts: Vec<String> = enc.split(':').map(String::from).collect();
        let mut ct = STANDARD.decode(&parts[3]).unwrap();
        ct[0] ^= 0x01;
        parts[3] = STANDARD.encode(ct);
        assert!(decrypt_secret(&parts.join(":"), "k").is_err());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let enc = encrypt_secret("secret", "k").unwrap().replacen("v1", "v2", 1);
        assert!(matches!(
            decrypt_secret(&enc, "k"),
            Err(CryptError::UnsupportedSecretFormat)
        ));
        assert!(matches!(
            decrypt_secret("v1:only:three", "k"),
            Err(CryptError::UnsupportedSecretFormat)
        ));
    }
}
