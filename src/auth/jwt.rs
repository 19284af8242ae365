use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// Short-lived bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
}

/// Long-lived token carried in the refresh cookie. `jti` keeps two tokens
/// issued within the same second distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub jti: String,
    pub exp: i64,
}

fn encode<C: Serialize, K: AsRef<[u8]>>(claims: &C, key: K) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    jsonwebtoken::encode(&header, claims, &key)
}

fn decode<C: for<'de> Deserialize<'de>, K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<C>> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    let key = DecodingKey::from_secret(key.as_ref());

    jsonwebtoken::decode::<C>(token, &key, &validation)
}

pub fn generate_access_token<K: AsRef<[u8]>>(
    claims: AccessClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    encode(&claims, key)
}

pub fn process_access_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<AccessClaims>> {
    decode(token, key)
}

pub fn generate_refresh_token<K: AsRef<[u8]>>(
    claims: RefreshClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    encode(&claims, key)
}

pub fn process_refresh_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<RefreshClaims>> {
    decode(token, key)
}

#[cfg(test)]
mod test {
    use super::*;

    fn in_an_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn access_token_round_trip() {
        let token = generate_access_token(
            AccessClaims {
                sub: "user-1".into(),
                role: "ADMIN".into(),
                exp: in_an_hour(),
            },
            "secret",
        )
        .unwrap();

        let data = process_access_token(&token, "secret").unwrap();
        assert_eq!(data.claims.sub, "user-1");
        assert_eq!(data.claims.role, "ADMIN");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(
            AccessClaims {
                sub: "user-1".into(),
                role: "USER".into(),
                exp: in_an_hour(),
            },
            "secret",
        )
        .unwrap();

        assert!(process_access_token(&token, "another secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_refresh_token(
            RefreshClaims {
                sub: "user-1".into(),
                jti: "abc".into(),
                exp: chrono::Utc::now().timestamp() - 10,
            },
            "secret",
        )
        .unwrap();

        assert!(process_refresh_token(&token, "secret").is_err());
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let token = generate_access_token(
            AccessClaims {
                sub: "user-1".into(),
                role: "USER".into(),
                exp: in_an_hour(),
            },
            "shared",
        )
        .unwrap();

        // no `jti` claim
        assert!(process_refresh_token(&token, "shared").is_err());
    }
}
