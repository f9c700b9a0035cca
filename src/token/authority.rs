use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::error::Error;
use crate::types::{Claims, Identity, UserId};

pub(crate) const ISSUER: &str = "favorites";

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Issues and validates stateless HS256 bearer tokens.
#[derive(Clone)]
pub(crate) struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    pub(crate) fn new(secret: &str) -> Self {
        // Expiry is checked by hand so an expired token is only reported once
        // its signature and claims are known to be good.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub(crate) fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, Error> {
        let expiration_time = now + Duration::hours(TOKEN_LIFETIME_HOURS);

        let claims = Claims {
            authorized: true,
            user_id: identity.id,
            iss: ISSUER.into(),
            iat: now.timestamp(),
            exp: expiration_time.timestamp(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Returns the user id carried by `token`.
    ///
    /// Checks run in order and the first failure wins: emptiness, envelope and
    /// algorithm, signature, claim shape, expiry.
    pub(crate) fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, Error> {
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }

        let header = jsonwebtoken::decode_header(token).map_err(|e| match e.kind() {
            ErrorKind::Json(_) if declared_algorithm(token).is_some_and(|alg| alg != "HS256") => {
                Error::InvalidSigningMethod
            }
            _ => Error::MalformedToken,
        })?;
        if header.alg != Algorithm::HS256 {
            return Err(Error::InvalidSigningMethod);
        }

        let token_data =
            match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
                Ok(token_data) => token_data,
                Err(e) => {
                    return Err(match e.kind() {
                        ErrorKind::InvalidSignature => Error::InvalidSignature,
                        ErrorKind::InvalidAlgorithm => Error::InvalidSigningMethod,
                        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                            Error::InvalidClaims
                        }
                        _ => Error::MalformedToken,
                    });
                }
            };

        if now.timestamp() > token_data.claims.exp {
            return Err(Error::TokenExpired);
        }

        Ok(token_data.claims.user_id)
    }
}

/// Reads the raw `alg` of a header jsonwebtoken refused to parse, such as
/// `none`.
fn declared_algorithm(token: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct RawHeader {
        alg: String,
    }

    let segment = token.split('.').next()?;
    let decoded = URL_SAFE_NO_PAD.decode(segment).ok()?;
    let header: RawHeader = serde_json::from_slice(&decoded).ok()?;
    Some(header.alg)
}
