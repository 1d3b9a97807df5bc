//! Defines the JWT claims used for bearer token auth and how to create and verify tokens.

// Adapted from https://github.com/tokio-rs/axum/blob/main/examples/jwt/src/main.rs

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, app_state::JwtKeys, user::UserID};

/// How long a bearer token stays valid after it is issued.
const TOKEN_LIFETIME: Duration = Duration::hours(24);

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The expiry time of the token as a unix timestamp.
    pub exp: usize,
    /// The time the token was issued as a unix timestamp.
    pub iat: usize,
    /// The ID of the user the token was issued to.
    pub user_id: UserID,
}

impl<S> FromRequestParts<S> for Claims
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    Error::MissingToken
                } else {
                    Error::InvalidToken
                }
            })?;

        let State(jwt_keys) = parts
            .extract_with_state::<State<JwtKeys>, _>(state)
            .await
            .map_err(|_| Error::InvalidToken)?;

        let token_data = decode_jwt(bearer.token(), &jwt_keys.decoding)?;

        Ok(token_data.claims)
    }
}

/// Create a signed bearer token for the user `user_id`.
///
/// # Errors
///
/// This function will return a [Error::TokenCreation] if the token could not be signed.
pub fn encode_jwt(user_id: UserID, encoding_key: &EncodingKey) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        exp: (now + TOKEN_LIFETIME).unix_timestamp() as usize,
        iat: now.unix_timestamp() as usize,
        user_id,
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|error| {
        tracing::error!("could not sign auth token: {error}");
        Error::TokenCreation
    })
}

/// Verify a bearer token and extract its claims.
///
/// # Errors
///
/// This function will return a [Error::InvalidToken] if the token is malformed,
/// has an invalid signature or has expired.
pub fn decode_jwt(token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, Error> {
    decode(token, decoding_key, &Validation::default()).map_err(|_| Error::InvalidToken)
}

#[cfg(test)]
mod jwt_tests {
    use crate::{app_state::JwtKeys, user::UserID};

    use super::{decode_jwt, encode_jwt};

    #[test]
    fn encode_jwt_creates_token() {
        let keys = JwtKeys::new("42");

        let token = encode_jwt(UserID::new(1), &keys.encoding).expect("could not encode token");

        assert!(!token.is_empty());
    }

    #[test]
    fn decode_jwt_returns_user_id() {
        let keys = JwtKeys::new("42");
        let user_id = UserID::new(123);
        let token = encode_jwt(user_id, &keys.encoding).expect("could not encode token");

        let claims = decode_jwt(&token, &keys.decoding)
            .expect("could not decode token")
            .claims;

        assert_eq!(claims.user_id, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn decode_jwt_fails_with_wrong_secret() {
        let keys = JwtKeys::new("42");
        let other_keys = JwtKeys::new("not 42");
        let token =
            encode_jwt(UserID::new(1), &keys.encoding).expect("could not encode token");

        let result = decode_jwt(&token, &other_keys.decoding);

        assert!(result.is_err());
    }
}
