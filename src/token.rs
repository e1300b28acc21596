use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use http::HeaderValue;
use thiserror::Error;

pub type AccessToken = String;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenType {
    Bearer,
}

#[derive(Error, Debug, PartialEq)]
pub enum TokenError {
    #[error("invalid token type: {0}")]
    InvalidType(String),
    #[error("empty access token")]
    EmptyAccessToken,
    #[error("invalid token lifetime: {0} seconds")]
    InvalidLifetime(u64),
    #[error("access token is not a valid header value")]
    InvalidHeaderValue,
}

/// A bearer token held in memory for the duration of one run.
#[derive(Clone, PartialEq)]
pub struct Token {
    expires_at: DateTime<Utc>,
    access_token: AccessToken,
    token_type: TokenType,
}

impl TryFrom<&str> for TokenType {
    type Error = TokenError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("bearer") {
            Ok(TokenType::Bearer)
        } else {
            Err(TokenError::InvalidType(value.to_string()))
        }
    }
}

impl Token {
    pub fn new(
        access_token: AccessToken,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, TokenError> {
        if access_token.is_empty() {
            return Err(TokenError::EmptyAccessToken);
        }
        Ok(Token {
            access_token,
            token_type,
            expires_at,
        })
    }

    /// Builds a token that expires `expires_in` seconds from now.
    pub fn expiring_in(
        access_token: AccessToken,
        token_type: TokenType,
        expires_in: u64,
    ) -> Result<Self, TokenError> {
        let lifetime = i64::try_from(expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or(TokenError::InvalidLifetime(expires_in))?;
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or(TokenError::InvalidLifetime(expires_in))?;

        Self::new(access_token, token_type, expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.lt(&Utc::now())
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Value for the `Authorization` header, marked as sensitive.
    pub fn authorization_header(&self) -> Result<HeaderValue, TokenError> {
        let mut value =
            HeaderValue::from_str(&self.to_string()).map_err(|_| TokenError::InvalidHeaderValue)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Bearer => write!(f, "Bearer"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("expires_at", &self.expires_at)
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}
