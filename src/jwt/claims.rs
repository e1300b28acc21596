use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest validity window the token endpoint accepts for an assertion.
pub const MAX_ASSERTION_LIFETIME: TimeDelta = TimeDelta::seconds(3600);

#[derive(Error, Debug, PartialEq)]
pub enum ClaimsError {
    #[error("assertion lifetime must be within (0, {max}] seconds, got {got}")]
    InvalidLifetime { got: i64, max: i64 },
    #[error("timestamp out of range: `{0}`")]
    Timestamp(String),
}

/// JWT claims of a service account assertion (RFC 7523).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Issuer. The service account email.
    pub(crate) iss: String,
    /// Subject. Same as the issuer: the service account acts on its own behalf.
    pub(crate) sub: String,
    /// Audience. Full URL of the token endpoint.
    pub(crate) aud: String,
    /// Issued at (as UTC timestamp).
    pub(crate) iat: u64,
    /// Expiration time (as UTC timestamp).
    pub(crate) exp: u64,
    /// Space separated OAuth2 scopes requested for the access token.
    pub(crate) scope: String,
}

impl Claims {
    /// Create a new Claims instance valid from `issued_at` for `lifetime`.
    pub fn new(
        service_account: &str,
        aud: &str,
        issued_at: DateTime<Utc>,
        lifetime: TimeDelta,
        scope: &str,
    ) -> Result<Self, ClaimsError> {
        if lifetime <= TimeDelta::zero() || lifetime > MAX_ASSERTION_LIFETIME {
            return Err(ClaimsError::InvalidLifetime {
                got: lifetime.num_seconds(),
                max: MAX_ASSERTION_LIFETIME.num_seconds(),
            });
        }

        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| ClaimsError::Timestamp("computing expiration time".into()))?;

        Ok(Self {
            iss: service_account.to_owned(),
            sub: service_account.to_owned(),
            aud: aud.to_owned(),
            iat: to_unix_timestamp(issued_at)?,
            exp: to_unix_timestamp(expires_at)?,
            scope: scope.to_owned(),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn audience(&self) -> &str {
        &self.aud
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn issued_at(&self) -> u64 {
        self.iat
    }

    pub fn expires_at(&self) -> u64 {
        self.exp
    }
}

fn to_unix_timestamp(time: DateTime<Utc>) -> Result<u64, ClaimsError> {
    time.timestamp()
        .try_into()
        .map_err(|_| ClaimsError::Timestamp(format!("negative timestamp: {time}")))
}
