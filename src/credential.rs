use std::fmt;

use http::Uri;
use serde::Deserialize;
use thiserror::Error;

use crate::jwt::signer::local::{LocalPrivateKeySigner, LocalPrivateKeySignerError};

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("invalid service account JSON: `{0}`")]
    InvalidJson(String),
    #[error("service account field `{0}` is empty")]
    EmptyField(&'static str),
    #[error("invalid token_uri `{0}`: `{1}`")]
    InvalidTokenUri(String, String),
}

/// Represents a PEM-encoded private key "byte string".
#[derive(Clone, PartialEq)]
pub struct PrivateKeyPem(Vec<u8>);

impl<S: AsRef<[u8]>> From<S> for PrivateKeyPem {
    fn from(key: S) -> Self {
        PrivateKeyPem(key.as_ref().to_vec())
    }
}

impl fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyPem(<redacted>)")
    }
}

impl TryFrom<&PrivateKeyPem> for LocalPrivateKeySigner {
    type Error = LocalPrivateKeySignerError;
    fn try_from(value: &PrivateKeyPem) -> Result<Self, Self::Error> {
        Self::try_from(value.0.as_slice())
    }
}

/// The fields of a Google service account key file this tool relies on.
#[derive(Deserialize)]
struct ServiceAccountKeyFile {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

/// Service account identity, loaded once per run and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAccountCredential {
    client_email: String,
    private_key: PrivateKeyPem,
    token_uri: Uri,
    /// `token_uri` exactly as configured.
    audience: String,
}

impl ServiceAccountCredential {
    pub fn new(
        client_email: String,
        private_key: PrivateKeyPem,
        token_uri: &str,
    ) -> Result<Self, CredentialError> {
        if client_email.trim().is_empty() {
            return Err(CredentialError::EmptyField("client_email"));
        }
        if private_key.0.iter().all(u8::is_ascii_whitespace) {
            return Err(CredentialError::EmptyField("private_key"));
        }
        let audience = token_uri.trim().to_string();
        let token_uri = audience
            .parse::<Uri>()
            .map_err(|e| CredentialError::InvalidTokenUri(audience.clone(), e.to_string()))?;
        Ok(Self {
            client_email,
            private_key,
            token_uri,
            audience,
        })
    }

    /// Parses the JSON key file downloaded for a service account.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let key_file: ServiceAccountKeyFile =
            serde_json::from_str(json).map_err(|e| CredentialError::InvalidJson(e.to_string()))?;

        let token_uri = key_file
            .token_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .unwrap_or(DEFAULT_TOKEN_URI);

        Self::new(
            key_file.client_email,
            PrivateKeyPem::from(key_file.private_key),
            token_uri,
        )
    }

    /// Issuer and subject of the assertions signed for this account.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn private_key(&self) -> &PrivateKeyPem {
        &self.private_key
    }

    /// Token endpoint the assertion is exchanged at.
    pub fn token_uri(&self) -> &Uri {
        &self.token_uri
    }

    /// Audience of the signed assertion: the configured `token_uri`, byte for byte.
    pub fn audience(&self) -> &str {
        &self.audience
    }
}
