use std::fmt;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use thiserror::Error;

use crate::jwt::{claims::Claims, error::JwtEncoderError, signed::SignedJwt};

use super::JwtSigner;

/// Errors that can occur when creating a LocalPrivateKeySigner.
#[derive(Debug, Error)]
pub enum LocalPrivateKeySignerError {
    #[error("unable to load private key: `{0}`")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("unsupported signature algorithm: `{0:?}`")]
    UnsupportedAlgorithm(Algorithm),
}

/// Signer structure that uses an in-memory RSA private key to sign JWTs.
pub struct LocalPrivateKeySigner {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
}

impl LocalPrivateKeySigner {
    /// Loads a PEM encoded RSA private key (PKCS#1 or PKCS#8) to sign with `algorithm`.
    ///
    /// Only the RSA family is accepted since service account keys are RSA keys.
    pub fn new(pem: &[u8], algorithm: Algorithm) -> Result<Self, LocalPrivateKeySignerError> {
        match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Ok(Self {
                // This will call pem::parse
                encoding_key: EncodingKey::from_rsa_pem(pem)?,
                algorithm,
            }),
            unsupported => Err(LocalPrivateKeySignerError::UnsupportedAlgorithm(unsupported)),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl fmt::Debug for LocalPrivateKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalPrivateKeySigner")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Attempt to create an RS256 LocalPrivateKeySigner from PEM file contents.
impl TryFrom<&[u8]> for LocalPrivateKeySigner {
    type Error = LocalPrivateKeySignerError;

    fn try_from(pem: &[u8]) -> Result<Self, Self::Error> {
        Self::new(pem, Algorithm::RS256)
    }
}

impl JwtSigner for LocalPrivateKeySigner {
    fn sign(&self, claims: Claims) -> Result<SignedJwt, JwtEncoderError> {
        let value = jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtEncoderError::AssertionSigning {
                subject: claims.sub.clone(),
                reason: e.to_string(),
            })?;
        Ok(SignedJwt { value })
    }
}
