use super::{claims::Claims, error::JwtEncoderError, signed::SignedJwt};
use local::LocalPrivateKeySigner;

pub mod local;

/// Turns a claim set into the compact, signed assertion sent to the token endpoint.
pub trait JwtSigner {
    fn sign(&self, claims: Claims) -> Result<SignedJwt, JwtEncoderError>;
}

/// Signers a run can be configured with.
pub enum JwtSignerImpl {
    /// Service account private key held in memory.
    Local(LocalPrivateKeySigner),
}

impl JwtSigner for JwtSignerImpl {
    fn sign(&self, claims: Claims) -> Result<SignedJwt, JwtEncoderError> {
        match self {
            Self::Local(local_signer) => local_signer.sign(claims),
        }
    }
}
