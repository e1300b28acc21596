use thiserror::Error;

/// Failure to turn a claim set into a compact assertion.
#[derive(Error, Debug)]
pub enum JwtEncoderError {
    #[error("unable to sign assertion for `{subject}`: `{reason}`")]
    AssertionSigning { subject: String, reason: String },
}
