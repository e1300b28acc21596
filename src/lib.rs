pub mod annotation;
pub mod commands;
pub mod config;
pub mod credential;
pub mod git;
pub mod http;
pub mod http_client;
pub mod jwt;
pub mod orchestrator;
pub mod parameters;
pub mod token;
pub mod token_exchanger;
pub mod token_retriever;

use crate::annotation::client::AnnotationClientError;
use crate::config::ConfigError;
use crate::credential::CredentialError;
use crate::http_client::HttpClientError;
use crate::jwt::claims::ClaimsError;
use crate::jwt::error::JwtEncoderError;
use crate::jwt::signer::local::LocalPrivateKeySignerError;
use crate::token::Token;
use crate::token_exchanger::TokenExchangeError;
use thiserror::Error;

/// Every way a run can fail. All of them are terminal.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("signing error: {0}")]
    Signing(String),
    #[error("token exchange error: {0}")]
    TokenExchange(String),
    #[error("unsuccessful HTTP response: status `{status}`, body: `{body}`")]
    Http { status: u16, body: String },
    #[error("http transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum TokenRetrieverError {
    #[error("building JWT claims: `{0}`")]
    Claims(#[from] ClaimsError),
    #[error("signing JWT: `{0}`")]
    JwtSigner(#[from] JwtEncoderError),
    #[error("exchanging signed assertion: `{0}`")]
    TokenExchange(#[from] TokenExchangeError),
}

/// Obtains a bearer token for a single authenticated call.
pub trait TokenRetriever {
    fn retrieve(&self) -> Result<Token, TokenRetrieverError>;
}

impl From<ConfigError> for AnnotatorError {
    fn from(err: ConfigError) -> Self {
        AnnotatorError::Configuration(err.to_string())
    }
}

impl From<CredentialError> for AnnotatorError {
    fn from(err: CredentialError) -> Self {
        AnnotatorError::Configuration(err.to_string())
    }
}

impl From<LocalPrivateKeySignerError> for AnnotatorError {
    fn from(err: LocalPrivateKeySignerError) -> Self {
        AnnotatorError::Signing(err.to_string())
    }
}

impl From<ClaimsError> for AnnotatorError {
    fn from(err: ClaimsError) -> Self {
        AnnotatorError::Signing(err.to_string())
    }
}

impl From<JwtEncoderError> for AnnotatorError {
    fn from(err: JwtEncoderError) -> Self {
        AnnotatorError::Signing(err.to_string())
    }
}

impl From<HttpClientError> for AnnotatorError {
    fn from(err: HttpClientError) -> Self {
        match err {
            HttpClientError::UnsuccessfulResponse { status, body } => {
                AnnotatorError::Http { status, body }
            }
            HttpClientError::TransportError(msg) | HttpClientError::InvalidResponse(msg) => {
                AnnotatorError::Transport(msg)
            }
            HttpClientError::EncoderError(msg) => {
                AnnotatorError::Configuration(format!("building request: {msg}"))
            }
        }
    }
}

impl From<TokenExchangeError> for AnnotatorError {
    fn from(err: TokenExchangeError) -> Self {
        match err {
            TokenExchangeError::Http(http_err) => http_err.into(),
            other => AnnotatorError::TokenExchange(other.to_string()),
        }
    }
}

impl From<AnnotationClientError> for AnnotatorError {
    fn from(err: AnnotationClientError) -> Self {
        match err {
            AnnotationClientError::Http(http_err) => http_err.into(),
            AnnotationClientError::InvalidEndpoint(msg) => AnnotatorError::Configuration(msg),
            AnnotationClientError::InvalidToken(msg) => AnnotatorError::TokenExchange(msg),
        }
    }
}

impl From<TokenRetrieverError> for AnnotatorError {
    fn from(err: TokenRetrieverError) -> Self {
        match err {
            TokenRetrieverError::Claims(e) => e.into(),
            TokenRetrieverError::JwtSigner(e) => e.into(),
            TokenRetrieverError::TokenExchange(e) => e.into(),
        }
    }
}
