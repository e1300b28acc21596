use http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::http_client::{ContentType, HttpClient, HttpClientError, ResponseBody, request};
use crate::jwt::signed::SignedJwt;
use crate::token::{AccessToken, Token, TokenType};

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum TokenExchangeError {
    #[error("no access token received: `{0}`")]
    MissingAccessToken(String),
    #[error("invalid token response: `{0}`")]
    InvalidResponse(String),
    #[error("token endpoint request failed: {0}")]
    Http(#[from] HttpClientError),
}

/// Trades a signed assertion for a bearer token.
pub trait TokenExchanger {
    fn exchange(&self, assertion: &SignedJwt) -> Result<Token, TokenExchangeError>;
}

/// Performs the OAuth2 JWT-bearer grant (RFC 7523) against a token endpoint.
pub struct HttpTokenExchanger<C> {
    /// HTTP client
    http_client: C,
    /// OAuth2 token endpoint
    endpoint: Uri,
}

impl<C> HttpTokenExchanger<C> {
    pub fn new(http_client: C, endpoint: Uri) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }
}

impl<C> TokenExchanger for HttpTokenExchanger<C>
where
    C: HttpClient,
{
    /// Executes a form encoded POST to the token endpoint and extracts the `access_token`.
    fn exchange(&self, assertion: &SignedJwt) -> Result<Token, TokenExchangeError> {
        let token_request = TokenRequest {
            grant_type: GrantType::JwtBearer,
            assertion: assertion.value(),
        };

        let body = request(
            &self.http_client,
            Method::POST,
            &self.endpoint,
            HeaderMap::new(),
            &token_request,
            ContentType::FormUrlEncoded,
        )?;
        debug!("token exchange response received");

        let response = TokenResponse::from_body(&body);
        let access_token = response
            .access_token
            .ok_or_else(|| TokenExchangeError::MissingAccessToken(body.to_string()))?;

        Token::expiring_in(
            access_token,
            response.token_type,
            response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        )
        .map_err(|e| TokenExchangeError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "urn:ietf:params:oauth:grant-type:jwt-bearer")]
    JwtBearer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: GrantType,
    pub assertion: &'a str,
}

/// The parts of a token endpoint response a run relies on.
///
/// Only `access_token` is required. The other fields are read leniently and fall back
/// to their defaults when missing or malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResponse {
    pub access_token: Option<AccessToken>,
    pub token_type: TokenType,
    /// The lifetime in seconds of the access token.
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    pub fn from_body(body: &ResponseBody) -> Self {
        let access_token = body
            .str_field("access_token")
            .filter(|token| !token.is_empty())
            .map(AccessToken::from);

        let ResponseBody::Json(value) = body else {
            return Self {
                access_token,
                token_type: TokenType::Bearer,
                expires_in: None,
            };
        };

        let token_type = match value.get("token_type") {
            None | Some(Value::Null) => TokenType::Bearer,
            Some(token_type) => token_type
                .as_str()
                .and_then(|t| TokenType::try_from(t).ok())
                .unwrap_or_else(|| {
                    warn!("unexpected token_type `{token_type}`, using Bearer");
                    TokenType::Bearer
                }),
        };

        let expires_in = match value.get("expires_in") {
            None | Some(Value::Null) => None,
            Some(expires_in) => {
                let seconds = match expires_in {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.trim().parse::<u64>().ok(),
                    _ => None,
                };
                if seconds.is_none() {
                    warn!(
                        "unexpected expires_in `{expires_in}`, assuming {DEFAULT_TOKEN_LIFETIME_SECS}s"
                    );
                }
                seconds
            }
        };

        Self {
            access_token,
            token_type,
            expires_in,
        }
    }
}
