use std::fmt;
use std::str::FromStr;

use http::header::AUTHORIZATION;
use http::{HeaderMap, Method, Uri};
use thiserror::Error;
use tracing::debug;

use super::Annotation;
use crate::http_client::{ContentType, HttpClient, HttpClientError, ResponseBody, request};
use crate::token::Token;

/// Base URL of the Google Analytics Admin API.
pub const DEFAULT_API_BASE_URL: &str = "https://analyticsadmin.googleapis.com";

#[derive(Error, Debug)]
pub enum AnnotationClientError {
    #[error("invalid annotation endpoint: `{0}`")]
    InvalidEndpoint(String),
    #[error("unusable bearer token: `{0}`")]
    InvalidToken(String),
    #[error("annotation request failed: {0}")]
    Http(#[from] HttpClientError),
}

#[derive(Error, Debug, PartialEq)]
#[error("invalid GA4 property id `{0}`: expected digits, optionally prefixed with `properties/`")]
pub struct PropertyIdError(String);

/// Numeric identifier of a GA4 property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyId(String);

impl FromStr for PropertyId {
    type Err = PropertyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let id = trimmed.strip_prefix("properties/").unwrap_or(trimmed);
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(PropertyIdError(s.to_string()));
        }
        Ok(Self(id.to_string()))
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates reporting data annotations on behalf of a bearer token holder.
pub struct AnnotationClient<C> {
    http_client: C,
    api_base_url: Uri,
}

impl<C> AnnotationClient<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C, api_base_url: Uri) -> Self {
        Self {
            http_client,
            api_base_url,
        }
    }

    /// `{api_base}/v1alpha/properties/{property}/reportingDataAnnotations`
    pub fn endpoint(&self, property: &PropertyId) -> Result<Uri, AnnotationClientError> {
        let base = self.api_base_url.to_string();
        let url = format!(
            "{}/v1alpha/properties/{property}/reportingDataAnnotations",
            base.trim_end_matches('/')
        );
        url.parse::<Uri>()
            .map_err(|e| AnnotationClientError::InvalidEndpoint(format!("{url}: {e}")))
    }

    /// Sends one create request. The remote side assigns the resource name; nothing is deduplicated.
    pub fn create(
        &self,
        property: &PropertyId,
        annotation: &Annotation,
        token: &Token,
    ) -> Result<ResponseBody, AnnotationClientError> {
        let endpoint = self.endpoint(property)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            token
                .authorization_header()
                .map_err(|e| AnnotationClientError::InvalidToken(e.to_string()))?,
        );

        debug!("creating annotation in property {property}");
        let body = request(
            &self.http_client,
            Method::POST,
            &endpoint,
            headers,
            annotation,
            ContentType::Json,
        )?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationColor;
    use crate::http::client::HttpClient as ReqwestHttpClient;
    use crate::http_client::tests::{MockHttpClient, response};
    use crate::token::{AccessToken, TokenType};
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn annotation() -> Annotation {
        Annotation::build(
            "a1b2c3d4e5",
            "org/repo",
            Some("fix bug"),
            None,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
        )
    }

    fn token() -> Token {
        Token::expiring_in(AccessToken::from("T"), TokenType::Bearer, 3599).unwrap()
    }

    fn property() -> PropertyId {
        "123456789".parse().unwrap()
    }

    #[test]
    fn property_id_parsing() {
        assert_eq!(PropertyId::from_str("123").unwrap().to_string(), "123");
        assert_eq!(PropertyId::from_str(" properties/42 ").unwrap().to_string(), "42");
        assert!(PropertyId::from_str("").is_err());
        assert!(PropertyId::from_str("properties/").is_err());
        assert!(PropertyId::from_str("G-ABC123").is_err());
        assert!(PropertyId::from_str("12/../34").is_err());
    }

    #[test]
    fn endpoint_is_built_from_the_base_url() {
        let client = AnnotationClient::new(
            MockHttpClient::new(),
            Uri::from_static(DEFAULT_API_BASE_URL),
        );
        assert_eq!(
            client.endpoint(&property()).unwrap(),
            "https://analyticsadmin.googleapis.com/v1alpha/properties/123456789/reportingDataAnnotations"
        );

        let client = AnnotationClient::new(
            MockHttpClient::new(),
            Uri::from_static("http://127.0.0.1:8080/"),
        );
        assert_eq!(
            client.endpoint(&property()).unwrap(),
            "http://127.0.0.1:8080/v1alpha/properties/123456789/reportingDataAnnotations"
        );
    }

    #[test]
    fn create_sends_bearer_authenticated_json() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| {
                let authorization = &req.headers()[AUTHORIZATION];
                authorization == "Bearer T"
                    && authorization.is_sensitive()
                    && req.headers()[http::header::CONTENT_TYPE] == "application/json"
                    && serde_json::from_slice::<serde_json::Value>(req.body()).unwrap()
                        == json!({
                            "title": "Deploy: org/repo",
                            "description": "Commit: a1b2c3d - fix bug",
                            "color": "BLUE",
                            "annotationDate": {"year": 2024, "month": 3, "day": 15}
                        })
            })
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"name":"properties/123456789/reportingDataAnnotations/1"}"#,
                ))
            });

        let client = AnnotationClient::new(http_client, Uri::from_static(DEFAULT_API_BASE_URL));
        let body = client.create(&property(), &annotation(), &token()).unwrap();

        assert_eq!(
            body.str_field("name"),
            Some("properties/123456789/reportingDataAnnotations/1")
        );
    }

    #[test]
    fn forbidden_is_reported_with_status_and_body() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(|_| Ok(response(403, r#"{"error":"forbidden"}"#)));

        let client = AnnotationClient::new(http_client, Uri::from_static(DEFAULT_API_BASE_URL));
        let error = client
            .create(&property(), &annotation(), &token())
            .unwrap_err();

        assert_matches!(
            error,
            AnnotationClientError::Http(HttpClientError::UnsuccessfulResponse { status: 403, body }) => {
                assert_eq!(body, r#"{"error":"forbidden"}"#);
            }
        );
    }

    #[test]
    fn create_against_admin_api_server() {
        let server = MockServer::start();
        let path = "/v1alpha/properties/123456789/reportingDataAnnotations";
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(path)
                .header("authorization", "Bearer T")
                .json_body(json!({
                    "title": "Deploy: org/repo",
                    "description": "Commit: a1b2c3d - fix bug",
                    "color": "RED",
                    "annotationDate": {"year": 2024, "month": 3, "day": 15}
                }));
            then.status(200)
                .json_body(json!({"name": "properties/123456789/reportingDataAnnotations/7"}));
        });

        let client = AnnotationClient::new(
            ReqwestHttpClient::new().unwrap(),
            server.base_url().parse().unwrap(),
        );
        let result = client.create(
            &property(),
            &annotation().with_color(AnnotationColor::Red),
            &token(),
        );

        assert!(result.is_ok());
        mock.assert();
    }
}
