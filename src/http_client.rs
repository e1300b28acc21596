use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use http::{Method, Request, Response, Uri};
use serde::Serialize;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum HttpClientError {
    /// Represents an http transport crate error.
    #[error("HTTP Transport error: `{0}`")]
    TransportError(String),
    /// Unsuccessful HTTP response.
    #[error("Status code: `{status}` Body: `{body}`")]
    UnsuccessfulResponse { status: u16, body: String },
    /// Represents an encode error.
    #[error("error encoding `{0}`")]
    EncoderError(String),
    /// Represents an unexpected response.
    #[error("invalid http response: `{0}`")]
    InvalidResponse(String),
}

/// A synchronous trait that defines the internal methods for HTTP clients.
pub trait HttpClient {
    /// A synchronous function sends a request. The method and url are defined inside the Request.
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>;
}

impl<C> HttpClient for &C
where
    C: HttpClient + ?Sized,
{
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        (**self).send(req)
    }
}

/// How a request body is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    FormUrlEncoded,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }

    fn encode<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>, HttpClientError> {
        match self {
            ContentType::Json => serde_json::to_vec(body)
                .map_err(|e| HttpClientError::EncoderError(format!("JSON body: {e}"))),
            ContentType::FormUrlEncoded => serde_urlencoded::to_string(body)
                .map(String::into_bytes)
                .map_err(|e| HttpClientError::EncoderError(format!("form body: {e}"))),
        }
    }
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    /// The body was not valid JSON.
    Text(String),
}

impl ResponseBody {
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body)
            .map(ResponseBody::Json)
            .unwrap_or_else(|_| ResponseBody::Text(String::from_utf8_lossy(body).into_owned()))
    }

    /// Looks up a top-level string field of a JSON object body.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        match self {
            ResponseBody::Json(value) => value.get(field).and_then(serde_json::Value::as_str),
            ResponseBody::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{value}"),
            ResponseBody::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Sends one request with `body` serialized as `content_type` and classifies the response.
///
/// Any status in `[200, 300)` is a success. Every other status is returned as
/// [`HttpClientError::UnsuccessfulResponse`] with the raw body for diagnostics.
pub fn request<C, B>(
    client: &C,
    method: Method,
    url: &Uri,
    headers: HeaderMap,
    body: &B,
    content_type: ContentType,
) -> Result<ResponseBody, HttpClientError>
where
    C: HttpClient + ?Sized,
    B: Serialize + ?Sized,
{
    let encoded_body = content_type.encode(body)?;

    let mut builder = Request::builder()
        .method(method.clone())
        .uri(url)
        .header(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
    if let Some(request_headers) = builder.headers_mut() {
        request_headers.extend(headers);
    }
    let req = builder
        .body(encoded_body)
        .map_err(|e| HttpClientError::EncoderError(format!("building request: {e}")))?;

    debug!("making {method} request to {url}");
    let response = client.send(req)?;
    let status = response.status().as_u16();
    debug!("received response with status code: {status}");

    if !is_success(status) {
        return Err(HttpClientError::UnsuccessfulResponse {
            status,
            body: String::from_utf8_lossy(response.body()).into_owned(),
        });
    }

    Ok(ResponseBody::parse(response.body()))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
