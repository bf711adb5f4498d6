//! HTTP record source

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use super::RecordSource;
use crate::builder::Missing;
use crate::builder::Set;
use crate::error::FetchError;
use crate::model::Record;

/// Query parameter carrying the scope id.
const SCOPE_PARAM: &str = "recordId";

/// Fetches records from a REST endpoint.
///
/// Issues `GET {base_url}/{endpoint}?recordId={scope_id}` and expects either a
/// JSON array of records or an object with a `records` array. Non-2xx
/// responses with a `{message, stackTrace}` body (or a list of
/// `{message, errorCode}`) become [`FetchError::Backend`]; anything else
/// becomes [`FetchError::Http`].
///
/// Cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use activity_lib::source::HttpRecordSource;
///
/// let source = HttpRecordSource::builder()
///     .url("https://example.my.site.com")
///     .endpoint("services/apexrest/activities")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let records = source.fetch("001000000000001").await?;
/// ```
#[derive(Clone)]
pub struct HttpRecordSource {
    inner: Arc<HttpRecordSourceInner>,
}

struct HttpRecordSourceInner {
    base_url: String,
    endpoint: String,
    http_client: Client,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpRecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRecordSource")
            .field("base_url", &self.inner.base_url)
            .field("endpoint", &self.inner.endpoint)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpRecordSource {
    /// Creates a new builder.
    pub fn builder() -> HttpRecordSourceBuilder<Missing> {
        HttpRecordSourceBuilder::new()
    }

    /// Builds the request URL for `scope_id`.
    pub fn request_url(&self, scope_id: &str) -> Result<Url, FetchError> {
        let raw = format!(
            "{}/{}",
            self.inner.base_url.trim_end_matches('/'),
            self.inner.endpoint.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
        url.query_pairs_mut().append_pair(SCOPE_PARAM, scope_id);
        Ok(url)
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch(&self, scope_id: &str) -> Result<Vec<Record>, FetchError> {
        let url = self.request_url(scope_id)?;
        log::debug!("GET {}", url);

        let mut request = self
            .inner
            .http_client
            .get(url)
            .header(ACCEPT, "application/json");

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            parse_records(&body)
        } else {
            Err(parse_error(status.as_u16(), body))
        }
    }
}

// =============================================================================
// Response bodies
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsBody {
    List(Vec<Record>),
    Page { records: Vec<Record> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendErrorBody {
    message: String,
    #[serde(default)]
    stack_trace: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Wrapped { body: BackendErrorBody },
    Single(BackendErrorBody),
    List(Vec<BackendErrorBody>),
}

fn parse_records(body: &str) -> Result<Vec<Record>, FetchError> {
    match serde_json::from_str::<RecordsBody>(body) {
        Ok(RecordsBody::List(records)) | Ok(RecordsBody::Page { records }) => Ok(records),
        Err(e) => {
            log::debug!("Unparseable response body: {}", body);
            Err(FetchError::parse_with_body(e.to_string(), body))
        }
    }
}

fn parse_error(status: u16, body: String) -> FetchError {
    let backend = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody::Wrapped { body }) | Ok(ErrorBody::Single(body)) => Some(body),
        Ok(ErrorBody::List(list)) => list.into_iter().next(),
        Err(_) => None,
    };

    match backend {
        Some(err) => match err.stack_trace.or(err.error_code) {
            Some(trace) if !trace.is_empty() => FetchError::backend_with_trace(err.message, trace),
            _ => FetchError::backend(err.message),
        },
        None => FetchError::http(status, body),
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Builder for constructing an [`HttpRecordSource`].
///
/// # Required Fields
///
/// - `url` - The backend base URL
pub struct HttpRecordSourceBuilder<U> {
    url: U,
    endpoint: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpRecordSourceBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            endpoint: "activities".to_string(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> HttpRecordSourceBuilder<Set<String>> {
        HttpRecordSourceBuilder {
            url: Set(url.into()),
            endpoint: self.endpoint,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for HttpRecordSourceBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> HttpRecordSourceBuilder<U> {
    /// Sets the endpoint path, relative to the base URL.
    ///
    /// Defaults to `activities`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// Ignored when a custom client is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HttpRecordSourceBuilder<Set<String>> {
    /// Builds the [`HttpRecordSource`].
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be created.
    pub fn build(self) -> Result<HttpRecordSource, FetchError> {
        let base_url = self.url.0;
        Url::parse(&base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpRecordSource {
            inner: Arc::new(HttpRecordSourceInner {
                base_url,
                endpoint: self.endpoint,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> HttpRecordSource {
        HttpRecordSource::builder()
            .url(base)
            .endpoint("/services/apexrest/activities")
            .build()
            .unwrap()
    }

    #[test]
    fn test_request_url() {
        let url = source("https://example.com/").request_url("001 A&B").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/services/apexrest/activities?recordId=001+A%26B"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpRecordSource::builder().url("not a url").build().unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn test_parse_records_array_and_page() {
        let list = parse_records(r#"[{"Id": "a1", "Subject": "Call"}]"#).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id(), Some("a1"));

        let page = parse_records(r#"{"totalSize": 0, "done": true, "records": []}"#).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_parse_records_rejects_garbage() {
        let err = parse_records("<html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert_eq!(err.body(), Some("<html>"));
        assert!(!err.detail().contains("<html>"));
    }

    #[test]
    fn test_parse_error_with_stack_trace() {
        let err = parse_error(500, r#"{"message": "x", "stackTrace": "y"}"#.to_string());
        assert_eq!(err.detail(), "x\ny");
    }

    #[test]
    fn test_parse_error_wrapped_body() {
        let err = parse_error(400, r#"{"body": {"message": "bad", "stackTrace": ""}}"#.to_string());
        assert_eq!(err.message(), "bad");
        assert_eq!(err.trace(), None);
    }

    #[test]
    fn test_parse_error_list_uses_error_code() {
        let err = parse_error(
            400,
            r#"[{"message": "Session expired", "errorCode": "INVALID_SESSION_ID"}]"#.to_string(),
        );
        assert_eq!(err.detail(), "Session expired\nINVALID_SESSION_ID");
    }

    #[test]
    fn test_parse_error_plain_body() {
        let err = parse_error(502, "Bad Gateway".to_string());
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.message(), "HTTP 502: Bad Gateway");
    }
}
