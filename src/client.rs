use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::Stream;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability;
use crate::types::{GenerateRequest, GenerateResponse, ModelListResponse};

const DEFAULT_API_URL: &str = "http://localhost:11434/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for a local Ollama server.
#[derive(Clone)]
pub struct Ollama {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Ollama {
    /// Create a new Ollama client.
    ///
    /// The base URL can be provided directly, read from the OLLAMUS_HOST
    /// environment variable, or left to the default local address.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Self::resolve_base_url(base_url)?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every response passing through this
    /// client.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve and validate the base URL, normalizing to a trailing slash.
    fn resolve_base_url(base_url: Option<String>) -> Result<String> {
        let base_url = match base_url {
            Some(base_url) => base_url,
            None => match env::var("OLLAMUS_HOST") {
                Ok(host) => host,
                Err(_) => DEFAULT_API_URL.to_string(),
            },
        };
        url::Url::parse(&base_url)
            .map_err(|e| Error::url(format!("Invalid base URL {base_url:?}: {e}"), Some(e)))?;
        if base_url.ends_with('/') {
            Ok(base_url)
        } else {
            Ok(format!("{base_url}/"))
        }
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        // Ollama reports failures as `{"error": "..."}`.
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let error_message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| error_body.clone());

        match status_code {
            400 => Error::bad_request(error_message, None),
            404 => {
                let model = extract_quoted_name(&error_message);
                Error::not_found(error_message, model)
            }
            408 => Error::timeout(error_message, None),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message),
            _ => Error::api(status_code, error_message),
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Send a completion request and get the full response in one piece.
    pub async fn generate(&self, mut params: GenerateRequest) -> Result<GenerateResponse> {
        params.stream = false;
        let url = format!("{}api/generate", self.base_url);

        observability::CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(&params)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.map_transport_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        let response = response.json::<GenerateResponse>().await.map_err(|e| {
            observability::CLIENT_REQUEST_ERRORS.click();
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        observability::CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if let Some(logger) = &self.logger {
            logger.log_response(&response);
        }
        Ok(response)
    }

    /// Send a completion request and get a streaming response.
    ///
    /// The server frames streamed responses as newline-delimited JSON, one
    /// [`GenerateResponse`] chunk per line; the final chunk has `done` set
    /// and carries the timing and token-count fields.
    pub async fn generate_stream(
        &self,
        mut params: GenerateRequest,
    ) -> Result<impl Stream<Item = Result<GenerateResponse>>> {
        params.stream = true;
        let url = format!("{}api/generate", self.base_url);

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/x-ndjson"),
        );

        observability::CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&params)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.map_transport_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        let stream = response.bytes_stream();
        Ok(process_ndjson(stream, self.logger.clone()))
    }

    /// List the models installed on the server.
    pub async fn models(&self) -> Result<ModelListResponse> {
        let url = format!("{}api/tags", self.base_url);

        observability::CLIENT_REQUESTS.click();
        let response = self
            .client
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.map_transport_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ModelListResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

impl fmt::Debug for Ollama {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Process a stream of bytes into a stream of newline-delimited JSON chunks
fn process_ndjson<S>(
    byte_stream: S,
    logger: Option<Arc<dyn ClientLogger>>,
) -> impl Stream<Item = Result<GenerateResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type. Fused because the final
    // buffered line is yielded after the byte stream itself ends.
    let stream = byte_stream
        .map(|result| {
            result.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
            })
        })
        .fuse();

    let buffer = String::new();

    stream::unfold(
        (stream, buffer, logger),
        move |(mut stream, mut buffer, logger)| async move {
            loop {
                // First check if we have a complete line in the buffer
                if let Some((chunk, remaining)) = extract_line(&buffer) {
                    buffer = remaining;
                    let chunk = observe_chunk(chunk, &logger);
                    return Some((chunk, (stream, buffer, logger)));
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {}", e),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer, logger),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        observability::STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, logger)));
                    }
                    None => {
                        // End of stream; the final line may lack a newline
                        let line = std::mem::take(&mut buffer);
                        let line = line.trim();
                        if !line.is_empty() {
                            let chunk = observe_chunk(parse_chunk(line), &logger);
                            return Some((chunk, (stream, buffer, logger)));
                        }
                        return None;
                    }
                }
            }
        },
    )
}

fn observe_chunk(
    chunk: Result<GenerateResponse>,
    logger: &Option<Arc<dyn ClientLogger>>,
) -> Result<GenerateResponse> {
    match &chunk {
        Ok(response) => {
            observability::STREAM_CHUNKS.click();
            if let Some(logger) = logger {
                logger.log_stream_chunk(response);
            }
        }
        Err(_) => {
            observability::STREAM_ERRORS.click();
        }
    }
    chunk
}

/// Extract a complete line from a buffer string, skipping blank lines
fn extract_line(buffer: &str) -> Option<(Result<GenerateResponse>, String)> {
    let mut remaining = buffer;
    loop {
        let (line, rest) = remaining.split_once('\n')?;
        let line = line.trim();
        if line.is_empty() {
            remaining = rest;
            continue;
        }
        return Some((parse_chunk(line), rest.to_string()));
    }
}

/// Parse one NDJSON line into a chunk
fn parse_chunk(line: &str) -> Result<GenerateResponse> {
    #[derive(Deserialize)]
    struct StreamErrorLine {
        error: String,
    }

    match serde_json::from_str::<GenerateResponse>(line) {
        Ok(chunk) => Ok(chunk),
        Err(e) => {
            // The server reports mid-stream failures as an error line.
            if let Ok(error_line) = serde_json::from_str::<StreamErrorLine>(line) {
                Err(Error::streaming(error_line.error, None))
            } else {
                Err(Error::serialization(
                    format!("Failed to parse stream chunk: {}", e),
                    Some(Box::new(e)),
                ))
            }
        }
    }
}

/// Extract the first single-quoted name from a server error message,
/// e.g. the model in `model 'foo' not found`.
fn extract_quoted_name(message: &str) -> Option<String> {
    let start = message.find('\'')? + 1;
    let end = start + message[start..].find('\'')?;
    if start < end {
        Some(message[start..end].to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        // Test with explicit base URL
        let client = Ollama::new(Some("http://localhost:11434".to_string())).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434/");
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        // Test with custom options
        let client = Ollama::with_options(
            Some("http://model-host.example.com:11434/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://model-host.example.com:11434/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Ollama::new(Some("not a url".to_string())).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn test_extract_line() {
        // No complete line yet
        assert!(extract_line(r#"{"model":"llama3.1","#).is_none());

        // One complete line plus a partial one
        let buffer = concat!(
            r#"{"model":"llama3.1","created_at":"2023-08-04T19:22:45.499127Z","response":"The","done":false}"#,
            "\n",
            r#"{"model":"llama3"#,
        );
        let (chunk, rest) = extract_line(buffer).unwrap();
        let chunk = chunk.unwrap();
        assert_eq!(chunk.response, "The");
        assert!(!chunk.done);
        assert_eq!(rest, r#"{"model":"llama3"#);

        // Blank lines are skipped
        let buffer = concat!(
            "\n\n",
            r#"{"model":"llama3.1","created_at":"2023-08-04T19:22:45.499127Z","response":"x","done":true}"#,
            "\n",
        );
        let (chunk, rest) = extract_line(buffer).unwrap();
        assert!(chunk.unwrap().done);
        assert_eq!(rest, "");
    }

    #[test]
    fn test_parse_chunk_error_line() {
        let err = parse_chunk(r#"{"error":"something went wrong"}"#).unwrap_err();
        assert!(matches!(err, Error::Streaming { .. }));
        assert!(err.to_string().contains("something went wrong"));

        let err = parse_chunk("not json").unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn test_extract_quoted_name() {
        assert_eq!(
            extract_quoted_name("model 'neural-chat' not found, try pulling it first"),
            Some("neural-chat".to_string())
        );
        assert_eq!(extract_quoted_name("no quotes here"), None);
        assert_eq!(extract_quoted_name("empty '' quotes"), None);
    }
}
