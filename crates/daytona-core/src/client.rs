//! Authenticated HTTP client for the Daytona REST API.
//!
//! Every request goes through a single dispatch loop that attaches the
//! bearer token, maps non-2xx statuses to [`CoreError`], and applies the
//! transport-only retry policy from [`ClientConfig`].

use crate::config::ClientConfig;
use crate::error::CoreError;
use bytes::Bytes;
use reqwest::{multipart, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

/// Low-level client holding the credential context and a connection pool.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Transport`] if the TLS backend cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        tracing::debug!(
            server_url = %config.server_url,
            max_retries = config.max_retries,
            "HTTP client created"
        );

        Ok(Self { http, config })
    }

    /// Get the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and parse the JSON response.
    ///
    /// `path` is a list of unencoded path segments appended to the server
    /// URL. An empty 2xx body yields `Value::Null`.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        body: Option<&B>,
    ) -> Result<Value, CoreError> {
        self.send_with_query(method, path, &[], body).await
    }

    /// Same as [`HttpClient::send`], with query-string parameters.
    pub async fn send_with_query<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Value, CoreError> {
        let url = self.endpoint(path)?;
        let response = self
            .dispatch(&method, &url, || {
                let request = self.request(method.clone(), url.clone()).query(query);
                match body {
                    Some(body) => request.json(body),
                    None => request,
                }
            })
            .await?;

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request and deserialize the JSON response into `T`.
    pub async fn send_as<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, CoreError> {
        let value = self.send_with_query(method, path, query, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET a raw byte payload.
    pub async fn get_bytes(&self, path: &[&str], query: &[(&str, &str)]) -> Result<Bytes, CoreError> {
        let url = self.endpoint(path)?;
        let response = self
            .dispatch(&Method::GET, &url, || {
                self.request(Method::GET, url.clone()).query(query)
            })
            .await?;
        Ok(response.bytes().await?)
    }

    /// POST a byte payload as the `file` part of a multipart form.
    pub async fn upload(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
        file_name: &str,
        content: Bytes,
    ) -> Result<(), CoreError> {
        let url = self.endpoint(path)?;
        self.dispatch(&Method::POST, &url, || {
            let part = multipart::Part::bytes(content.to_vec()).file_name(file_name.to_string());
            let form = multipart::Form::new().part("file", part);
            self.request(Method::POST, url.clone())
                .query(query)
                .multipart(form)
        })
        .await?;
        Ok(())
    }

    /// Build an authenticated request.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.config.api_key)
    }

    /// Append path segments to the server URL, percent-encoding each one.
    fn endpoint(&self, path: &[&str]) -> Result<Url, CoreError> {
        let mut url = self.config.server_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::Validation("server_url cannot be used as a base".into()))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    /// Send a request built by `build`, retrying transport failures only.
    ///
    /// The builder is invoked once per attempt since request bodies are
    /// consumed on send.
    async fn dispatch<F>(&self, method: &Method, url: &Url, build: F) -> Result<Response, CoreError>
    where
        F: Fn() -> RequestBuilder,
    {
        let start = std::time::Instant::now();
        let mut attempt = 0u32;

        loop {
            tracing::debug!(method = %method, url = %url, attempt, "Sending request");

            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!(
                        method = %method,
                        url = %url,
                        status = status.as_u16(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Response received"
                    );

                    if status.is_success() {
                        return Ok(response);
                    }

                    let body = match response.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            tracing::debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                            String::new()
                        }
                    };
                    tracing::debug!(status = status.as_u16(), body = %body, "Request failed");
                    return Err(CoreError::from_status(status.as_u16(), body));
                }
                Err(e) if attempt < self.config.max_retries => {
                    let delay = self.config.retry_backoff * 2u32.saturating_pow(attempt);
                    tracing::warn!(
                        method = %method,
                        url = %url,
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transport error, retrying..."
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(method = %method, url = %url, error = %e, attempt, "Transport error");
                    return Err(e.into());
                }
            }
        }
    }
}
