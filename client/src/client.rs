use crate::transport::{Encoding, Payload, Request, RequestOutcome, Transport};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use url::Url;

/// HTTP transport backed by `reqwest`.
#[derive(Clone)]
pub struct Client {
    pub base_url: Url,
    pub http_client: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }

        // Relative joins only keep the last path segment when it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http_client: reqwest::Client::new(),
        })
    }

    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn build(&self, request: &Request) -> Result<reqwest::RequestBuilder> {
        let url = self.url_for(&request.path)?;
        let mut builder = self.http_client.request(request.method.clone(), url);
        builder = match (&request.body, request.encoding) {
            (None, _) | (Some(Payload::Empty), _) => builder,
            (Some(Payload::Json(value)), Encoding::Structured) => builder.json(value),
            (Some(body), Encoding::Structured) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.as_text().unwrap_or_default()),
            (Some(body), Encoding::PlainText) => builder
                .header(CONTENT_TYPE, "text/plain")
                .body(body.as_text().unwrap_or_default()),
        };
        Ok(builder)
    }
}

#[async_trait]
impl Transport for Client {
    async fn send(&self, request: Request) -> RequestOutcome {
        let builder = match self.build(&request) {
            Ok(builder) => builder,
            Err(err) => {
                warn!(%request, error = %err, "failed to build request");
                return RequestOutcome::unreachable(err.to_string());
            }
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%request, error = %err, "request failed before a response arrived");
                return RequestOutcome::unreachable(err.to_string());
            }
        };

        let status = response.status();
        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    %request,
                    status = status.as_u16(),
                    error = %err,
                    "failed to read response body"
                );
                String::new()
            }
        };
        let body = Payload::parse(raw, request.encoding);
        debug!(%request, status = status.as_u16(), "received response");

        if status.is_success() {
            RequestOutcome::Success {
                status: status.as_u16(),
                body,
            }
        } else {
            RequestOutcome::Failure {
                status: Some(status.as_u16()),
                body: match body {
                    Payload::Empty => None,
                    body => Some(body),
                },
            }
        }
    }
}
