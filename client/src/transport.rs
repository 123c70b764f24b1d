use async_trait::async_trait;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;

/// How a request body is sent and how the response body is read back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// JSON request body; JSON response when the body parses as JSON.
    #[default]
    Structured,
    /// Opaque text in both directions.
    PlainText,
}

/// A response (or request) body.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Payload::Json(value),
            Err(err) => Payload::Text(err.to_string()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    /// Read a response body according to the request's encoding.
    pub fn parse(raw: String, encoding: Encoding) -> Self {
        if raw.is_empty() {
            return Payload::Empty;
        }
        match encoding {
            Encoding::PlainText => Payload::Text(raw),
            Encoding::Structured => match serde_json::from_str(&raw) {
                Ok(value) => Payload::Json(value),
                Err(_) => Payload::Text(raw),
            },
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Payload::Json(value) => T::deserialize(value),
            Payload::Text(text) => serde_json::from_str(text),
            Payload::Empty => serde_json::from_str(""),
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Payload::Empty => None,
            Payload::Json(Value::String(text)) => Some(text.clone()),
            Payload::Json(value) => Some(value.to_string()),
            Payload::Text(text) => Some(text.clone()),
        }
    }
}

/// One call against the game server.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path relative to the server's base URL (e.g. `api/games/42`).
    pub path: String,
    pub body: Option<Payload>,
    pub encoding: Encoding,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            encoding: Encoding::Structured,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: None,
            encoding: Encoding::Structured,
        }
    }

    pub fn with_json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(Payload::json(body));
        self.encoding = Encoding::Structured;
        self
    }

    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Payload::text(body));
        self.encoding = Encoding::PlainText;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method, self.path)
    }
}

/// Result of a single call. Consumed once by the step that issued it.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestOutcome {
    Success { status: u16, body: Payload },
    /// `status` is `None` when no response was received at all.
    Failure {
        status: Option<u16>,
        body: Option<Payload>,
    },
}

impl RequestOutcome {
    pub fn success(status: u16, body: Payload) -> Self {
        RequestOutcome::Success { status, body }
    }

    pub fn failure(status: u16) -> Self {
        RequestOutcome::Failure {
            status: Some(status),
            body: None,
        }
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        RequestOutcome::Failure {
            status: None,
            body: Some(Payload::Text(reason.into())),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestOutcome::Success { status, .. } => Some(*status),
            RequestOutcome::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }
}

/// Issues requests against the game server.
///
/// Implementations never retry and never fail: every problem is reported as
/// a [`RequestOutcome::Failure`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> RequestOutcome;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: Request) -> RequestOutcome {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_parse() {
        assert_eq!(Payload::parse(String::new(), Encoding::Structured), Payload::Empty);
        assert_eq!(
            Payload::parse("{\"a\":1}".into(), Encoding::Structured),
            Payload::Json(json!({"a": 1}))
        );
        assert_eq!(
            Payload::parse("Yadav".into(), Encoding::Structured),
            Payload::Text("Yadav".into())
        );
        assert_eq!(
            Payload::parse("{\"a\":1}".into(), Encoding::PlainText),
            Payload::Text("{\"a\":1}".into())
        );
    }

    #[test]
    fn test_request_builders() {
        let request = Request::post("api/games/1/cheatstate").with_text("SHOW_ALL");
        assert_eq!(request.encoding, Encoding::PlainText);
        assert_eq!(request.body, Some(Payload::Text("SHOW_ALL".into())));
        assert_eq!(request.to_string(), "POST /api/games/1/cheatstate");

        let request = Request::post("api/games/1/moves").with_json(&json!({"row": 1, "col": 2}));
        assert_eq!(request.encoding, Encoding::Structured);
        assert_eq!(request.body, Some(Payload::Json(json!({"row": 1, "col": 2}))));
    }

    #[test]
    fn test_outcome_status() {
        assert_eq!(RequestOutcome::failure(404).status(), Some(404));
        assert_eq!(RequestOutcome::unreachable("refused").status(), None);
        assert!(RequestOutcome::success(200, Payload::Empty).is_success());
    }
}
