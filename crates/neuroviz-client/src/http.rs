//! Transport-neutral HTTP request and response.
//!
//! [`crate::ApiClient`] builds [`HttpRequest`]s and interprets
//! [`HttpResponse`]s; an [`HttpTransport`] moves them over the wire. Tests swap
//! in a scripted transport.

use std::{fmt, future::Future};

use serde_json::Value;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File field.
    File {
        /// Field name.
        name: String,
        /// File name sent to the server.
        file_name: String,
        /// MIME type, if known.
        content_type: Option<String>,
        /// File contents.
        bytes: Vec<u8>,
    },
}

impl FormPart {
    /// Field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON body.
    Json(Value),
    /// `multipart/form-data` body.
    Multipart(Vec<FormPart>),
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
    /// Body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path` with no body.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), bearer: None, body: RequestBody::Empty }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Set a multipart body.
    #[must_use]
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Request line used as cache signature, e.g. `GET /sessions?page=0&size=10`.
    pub fn signature(&self) -> String {
        let mut line = format!("{} {}", self.method, self.path);
        for (i, (key, value)) in self.query.iter().enumerate() {
            line.push(if i == 0 { '?' } else { '&' });
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}

/// A response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with `status` and a JSON `body`.
    pub fn json(status: u16, body: &Value) -> Self {
        Self { status, body: body.to_string().into_bytes() }
    }

    /// Returns true for 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves requests to the backend.
pub trait HttpTransport: Send + Sync {
    /// Transport-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Perform `request`.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received. Non-2xx statuses
    /// are responses, not errors.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_includes_ordered_query() {
        let request = HttpRequest::get("/sessions").query("page", 0).query("size", 10);
        assert_eq!(request.signature(), "GET /sessions?page=0&size=10");
        assert_eq!(HttpRequest::post("/auth/login").signature(), "POST /auth/login");
    }
}
