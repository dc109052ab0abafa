use std::mem;

use http::header::HeaderName;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;

use crate::Result;

/// Signing context for request.
///
/// The target is kept verbatim: path and query are never decoded or
/// re-encoded, so the signed text is exactly what goes on the wire.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP path, `/` if the uri carries none.
    pub path: String,
    /// Raw HTTP query without the leading `?`.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let path = match parts.uri.path() {
            "" => "/".to_string(),
            v => v.to_string(),
        };
        let query = parts
            .uri
            .query()
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string());

        Ok(SigningRequest {
            method: parts.method.clone(),
            path,
            query,

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    ///
    /// Only headers are returned; the uri is never touched by signing.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        mem::swap(&mut parts.headers, &mut self.headers);
        Ok(())
    }

    /// The request target: path plus `?query` when a query exists.
    pub fn target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// The HTTP/1.1 request line, like `GET /v1/messages?page=2 HTTP/1.1`.
    pub fn request_line(&self) -> String {
        format!("{} {} HTTP/1.1", self.method, self.target())
    }

    /// Get the first value of a header.
    ///
    /// Returns empty string if header not found. Headers carrying several
    /// values only contribute their first one.
    #[inline]
    pub fn header_first_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Replace all values of a header with a single value.
    #[inline]
    pub fn header_insert(&mut self, key: HeaderName, value: HeaderValue) {
        self.headers.insert(key, value);
    }

    /// Remove all values of a header.
    #[inline]
    pub fn header_remove(&mut self, key: &HeaderName) {
        self.headers.remove(key);
    }
}
