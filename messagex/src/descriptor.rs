use std::collections::HashMap;

use http::{Method, StatusCode};
use messagex_core::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Descriptor of a remote service: where it lives and which operations it offers.
///
/// A descriptor is read only once a client is built. Clients keep it behind
/// an `Arc` and share it across every call.
#[derive(Debug, Clone, Deserialize)]
pub struct Descriptor {
    /// Base address of the service, for example `https://api.example.com`.
    pub host: String,
    /// Version prefix placed between the host and every request uri.
    #[serde(default)]
    pub version: String,
    /// Operations keyed by their capitalized name.
    pub endpoints: HashMap<String, Endpoint>,
}

/// One operation declared by a [`Descriptor`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// HTTP method used to call the operation.
    #[serde(deserialize_with = "deserialize_method")]
    pub method: Method,
    /// Path (and optional query) relative to the version prefix.
    pub request_uri: String,
    /// Response types keyed by status code. Unlisted codes are returned raw.
    #[serde(default)]
    pub response: HashMap<u16, ResponseMapping>,
}

/// Type a response body decodes into.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseMapping {
    /// Name of the mapped type.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Descriptor {
    /// Create an empty descriptor for `host`.
    pub fn new(host: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            version: version.into(),
            endpoints: HashMap::new(),
        }
    }

    /// Declare an operation.
    pub fn with_endpoint(mut self, name: impl Into<String>, endpoint: Endpoint) -> Self {
        self.endpoints.insert(name.into(), endpoint);
        self
    }

    /// Parse a descriptor document.
    ///
    /// Both the bare shape and a document wrapping it under a top level
    /// `service` member are accepted.
    pub fn from_slice(bs: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bs)
            .map_err(|e| Error::config_invalid("descriptor is not valid json").with_source(e))?;
        Self::from_value(value)
    }

    /// Build a descriptor from an already parsed document.
    pub fn from_value(mut value: Value) -> Result<Self> {
        if let Some(service) = value.get_mut("service") {
            value = service.take();
        }

        let descriptor: Descriptor = serde_json::from_value(value)
            .map_err(|e| Error::config_invalid("descriptor has an invalid shape").with_source(e))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the fields every call relies on.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config_invalid("descriptor host must not be empty"));
        }
        Ok(())
    }

    /// Look up an operation by its normalized name.
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }

    /// Full uri of `endpoint`: `<host>/<version><requestUri>`.
    ///
    /// Slashes at the joins are collapsed and an empty version is skipped.
    pub fn request_uri(&self, endpoint: &Endpoint) -> String {
        let mut uri = self.host.trim_end_matches('/').to_string();

        let version = self.version.trim_matches('/');
        if !version.is_empty() {
            uri.push('/');
            uri.push_str(version);
        }

        let path = endpoint.request_uri.trim_start_matches('/');
        if !path.is_empty() {
            uri.push('/');
            uri.push_str(path);
        }

        uri
    }
}

impl Endpoint {
    /// Create an endpoint without any response mapping.
    pub fn new(method: Method, request_uri: impl Into<String>) -> Self {
        Self {
            method,
            request_uri: request_uri.into(),
            response: HashMap::new(),
        }
    }

    /// Map responses with `status` to `type_name`.
    pub fn with_response(mut self, status: u16, type_name: impl Into<String>) -> Self {
        self.response.insert(
            status,
            ResponseMapping {
                type_name: type_name.into(),
            },
        );
        self
    }

    /// The type mapped for `status`, if any.
    pub fn response_type(&self, status: StatusCode) -> Option<&str> {
        self.response
            .get(&status.as_u16())
            .map(|v| v.type_name.as_str())
    }
}

fn deserialize_method<'de, D>(deserializer: D) -> std::result::Result<Method, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Method::from_bytes(s.to_ascii_uppercase().as_bytes()).map_err(serde::de::Error::custom)
}
