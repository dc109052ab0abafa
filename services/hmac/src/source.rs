use std::fmt::{self, Debug};
use std::sync::Arc;

use messagex_core::{Error, ProvideCredential, Result};
use serde_json::Value;

use crate::{Credential, StaticCredentialProvider};

/// Every shape of credential input a client accepts.
///
/// A source is normalized once, at client construction, into a single
/// [`ProvideCredential`] that is invoked on every request.
#[derive(Clone)]
pub enum CredentialSource {
    /// A provider used as is.
    Provider(Arc<dyn ProvideCredential<Credential = Credential>>),
    /// An access key and secret pair.
    StaticPair {
        /// Access key part.
        key: String,
        /// Secret part.
        secret: String,
    },
    /// A ready credential.
    Credentials(Credential),
    /// Sign with the anonymous credential.
    Anonymous,
}

impl CredentialSource {
    /// Use the given provider.
    pub fn provider(provider: impl ProvideCredential<Credential = Credential>) -> Self {
        Self::Provider(Arc::new(provider))
    }

    /// Use a static access key and secret.
    pub fn pair(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::StaticPair {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Build a source from loosely typed configuration input.
    ///
    /// Accepts an object with string `key` and `secret` members, or `false`
    /// for anonymous credentials. Anything else is a configuration error.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(false) => Ok(Self::Anonymous),
            Value::Object(map) => match (map.get("key"), map.get("secret")) {
                (Some(Value::String(key)), Some(Value::String(secret))) => {
                    Ok(Self::pair(key.as_str(), secret.as_str()))
                }
                _ => Err(Error::config_invalid(
                    "credentials must provide both `key` and `secret` as strings",
                )),
            },
            other => Err(Error::config_invalid(format!(
                "credentials must be a provider, a credential, a `{{key, secret}}` pair or `false`, got {}",
                value_kind(other)
            ))),
        }
    }

    /// Normalize into the provider used for every request.
    pub fn into_provider(self) -> Arc<dyn ProvideCredential<Credential = Credential>> {
        match self {
            Self::Provider(provider) => provider,
            Self::StaticPair { key, secret } => {
                Arc::new(StaticCredentialProvider::new(&key, &secret))
            }
            Self::Credentials(credential) => {
                Arc::new(StaticCredentialProvider::from_credential(credential))
            }
            Self::Anonymous => Arc::new(StaticCredentialProvider::anonymous()),
        }
    }
}

impl Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(provider) => f.debug_tuple("Provider").field(provider).finish(),
            Self::StaticPair { key, secret } => f
                .debug_tuple("StaticPair")
                .field(&Credential::new(key, secret))
                .finish(),
            Self::Credentials(credential) => f.debug_tuple("Credentials").field(credential).finish(),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

impl From<Credential> for CredentialSource {
    fn from(credential: Credential) -> Self {
        Self::Credentials(credential)
    }
}

impl TryFrom<bool> for CredentialSource {
    type Error = Error;

    /// Only `false` is meaningful: it selects anonymous credentials.
    fn try_from(value: bool) -> Result<Self> {
        if value {
            Err(Error::config_invalid(
                "`true` is not a valid credential setting, use `false` for anonymous credentials",
            ))
        } else {
            Ok(Self::Anonymous)
        }
    }
}

impl TryFrom<Value> for CredentialSource {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
