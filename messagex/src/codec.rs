use std::fmt::Debug;

use bytes::Bytes;
use messagex_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Codec turns payloads into request bodies and response bodies into values.
pub trait Codec: Debug + Send + Sync + 'static {
    /// Encode a payload into a request body.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes>;

    /// Decode a response body into the type the descriptor maps as `type_name`.
    fn decode<T: DeserializeOwned>(&self, bs: &[u8], type_name: &str) -> Result<T>;
}

/// Codec for `application/json` bodies built on `serde_json`.
///
/// Payloads that serialize to `null`, such as `()` or `None`, are sent as an
/// empty body. An empty response body decodes as `null`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes> {
        let bs = serde_json::to_vec(value)
            .map_err(|e| Error::serialization("failed to encode payload as json").with_source(e))?;
        if bs == b"null" {
            return Ok(Bytes::new());
        }
        Ok(Bytes::from(bs))
    }

    fn decode<T: DeserializeOwned>(&self, bs: &[u8], type_name: &str) -> Result<T> {
        let bs = if bs.is_empty() { &b"null"[..] } else { bs };
        serde_json::from_slice(bs).map_err(|e| {
            Error::serialization(format!("failed to decode response as {type_name}")).with_source(e)
        })
    }
}
