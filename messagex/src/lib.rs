#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use messagex_core::*;

/// HMAC signing scheme.
pub mod hmac {
    pub use messagex_hmac::*;
}
pub use messagex_hmac::{Algorithm, Credential, CredentialSource};

mod descriptor;
pub use descriptor::{Descriptor, Endpoint, ResponseMapping};
mod codec;
pub use codec::{Codec, JsonCodec};
mod call;
pub use call::{Invocation, PendingCall, Reply};
mod client;
pub use client::{normalize_operation, Client, ClientBuilder};

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;
