//! Core components for descriptor driven, signed API clients.
//!
//! This crate provides the foundational types and traits for the messagex ecosystem.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **Traits**: Abstract interfaces for credential resolution (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Signer**: Resolves the credential and signs a request with it
//! - **SigningStage**: An [`HttpSend`] stage that signs every request before forwarding it
//!
//! ## Example
//!
//! ```no_run
//! use messagex_core::{Context, Signer, SigningStage, ProvideCredential, SignRequest, Result};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use http::request::Parts;
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl ProvideCredential for MyProvider {
//!     type Credential = String;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<String>> {
//!         Ok(Some("my-token".to_string()))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MySigner;
//!
//! #[async_trait]
//! impl SignRequest for MySigner {
//!     type Credential = String;
//!
//!     async fn sign_request(
//!         &self,
//!         _: &Context,
//!         req: &mut Parts,
//!         _: &Bytes,
//!         cred: Option<&String>,
//!     ) -> Result<()> {
//!         if let Some(token) = cred {
//!             req.headers.insert("authorization", format!("token {token}").parse()?);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::default();
//! let signer = Signer::new(ctx.clone(), MyProvider, MySigner);
//! let stage = SigningStage::new(signer, ctx);
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};
mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{ProvideCredential, SignRequest};
mod chain;
pub use chain::ProvideCredentialChain;
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::{Signer, SigningStage};
