use crate::{constants::*, Credential};
use async_trait::async_trait;
use messagex_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `MESSAGEX_ACCESS_KEY`: The access key
/// - `MESSAGEX_SECRET_KEY`: The secret key
///
/// Variables are read through [`Context`] on every call, so rotated values
/// are picked up without rebuilding the client.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (envs.get(MESSAGEX_ACCESS_KEY), envs.get(MESSAGEX_SECRET_KEY)) {
            (Some(ak), Some(sk)) => Ok(Some(Credential::new(ak, sk))),
            _ => Ok(None),
        }
    }
}
