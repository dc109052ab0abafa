use crate::Credential;
use async_trait::async_trait;
use messagex_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider always provides the same credential.
///
/// This is what a `{key, secret}` pair, a ready [`Credential`] and the
/// anonymous setting all normalize into.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with access key and secret.
    pub fn new(access_key: &str, secret: &str) -> Self {
        Self::from_credential(Credential::new(access_key, secret))
    }

    /// Create a new StaticCredentialProvider from a credential.
    pub fn from_credential(credential: Credential) -> Self {
        Self { credential }
    }

    /// Create a provider yielding the anonymous credential.
    pub fn anonymous() -> Self {
        Self::from_credential(Credential::anonymous())
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
