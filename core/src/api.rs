use crate::{Context, Result};
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;

/// ProvideCredential is the trait used by signer to resolve the credential.
///
/// Providers are invoked once per outgoing request and must be safe to call
/// concurrently. Any caching is the provider's own business.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Resolve the credential.
    ///
    /// Returns `Ok(None)` if this provider has nothing to offer, which allows
    /// providers to be chained.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

#[async_trait::async_trait]
impl<T: ProvideCredential + ?Sized> ProvideCredential for Arc<T> {
    type Credential = T::Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.as_ref().provide_credential(ctx).await
    }
}

/// SignRequest is the trait used by signer to sign the request.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// ## Body
    ///
    /// The `body` is the exact payload that will be transmitted. Signers that
    /// digest the body must not assume it can be read again later.
    ///
    /// ## Credential
    ///
    /// The `credential` is `None` if no provider yielded one. Signers decide
    /// whether they can sign without it.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        body: &Bytes,
        credential: Option<&Self::Credential>,
    ) -> Result<()>;
}
