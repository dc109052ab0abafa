use crate::{Context, Error, HttpSend, ProvideCredential, Result, SignRequest};
use bytes::Bytes;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// The credential is resolved fresh on every call. Signer keeps no state
/// between calls, so clones can be shared across tasks freely.
pub struct Signer<K: Send + Sync + Unpin + 'static> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: Send + Sync + Unpin + 'static> Clone for Signer<K> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            provider: self.provider.clone(),
            builder: self.builder.clone(),
        }
    }
}

impl<K: Send + Sync + Unpin + 'static> Debug for Signer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("ctx", &self.ctx)
            .field("provider", &self.provider)
            .field("builder", &self.builder)
            .finish()
    }
}

impl<K: Send + Sync + Unpin + 'static> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            builder: Arc::new(builder),
        }
    }

    /// Create a new signer from providers already shared elsewhere.
    pub fn from_arc(
        ctx: Context,
        provider: Arc<dyn ProvideCredential<Credential = K>>,
        builder: Arc<dyn SignRequest<Credential = K>>,
    ) -> Self {
        Self {
            ctx,
            provider,
            builder,
        }
    }

    /// The context this signer resolves credentials with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resolve the credential and sign the request in place.
    ///
    /// A provider that yields no credential fails the signing with
    /// [`ErrorKind::CredentialInvalid`](crate::ErrorKind::CredentialInvalid).
    pub async fn sign(&self, req: &mut http::request::Parts, body: &Bytes) -> Result<()> {
        let cred = self
            .provider
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| Error::credential_invalid("no credential provided"))?;

        self.builder
            .sign_request(&self.ctx, req, body, Some(&cred))
            .await
    }
}

/// SigningStage signs every request right before handing it to the next stage.
///
/// The next stage is either another stage or the terminal transport. If the
/// credential can't be resolved, the error is returned and nothing reaches
/// the next stage. Responses are passed back untouched.
pub struct SigningStage<K: Send + Sync + Unpin + 'static> {
    signer: Signer<K>,
    next: Arc<dyn HttpSend>,
}

impl<K: Send + Sync + Unpin + 'static> Debug for SigningStage<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningStage")
            .field("signer", &self.signer)
            .field("next", &self.next)
            .finish()
    }
}

impl<K: Send + Sync + Unpin + 'static> SigningStage<K> {
    /// Wrap `next` with a signing stage.
    pub fn new(signer: Signer<K>, next: impl HttpSend) -> Self {
        Self {
            signer,
            next: Arc::new(next),
        }
    }
}

#[async_trait::async_trait]
impl<K: Send + Sync + Unpin + 'static> HttpSend for SigningStage<K> {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (mut parts, body) = req.into_parts();

        self.signer.sign(&mut parts, &body).await?;
        log::debug!("signed request: {} {}", parts.method, parts.uri);

        self.next
            .http_send(http::Request::from_parts(parts, body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use http::header::AUTHORIZATION;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct FixedProvider(Option<&'static str>);

    #[async_trait::async_trait]
    impl ProvideCredential for FixedProvider {
        type Credential = String;

        async fn provide_credential(&self, _: &Context) -> Result<Option<String>> {
            match self.0 {
                Some("fail") => Err(Error::credential_invalid("provider is down")),
                v => Ok(v.map(|v| v.to_string())),
            }
        }
    }

    #[derive(Debug)]
    struct TokenBuilder;

    #[async_trait::async_trait]
    impl SignRequest for TokenBuilder {
        type Credential = String;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            body: &Bytes,
            credential: Option<&String>,
        ) -> Result<()> {
            let token = credential.ok_or_else(|| Error::credential_invalid("missing"))?;
            req.headers
                .insert(AUTHORIZATION, format!("token {token} {}", body.len()).parse()?);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSend {
        seen: Mutex<Vec<http::request::Parts>>,
    }

    #[async_trait::async_trait]
    impl HttpSend for RecordingSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.seen.lock().unwrap().push(req.into_parts().0);
            Ok(http::Response::builder()
                .status(202)
                .body(Bytes::from_static(b"accepted"))?)
        }
    }

    fn request() -> http::Request<Bytes> {
        http::Request::post("https://api.example.com/v1/messages")
            .body(Bytes::from_static(b"{}"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_stage_signs_then_forwards() -> Result<()> {
        let next = Arc::new(RecordingSend::default());
        let signer = Signer::new(Context::new(), FixedProvider(Some("abc")), TokenBuilder);
        let stage = SigningStage::new(signer, next.clone());

        let resp = stage.http_send(request()).await?;
        assert_eq!(resp.status(), 202);
        assert_eq!(resp.body().as_ref(), b"accepted");

        let seen = next.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].headers[AUTHORIZATION], "token abc 2");
        Ok(())
    }

    #[tokio::test]
    async fn test_stage_stops_when_credential_fails() {
        let next = Arc::new(RecordingSend::default());
        let signer = Signer::new(Context::new(), FixedProvider(Some("fail")), TokenBuilder);
        let stage = SigningStage::new(signer, next.clone());

        let err = stage.http_send(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(next.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stage_stops_when_no_credential() {
        let next = Arc::new(RecordingSend::default());
        let signer = Signer::new(Context::new(), FixedProvider(None), TokenBuilder);
        let stage = SigningStage::new(signer, next.clone());

        let err = stage.http_send(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(next.seen.lock().unwrap().is_empty());
    }
}
