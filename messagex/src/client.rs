use std::fmt::{self, Debug};
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use log::debug;
use messagex_core::{Context, Error, HttpSend, Result, Signer, SigningStage};
use messagex_hmac::{Algorithm, Credential, CredentialSource, RequestSigner};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::call::BlockingRuntime;
use crate::{Codec, Descriptor, Endpoint, Invocation, JsonCodec, PendingCall, Reply};

/// Normalize an operation name as written by the caller.
///
/// An ASCII first letter is capitalized, anything else is kept as is. A trailing `Async` is stripped and marks
/// the call as asynchronous.
///
/// ```
/// use messagex::normalize_operation;
///
/// assert_eq!(normalize_operation("getMessage"), ("GetMessage".to_string(), false));
/// assert_eq!(normalize_operation("SendAsync"), ("Send".to_string(), true));
/// ```
pub fn normalize_operation(raw: &str) -> (String, bool) {
    let mut chars = raw.chars();
    let name: String = match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_uppercase())
            .chain(chars)
            .collect(),
        None => String::new(),
    };

    match name.strip_suffix("Async") {
        Some(stripped) => (stripped.to_string(), true),
        None => (name, false),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_lowercase())
            .chain(chars)
            .collect(),
        None => String::new(),
    }
}

/// Client dispatching descriptor operations as signed HTTP calls.
///
/// Every call goes through the same pipeline: the payload is encoded, the
/// request is signed with freshly resolved credentials and sent through the
/// context's transport, then the response is decoded when the descriptor
/// maps its status code.
pub struct Client<C: Codec = JsonCodec> {
    descriptor: Arc<Descriptor>,
    stage: Arc<SigningStage<Credential>>,
    codec: Arc<C>,
    runtime: Arc<BlockingRuntime>,
}

impl<C: Codec> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            stage: self.stage.clone(),
            codec: self.codec.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<C: Codec> Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("descriptor", &self.descriptor)
            .field("stage", &self.stage)
            .field("codec", &self.codec)
            .finish()
    }
}

impl Client {
    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<C: Codec> Client<C> {
    /// The descriptor this client dispatches against.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Invoke the operation named `operation`.
    ///
    /// The call is asynchronous when `wants_async` is set or the name ends
    /// with `Async`, and [`Invocation::Pending`] is returned. Otherwise this
    /// blocks until the reply is available.
    ///
    /// Unknown operations fail right away without touching the network.
    pub fn invoke<T, P>(
        &self,
        operation: &str,
        payload: &P,
        wants_async: bool,
    ) -> Result<Invocation<T>>
    where
        T: DeserializeOwned + Send + 'static,
        P: Serialize + ?Sized,
    {
        let (name, forced_async) = normalize_operation(operation);
        let call = self.prepare(name, payload)?;

        if wants_async || forced_async {
            Ok(Invocation::Pending(call))
        } else {
            call.wait().map(Invocation::Ready)
        }
    }

    /// Invoke an operation and block until it completes, whatever its name says.
    pub fn call<T, P>(&self, operation: &str, payload: &P) -> Result<Reply<T>>
    where
        T: DeserializeOwned + Send + 'static,
        P: Serialize + ?Sized,
    {
        self.invoke(operation, payload, false)?.wait()
    }

    /// Invoke an operation and return the call without waiting for it.
    pub fn call_async<T, P>(&self, operation: &str, payload: &P) -> Result<PendingCall<T>>
    where
        T: DeserializeOwned + Send + 'static,
        P: Serialize + ?Sized,
    {
        let (name, _) = normalize_operation(operation);
        self.prepare(name, payload)
    }

    /// Sign and send an arbitrary request through the client's pipeline.
    pub async fn send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.stage.http_send(req).await
    }

    fn prepare<T, P>(&self, name: String, payload: &P) -> Result<PendingCall<T>>
    where
        T: DeserializeOwned + Send + 'static,
        P: Serialize + ?Sized,
    {
        let endpoint = self.descriptor.endpoint(&name).cloned().ok_or_else(|| {
            Error::usage_invalid(format!(
                "requested endpoint {} is not provided",
                lower_first(&name)
            ))
        })?;

        let uri = self.descriptor.request_uri(&endpoint);
        let target = format!("{} {uri}", endpoint.method);
        debug!("invoking operation {name}: {target}");

        // Failures from here on surface where the caller observes the result.
        let req = self
            .codec
            .encode(payload)
            .and_then(|body| build_request(&endpoint, &uri, body));

        let stage = self.stage.clone();
        let codec = self.codec.clone();
        let operation = name.clone();
        let fut = async move {
            let resp = stage.http_send(req?).await?;
            debug!("operation {operation} responded with {}", resp.status());
            resolve(codec.as_ref(), &endpoint, resp)
        };

        Ok(PendingCall::new(
            name,
            target,
            self.runtime.clone(),
            fut.boxed(),
        ))
    }
}

fn build_request(endpoint: &Endpoint, uri: &str, body: Bytes) -> Result<http::Request<Bytes>> {
    let req = http::Request::builder()
        .method(endpoint.method.clone())
        .uri(uri)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(body)?;
    Ok(req)
}

fn resolve<C: Codec, T: DeserializeOwned>(
    codec: &C,
    endpoint: &Endpoint,
    resp: http::Response<Bytes>,
) -> Result<Reply<T>> {
    let status = resp.status();
    match endpoint.response_type(status) {
        None => Ok(Reply::Raw(resp)),
        Some(type_name) => Ok(Reply::Typed {
            status,
            type_name: type_name.to_string(),
            value: codec.decode(resp.body(), type_name)?,
        }),
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder<C: Codec = JsonCodec> {
    descriptor: Option<Descriptor>,
    credentials: Option<CredentialSource>,
    ctx: Option<Context>,
    codec: C,
    algorithm: Algorithm,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a builder using [`JsonCodec`] and [`Algorithm::HmacSha256`].
    pub fn new() -> Self {
        Self {
            descriptor: None,
            credentials: None,
            ctx: None,
            codec: JsonCodec,
            algorithm: Algorithm::default(),
        }
    }
}

impl<C: Codec> ClientBuilder<C> {
    /// Set the service descriptor. Required.
    pub fn descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Set the credentials requests are signed with. Required.
    ///
    /// Use [`CredentialSource::Anonymous`] to sign with empty credentials.
    pub fn credentials(mut self, credentials: impl Into<CredentialSource>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Set the context providing the transport and the environment.
    pub fn context(mut self, ctx: Context) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Select the HMAC algorithm.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Replace the codec.
    pub fn codec<D: Codec>(self, codec: D) -> ClientBuilder<D> {
        ClientBuilder {
            descriptor: self.descriptor,
            credentials: self.credentials,
            ctx: self.ctx,
            codec,
            algorithm: self.algorithm,
        }
    }

    /// Build the client.
    pub fn build(self) -> Result<Client<C>> {
        let descriptor = self
            .descriptor
            .ok_or_else(|| Error::config_invalid("a service descriptor is required"))?;
        descriptor.validate()?;

        let credentials = self.credentials.ok_or_else(|| {
            Error::config_invalid(
                "credentials are required, use CredentialSource::Anonymous to sign anonymously",
            )
        })?;

        let ctx = match self.ctx {
            Some(ctx) => ctx,
            None => fallback_context(),
        };

        let signer = Signer::from_arc(
            ctx.clone(),
            credentials.into_provider(),
            Arc::new(RequestSigner::new().with_algorithm(self.algorithm)),
        );

        Ok(Client {
            descriptor: Arc::new(descriptor),
            stage: Arc::new(SigningStage::new(signer, ctx)),
            codec: Arc::new(self.codec),
            runtime: Arc::new(BlockingRuntime::new()?),
        })
    }
}

#[cfg(feature = "default-context")]
fn fallback_context() -> Context {
    crate::default_context()
}

#[cfg(not(feature = "default-context"))]
fn fallback_context() -> Context {
    Context::new()
}
