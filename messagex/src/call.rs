use std::fmt::{self, Debug};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::future::BoxFuture;
use http::StatusCode;
use messagex_core::{Error, Result};
use tokio::runtime::{Builder, Handle, Runtime};

/// What an operation resolved to.
#[derive(Debug)]
pub enum Reply<T> {
    /// The status code is mapped by the descriptor and the body decoded into `T`.
    Typed {
        /// Status code of the response.
        status: StatusCode,
        /// Type name the descriptor maps the status code to.
        type_name: String,
        /// The decoded body.
        value: T,
    },
    /// The status code is not mapped, here is the response as received.
    Raw(http::Response<Bytes>),
}

impl<T> Reply<T> {
    /// Status code of the response behind this reply.
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Typed { status, .. } => *status,
            Reply::Raw(resp) => resp.status(),
        }
    }

    /// Check if the response was decoded.
    pub fn is_typed(&self) -> bool {
        matches!(self, Reply::Typed { .. })
    }

    /// The decoded value, if the status code was mapped.
    pub fn typed(self) -> Option<T> {
        match self {
            Reply::Typed { value, .. } => Some(value),
            Reply::Raw(_) => None,
        }
    }

    /// The raw response, if the status code was not mapped.
    pub fn raw(self) -> Option<http::Response<Bytes>> {
        match self {
            Reply::Typed { .. } => None,
            Reply::Raw(resp) => Some(resp),
        }
    }
}

/// Result of invoking an operation: ready for blocking calls, pending otherwise.
#[derive(Debug)]
pub enum Invocation<T> {
    /// The call has completed.
    Ready(Reply<T>),
    /// The call is in flight, await it or [`wait`](PendingCall::wait) on it.
    Pending(PendingCall<T>),
}

impl<T> Invocation<T> {
    /// Check if the call is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Invocation::Pending(_))
    }

    /// Block until the reply is available.
    pub fn wait(self) -> Result<Reply<T>> {
        match self {
            Invocation::Ready(reply) => Ok(reply),
            Invocation::Pending(call) => call.wait(),
        }
    }

    /// Await the reply.
    pub async fn resolve(self) -> Result<Reply<T>> {
        match self {
            Invocation::Ready(reply) => Ok(reply),
            Invocation::Pending(call) => call.await,
        }
    }
}

/// An in-flight operation.
///
/// Nothing is sent until the call is polled, either by awaiting it or by
/// calling [`PendingCall::wait`].
pub struct PendingCall<T> {
    operation: String,
    endpoint: String,
    runtime: Arc<BlockingRuntime>,
    fut: BoxFuture<'static, Result<Reply<T>>>,
}

impl<T> PendingCall<T> {
    pub(crate) fn new(
        operation: String,
        endpoint: String,
        runtime: Arc<BlockingRuntime>,
        fut: BoxFuture<'static, Result<Reply<T>>>,
    ) -> Self {
        Self {
            operation,
            endpoint,
            runtime,
            fut,
        }
    }

    /// Normalized name of the operation.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Method and uri the operation is sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Block the current thread until the call completes.
    ///
    /// Fails with [`ErrorKind::UsageInvalid`](messagex_core::ErrorKind::UsageInvalid)
    /// when called from inside an async runtime: await the call there instead.
    pub fn wait(self) -> Result<Reply<T>> {
        self.runtime.block_on(self.fut)
    }
}

impl<T> Future for PendingCall<T> {
    type Output = Result<Reply<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().fut.as_mut().poll(cx)
    }
}

impl<T> Debug for PendingCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("operation", &self.operation)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Runtime driving blocking calls.
///
/// Its worker keeps running between calls, so connection tasks the transport
/// spawns during a blocking call stay alive for calls awaited elsewhere.
#[derive(Debug)]
pub(crate) struct BlockingRuntime {
    rt: Option<Runtime>,
}

impl BlockingRuntime {
    pub(crate) fn new() -> Result<Self> {
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("messagex-blocking")
            .enable_all()
            .build()
            .map_err(|e| Error::unexpected("failed to build blocking runtime").with_source(e))?;

        Ok(Self { rt: Some(rt) })
    }

    pub(crate) fn block_on<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        if Handle::try_current().is_ok() {
            return Err(Error::usage_invalid(
                "blocking call issued from inside an async runtime, await the call instead",
            ));
        }

        let rt = self
            .rt
            .as_ref()
            .ok_or_else(|| Error::unexpected("blocking runtime has been shut down"))?;
        rt.block_on(fut)
    }
}

impl Drop for BlockingRuntime {
    fn drop(&mut self) {
        // Dropping a runtime inside another one panics.
        if let Some(rt) = self.rt.take() {
            rt.shutdown_background();
        }
    }
}
