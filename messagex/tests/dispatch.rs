use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use messagex::{
    Client, Context, Credential, CredentialSource, Descriptor, Endpoint, ErrorKind, HttpSend,
    Invocation, ProvideCredential, Reply, Result,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Deserialize)]
struct Message {
    id: u64,
    body: String,
}

#[derive(Serialize)]
struct GetMessage {
    id: u64,
}

/// Transport answering every request with a canned response and recording it.
#[derive(Debug)]
struct FakeTransport {
    status: StatusCode,
    body: &'static str,
    calls: AtomicUsize,
    received: Mutex<Vec<http::Request<Bytes>>>,
}

impl FakeTransport {
    fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> (Method, String, HashMap<String, String>, Bytes) {
        let received = self.received.lock().unwrap();
        let req = received.last().expect("a request must have been sent");
        let headers = req
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap().to_string()))
            .collect();
        (
            req.method().clone(),
            req.uri().to_string(),
            headers,
            req.body().clone(),
        )
    }
}

#[async_trait]
impl HttpSend for FakeTransport {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(req);

        Ok(http::Response::builder()
            .status(self.status)
            .header("content-type", "application/json")
            .body(Bytes::from_static(self.body.as_bytes()))?)
    }
}

fn descriptor() -> Descriptor {
    Descriptor::from_slice(
        br#"{
            "service": {
                "host": "https://api.example.com",
                "version": "v1",
                "endpoints": {
                    "GetMessage": {
                        "method": "GET",
                        "requestUri": "/messages",
                        "response": {"200": {"type": "Message"}}
                    },
                    "Send": {
                        "method": "POST",
                        "requestUri": "/messages",
                        "response": {"202": {"type": "Message"}}
                    }
                }
            }
        }"#,
    )
    .expect("descriptor must be valid")
}

fn client(transport: Arc<FakeTransport>, credentials: impl Into<CredentialSource>) -> Client {
    let _ = env_logger::builder().is_test(true).try_init();

    Client::builder()
        .descriptor(descriptor())
        .credentials(credentials)
        .context(Context::new().with_http_send(transport))
        .build()
        .expect("client must build")
}

#[test]
fn test_mapped_status_is_decoded() -> Result<()> {
    let transport = FakeTransport::new(200, r#"{"id": 42, "body": "hello"}"#);
    let client = client(transport.clone(), CredentialSource::pair("mx-key", "mx-secret"));

    let reply = client.call::<Message, _>("getMessage", &GetMessage { id: 42 })?;
    match reply {
        Reply::Typed {
            status,
            type_name,
            value,
        } => {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(type_name, "Message");
            assert_eq!(
                value,
                Message {
                    id: 42,
                    body: "hello".to_string()
                }
            );
        }
        Reply::Raw(resp) => panic!("expected a typed reply, got {resp:?}"),
    }

    let (method, uri, headers, body) = transport.last_request();
    assert_eq!(method, Method::GET);
    assert_eq!(uri, "https://api.example.com/v1/messages");
    assert_eq!(body, Bytes::from_static(br#"{"id":42}"#));
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["content-length"], "9");
    assert!(headers.contains_key("content-md5"));
    assert!(headers.contains_key("date"));
    assert!(headers["authorization"].starts_with(
        r#"hmac username="mx-key", algorithm="hmac-sha256", headers="content-type content-md5 content-length date request-line""#
    ));
    Ok(())
}

#[test]
fn test_unmapped_status_is_returned_raw() -> Result<()> {
    let transport = FakeTransport::new(404, r#"{"error": "not found"}"#);
    let client = client(transport.clone(), CredentialSource::pair("mx-key", "mx-secret"));

    let reply = client.call::<Message, _>("GetMessage", &GetMessage { id: 7 })?;
    assert!(!reply.is_typed());
    assert_eq!(reply.status(), StatusCode::NOT_FOUND);

    let resp = reply.raw().expect("must be raw");
    assert_eq!(resp.body(), &Bytes::from_static(br#"{"error": "not found"}"#));
    assert_eq!(transport.calls(), 1);
    Ok(())
}

#[test]
fn test_unknown_operation_never_reaches_transport() {
    let transport = FakeTransport::new(200, "{}");
    let client = client(transport.clone(), CredentialSource::Anonymous);

    let err = client
        .invoke::<Message, _>("NoSuchOp", &GetMessage { id: 1 }, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UsageInvalid);

    let err = client
        .invoke::<Message, _>("noSuchOpAsync", &GetMessage { id: 1 }, true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UsageInvalid);

    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_blocking_invoke_is_ready() -> Result<()> {
    let transport = FakeTransport::new(202, r#"{"id": 1, "body": "queued"}"#);
    let client = client(transport.clone(), CredentialSource::Anonymous);

    let invocation = client.invoke::<Message, _>("send", &serde_json::json!({"to": "a"}), false)?;
    assert!(!invocation.is_pending());
    assert_eq!(invocation.wait()?.status(), StatusCode::ACCEPTED);
    Ok(())
}

#[tokio::test]
async fn test_async_suffix_resolves_same_endpoint() -> Result<()> {
    let transport = FakeTransport::new(202, r#"{"id": 1, "body": "queued"}"#);
    let client = client(transport.clone(), CredentialSource::Anonymous);
    let payload = serde_json::json!({"to": "+61400000000", "body": "hi"});

    // The suffix forces a pending call even though a blocking one was asked for.
    let invocation = client.invoke::<Message, _>("sendAsync", &payload, false)?;
    let Invocation::Pending(call) = invocation else {
        panic!("an Async suffixed call must be pending");
    };
    assert_eq!(call.operation(), "Send");
    assert_eq!(transport.calls(), 0, "nothing is sent before polling");

    let reply = call.await?;
    assert_eq!(reply.typed().map(|m| m.body), Some("queued".to_string()));
    let (async_method, async_uri, _, _) = transport.last_request();

    let reply = client
        .invoke::<Message, _>("send", &payload, true)?
        .resolve()
        .await?;
    assert!(reply.is_typed());
    let (method, uri, _, _) = transport.last_request();

    assert_eq!(async_method, Method::POST);
    assert_eq!(async_uri, uri);
    assert_eq!(async_method, method);
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_blocking_call_inside_runtime_is_rejected() {
    let transport = FakeTransport::new(200, "{}");
    let client = client(transport.clone(), CredentialSource::Anonymous);

    let err = client
        .call::<Message, _>("getMessage", &GetMessage { id: 1 })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UsageInvalid);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_decode_failure_surfaces_on_await() -> Result<()> {
    let transport = FakeTransport::new(200, r#"{"id": "not a number"}"#);
    let client = client(transport.clone(), CredentialSource::Anonymous);

    let call = client.call_async::<Message, _>("getMessage", &GetMessage { id: 1 })?;
    let err = call.await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(transport.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_payload_sends_empty_body() -> Result<()> {
    let transport = FakeTransport::new(200, r#"{"id": 3, "body": "x"}"#);
    let client = client(transport.clone(), Credential::new("mx-key", "mx-secret"));

    client.call_async::<Message, _>("getMessage", &())?.await?;

    let (_, _, headers, body) = transport.last_request();
    assert!(body.is_empty());
    assert!(!headers.contains_key("content-type"));
    assert!(!headers.contains_key("content-md5"));
    assert!(!headers.contains_key("content-length"));
    assert!(headers["authorization"].contains(r#"headers="date request-line""#));
    Ok(())
}

#[derive(Debug)]
struct FailingProvider;

#[async_trait]
impl ProvideCredential for FailingProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Credential>> {
        Err(messagex::Error::credential_invalid("credential service unavailable"))
    }
}

#[tokio::test]
async fn test_credential_failure_stops_the_request() -> Result<()> {
    let transport = FakeTransport::new(200, "{}");
    let client = client(transport.clone(), CredentialSource::provider(FailingProvider));

    let err = client
        .call_async::<Message, _>("getMessage", &GetMessage { id: 1 })?
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert_eq!(transport.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_send_signs_raw_requests() -> Result<()> {
    let transport = FakeTransport::new(204, "");
    let client = client(transport.clone(), CredentialSource::pair("mx-key", "mx-secret"));

    let req = http::Request::builder()
        .method(Method::DELETE)
        .uri("https://api.example.com/v1/messages/9?force=true")
        .body(Bytes::new())?;
    let resp = client.send(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (method, uri, headers, _) = transport.last_request();
    assert_eq!(method, Method::DELETE);
    assert_eq!(uri, "https://api.example.com/v1/messages/9?force=true");
    assert!(headers["authorization"].starts_with(r#"hmac username="mx-key""#));
    Ok(())
}

#[tokio::test]
async fn test_encode_failure_surfaces_on_await() -> Result<()> {
    let transport = FakeTransport::new(202, r#"{"id": 1, "body": "queued"}"#);
    let client = client(transport.clone(), CredentialSource::Anonymous);

    // JSON object keys must be strings.
    let payload: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
    let call = client.call_async::<Message, _>("send", &payload)?;

    let err = call.await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(transport.calls(), 0);
    Ok(())
}
