//! Blocking and awaited calls sharing one client over the reqwest transport.
#![cfg(feature = "default-context")]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use http::{Method, StatusCode};
use messagex::{default_context, Client, CredentialSource, Descriptor, Endpoint, Result};
use serde_json::Value;

/// Keep-alive HTTP/1.1 server answering `{"ok":true}` to every request.
fn serve() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));

    let counter = requests.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let counter = counter.clone();
            thread::spawn(move || handle(stream, counter));
        }
    });

    (format!("http://{addr}"), requests)
}

fn handle(stream: TcpStream, counter: Arc<AtomicUsize>) {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);

    loop {
        let mut content_length = 0;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                return;
            }
            let header = line.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }

        let mut body = vec![0; content_length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }
        counter.fetch_add(1, Ordering::SeqCst);

        let payload = br#"{"ok":true}"#;
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
            payload.len()
        );
        if writer.write_all(head.as_bytes()).is_err() || writer.write_all(payload).is_err() {
            return;
        }
    }
}

fn client(host: &str) -> Client {
    let _ = env_logger::builder().is_test(true).try_init();

    let descriptor = Descriptor::new(host, "v1").with_endpoint(
        "Ping",
        Endpoint::new(Method::GET, "/ping").with_response(200, "Pong"),
    );
    Client::builder()
        .descriptor(descriptor)
        .credentials(CredentialSource::pair("mx-key", "mx-secret"))
        .context(default_context())
        .build()
        .expect("client must build")
}

#[test]
fn test_awaited_call_after_blocking_call() -> Result<()> {
    let (host, requests) = serve();
    let client = client(&host);

    let reply = client.call::<Value, _>("ping", &())?;
    assert_eq!(reply.status(), StatusCode::OK);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let call = client.call_async::<Value, _>("ping", &())?;
    let reply = rt
        .block_on(async { tokio::time::timeout(Duration::from_secs(5), call).await })
        .expect("awaited call must not hang after a blocking call")?;
    assert_eq!(reply.typed(), Some(serde_json::json!({"ok": true})));

    // And back to blocking once more on the same pooled connection.
    let reply = client.call::<Value, _>("ping", &())?;
    assert_eq!(reply.status(), StatusCode::OK);

    assert_eq!(requests.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn test_blocking_call_after_awaited_call() -> Result<()> {
    let (host, requests) = serve();
    let client = client(&host);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let call = client.call_async::<Value, _>("ping", &())?;
    let reply = rt
        .block_on(async { tokio::time::timeout(Duration::from_secs(5), call).await })
        .expect("awaited call must complete")?;
    assert_eq!(reply.status(), StatusCode::OK);

    let reply = client.call::<Value, _>("ping", &())?;
    assert_eq!(reply.status(), StatusCode::OK);

    assert_eq!(requests.load(Ordering::SeqCst), 2);
    Ok(())
}
