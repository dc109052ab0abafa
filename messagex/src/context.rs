use messagex_core::{Context, OsEnv};
use messagex_http_send_reqwest::ReqwestHttpSend;

/// Context sending requests with a default `reqwest` client and reading the
/// process environment.
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
