//! HMAC request signing for messagex services.
//!
//! The scheme signs an ordered set of fields: the body digest fields (only
//! when a body is present), the `date` and a synthetic `request-line`. The
//! resulting header looks like:
//!
//! ```text
//! Authorization: hmac username="<key>", algorithm="hmac-sha256", headers="<fields>", signature="<base64>"
//! ```

mod constants;
pub use constants::*;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod source;
pub use source::CredentialSource;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::{Algorithm, RequestSigner};
