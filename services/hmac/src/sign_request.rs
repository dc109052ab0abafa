//! HMAC request signer.
use std::fmt::Write;

use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::header::CONTENT_LENGTH;
use http::header::CONTENT_TYPE;
use http::header::DATE;
use http::HeaderName;
use http::HeaderValue;
use log::debug;
use messagex_core::hash::base64_hmac_sha1;
use messagex_core::hash::base64_hmac_sha256;
use messagex_core::hash::base64_hmac_sha512;
use messagex_core::hash::base64_md5;
use messagex_core::time::format_http_date;
use messagex_core::time::now;
use messagex_core::time::DateTime;
use messagex_core::Context;
use messagex_core::Error;
use messagex_core::Result;
use messagex_core::SignRequest;
use messagex_core::SigningRequest;

use super::constants::*;
use super::credential::Credential;

/// HMAC algorithm used to compute the signature.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// `hmac-sha1`
    HmacSha1,
    /// `hmac-sha256`, what the server expects unless told otherwise.
    #[default]
    HmacSha256,
    /// `hmac-sha512`
    HmacSha512,
}

impl Algorithm {
    /// Name carried in the `algorithm` parameter of the `Authorization` header.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Algorithm::HmacSha1 => "hmac-sha1",
            Algorithm::HmacSha256 => "hmac-sha256",
            Algorithm::HmacSha512 => "hmac-sha512",
        }
    }

    /// Base64 encoded HMAC of `content` keyed by `key`.
    pub fn sign(&self, key: &[u8], content: &[u8]) -> String {
        match self {
            Algorithm::HmacSha1 => base64_hmac_sha1(key, content),
            Algorithm::HmacSha256 => base64_hmac_sha256(key, content),
            Algorithm::HmacSha512 => base64_hmac_sha512(key, content),
        }
    }
}

/// RequestSigner that implements the messagex HMAC authorization.
///
/// Signing attaches `Authorization` and `Date`. When the body is not empty,
/// `Content-Type`, `Content-MD5` and `Content-Length` are attached and
/// signed as well; when it is empty, all three are stripped.
#[derive(Debug, Default)]
pub struct RequestSigner {
    algorithm: Algorithm,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a signer using [`Algorithm::HmacSha256`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the HMAC algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut http::request::Parts,
        body: &Bytes,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        // One timestamp for both the signed field and the emitted header.
        let now = self.time.unwrap_or_else(now);

        let mut req = SigningRequest::build(parts)?;

        let fields = signed_fields(&req, body, now)?;
        let string_to_sign = string_to_sign(&fields)?;
        let signature = self
            .algorithm
            .sign(cred.secret().as_bytes(), string_to_sign.as_bytes());

        let authorization = format!(
            r#"hmac username="{}", algorithm="{}", headers="{}", signature="{}""#,
            cred.access_key(),
            self.algorithm.as_str(),
            headers_list(&fields),
            signature
        );

        req.header_insert(AUTHORIZATION, {
            let mut value: HeaderValue = authorization.parse()?;
            value.set_sensitive(true);

            value
        });

        let content_md5 = HeaderName::from_static(CONTENT_MD5);
        for (name, value) in &fields {
            match *name {
                "date" => req.header_insert(DATE, value.parse()?),
                "content-type" => req.header_insert(CONTENT_TYPE, value.parse()?),
                CONTENT_MD5 => req.header_insert(content_md5.clone(), value.parse()?),
                "content-length" => req.header_insert(CONTENT_LENGTH, value.parse()?),
                _ => {}
            }
        }
        if body.is_empty() {
            req.header_remove(&CONTENT_TYPE);
            req.header_remove(&content_md5);
            req.header_remove(&CONTENT_LENGTH);
        }

        req.apply(parts)
    }
}

/// Collect the signed fields in the order the server verifies them.
///
/// ```text
/// content-type     (non-empty body only, first value)
/// content-md5      (non-empty body only)
/// content-length   (non-empty body only)
/// date
/// request-line
/// ```
fn signed_fields(
    req: &SigningRequest,
    body: &[u8],
    now: DateTime,
) -> Result<Vec<(&'static str, String)>> {
    let mut fields = Vec::with_capacity(5);

    if !body.is_empty() {
        fields.push((
            "content-type",
            req.header_first_or_default(&CONTENT_TYPE)?.to_string(),
        ));
        fields.push((CONTENT_MD5, base64_md5(body)));
        fields.push(("content-length", body.len().to_string()));
    }
    fields.push(("date", format_http_date(now)));
    fields.push((REQUEST_LINE, req.request_line()));

    Ok(fields)
}

/// Space joined field names, telling the server which fields were signed.
fn headers_list(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// content-type: application/json
/// content-md5: <base64 md5 of body>
/// content-length: <body length>
/// date: Mon, 15 Aug 2022 16:50:12 GMT
/// POST /v1/messages HTTP/1.1
/// ```
///
/// The request line is written without a name prefix.
fn string_to_sign(fields: &[(&'static str, String)]) -> Result<String> {
    let mut s = String::new();

    for (idx, (name, value)) in fields.iter().enumerate() {
        if idx != 0 {
            s.write_str("\n")?;
        }
        if *name == REQUEST_LINE {
            s.write_str(value)?;
        } else {
            write!(&mut s, "{}: {}", name.to_lowercase(), value)?;
        }
    }

    debug!("string to sign: {}", &s);
    Ok(s)
}
