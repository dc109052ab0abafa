// Env values used by the messagex services.
/// Env name for the access key.
pub const MESSAGEX_ACCESS_KEY: &str = "MESSAGEX_ACCESS_KEY";
/// Env name for the secret key.
pub const MESSAGEX_SECRET_KEY: &str = "MESSAGEX_SECRET_KEY";

// Headers used in the hmac scheme.
pub(crate) const CONTENT_MD5: &str = "content-md5";

// Synthetic signed field holding the raw request line.
pub(crate) const REQUEST_LINE: &str = "request-line";
