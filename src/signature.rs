use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check a `X-Hub-Signature-256` value (`sha256=<hex>`) against the raw request body.
///
/// The digest comparison is constant-time.
pub(crate) fn verify(secret: &[u8], body: &[u8], signature: &str) -> bool {
    // GitHub puts a prefix in front of its hex SHA256
    let Some(signature) = signature.strip_prefix("sha256=") else {
        tracing::debug!("signature is missing the sha256= prefix");
        return false;
    };
    let Ok(expected) = hex::decode(signature) else {
        tracing::debug!("signature is not valid hex");
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
