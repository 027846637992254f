use sha2::{Digest, Sha256};

/// Header carrying the body digest. Gateways that do not check it ignore it.
pub const CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";

/// Lowercase hex SHA-256 of the exact request body bytes.
pub fn content_sha256(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
