use sha2::{Digest, Sha256};

/// Hex SHA-256 of `text`.
///
/// For client-side fingerprinting (cache keys, dedup, change detection).
/// Not a password hash: there is no salt and no work factor.
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(digest)
}
