//! Request key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// The method is upper-cased so `get` and `GET` share an entry.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_request_key("GET", "http://localhost:8080/index.html");
        let hash2 = compute_request_key("GET", "http://localhost:8080/index.html");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_method_case() {
        let lower = compute_request_key("get", "http://localhost:8080/");
        let upper = compute_request_key("GET", "http://localhost:8080/");
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_hash_different_url() {
        let root = compute_request_key("GET", "http://localhost:8080/");
        let index = compute_request_key("GET", "http://localhost:8080/index.html");
        assert_ne!(root, index);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_request_key("GET", "http://localhost:8080/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
