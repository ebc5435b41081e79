use sha2::{Digest, Sha256};

/// Deterministic SHA-256 fingerprint of a text body as 64 lowercase hex
/// characters. This is the identity key for original-content deduplication.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = content_hash("Our Q3 revenue grew 40%.");
        let b = content_hash("Our Q3 revenue grew 40%.");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_distinguishes_inputs() {
        assert_ne!(content_hash("alpha"), content_hash("beta"));
        // Whitespace is significant — identity is the exact text body.
        assert_ne!(content_hash("alpha"), content_hash("alpha "));
    }

    #[test]
    fn test_hash_shape() {
        let h = content_hash("anything");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            content_hash("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
