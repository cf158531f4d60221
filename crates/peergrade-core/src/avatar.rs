//! Identicon avatar seeds and URLs.
//!
//! The image service is external; we only derive a stable seed per user and
//! build the URL that points at it.

use sha2::{Digest, Sha256};

/// Default identicon endpoint.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/identicon/svg";

/// Stable seed for a user: first 16 hex chars of `sha256(name:id)`.
pub fn avatar_seed(name: &str, user_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b":");
    hasher.update(user_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

/// `{base}?seed={seed}` with the seed percent-encoded.
pub fn avatar_url(base: &str, seed: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}seed={}", base.trim_end_matches('/'), sep, encode_component(seed))
}

// RFC 3986 unreserved characters pass through; everything else is %XX.
fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_stable_and_short() {
        let a = avatar_seed("Ana", "u-1");
        assert_eq!(a, avatar_seed("Ana", "u-1"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, avatar_seed("Ana", "u-2"));
    }

    #[test]
    fn test_url_encodes_seed() {
        assert_eq!(
            avatar_url("https://img.example/identicon", "José Díaz"),
            "https://img.example/identicon?seed=Jos%C3%A9%20D%C3%ADaz"
        );
        assert_eq!(
            avatar_url("https://img.example/identicon/", "a&b=c"),
            "https://img.example/identicon?seed=a%26b%3Dc"
        );
    }

    #[test]
    fn test_url_appends_to_existing_query() {
        assert_eq!(
            avatar_url("https://img.example/i?size=64", "abc"),
            "https://img.example/i?size=64&seed=abc"
        );
    }
}
