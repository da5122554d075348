//! Session bootstrap helpers: login URL and token-exchange checksum.

use sha2::{Digest, Sha256};

/// URL the user opens to authorize the app and obtain a request token.
pub fn login_url(api_key: &str) -> String {
    format!("https://kite.trade/connect/login?v=3&api_key={api_key}")
}

/// Checksum for the session-token exchange.
///
/// SHA-256 over api_key + request_token + api_secret, hex-encoded.
pub fn session_checksum(api_key: &str, request_token: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(request_token.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_checksum() {
        let sum = session_checksum("kitefront", "AbC123req", "topsecret");
        assert_eq!(
            sum,
            "14201613b926b23f82f32b6532f12f8f86326393d07bdefc9818d92200a23228"
        );
    }

    #[test]
    fn login_url_carries_api_key() {
        let url = login_url("myapikey");
        assert_eq!(url, "https://kite.trade/connect/login?v=3&api_key=myapikey");
    }
}
