//! Request signatures expected by the Z.ai API.
//!
//! Two schemes coexist and are chosen by call site:
//!
//! - **Legacy** (`X-Timestamp` / `X-Nonce` / `X-Signature`): a single
//!   HMAC-SHA256 over method, timestamp, nonce and body, keyed by a token.
//!   Only the anonymous auth endpoint still uses it.
//! - **Current**: a double HMAC. The first pass derives an intermediate key
//!   from a fixed secret and the 5-minute bucket of the timestamp; the second
//!   signs the request descriptor, the prompt text and the timestamp with it.

use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Shared secret behind the time-bucketed intermediate key.
pub const CHAT_SIGNING_SECRET: &str = "junjie";

/// Width of one intermediate-key bucket in milliseconds.
pub const BUCKET_MS: i64 = 5 * 60 * 1000;

/// Hex length of the legacy nonce.
const NONCE_HEX_LEN: usize = 16;

/// Signature produced by the current scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
    pub signature: String,
    pub timestamp: i64,
}

/// Legacy signature headers, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySignature {
    pub timestamp: String,
    pub nonce: String,
    pub signature: String,
}

impl LegacySignature {
    /// Header name/value pairs to attach to a request.
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            ("X-Timestamp", self.timestamp.as_str()),
            ("X-Nonce", self.nonce.as_str()),
            ("X-Signature", self.signature.as_str()),
        ]
    }
}

fn hmac_hex(key: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Compute legacy signature headers with the current time and a random nonce.
pub fn legacy_signature_headers(token: &str, body: &str, method: &str) -> LegacySignature {
    let mut nonce_bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    legacy_signature_headers_at(token, body, method, now_ms(), nonce_bytes)
}

/// Compute legacy signature headers for an explicit timestamp and nonce.
pub fn legacy_signature_headers_at(
    token: &str,
    body: &str,
    method: &str,
    timestamp_ms: i64,
    nonce_bytes: [u8; 8],
) -> LegacySignature {
    let timestamp = timestamp_ms.to_string();
    // 8 bytes already encode to 16 hex chars; the cut is kept for wire parity.
    let mut nonce = hex::encode(nonce_bytes);
    nonce.truncate(NONCE_HEX_LEN);

    let sign_string = format!("{method}\n{timestamp}\n{nonce}\n{body}");
    let signature = hmac_hex(token.as_bytes(), sign_string.as_bytes());

    LegacySignature {
        timestamp,
        nonce,
        signature,
    }
}

/// Intermediate key for the bucket containing `timestamp_ms`.
pub fn intermediate_key(timestamp_ms: i64) -> String {
    let bucket = timestamp_ms.div_euclid(BUCKET_MS);
    hmac_hex(CHAT_SIGNING_SECRET.as_bytes(), bucket.to_string().as_bytes())
}

/// Sign a chat request with the current scheme at the current time.
pub fn generate_chat_signature(e: &str, t: &str) -> SignaturePayload {
    generate_chat_signature_at(e, t, now_ms())
}

/// Sign a chat request with the current scheme at an explicit time.
pub fn generate_chat_signature_at(e: &str, t: &str, timestamp_ms: i64) -> SignaturePayload {
    let key = intermediate_key(timestamp_ms);
    let message = format!("{e}|{t}|{timestamp_ms}");
    SignaturePayload {
        signature: hmac_hex(key.as_bytes(), message.as_bytes()),
        timestamp: timestamp_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn hmac_matches_rfc4231_case_2() {
        let mac = hmac_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            mac,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn legacy_headers_have_expected_shape() {
        let sig = legacy_signature_headers("secret", "", "GET");
        assert_eq!(sig.nonce.len(), 16);
        assert_eq!(sig.signature.len(), 64);
        assert!(is_lower_hex(&sig.nonce));
        assert!(is_lower_hex(&sig.signature));
        assert!(sig.timestamp.parse::<i64>().is_ok());
    }

    #[test]
    fn legacy_headers_differ_between_calls() {
        let a = legacy_signature_headers("secret", "", "GET");
        let b = legacy_signature_headers("secret", "", "GET");
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn legacy_signature_covers_method_timestamp_nonce_and_body() {
        let nonce = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01, 0x02, 0x03];
        let sig = legacy_signature_headers_at("anonymous", "", "GET", 1_700_000_000_000, nonce);

        assert_eq!(sig.timestamp, "1700000000000");
        assert_eq!(sig.nonce, "deadbeef00010203");
        let expected = hmac_hex(b"anonymous", b"GET\n1700000000000\ndeadbeef00010203\n");
        assert_eq!(sig.signature, expected);

        let post = legacy_signature_headers_at("anonymous", "", "POST", 1_700_000_000_000, nonce);
        assert_ne!(post.signature, sig.signature);
    }

    #[test]
    fn legacy_header_pairs_use_wire_names() {
        let sig = legacy_signature_headers_at("k", "{}", "POST", 1, [0; 8]);
        let names: Vec<_> = sig.headers().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["X-Timestamp", "X-Nonce", "X-Signature"]);
    }

    #[test]
    fn chat_signature_is_deterministic_for_same_millisecond() {
        let a = generate_chat_signature_at("requestId,1", "hello", 1_700_000_123_456);
        let b = generate_chat_signature_at("requestId,1", "hello", 1_700_000_123_456);
        assert_eq!(a, b);
        assert_eq!(a.timestamp, 1_700_000_123_456);
        assert_eq!(a.signature.len(), 64);
    }

    #[test]
    fn intermediate_key_is_stable_within_bucket() {
        let start = 1_700_000_100_000 - 1_700_000_100_000 % BUCKET_MS;
        assert_eq!(intermediate_key(start), intermediate_key(start + BUCKET_MS - 1));
        assert_ne!(intermediate_key(start), intermediate_key(start + BUCKET_MS));
    }

    #[test]
    fn intermediate_key_signs_bucket_index() {
        let ts = 900_001;
        assert_eq!(intermediate_key(ts), hmac_hex(CHAT_SIGNING_SECRET.as_bytes(), b"3"));
    }

    #[test]
    fn chat_signature_depends_on_timestamp_and_text() {
        let base = generate_chat_signature_at("e", "t", 1_000_000);
        assert_ne!(base, generate_chat_signature_at("e", "t", 1_000_001));
        assert_ne!(
            base.signature,
            generate_chat_signature_at("e", "other", 1_000_000).signature
        );
    }

    #[test]
    fn chat_signature_uses_current_clock() {
        let before = chrono::Utc::now().timestamp_millis();
        let sig = generate_chat_signature("e", "t");
        let after = chrono::Utc::now().timestamp_millis();
        assert!(sig.timestamp >= before && sig.timestamp <= after);
    }
}
