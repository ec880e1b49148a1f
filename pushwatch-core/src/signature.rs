//! Webhook signature generation and verification
//!
//! Signatures use the GitHub `X-Hub-Signature` shape: `algorithm=hexdigest`,
//! an HMAC of the raw request body keyed with the shared secret.

use crate::{CheckError, Result};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Supported HMAC digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// HMAC-SHA1 (`X-Hub-Signature`)
    #[default]
    Sha1,

    /// HMAC-SHA256 (`X-Hub-Signature-256`)
    Sha256,

    Sha384,

    Sha512,
}

impl Algorithm {
    /// Name used in the signature prefix
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Keyed hash of `data`, hex-encoded in lowercase
    pub fn hmac_hex(&self, key: &[u8], data: &[u8]) -> String {
        match self {
            Self::Sha1 => compute::<HmacSha1>(key, data),
            Self::Sha256 => compute::<HmacSha256>(key, data),
            Self::Sha384 => compute::<HmacSha384>(key, data),
            Self::Sha512 => compute::<HmacSha512>(key, data),
        }
    }
}

impl FromStr for Algorithm {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(CheckError::SignatureAlgorithmUnsupported(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn compute<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> String {
    // HMAC accepts keys of any length, so this never takes the error branch
    let mut mac = match <M as hmac::digest::KeyInit>::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

/// Outcome of a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// No secret is configured, so the signature was not checked
    Skipped,

    /// The signature matched
    Verified(Algorithm),
}

/// Verifies `algorithm=hexdigest` signatures against a shared secret
///
/// A verifier without a secret accepts every request. This is the
/// documented opt-out for repositories that do not sign their webhooks;
/// callers can tell it happened from [`Verification::Skipped`].
#[derive(Clone, Default)]
pub struct SignatureVerifier {
    secret: Option<String>,
}

impl SignatureVerifier {
    /// Create a verifier; an empty secret disables verification
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    /// Whether a secret is configured
    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify `signature` over the raw `payload` bytes
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<Verification> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(Verification::Skipped);
        };

        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(CheckError::SignatureMissing)?;

        let (algorithm, expected) = signature.split_once('=').unwrap_or((signature, ""));
        let algorithm: Algorithm = algorithm.parse()?;

        let computed = algorithm.hmac_hex(secret.as_bytes(), payload);
        if !constant_time_compare(expected, &computed) {
            return Err(CheckError::SignatureMismatch);
        }

        Ok(Verification::Verified(algorithm))
    }

    /// Produce the header value for `payload`, or `None` without a secret
    pub fn sign(&self, payload: &[u8], algorithm: Algorithm) -> Option<String> {
        self.secret
            .as_deref()
            .map(|secret| sign(secret, payload, algorithm))
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Compute an `algorithm=hexdigest` header value
pub fn sign(secret: &str, payload: &[u8], algorithm: Algorithm) -> String {
    format!(
        "{}={}",
        algorithm.name(),
        algorithm.hmac_hex(secret.as_bytes(), payload)
    )
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Header names carrying push signatures
pub mod headers {
    /// SHA1 signature header
    pub const SIGNATURE: &str = "X-Hub-Signature";

    /// SHA256 signature header
    pub const SIGNATURE_256: &str = "X-Hub-Signature-256";
}

/// Pick the signature out of request headers, preferring SHA256
///
/// Header names are matched case-insensitively.
pub fn signature_from_headers(headers: &HashMap<String, String>) -> Option<&str> {
    let find = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    };
    find(headers::SIGNATURE_256).or_else(|| find(headers::SIGNATURE))
}

#[cfg(test)]
mod tests {
    use super::*;

    // HMAC-SHA1("key", "The quick brown fox jumps over the lazy dog")
    const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";
    const FOX_SHA1: &str = "de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9";
    const FOX_SHA256: &str = "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8";

    #[test]
    fn test_known_digests() {
        assert_eq!(Algorithm::Sha1.hmac_hex(b"key", FOX), FOX_SHA1);
        assert_eq!(Algorithm::Sha256.hmac_hex(b"key", FOX), FOX_SHA256);
    }

    #[test]
    fn test_verify_sha1() {
        let verifier = SignatureVerifier::new(Some("key"));
        let signature = format!("sha1={}", FOX_SHA1);

        let result = verifier.verify(FOX, Some(&signature));
        assert_eq!(result, Ok(Verification::Verified(Algorithm::Sha1)));
    }

    #[test]
    fn test_verify_sha256() {
        let verifier = SignatureVerifier::new(Some("key"));
        let signature = format!("sha256={}", FOX_SHA256);

        assert!(verifier.verify(FOX, Some(&signature)).is_ok());
    }

    #[test]
    fn test_sign_and_verify_all_algorithms() {
        let verifier = SignatureVerifier::new(Some("test-secret"));
        let payload = br#"{"repository":{"full_name":"acme/app"}}"#;

        for algorithm in [
            Algorithm::Sha1,
            Algorithm::Sha256,
            Algorithm::Sha384,
            Algorithm::Sha512,
        ] {
            let signature = verifier.sign(payload, algorithm).unwrap();
            assert!(signature.starts_with(algorithm.name()));
            assert_eq!(
                verifier.verify(payload, Some(&signature)),
                Ok(Verification::Verified(algorithm))
            );
        }
    }

    #[test]
    fn test_flipped_digit_fails() {
        let verifier = SignatureVerifier::new(Some("key"));

        for i in 0..FOX_SHA1.len() {
            let mut digest: Vec<u8> = FOX_SHA1.bytes().collect();
            digest[i] = if digest[i] == b'0' { b'1' } else { b'0' };
            let signature = format!("sha1={}", String::from_utf8(digest).unwrap());

            assert_eq!(
                verifier.verify(FOX, Some(&signature)),
                Err(CheckError::SignatureMismatch)
            );
        }
    }

    #[test]
    fn test_wrong_secret() {
        let signature = sign("secret1", b"payload", Algorithm::Sha256);
        let verifier = SignatureVerifier::new(Some("secret2"));

        assert_eq!(
            verifier.verify(b"payload", Some(&signature)),
            Err(CheckError::SignatureMismatch)
        );
    }

    #[test]
    fn test_no_secret_skips() {
        let verifier = SignatureVerifier::new(None);
        assert!(!verifier.is_enabled());
        assert_eq!(verifier.verify(b"anything", None), Ok(Verification::Skipped));
        assert_eq!(
            verifier.verify(b"anything", Some("sha1=bogus")),
            Ok(Verification::Skipped)
        );
        assert_eq!(verifier.sign(b"anything", Algorithm::Sha1), None);

        assert!(!SignatureVerifier::new(Some("")).is_enabled());
    }

    #[test]
    fn test_missing_signature() {
        let verifier = SignatureVerifier::new(Some("key"));
        assert_eq!(verifier.verify(FOX, None), Err(CheckError::SignatureMissing));
        assert_eq!(verifier.verify(FOX, Some("  ")), Err(CheckError::SignatureMissing));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let verifier = SignatureVerifier::new(Some("key"));
        assert_eq!(
            verifier.verify(FOX, Some("md4=abcd")),
            Err(CheckError::SignatureAlgorithmUnsupported("md4".to_string()))
        );
        assert_eq!(
            verifier.verify(FOX, Some("garbage")),
            Err(CheckError::SignatureAlgorithmUnsupported("garbage".to_string()))
        );
    }

    #[test]
    fn test_empty_digest_is_mismatch() {
        let verifier = SignatureVerifier::new(Some("key"));
        assert_eq!(
            verifier.verify(FOX, Some("sha1=")),
            Err(CheckError::SignatureMismatch)
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let verifier = SignatureVerifier::new(Some("hunter2"));
        assert!(!format!("{:?}", verifier).contains("hunter2"));
    }

    #[test]
    fn test_signature_from_headers() {
        let mut headers = HashMap::new();
        headers.insert("x-hub-signature".to_string(), "sha1=aa".to_string());
        assert_eq!(signature_from_headers(&headers), Some("sha1=aa"));

        headers.insert("X-Hub-Signature-256".to_string(), "sha256=bb".to_string());
        assert_eq!(signature_from_headers(&headers), Some("sha256=bb"));

        assert_eq!(signature_from_headers(&HashMap::new()), None);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
        assert!(!constant_time_compare("", "a"));
    }
}
