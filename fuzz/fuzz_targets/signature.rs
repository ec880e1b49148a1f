//! Fuzz target for signature verification.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pushwatch_core::{Algorithm, SignatureVerifier, Verification, sign};

#[derive(Debug, Arbitrary)]
struct FuzzSignature {
    secret: String,
    payload: Vec<u8>,
    header: Option<String>,
    algorithm: u8,
}

fuzz_target!(|data: FuzzSignature| {
    let verifier = SignatureVerifier::new(Some(&data.secret));

    // Arbitrary header values must be rejected or accepted, never panic
    let _ = verifier.verify(&data.payload, data.header.as_deref());

    if data.secret.is_empty() {
        return;
    }

    let algorithm = match data.algorithm % 4 {
        0 => Algorithm::Sha1,
        1 => Algorithm::Sha256,
        2 => Algorithm::Sha384,
        _ => Algorithm::Sha512,
    };
    let signature = sign(&data.secret, &data.payload, algorithm);
    assert_eq!(
        verifier.verify(&data.payload, Some(&signature)),
        Ok(Verification::Verified(algorithm))
    );
});
