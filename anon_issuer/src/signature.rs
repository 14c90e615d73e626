//! HMAC request signatures shared between services
//!
//! A signed request carries a `signature` header of the form
//! `sha256=<hex digest>`, where the digest is the HMAC-SHA256 of the raw
//! request body keyed with the receiving service's [`SecureKey`][crate::SecureKey].

use ring::hmac;
use thiserror::Error;

use crate::SecureKeyRef;

/// Name of the header carrying the signature
pub const SIGNATURE_HEADER: &str = "signature";

const SCHEME: &str = "sha256=";

/// A request signature could not be verified
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No signature was attached to the request
    #[error("request signature is missing")]
    Missing,
    /// The signature does not use the `sha256=` scheme
    #[error("unsupported signature scheme")]
    UnsupportedScheme,
    /// The signature is not a hex string
    #[error("request signature is not valid hex")]
    Encoding,
    /// The signature does not match the body
    #[error("request signature does not match")]
    Mismatch,
}

fn key(secret: &SecureKeyRef) -> hmac::Key {
    hmac::Key::new(hmac::HMAC_SHA256, secret.as_str().as_bytes())
}

/// Produces the `signature` header value for `body`
pub fn sign(secret: &SecureKeyRef, body: &[u8]) -> String {
    let tag = hmac::sign(&key(secret), body);
    format!("{SCHEME}{}", hex::encode(tag.as_ref()))
}

/// Checks a `signature` header value against `body`
///
/// The comparison runs in constant time.
pub fn verify(secret: &SecureKeyRef, body: &[u8], signature: &str) -> Result<(), SignatureError> {
    let digest = signature
        .trim()
        .strip_prefix(SCHEME)
        .ok_or(SignatureError::UnsupportedScheme)?;
    let digest = hex::decode(digest).map_err(|_| SignatureError::Encoding)?;

    hmac::verify(&key(secret), body, &digest).map_err(|_| SignatureError::Mismatch)
}
