// src/mediator/codec.rs
// =============================================================================
// Opaque, reversible encoding of the target URL carried in `/go?u=...`.
//
// The token is base64 over the UTF-8 bytes of the URL with the URL-safe
// alphabet ('-' and '_' instead of '+' and '/') and no '=' padding, so it can
// sit in a query string without escaping.
//
// Decoding accepts padded and unpadded tokens; encoding never pads.
// =============================================================================

use crate::error::MediationError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes a target URL into a redirect token
pub fn encode(url: &str) -> String {
    TOKEN_ENGINE.encode(url.as_bytes())
}

/// Recovers the target URL from a redirect token
pub fn decode(token: &str) -> Result<String, MediationError> {
    let bytes = TOKEN_ENGINE.decode(token.trim())?;
    Ok(String::from_utf8(bytes)?)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a const engine?
//    - base64 engines are plain values; building one in a const means no
//      setup at runtime and one shared configuration for encode and decode
//
// 2. What does the ? do in decode()?
//    - DecodeError and FromUtf8Error both convert into MediationError through
//      the #[from] attributes in error.rs
// -----------------------------------------------------------------------------
