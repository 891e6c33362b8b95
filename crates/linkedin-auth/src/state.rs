//! CSRF state for the authorization request
//!
//! The state is an opaque random value sent in the login URL and echoed
//! back by LinkedIn in the callback. It is kept in the caller's session
//! and compared in constant time.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use subtle::ConstantTimeEq;

/// Random bytes per state value (43 base64url characters).
pub const STATE_BYTES: usize = 32;

/// Generate an unguessable state value.
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Exact, constant-time comparison of the stored and returned state.
///
/// Length differences are not hidden; the length of a state value is public.
pub fn verify_state(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
