//! Random secret generation and encoding.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rand::RngCore as _;

use sis_core::Error;

/// Generate a fresh one-time-code seed (20 random bytes, base64).
pub fn random_otp_seed() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Decode a stored one-time-code seed.
///
/// A seed that fails to decode is a corrupt identity document, not a
/// caller mistake.
pub fn decode_otp_seed(seed: &str) -> Result<Vec<u8>, Error> {
    STANDARD.decode(seed).map_err(Error::storage)
}

/// Generate a device bearer token (32 random bytes, URL-safe base64).
pub fn random_device_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate an ephemeral signing secret for when none is configured.
pub fn random_signing_secret() -> Vec<u8> {
    let mut bytes = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_decode_to_twenty_bytes() {
        let seed = random_otp_seed();
        assert_eq!(decode_otp_seed(&seed).unwrap().len(), 20);
    }

    #[test]
    fn seeds_and_tokens_are_unique() {
        assert_ne!(random_otp_seed(), random_otp_seed());
        assert_ne!(random_device_token(), random_device_token());
    }

    #[test]
    fn bad_seed_is_a_storage_error() {
        assert!(matches!(
            decode_otp_seed("!!not base64!!"),
            Err(Error::Storage(_))
        ));
    }
}
