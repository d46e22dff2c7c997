//! Random identifiers handed to guests and organizers

use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// Symbols an event code is drawn from
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of an event code
pub const CODE_LENGTH: usize = 8;

/// Number of random bytes behind a session or owner token
const TOKEN_BYTES: usize = 32;

/// Draw an event code uniformly from [`CODE_ALPHABET`]
pub fn generate_event_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Mint a 256-bit bearer token, hex encoded (64 characters)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
