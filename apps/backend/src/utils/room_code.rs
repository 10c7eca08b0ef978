//! Room code generation.
//!
//! Room codes are 4-character uppercase alphanumeric strings, short enough
//! to read out loud. Uniqueness among active rooms is enforced by the
//! registry's collision retry, not here.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of every room code.
pub const ROOM_CODE_LEN: usize = 4;

/// Generate a candidate room code.
///
/// Draws `ROOM_CODE_LEN` characters uniformly from the 36-character
/// uppercase alphanumeric alphabet. The caller supplies the RNG so tests
/// can pass a seeded generator.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(ROOM_CODE_LEN);
    for _ in 0..ROOM_CODE_LEN {
        let idx = rng.random_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }
    code
}

/// Normalize an inbound code for lookup: codes are case-insensitive.
pub fn normalize_room_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
