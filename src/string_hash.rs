//! Polynomial string hash used for directive verb lookup.
//!
//! The hash is a `const fn`, so a verb literal can be hashed at compile time
//! and compared against a token hashed at run time.

/// Multiplier applied to the running hash before each byte is added.
pub const HASH_MULTIPLIER: u32 = 101;

/// Hash `s` starting from `seed`: `h' = h * 101 + byte`, wrapping on overflow.
pub const fn string_hash_with_seed(s: &str, seed: u32) -> u32 {
    let bytes = s.as_bytes();
    let mut hash = seed;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_mul(HASH_MULTIPLIER).wrapping_add(bytes[i] as u32);
        i += 1;
    }
    hash
}

/// Hash `s` with the default seed of zero.
pub const fn string_hash(s: &str) -> u32 {
    string_hash_with_seed(s, 0)
}
