//! Random token generation

use rand::{rngs::OsRng, Rng};

/// Symbols a generated token may contain.
pub const RANDOM_SOURCE: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_+";

/// Returns `n` characters drawn uniformly from [`RANDOM_SOURCE`] using the OS CSPRNG.
pub fn random_string(n: usize) -> String {
    let mut rng = OsRng;

    (0..n)
        .map(|_| RANDOM_SOURCE[rng.gen_range(0..RANDOM_SOURCE.len())] as char)
        .collect()
}
