//! Deterministic test inputs.

#![allow(dead_code)]

/// Repeat a sentence until `len` bytes.
pub fn make_pattern(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while out.len() < len {
        out.extend_from_slice(pattern);
    }
    out.truncate(len);
    out
}

/// Pseudo-random bytes from a linear congruential generator.
pub fn make_random(len: usize, mut seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        out.push((seed >> 16) as u8);
    }
    out
}

/// Every byte value, `repeats` times over.
pub fn all_bytes(repeats: usize) -> Vec<u8> {
    (0..repeats).flat_map(|_| 0u8..=255).collect()
}
