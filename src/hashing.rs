use metrohash::MetroHash64;
use std::hash::Hasher;

/// The mixing constant used to fold new values into a running hash
/// (the classic boost::hash_combine magic number).
const COMBINE_CONST: u64 = 0x9E3779B9;

/// Folds `v` into the running hash `h`.
pub fn combine(h: u64, v: u64) -> u64 {
    h ^ v
        .wrapping_add(COMBINE_CONST)
        .wrapping_add(h << 6)
        .wrapping_add(h >> 2)
}

pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = MetroHash64::new();
    hasher.write(bytes);
    hasher.finish()
}

pub fn hash_str(s: &str) -> u64 {
    hash_bytes(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_sensitive_to_order() {
        let a = combine(combine(0, 1), 2);
        let b = combine(combine(0, 2), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn combine_is_deterministic() {
        assert_eq!(combine(42, 7), combine(42, 7));
    }

    #[test]
    fn different_bytes_hash_differently() {
        assert_ne!(hash_bytes(b"abc"), hash_bytes(b"abd"));
    }
}
