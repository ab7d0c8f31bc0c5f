//! Random identifier generation for stored objects

use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes per identifier; hex-encoded to twice as many
/// characters. Collisions are treated as astronomically unlikely for a
/// self-hosted deployment and are not checked against existing names: a
/// colliding upload silently overwrites.
const ID_BYTES: usize = 4;

/// Generate a short opaque identifier: lowercase hex from OS randomness.
pub fn generate() -> String {
    let mut bytes = [0u8; ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_shape() {
        let id = generate();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_identifiers_are_distinct() {
        // Not a uniqueness proof, just a sanity check that the source is
        // actually random.
        let ids: std::collections::HashSet<String> = (0..64).map(|_| generate()).collect();
        assert_eq!(ids.len(), 64);
    }
}
