//! Payload digests.
//!
//! The wire checksum is the first four bytes of a double SHA-256 over the
//! payload, read as a little-endian `u32`.

use sha2::{Digest, Sha256};

/// SHA-256 applied twice
pub fn hash256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Checksum stored in bytes 20..24 of a header
pub fn checksum(data: &[u8]) -> u32 {
    let digest = hash256(data);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_checksum() {
        // Well-known value carried by every empty-payload message (verack, getaddr)
        assert_eq!(checksum(&[]), 0xe2e0_f65d);
        assert_eq!(&hash256(&[])[..4], &[0x5d, 0xf6, 0xe0, 0xe2]);
    }

    #[test]
    fn test_checksum_differs_on_single_bit() {
        let a = checksum(b"hello");
        let b = checksum(b"hellp");
        assert_ne!(a, b);
    }
}
