//! Domain-separated hashing into the BLS12-381 groups.
//!
//! Every hash used by the crate takes an explicit domain label so that an
//! accumulator element can never collide with an accumulator secret key, an
//! ABE attribute point or a payload key derived from the same bytes.

use super::pairing::{G1Projective, GT_BYTES, Gt, Scalar, gt_to_bytes};
use bls12_381_plus::elliptic_curve::hash2curve::ExpandMsgXmd;
use zeroize::Zeroizing;

/// Domain for accumulator elements derived from client identifiers.
pub const DOMAIN_ELEMENT: &str = "clearance-core v1 accumulator element";

/// Domain for accumulator secret keys derived from seeds.
pub const DOMAIN_ACCUMULATOR_KEY: &str = "clearance-core v1 accumulator secret key";

/// Domain for symmetric payload keys derived from Gt session elements.
pub const DOMAIN_SESSION_KEY: &str = "clearance-core v1 abe session key";

/// Hash-to-curve DST for attribute points (single-authority scheme).
pub const DST_ATTRIBUTE: &[u8] = b"CLEARANCE-V01-CS01-with-BLS12381G1_XMD:SHA3-256_SSWU_RO_ATTR_";

/// Hash-to-curve DST for global identifiers (multi-authority scheme).
pub const DST_GLOBAL_ID: &[u8] = b"CLEARANCE-V01-CS01-with-BLS12381G1_XMD:SHA3-256_SSWU_RO_GID_";

/// Hash arbitrary bytes to a scalar.
///
/// BLAKE3 in key-derivation mode provides the domain separation; 64 bytes of
/// XOF output are reduced modulo the group order.
pub fn hash_to_scalar(domain: &str, data: &[u8]) -> Scalar {
    let mut hasher = blake3::Hasher::new_derive_key(domain);
    hasher.update(data);
    let mut wide = Zeroizing::new([0u8; 64]);
    hasher.finalize_xof().fill(&mut wide[..]);
    Scalar::from_bytes_wide(&wide)
}

/// Hash arbitrary bytes to a G1 point (random oracle).
pub fn hash_to_g1(dst: &[u8], data: &[u8]) -> G1Projective {
    G1Projective::hash::<ExpandMsgXmd<sha3::Sha3_256>>(data, dst)
}

/// Derive the 32 byte payload key from a Gt session element.
pub fn derive_session_key(session: &Gt) -> Zeroizing<[u8; 32]> {
    let bytes: Zeroizing<[u8; GT_BYTES]> = Zeroizing::new(gt_to_bytes(session));
    Zeroizing::new(blake3::derive_key(DOMAIN_SESSION_KEY, &bytes[..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_scalar_is_deterministic() {
        let a = hash_to_scalar(DOMAIN_ELEMENT, b"alskjdfhiuaf");
        let b = hash_to_scalar(DOMAIN_ELEMENT, b"alskjdfhiuaf");
        assert_eq!(a, b);
    }

    #[test]
    fn test_domains_are_separated() {
        let element = hash_to_scalar(DOMAIN_ELEMENT, b"seed");
        let key = hash_to_scalar(DOMAIN_ACCUMULATOR_KEY, b"seed");
        assert_ne!(element, key);

        assert_ne!(hash_to_g1(DST_ATTRIBUTE, b"level:1"), hash_to_g1(DST_GLOBAL_ID, b"level:1"));
    }
}
