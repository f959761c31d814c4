//! BLS12-381 group helpers.
//!
//! Thin layer over `bls12_381_plus` used by both the accumulator and the ABE
//! schemes: the pairing itself, uniform scalar sampling, and fixed-size
//! encodings of scalars, G1/G2 points and Gt elements that never panic on
//! malformed input.

use super::CryptoError;
use bls12_381_plus::group::Curve;
use cosmian_crypto_core::{
    CryptoCoreError,
    bytes_ser_de::{Deserializer, Serializer},
    reexport::rand_core::CryptoRngCore,
};

pub use bls12_381_plus::{G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar};

/// Size of a big-endian encoded scalar.
pub const SCALAR_BYTES: usize = 32;

/// Size of a compressed G1 point.
pub const G1_BYTES: usize = G1Affine::COMPRESSED_BYTES;

/// Size of a compressed G2 point.
pub const G2_BYTES: usize = G2Affine::COMPRESSED_BYTES;

/// Size of an encoded target group element.
pub const GT_BYTES: usize = 576;

/// Compute the bilinear pairing `e(a, b)`.
pub fn pairing(a: &G1Projective, b: &G2Projective) -> Gt {
    bls12_381_plus::pairing(&a.to_affine(), &b.to_affine())
}

/// Sample a uniformly random scalar.
///
/// 64 random bytes are reduced modulo the group order, which keeps the bias
/// negligible and avoids depending on the `ff` rng bounds.
pub fn random_scalar(rng: &mut impl CryptoRngCore) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_wide(&bytes)
}

/// Map a signed small integer (MSP matrix entry) into the scalar field.
pub fn scalar_from_i64(value: i64) -> Scalar {
    let magnitude = Scalar::from(value.unsigned_abs());
    if value < 0 { -magnitude } else { magnitude }
}

pub fn scalar_to_bytes(scalar: &Scalar) -> [u8; SCALAR_BYTES] {
    scalar.to_be_bytes()
}

pub fn scalar_from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Result<Scalar, CryptoError> {
    Option::<Scalar>::from(Scalar::from_be_bytes(bytes))
        .ok_or_else(|| CryptoError::InvalidScalar("value exceeds the group order".to_string()))
}

pub fn g1_to_bytes(point: &G1Projective) -> [u8; G1_BYTES] {
    point.to_affine().to_compressed()
}

pub fn g1_from_bytes(bytes: &[u8; G1_BYTES]) -> Result<G1Projective, CryptoError> {
    Option::<G1Affine>::from(G1Affine::from_compressed(bytes))
        .map(G1Projective::from)
        .ok_or(CryptoError::InvalidG1Point)
}

pub fn g2_to_bytes(point: &G2Projective) -> [u8; G2_BYTES] {
    point.to_affine().to_compressed()
}

pub fn g2_from_bytes(bytes: &[u8; G2_BYTES]) -> Result<G2Projective, CryptoError> {
    Option::<G2Affine>::from(G2Affine::from_compressed(bytes))
        .map(G2Projective::from)
        .ok_or(CryptoError::InvalidG2Point)
}

pub fn gt_to_bytes(element: &Gt) -> [u8; GT_BYTES] {
    element.to_bytes()
}

pub fn gt_from_bytes(bytes: &[u8; GT_BYTES]) -> Result<Gt, CryptoError> {
    Option::<Gt>::from(Gt::from_bytes(bytes)).ok_or(CryptoError::InvalidGtElement)
}

// Serializer plumbing shared by every binary encoding in the crate.

pub fn write_scalar(ser: &mut Serializer, scalar: &Scalar) -> Result<usize, CryptoCoreError> {
    let bytes = zeroize::Zeroizing::new(scalar_to_bytes(scalar));
    ser.write_array(&bytes[..])
}

pub fn read_scalar(de: &mut Deserializer) -> Result<Scalar, CryptoError> {
    let bytes = zeroize::Zeroizing::new(de.read_array::<SCALAR_BYTES>()?);
    scalar_from_bytes(&bytes)
}

pub fn write_g1(ser: &mut Serializer, point: &G1Projective) -> Result<usize, CryptoCoreError> {
    ser.write_array(&g1_to_bytes(point))
}

pub fn read_g1(de: &mut Deserializer) -> Result<G1Projective, CryptoError> {
    g1_from_bytes(&de.read_array::<G1_BYTES>()?)
}

pub fn write_g2(ser: &mut Serializer, point: &G2Projective) -> Result<usize, CryptoCoreError> {
    ser.write_array(&g2_to_bytes(point))
}

pub fn read_g2(de: &mut Deserializer) -> Result<G2Projective, CryptoError> {
    g2_from_bytes(&de.read_array::<G2_BYTES>()?)
}

pub fn write_gt(ser: &mut Serializer, element: &Gt) -> Result<usize, CryptoCoreError> {
    ser.write_array(&gt_to_bytes(element))
}

pub fn read_gt(de: &mut Deserializer) -> Result<Gt, CryptoError> {
    gt_from_bytes(&de.read_array::<GT_BYTES>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381_plus::elliptic_curve::ops::MulByGenerator;
    use cosmian_crypto_core::{CsRng, reexport::rand_core::SeedableRng};

    #[test]
    fn test_pairing_bilinearity() {
        let mut rng = CsRng::from_entropy();
        let a = random_scalar(&mut rng);
        let b = random_scalar(&mut rng);

        let lhs = pairing(&G1Projective::mul_by_generator(&a), &G2Projective::mul_by_generator(&b));
        let rhs = pairing(&G1Projective::mul_by_generator(&(a * b)), &G2Projective::GENERATOR);

        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_signed_scalars() {
        assert_eq!(scalar_from_i64(-1) + Scalar::ONE, Scalar::ZERO);
        assert_eq!(scalar_from_i64(0), Scalar::ZERO);
        assert_eq!(scalar_from_i64(3), Scalar::from(3u64));
    }

    #[test]
    fn test_point_encodings() {
        let mut rng = CsRng::from_entropy();
        let s = random_scalar(&mut rng);

        let p1 = G1Projective::mul_by_generator(&s);
        assert_eq!(g1_from_bytes(&g1_to_bytes(&p1)).unwrap(), p1);

        let p2 = G2Projective::mul_by_generator(&s);
        assert_eq!(g2_from_bytes(&g2_to_bytes(&p2)).unwrap(), p2);

        let gt = pairing(&p1, &G2Projective::GENERATOR);
        assert_eq!(gt_from_bytes(&gt_to_bytes(&gt)).unwrap(), gt);

        assert_eq!(scalar_from_bytes(&scalar_to_bytes(&s)).unwrap(), s);
    }

    #[test]
    fn test_invalid_bytes() {
        assert_eq!(g1_from_bytes(&[0u8; G1_BYTES]), Err(CryptoError::InvalidG1Point));
        assert!(scalar_from_bytes(&[0xff; SCALAR_BYTES]).is_err());
    }
}
