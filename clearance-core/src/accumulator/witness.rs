use super::{Accumulator, Element, Error, PublicKey, SecretKey, value::trapdoor_inverse};
use crate::crypto::{
    G1Projective, G2Projective, Scalar,
    pairing::{G1_BYTES, SCALAR_BYTES, pairing, read_g1, read_scalar, write_g1, write_scalar},
};
use bls12_381_plus::{elliptic_curve::ops::MulByGenerator, ff::Field};

/// Proof that an element is accumulated in a given accumulator value.
///
/// Holds the element `y` and the point `C` such that `(y + sk)·C = V`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MembershipWitness {
    pub(crate) element: Element,
    pub(crate) c: G1Projective,
}

impl MembershipWitness {
    /// Issue a witness for `element` against the current value `acc`.
    ///
    /// Only the accumulator manager can do this: `C = (y + sk)^-1·V`.
    pub fn new(element: &Element, acc: &Accumulator, sk: &SecretKey) -> Result<Self, Error> {
        Ok(Self { element: *element, c: acc.0 * trapdoor_inverse(sk, element)? })
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Check `e(C, y·P̃ + Q̃) == e(V, P̃)`.
    #[must_use]
    pub fn verify(&self, pk: &PublicKey, acc: &Accumulator) -> bool {
        let shifted = G2Projective::mul_by_generator(&self.element.0) + pk.0;
        pairing(&self.c, &shifted) == pairing(&acc.0, &G2Projective::GENERATOR)
    }

    /// Bring the witness forward after `added` joined the set.
    ///
    /// `old` is the accumulator value before the addition:
    /// `C' = (y' - y)·C + V_old`.
    pub fn update_on_add(&self, added: &Element, old: &Accumulator) -> Result<Self, Error> {
        let delta = self.delta(added)?;
        Ok(Self { element: self.element, c: self.c * delta + old.0 })
    }

    /// Bring the witness forward after `removed` left the set.
    ///
    /// `new` is the accumulator value after the removal:
    /// `C' = (y' - y)^-1·(C - V_new)`.
    pub fn update_on_remove(&self, removed: &Element, new: &Accumulator) -> Result<Self, Error> {
        let delta = self.delta(removed)?;
        let inverse = Option::<Scalar>::from(delta.invert())
            .ok_or_else(|| Error::Crypto("non-invertible witness delta".to_string()))?;
        Ok(Self { element: self.element, c: (self.c - new.0) * inverse })
    }

    fn delta(&self, other: &Element) -> Result<Scalar, Error> {
        let delta = other.0 - self.element.0;
        if bool::from(delta.is_zero()) {
            return Err(Error::Crypto(
                "cannot update a witness with its own element".to_string(),
            ));
        }
        Ok(delta)
    }
}

/// Length of an encoded witness.
pub const WITNESS_BYTES: usize = SCALAR_BYTES + G1_BYTES;

mod serialization {
    use super::*;
    use cosmian_crypto_core::bytes_ser_de::{Deserializer, Serializable, Serializer};

    impl Serializable for MembershipWitness {
        type Error = Error;

        fn length(&self) -> usize {
            WITNESS_BYTES
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            let mut n = write_scalar(ser, &self.element.0)?;
            n += write_g1(ser, &self.c)?;
            Ok(n)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let element = Element(read_scalar(de)?);
            let c = read_g1(de)?;
            Ok(Self { element, c })
        }
    }
}

/// Decode a witness, rejecting anything but the fixed encoded length.
///
/// Malformed bytes are a `Deserialization` error, never a panic.
pub fn decode_witness(bytes: &[u8]) -> Result<MembershipWitness, Error> {
    use cosmian_crypto_core::bytes_ser_de::Serializable;

    if bytes.len() != WITNESS_BYTES {
        return Err(Error::Deserialization(format!(
            "witness must be {WITNESS_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(MembershipWitness::deserialize(bytes)?)
}

/// Decode and verify a witness in one step.
pub fn verify_encoded(pk: &PublicKey, acc: &Accumulator, bytes: &[u8]) -> Result<bool, Error> {
    Ok(decode_witness(bytes)?.verify(pk, acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmian_crypto_core::{
        CsRng,
        bytes_ser_de::Serializable,
        reexport::rand_core::SeedableRng,
    };

    fn setup(seed: &[u8]) -> (SecretKey, PublicKey, Accumulator) {
        let sk = SecretKey::new(seed).unwrap();
        let pk = sk.public_key();
        (sk, pk, Accumulator::random(&mut CsRng::from_entropy()))
    }

    #[test]
    fn test_common_use() {
        let (sk, pk, acc) = setup(b"1234567890");
        let wrong_sk = SecretKey::new(b"123456789").unwrap();

        let (acc, _) = acc.add(&sk, &Element::hash(b"value1")).unwrap();
        let (acc, _) = acc.add(&sk, &Element::hash(b"value2")).unwrap();
        let (acc, _) = acc.add(&sk, &Element::hash(b"value3")).unwrap();

        let y = Element::hash(b"value3");
        let witness = MembershipWitness::new(&y, &acc, &sk).unwrap();
        assert!(witness.verify(&pk, &acc));

        let illegal = MembershipWitness::new(&Element::hash(b"illegal"), &acc, &wrong_sk).unwrap();
        assert!(!illegal.verify(&pk, &acc));

        let wrong_key_witness = MembershipWitness::new(&y, &acc, &wrong_sk).unwrap();
        assert!(!wrong_key_witness.verify(&pk, &acc));

        let acc = acc.remove(&sk, &y).unwrap();
        assert!(!witness.verify(&pk, &acc));
    }

    #[test]
    fn test_add_witness_verifies() {
        let (sk, pk, acc) = setup(b"level/3");
        let y = Element::hash(b"user_id");

        let (acc, witness) = acc.add(&sk, &y).unwrap();
        assert!(witness.verify(&pk, &acc));
        assert_eq!(witness, MembershipWitness::new(&y, &acc, &sk).unwrap());
    }

    #[test]
    fn test_update_on_add() {
        let (sk, pk, acc) = setup(b"department/1");
        let y = Element::hash(b"prog1");
        let other = Element::hash(b"prog2");

        let (acc, witness) = acc.add(&sk, &y).unwrap();
        let (next, _) = acc.add(&sk, &other).unwrap();
        assert!(!witness.verify(&pk, &next));

        let updated = witness.update_on_add(&other, &acc).unwrap();
        assert!(updated.verify(&pk, &next));
    }

    #[test]
    fn test_update_on_remove() {
        let (sk, pk, acc) = setup(b"department/2");
        let y = Element::hash(b"prog1");
        let other = Element::hash(b"prog2");

        let (acc, _) = acc.add(&sk, &y).unwrap();
        let (acc, _) = acc.add(&sk, &other).unwrap();
        let witness = MembershipWitness::new(&y, &acc, &sk).unwrap();

        let next = acc.remove(&sk, &other).unwrap();
        assert!(!witness.verify(&pk, &next));

        let updated = witness.update_on_remove(&other, &next).unwrap();
        assert!(updated.verify(&pk, &next));
    }

    #[test]
    fn test_update_with_own_element_fails() {
        let (sk, _, acc) = setup(b"seed");
        let y = Element::hash(b"prog1");
        let (acc, witness) = acc.add(&sk, &y).unwrap();

        assert!(witness.update_on_add(&y, &acc).is_err());
        assert!(witness.update_on_remove(&y, &acc).is_err());
    }

    #[test]
    fn test_verify_encoded() {
        let (sk, pk, acc) = setup(b"seed");
        let (acc, witness) = acc.add(&sk, &Element::hash(b"user")).unwrap();
        let bytes = witness.serialize().unwrap();
        assert_eq!(MembershipWitness::deserialize(&bytes).unwrap(), witness);

        assert_eq!(verify_encoded(&pk, &acc, &bytes), Ok(true));

        let (next, _) = acc.add(&sk, &Element::hash(b"other")).unwrap();
        assert_eq!(verify_encoded(&pk, &next, &bytes), Ok(false));

        assert!(matches!(
            verify_encoded(&pk, &acc, &bytes[..WITNESS_BYTES - 1]),
            Err(Error::Deserialization(_))
        ));
        assert!(verify_encoded(&pk, &acc, &[0u8; WITNESS_BYTES]).is_err());
        assert!(verify_encoded(&pk, &acc, b"").is_err());
    }
}
