use super::{Element, Error, MembershipWitness, SecretKey};
use crate::crypto::{
    G1Projective, Scalar,
    pairing::{G1_BYTES, random_scalar, read_g1, write_g1},
};
use bls12_381_plus::{elliptic_curve::ops::MulByGenerator, ff::Field};
use cosmian_crypto_core::reexport::rand_core::CryptoRngCore;

/// Current set commitment `V` in G1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accumulator(pub(crate) G1Projective);

impl Accumulator {
    /// A fresh, empty accumulator: a uniformly random G1 point.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self(G1Projective::mul_by_generator(&random_scalar(rng)))
    }

    /// Accumulate `element`: `V' = (y + sk)·V`.
    ///
    /// The returned witness is valid against the returned accumulator only.
    pub fn add(
        &self,
        sk: &SecretKey,
        element: &Element,
    ) -> Result<(Self, MembershipWitness), Error> {
        let factor = element.0 + sk.scalar();
        if bool::from(factor.is_zero()) {
            return Err(Error::Crypto("element collides with the accumulator trapdoor".to_string()));
        }
        let next = Self(self.0 * factor);
        // (y + sk)^-1·V' is the previous value
        let witness = MembershipWitness { element: *element, c: self.0 };
        Ok((next, witness))
    }

    /// Remove `element`: `V' = (y + sk)^-1·V`.
    ///
    /// The arithmetic cannot tell whether `element` was ever added; callers
    /// track membership themselves.
    pub fn remove(&self, sk: &SecretKey, element: &Element) -> Result<Self, Error> {
        Ok(Self(self.0 * trapdoor_inverse(sk, element)?))
    }
}

/// `(y + sk)^-1`, failing when the element equals `-sk`.
pub(super) fn trapdoor_inverse(sk: &SecretKey, element: &Element) -> Result<Scalar, Error> {
    Option::<Scalar>::from((element.0 + sk.scalar()).invert())
        .ok_or_else(|| Error::Crypto("element collides with the accumulator trapdoor".to_string()))
}

mod serialization {
    use super::*;
    use cosmian_crypto_core::bytes_ser_de::{Deserializer, Serializable, Serializer};

    impl Serializable for Accumulator {
        type Error = Error;

        fn length(&self) -> usize {
            G1_BYTES
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            Ok(write_g1(ser, &self.0)?)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            Ok(Self(read_g1(de)?))
        }
    }

    #[test]
    fn test_accumulator_serialization() {
        use cosmian_crypto_core::{CsRng, reexport::rand_core::SeedableRng};

        let acc = Accumulator::random(&mut CsRng::from_entropy());
        let bytes = acc.serialize().expect("serialization failed");
        assert_eq!(Accumulator::deserialize(&bytes).expect("deserialization failed"), acc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmian_crypto_core::{CsRng, reexport::rand_core::SeedableRng};

    #[test]
    fn test_add_then_remove_restores_value() {
        let sk = SecretKey::new(b"1234567890").unwrap();
        let acc = Accumulator::random(&mut CsRng::from_entropy());
        let element = Element::hash(b"prog1");

        let (added, _) = acc.add(&sk, &element).unwrap();
        assert_ne!(added, acc);
        assert_eq!(added.remove(&sk, &element).unwrap(), acc);
    }

    #[test]
    fn test_operations_commute() {
        let sk = SecretKey::new(b"1234567890").unwrap();
        let acc = Accumulator::random(&mut CsRng::from_entropy());
        let (team1, team2) = (Element::hash(b"team1"), Element::hash(b"team2"));

        let (a, _) = acc.add(&sk, &team1).unwrap();
        let (a, _) = a.add(&sk, &team2).unwrap();
        let (b, _) = acc.add(&sk, &team2).unwrap();
        let (b, _) = b.add(&sk, &team1).unwrap();
        assert_eq!(a, b);
    }
}
