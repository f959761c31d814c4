use super::Error;
use crate::crypto::{
    G2Projective, Scalar,
    hash::{DOMAIN_ACCUMULATOR_KEY, hash_to_scalar},
    pairing::{read_g2, read_scalar, write_g2, write_scalar},
};
use bls12_381_plus::{elliptic_curve::ops::MulByGenerator, ff::Field};
use secrecy::{ExposeSecret, SecretBox};

/// Accumulator trapdoor `sk`.
pub struct SecretKey(SecretBox<Scalar>);

impl SecretKey {
    /// Derive a secret key from a seed.
    ///
    /// The same seed always yields the same key; callers creating several
    /// accumulators are responsible for giving each one a distinct seed.
    pub fn new(seed: &[u8]) -> Result<Self, Error> {
        let sk = hash_to_scalar(DOMAIN_ACCUMULATOR_KEY, seed);
        if bool::from(sk.is_zero()) {
            return Err(Error::Curve("seed hashes to the zero scalar".to_string()));
        }
        Ok(Self(SecretBox::new(Box::new(sk))))
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(G2Projective::mul_by_generator(self.0.expose_secret()))
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        self.0.expose_secret()
    }

    #[cfg(test)]
    pub(crate) fn from_scalar(sk: Scalar) -> Self {
        Self(SecretBox::new(Box::new(sk)))
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        Self(SecretBox::new(Box::new(*self.0.expose_secret())))
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for SecretKey {}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Public verification key `Q̃ = sk·P̃` in G2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(pub(crate) G2Projective);

mod serialization {
    use super::*;
    use crate::crypto::pairing::{G2_BYTES, SCALAR_BYTES};
    use cosmian_crypto_core::bytes_ser_de::{Deserializer, Serializable, Serializer};

    impl Serializable for SecretKey {
        type Error = Error;

        fn length(&self) -> usize {
            SCALAR_BYTES
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            Ok(write_scalar(ser, self.0.expose_secret())?)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let sk = read_scalar(de)?;
            if bool::from(sk.is_zero()) {
                return Err(Error::Deserialization("zero secret key".to_string()));
            }
            Ok(Self(SecretBox::new(Box::new(sk))))
        }
    }

    impl Serializable for PublicKey {
        type Error = Error;

        fn length(&self) -> usize {
            G2_BYTES
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            Ok(write_g2(ser, &self.0)?)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            Ok(Self(read_g2(de)?))
        }
    }

    #[test]
    fn test_key_serialization() {
        let sk = SecretKey::new(b"1234567890").unwrap();
        let bytes = sk.serialize().expect("serialization failed");
        assert_eq!(bytes.len(), sk.length());
        assert_eq!(SecretKey::deserialize(&bytes).expect("deserialization failed"), sk);

        let pk = sk.public_key();
        let bytes = pk.serialize().expect("serialization failed");
        assert_eq!(PublicKey::deserialize(&bytes).expect("deserialization failed"), pk);
    }
}
