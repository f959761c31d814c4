//! Single-authority ciphertext-policy ABE.
//!
//! Large-universe Waters construction used as a KEM: the policy hides a Gt
//! session element, which keys a ChaCha20-Poly1305 encryption of the payload.
//!
//! ```text
//!     MPK = (e(g1, g2)^α, g1^a)                  MSK = α
//!     C'  = g2^s
//!     C_i = g1^(a·λ_i) · H(ρ(i))^(-r_i)          D_i = g2^(r_i)
//!     K   = g1^α · g1^(a·t)    L = g2^t           K_x = H(x)^t
//! ```

use super::{Error, Msp};
use crate::{
    crypto::{
        AE, ChaChaDem, G1Projective, G2Projective, Gt, Scalar, derive_session_key,
        hash::DST_ATTRIBUTE,
        hash_to_g1, pairing,
        pairing::{read_g1, read_g2, read_scalar, write_g1, write_g2, write_scalar},
        random_scalar,
    },
    policy::{AccessPolicy, QualifiedAttribute},
};
use bls12_381_plus::elliptic_curve::ops::MulByGenerator;
use cosmian_crypto_core::reexport::rand_core::CryptoRngCore;
use secrecy::{ExposeSecret, SecretBox};
use std::collections::{BTreeMap, HashSet};
use zeroize::Zeroizing;

fn attribute_point(attribute: &QualifiedAttribute) -> G1Projective {
    hash_to_g1(DST_ATTRIBUTE, &attribute.bytes())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterPublicKey {
    egg_alpha: Gt,
    g1_a: G1Projective,
}

pub struct MasterSecretKey {
    alpha: SecretBox<Scalar>,
}

impl std::fmt::Debug for MasterSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterSecretKey([REDACTED])")
    }
}

/// The trusted authority's key pair.
#[derive(Debug)]
pub struct MasterKeys {
    pub msk: MasterSecretKey,
    pub mpk: MasterPublicKey,
}

impl MasterKeys {
    pub fn generate(rng: &mut impl CryptoRngCore) -> Self {
        let alpha = random_scalar(rng);
        let a = random_scalar(rng);
        Self::from_parts(alpha, G1Projective::mul_by_generator(&a))
    }

    fn from_parts(alpha: Scalar, g1_a: G1Projective) -> Self {
        let egg_alpha = pairing(&G1Projective::mul_by_generator(&alpha), &G2Projective::GENERATOR);
        Self {
            msk: MasterSecretKey { alpha: SecretBox::new(Box::new(alpha)) },
            mpk: MasterPublicKey { egg_alpha, g1_a },
        }
    }
}

impl Clone for MasterKeys {
    fn clone(&self) -> Self {
        Self::from_parts(*self.msk.alpha.expose_secret(), self.mpk.g1_a)
    }
}

impl PartialEq for MasterKeys {
    fn eq(&self, other: &Self) -> bool {
        self.msk.alpha.expose_secret() == other.msk.alpha.expose_secret() && self.mpk == other.mpk
    }
}

impl Eq for MasterKeys {}

/// Decryption key for one holder's attribute set.
pub struct UserSecretKey {
    k: G1Projective,
    l: G2Projective,
    k_x: BTreeMap<QualifiedAttribute, G1Projective>,
}

impl std::fmt::Debug for UserSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSecretKey")
            .field("attributes", &self.k_x.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) policy: String,
    c_prime: G2Projective,
    rows: Vec<(G1Projective, G2Projective)>,
    payload: Vec<u8>,
}

pub fn encrypt(
    rng: &mut impl CryptoRngCore,
    policy: &AccessPolicy,
    mpk: &MasterPublicKey,
    plaintext: &[u8],
) -> Result<Ciphertext, Error> {
    let msp = Msp::from_policy(policy);
    let v = (0..msp.columns()).map(|_| random_scalar(rng)).collect::<Vec<_>>();
    let lambdas = msp.shares(&v)?;
    let s = v[0];

    let rows = lambdas
        .iter()
        .enumerate()
        .map(|(i, lambda)| {
            let r = random_scalar(rng);
            let c = mpk.g1_a * lambda - attribute_point(msp.label(i)) * r;
            (c, G2Projective::mul_by_generator(&r))
        })
        .collect();

    let policy = policy.to_string();
    let key = derive_session_key(&(mpk.egg_alpha * s));
    let payload = ChaChaDem::encrypt(rng, &key, plaintext, policy.as_bytes())?;

    Ok(Ciphertext { policy, c_prime: G2Projective::mul_by_generator(&s), rows, payload })
}

pub fn keygen(
    rng: &mut impl CryptoRngCore,
    keys: &MasterKeys,
    attributes: &[QualifiedAttribute],
) -> UserSecretKey {
    let t = random_scalar(rng);
    let k = G1Projective::mul_by_generator(keys.msk.alpha.expose_secret()) + keys.mpk.g1_a * t;
    let k_x = attributes.iter().map(|attr| (attr.clone(), attribute_point(attr) * t)).collect();
    UserSecretKey { k, l: G2Projective::mul_by_generator(&t), k_x }
}

pub fn decrypt(ct: &Ciphertext, usk: &UserSecretKey) -> Result<Zeroizing<Vec<u8>>, Error> {
    let policy = AccessPolicy::parse(&ct.policy)?;
    let msp = Msp::from_policy(&policy);
    if msp.rows() != ct.rows.len() {
        return Err(Error::Deserialization("ciphertext rows do not match its policy".to_string()));
    }

    let owned = usk.k_x.keys().cloned().collect::<HashSet<_>>();
    let solution = msp.solve(&owned).ok_or(Error::PolicyNotSatisfied)?;

    let blinding = solution.iter().try_fold(Gt::IDENTITY, |acc, (i, omega)| {
        let (c, d) = &ct.rows[*i];
        let k_x = usk.k_x.get(msp.label(*i)).ok_or(Error::PolicyNotSatisfied)?;
        Ok::<_, Error>(acc + (pairing(c, &usk.l) + pairing(k_x, d)) * omega)
    })?;
    let session = pairing(&usk.k, &ct.c_prime) - blinding;

    ChaChaDem::decrypt(&derive_session_key(&session), &ct.payload, ct.policy.as_bytes())
        .map_err(|_| Error::PolicyNotSatisfied)
}

mod serialization {
    use super::*;
    use crate::crypto::pairing::{G1_BYTES, G2_BYTES, SCALAR_BYTES};
    use cosmian_crypto_core::bytes_ser_de::{
        Deserializer, Serializable, Serializer, to_leb128_len,
    };

    impl Serializable for MasterKeys {
        type Error = Error;

        fn length(&self) -> usize {
            SCALAR_BYTES + G1_BYTES
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            let mut n = write_scalar(ser, self.msk.alpha.expose_secret())?;
            n += write_g1(ser, &self.mpk.g1_a)?;
            Ok(n)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let alpha = read_scalar(de)?;
            let g1_a = read_g1(de)?;
            Ok(Self::from_parts(alpha, g1_a))
        }
    }

    impl Serializable for Ciphertext {
        type Error = Error;

        fn length(&self) -> usize {
            to_leb128_len(self.policy.len())
                + self.policy.len()
                + G2_BYTES
                + to_leb128_len(self.rows.len())
                + self.rows.len() * (G1_BYTES + G2_BYTES)
                + to_leb128_len(self.payload.len())
                + self.payload.len()
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            let mut n = ser.write_vec(self.policy.as_bytes())?;
            n += write_g2(ser, &self.c_prime)?;
            n += ser.write_leb128_u64(self.rows.len() as u64)?;
            for (c, d) in &self.rows {
                n += write_g1(ser, c)?;
                n += write_g2(ser, d)?;
            }
            n += ser.write_vec(&self.payload)?;
            Ok(n)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let policy = String::from_utf8(de.read_vec()?)
                .map_err(|e| Error::Deserialization(e.to_string()))?;
            let c_prime = read_g2(de)?;
            let rows = (0..de.read_leb128_u64()?)
                .map(|_| Ok((read_g1(de)?, read_g2(de)?)))
                .collect::<Result<Vec<_>, Error>>()?;
            let payload = de.read_vec()?;
            Ok(Self { policy, c_prime, rows, payload })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmian_crypto_core::{
        CsRng, bytes_ser_de::Serializable, reexport::rand_core::SeedableRng,
    };

    fn attrs(list: &[&str]) -> Vec<QualifiedAttribute> {
        list.iter().map(|a| QualifiedAttribute::try_from(*a).unwrap()).collect()
    }

    #[test]
    fn test_single_authority_round_trip() {
        let mut rng = CsRng::from_entropy();
        let keys = MasterKeys::generate(&mut rng);
        let policy = AccessPolicy::parse("department:1 AND (level:3 OR level:4)").unwrap();

        let ct = encrypt(&mut rng, &policy, &keys.mpk, b"secret msg").unwrap();

        let usk = keygen(&mut rng, &keys, &attrs(&["department:1", "level:4"]));
        assert_eq!(&decrypt(&ct, &usk).unwrap()[..], b"secret msg");

        let usk = keygen(&mut rng, &keys, &attrs(&["department:1", "level:2"]));
        assert_eq!(decrypt(&ct, &usk), Err(Error::PolicyNotSatisfied));

        let usk = keygen(&mut rng, &keys, &attrs(&["department:2", "level:4"]));
        assert_eq!(decrypt(&ct, &usk), Err(Error::PolicyNotSatisfied));
    }

    #[test]
    fn test_keys_from_another_authority_fail() {
        let mut rng = CsRng::from_entropy();
        let keys = MasterKeys::generate(&mut rng);
        let other = MasterKeys::generate(&mut rng);
        let policy = AccessPolicy::parse("department:1 AND level:4").unwrap();

        let ct = encrypt(&mut rng, &policy, &keys.mpk, b"secret msg").unwrap();
        let usk = keygen(&mut rng, &other, &attrs(&["department:1", "level:4"]));
        assert_eq!(decrypt(&ct, &usk), Err(Error::PolicyNotSatisfied));
    }

    #[test]
    fn test_ciphertexts_are_randomized() {
        let mut rng = CsRng::from_entropy();
        let keys = MasterKeys::generate(&mut rng);
        let policy = AccessPolicy::parse("department:1 AND level:4").unwrap();

        let ct1 = encrypt(&mut rng, &policy, &keys.mpk, b"secret msg").unwrap();
        let ct2 = encrypt(&mut rng, &policy, &keys.mpk, b"secret msg").unwrap();
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_serialization() {
        let mut rng = CsRng::from_entropy();
        let keys = MasterKeys::generate(&mut rng);
        let bytes = keys.serialize().expect("serialization failed");
        assert_eq!(MasterKeys::deserialize(&bytes).expect("deserialization failed"), keys);

        let policy = AccessPolicy::parse("department:1 AND (level:3 OR level:4)").unwrap();
        let ct = encrypt(&mut rng, &policy, &keys.mpk, b"secret msg").unwrap();
        let bytes = ct.serialize().expect("serialization failed");
        assert_eq!(bytes.len(), ct.length());
        assert_eq!(Ciphertext::deserialize(&bytes).expect("deserialization failed"), ct);
    }

    #[test]
    fn test_tampered_policy_fails_closed() {
        let mut rng = CsRng::from_entropy();
        let keys = MasterKeys::generate(&mut rng);
        let policy = AccessPolicy::parse("department:1 AND level:4").unwrap();

        let mut ct = encrypt(&mut rng, &policy, &keys.mpk, b"secret msg").unwrap();
        ct.policy = "department:2 AND level:4".to_string();

        let usk = keygen(&mut rng, &keys, &attrs(&["department:2", "level:4"]));
        assert_eq!(decrypt(&ct, &usk), Err(Error::PolicyNotSatisfied));
    }
}
