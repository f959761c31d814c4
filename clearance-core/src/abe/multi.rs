//! Decentralized multi-authority ABE (Lewko-Waters), used as a KEM.
//!
//! Every authority manages its own attributes with independent secrets
//! `(α_i, y_i)`; no setup is shared between authorities. Keys are bound to a
//! global identifier so that keys issued to different holders cannot be
//! combined.
//!
//! ```text
//!     PK_i   = (e(g1, g2)^α_i, g2^y_i)
//!     C1_x   = e(g1, g2)^λ_x · e(g1, g2)^(α_ρ(x)·r_x)
//!     C2_x   = g2^r_x
//!     C3_x   = g2^(y_ρ(x)·r_x) · g2^ω_x
//!     K_i,GID = g1^α_i · H(GID)^y_i
//! ```

use super::{Error, Msp};
use crate::{
    crypto::{
        AE, ChaChaDem, G1Projective, G2Projective, Gt, Scalar, derive_session_key,
        hash::DST_GLOBAL_ID,
        hash_to_g1, pairing,
        pairing::{
            read_g2, read_gt, read_scalar, write_g2, write_gt, write_scalar,
        },
        random_scalar,
    },
    policy::{AccessPolicy, QualifiedAttribute},
};
use bls12_381_plus::elliptic_curve::ops::MulByGenerator;
use cosmian_crypto_core::reexport::rand_core::CryptoRngCore;
use secrecy::{ExposeSecret, SecretBox};
use std::collections::{BTreeMap, HashMap, HashSet};
use zeroize::Zeroizing;

fn gt_generator() -> Gt {
    pairing(&G1Projective::GENERATOR, &G2Projective::GENERATOR)
}

/// Public key of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePublicKey {
    egg_alpha: Gt,
    g2_y: G2Projective,
}

/// Public keys of every attribute an authority manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityPublicKeys {
    pub authority: String,
    pub attributes: BTreeMap<QualifiedAttribute, AttributePublicKey>,
}

struct AttributeSecret {
    alpha: SecretBox<Scalar>,
    y: SecretBox<Scalar>,
}

impl AttributeSecret {
    fn new(alpha: Scalar, y: Scalar) -> Self {
        Self { alpha: SecretBox::new(Box::new(alpha)), y: SecretBox::new(Box::new(y)) }
    }

    fn public_key(&self) -> AttributePublicKey {
        AttributePublicKey {
            egg_alpha: gt_generator() * self.alpha.expose_secret(),
            g2_y: G2Projective::mul_by_generator(self.y.expose_secret()),
        }
    }
}

/// An independent attribute authority, e.g. "department" or "level".
pub struct Authority {
    name: String,
    secrets: BTreeMap<QualifiedAttribute, AttributeSecret>,
    public: AuthorityPublicKeys,
}

impl std::fmt::Debug for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authority")
            .field("name", &self.name)
            .field("attributes", &self.secrets.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Authority {
    pub fn new(
        name: &str,
        attributes: &[QualifiedAttribute],
        rng: &mut impl CryptoRngCore,
    ) -> Self {
        let secrets = attributes
            .iter()
            .map(|attr| {
                (attr.clone(), AttributeSecret::new(random_scalar(rng), random_scalar(rng)))
            })
            .collect();
        Self::from_secrets(name.to_owned(), secrets)
    }

    fn from_secrets(name: String, secrets: BTreeMap<QualifiedAttribute, AttributeSecret>) -> Self {
        let attributes =
            secrets.iter().map(|(attr, secret)| (attr.clone(), secret.public_key())).collect();
        let public = AuthorityPublicKeys { authority: name.clone(), attributes };
        Self { name, secrets, public }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn public_keys(&self) -> &AuthorityPublicKeys {
        &self.public
    }

    /// Issue `K = g1^α · H(gid)^y` for each requested attribute.
    pub fn generate_attribute_keys(
        &self,
        gid: &str,
        attributes: &[QualifiedAttribute],
    ) -> Result<Vec<AttributeKey>, Error> {
        let h = hash_to_g1(DST_GLOBAL_ID, gid.as_bytes());
        attributes
            .iter()
            .map(|attr| {
                let secret = self
                    .secrets
                    .get(attr)
                    .ok_or_else(|| Error::UnknownAttribute(attr.to_string()))?;
                Ok(AttributeKey {
                    gid: gid.to_owned(),
                    attribute: attr.clone(),
                    k: G1Projective::mul_by_generator(secret.alpha.expose_secret())
                        + h * secret.y.expose_secret(),
                })
            })
            .collect()
    }
}

impl Clone for Authority {
    fn clone(&self) -> Self {
        let secrets = self
            .secrets
            .iter()
            .map(|(attr, s)| {
                (attr.clone(), AttributeSecret::new(*s.alpha.expose_secret(), *s.y.expose_secret()))
            })
            .collect();
        Self::from_secrets(self.name.clone(), secrets)
    }
}

impl PartialEq for Authority {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.public == other.public
    }
}

impl Eq for Authority {}

/// Key for one attribute, bound to a global identifier.
pub struct AttributeKey {
    pub gid: String,
    pub attribute: QualifiedAttribute,
    k: G1Projective,
}

impl std::fmt::Debug for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeKey")
            .field("gid", &self.gid)
            .field("attribute", &self.attribute)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) policy: String,
    rows: Vec<(Gt, G2Projective, G2Projective)>,
    payload: Vec<u8>,
}

pub fn encrypt(
    rng: &mut impl CryptoRngCore,
    policy: &AccessPolicy,
    public_keys: &[&AuthorityPublicKeys],
    plaintext: &[u8],
) -> Result<Ciphertext, Error> {
    let msp = Msp::from_policy(policy);
    let lookup = public_keys
        .iter()
        .flat_map(|pks| pks.attributes.iter())
        .collect::<HashMap<_, _>>();

    let v = (0..msp.columns()).map(|_| random_scalar(rng)).collect::<Vec<_>>();
    let mut w = (0..msp.columns()).map(|_| random_scalar(rng)).collect::<Vec<_>>();
    w[0] = Scalar::ZERO;
    let lambdas = msp.shares(&v)?;
    let omegas = msp.shares(&w)?;

    let gt = gt_generator();
    let rows = (0..msp.rows())
        .map(|i| {
            let label = msp.label(i);
            let pk = lookup.get(label).ok_or_else(|| Error::MissingPublicKey(label.to_string()))?;
            let r = random_scalar(rng);
            Ok((
                gt * lambdas[i] + pk.egg_alpha * r,
                G2Projective::mul_by_generator(&r),
                pk.g2_y * r + G2Projective::mul_by_generator(&omegas[i]),
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let policy = policy.to_string();
    let key = derive_session_key(&(gt * v[0]));
    let payload = ChaChaDem::encrypt(rng, &key, plaintext, policy.as_bytes())?;

    Ok(Ciphertext { policy, rows, payload })
}

pub fn decrypt(ct: &Ciphertext, keys: &[AttributeKey]) -> Result<Zeroizing<Vec<u8>>, Error> {
    let gid = match keys.first() {
        Some(key) if keys.iter().all(|k| k.gid == key.gid) => &key.gid,
        _ => return Err(Error::PolicyNotSatisfied),
    };

    let policy = AccessPolicy::parse(&ct.policy)?;
    let msp = Msp::from_policy(&policy);
    if msp.rows() != ct.rows.len() {
        return Err(Error::Deserialization("ciphertext rows do not match its policy".to_string()));
    }

    let by_attribute = keys.iter().map(|k| (&k.attribute, &k.k)).collect::<HashMap<_, _>>();
    let owned = by_attribute.keys().map(|attr| (*attr).clone()).collect::<HashSet<_>>();
    let solution = msp.solve(&owned).ok_or(Error::PolicyNotSatisfied)?;

    let h = hash_to_g1(DST_GLOBAL_ID, gid.as_bytes());
    let session = solution.iter().try_fold(Gt::IDENTITY, |acc, (i, c)| {
        let (c1, c2, c3) = &ct.rows[*i];
        let k = by_attribute.get(msp.label(*i)).ok_or(Error::PolicyNotSatisfied)?;
        Ok::<_, Error>(acc + (*c1 + pairing(&h, c3) - pairing(k, c2)) * c)
    })?;

    ChaChaDem::decrypt(&derive_session_key(&session), &ct.payload, ct.policy.as_bytes())
        .map_err(|_| Error::PolicyNotSatisfied)
}

mod serialization {
    use super::*;
    use crate::crypto::pairing::{G2_BYTES, GT_BYTES, SCALAR_BYTES};
    use cosmian_crypto_core::bytes_ser_de::{
        Deserializer, Serializable, Serializer, to_leb128_len,
    };

    impl Serializable for Authority {
        type Error = Error;

        fn length(&self) -> usize {
            to_leb128_len(self.name.len())
                + self.name.len()
                + to_leb128_len(self.secrets.len())
                + self
                    .secrets
                    .keys()
                    .map(|attr| {
                        let l = attr.to_string().len();
                        to_leb128_len(l) + l + 2 * SCALAR_BYTES
                    })
                    .sum::<usize>()
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            let mut n = ser.write_vec(self.name.as_bytes())?;
            n += ser.write_leb128_u64(self.secrets.len() as u64)?;
            for (attr, secret) in &self.secrets {
                n += ser.write_vec(&attr.bytes())?;
                n += write_scalar(ser, secret.alpha.expose_secret())?;
                n += write_scalar(ser, secret.y.expose_secret())?;
            }
            Ok(n)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let name = String::from_utf8(de.read_vec()?)
                .map_err(|e| Error::Deserialization(e.to_string()))?;
            let secrets = (0..de.read_leb128_u64()?)
                .map(|_| {
                    let attr = String::from_utf8(de.read_vec()?)
                        .map_err(|e| Error::Deserialization(e.to_string()))?;
                    let attr = QualifiedAttribute::try_from(attr.as_str())?;
                    let alpha = read_scalar(de)?;
                    let y = read_scalar(de)?;
                    Ok((attr, AttributeSecret::new(alpha, y)))
                })
                .collect::<Result<BTreeMap<_, _>, Error>>()?;
            Ok(Self::from_secrets(name, secrets))
        }
    }

    impl Serializable for Ciphertext {
        type Error = Error;

        fn length(&self) -> usize {
            to_leb128_len(self.policy.len())
                + self.policy.len()
                + to_leb128_len(self.rows.len())
                + self.rows.len() * (GT_BYTES + 2 * G2_BYTES)
                + to_leb128_len(self.payload.len())
                + self.payload.len()
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            let mut n = ser.write_vec(self.policy.as_bytes())?;
            n += ser.write_leb128_u64(self.rows.len() as u64)?;
            for (c1, c2, c3) in &self.rows {
                n += write_gt(ser, c1)?;
                n += write_g2(ser, c2)?;
                n += write_g2(ser, c3)?;
            }
            n += ser.write_vec(&self.payload)?;
            Ok(n)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let policy = String::from_utf8(de.read_vec()?)
                .map_err(|e| Error::Deserialization(e.to_string()))?;
            let rows = (0..de.read_leb128_u64()?)
                .map(|_| Ok((read_gt(de)?, read_g2(de)?, read_g2(de)?)))
                .collect::<Result<Vec<_>, Error>>()?;
            let payload = de.read_vec()?;
            Ok(Self { policy, rows, payload })
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

    struct Setup {
        department: Authority,
        level: Authority,
        ct: Ciphertext,
    }

    fn setup(rng: &mut CsRng) -> Setup {
        let department = Authority::new("department", &attrs(&["department:1"]), rng);
        let level = Authority::new("level", &attrs(&["level:3", "level:4"]), rng);
        let policy = AccessPolicy::parse("department:1 AND (level:3 OR level:4)").unwrap();
        let ct = encrypt(
            rng,
            &policy,
            &[department.public_keys(), level.public_keys()],
            b"secret msg",
        )
        .unwrap();
        Setup { department, level, ct }
    }

    #[test]
    fn test_multi_authority_round_trip() {
        let mut rng = CsRng::from_entropy();
        let Setup { department, level, ct } = setup(&mut rng);

        let mut keys = department.generate_attribute_keys("gid", &attrs(&["department:1"])).unwrap();
        keys.extend(level.generate_attribute_keys("gid", &attrs(&["level:4"])).unwrap());
        assert_eq!(&decrypt(&ct, &keys).unwrap()[..], b"secret msg");

        let keys = level.generate_attribute_keys("gid", &attrs(&["level:3", "level:4"])).unwrap();
        assert_eq!(decrypt(&ct, &keys), Err(Error::PolicyNotSatisfied));
    }

    #[test]
    fn test_unknown_attribute_is_refused() {
        let mut rng = CsRng::from_entropy();
        let Setup { level, .. } = setup(&mut rng);

        assert_eq!(
            level.generate_attribute_keys("gid", &attrs(&["level:2"])).unwrap_err(),
            Error::UnknownAttribute("level:2".to_string())
        );
    }

    #[test]
    fn test_keys_of_different_holders_do_not_combine() {
        let mut rng = CsRng::from_entropy();
        let Setup { department, level, ct } = setup(&mut rng);

        let mut keys = department.generate_attribute_keys("alice", &attrs(&["department:1"])).unwrap();
        keys.extend(level.generate_attribute_keys("bob", &attrs(&["level:4"])).unwrap());
        assert_eq!(decrypt(&ct, &keys), Err(Error::PolicyNotSatisfied));

        // relabelling the key does not help
        for key in &mut keys {
            key.gid = "alice".to_string();
        }
        assert_eq!(decrypt(&ct, &keys), Err(Error::PolicyNotSatisfied));
    }

    #[test]
    fn test_missing_public_key() {
        let mut rng = CsRng::from_entropy();
        let department = Authority::new("department", &attrs(&["department:1"]), &mut rng);
        let policy = AccessPolicy::parse("department:1 AND level:4").unwrap();

        assert_eq!(
            encrypt(&mut rng, &policy, &[department.public_keys()], b"msg").unwrap_err(),
            Error::MissingPublicKey("level:4".to_string())
        );
    }

    #[test]
    fn test_serialization() {
        let mut rng = CsRng::from_entropy();
        let Setup { department, level, ct } = setup(&mut rng);

        let bytes = level.serialize().expect("serialization failed");
        assert_eq!(bytes.len(), level.length());
        let restored = Authority::deserialize(&bytes).expect("deserialization failed");
        assert_eq!(restored, level);

        let bytes = ct.serialize().expect("serialization failed");
        assert_eq!(bytes.len(), ct.length());
        let ct = Ciphertext::deserialize(&bytes).expect("deserialization failed");

        let mut keys = department.generate_attribute_keys("gid", &attrs(&["department:1"])).unwrap();
        keys.extend(restored.generate_attribute_keys("gid", &attrs(&["level:3"])).unwrap());
        assert_eq!(&decrypt(&ct, &keys).unwrap()[..], b"secret msg");
    }
}
