use super::{Error, multi, single};
use crate::{
    log::debug,
    policy::{
        Department, LevelHierarchy, QualifiedAttribute, compile_policy, create_attribs,
        policy_attributes,
    },
};
use cosmian_crypto_core::{CsRng, reexport::rand_core::SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use zeroize::Zeroizing;

/// Name of the authority issuing department attributes.
pub const DEPARTMENT_AUTHORITY: &str = "department";

/// Name of the authority issuing level attributes.
pub const LEVEL_AUTHORITY: &str = "level";

/// Which ABE backend a deployment runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbeMode {
    /// One trusted authority holding a master key pair.
    Single,
    /// Independent "department" and "level" authorities per document.
    #[default]
    Multi,
}

/// An encrypted document, tagged by backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCiphertext {
    Single(single::Ciphertext),
    Multi(multi::Ciphertext),
}

impl DocumentCiphertext {
    /// Policy text the document was encrypted under.
    #[must_use]
    pub fn policy(&self) -> &str {
        match self {
            Self::Single(ct) => &ct.policy,
            Self::Multi(ct) => &ct.policy,
        }
    }
}

/// Authority key state needed to later derive attribute keys for one
/// ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityMaterial {
    Single(single::MasterKeys),
    Multi { department: multi::Authority, level: multi::Authority },
}

/// Policy-driven document encryption.
///
/// Compiles `(department, level)` into a policy, encrypts under it, and on the
/// read side derives attribute keys from the requester's own
/// `(department, level)`.
#[derive(Debug)]
pub struct EncryptionService {
    hierarchy: LevelHierarchy,
    master: Option<single::MasterKeys>,
    rng: Mutex<CsRng>,
}

impl EncryptionService {
    /// In single-authority mode the master key pair is generated here, once.
    pub fn new(hierarchy: LevelHierarchy, mode: AbeMode) -> Self {
        let mut rng = CsRng::from_entropy();
        let master = match mode {
            AbeMode::Single => Some(single::MasterKeys::generate(&mut rng)),
            AbeMode::Multi => None,
        };
        Self { hierarchy, master, rng: Mutex::new(rng) }
    }

    #[must_use]
    pub fn mode(&self) -> AbeMode {
        if self.master.is_some() { AbeMode::Single } else { AbeMode::Multi }
    }

    #[must_use]
    pub fn hierarchy(&self) -> &LevelHierarchy {
        &self.hierarchy
    }

    fn lock_rng(&self) -> Result<MutexGuard<'_, CsRng>, Error> {
        self.rng.lock().map_err(|_| Error::MutexPoisoned)
    }

    pub fn encrypt_document(
        &self,
        department: Department,
        level: u32,
        plaintext: &[u8],
    ) -> Result<(DocumentCiphertext, AuthorityMaterial), Error> {
        let policy = compile_policy(&self.hierarchy, department, level)?;
        let mut rng = self.lock_rng()?;

        let res = match &self.master {
            Some(keys) => (
                DocumentCiphertext::Single(single::encrypt(&mut *rng, &policy, &keys.mpk, plaintext)?),
                AuthorityMaterial::Single(keys.clone()),
            ),
            None => {
                let (departments, levels) =
                    policy_attributes(&self.hierarchy, department, level)?;
                let department =
                    multi::Authority::new(DEPARTMENT_AUTHORITY, &departments, &mut *rng);
                let level = multi::Authority::new(LEVEL_AUTHORITY, &levels, &mut *rng);
                let ct = multi::encrypt(
                    &mut *rng,
                    &policy,
                    &[department.public_keys(), level.public_keys()],
                    plaintext,
                )?;
                (DocumentCiphertext::Multi(ct), AuthorityMaterial::Multi { department, level })
            },
        };

        debug!(policy = %policy, "document encrypted");
        Ok(res)
    }

    /// Decrypt as a holder of `(department, level)`.
    ///
    /// Every failure past input validation is reported as
    /// [`Error::PolicyNotSatisfied`].
    pub fn decrypt_document(
        &self,
        department: Department,
        level: u32,
        ciphertext: &DocumentCiphertext,
        material: &AuthorityMaterial,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        let (departments, levels) = create_attribs(&self.hierarchy, department, level)?;
        let parse = |list: Vec<String>| {
            list.iter()
                .map(|a| QualifiedAttribute::try_from(a.as_str()))
                .collect::<Result<Vec<_>, _>>()
        };
        let (departments, levels) = (parse(departments)?, parse(levels)?);
        let mut rng = self.lock_rng()?;

        let res = match (ciphertext, material) {
            (DocumentCiphertext::Single(ct), AuthorityMaterial::Single(keys)) => {
                let usk = single::keygen(&mut *rng, keys, &[departments, levels].concat());
                single::decrypt(ct, &usk)
            },
            (DocumentCiphertext::Multi(ct), AuthorityMaterial::Multi { department, level }) => {
                let gid = fresh_global_id(&mut *rng);
                department
                    .generate_attribute_keys(&gid, &departments)
                    .and_then(|mut keys| {
                        keys.extend(level.generate_attribute_keys(&gid, &levels)?);
                        Ok(keys)
                    })
                    .and_then(|keys| multi::decrypt(ct, &keys))
            },
            _ => Err(Error::PolicyNotSatisfied),
        };

        res.map_err(|e| {
            debug!(policy = ciphertext.policy(), "document decryption refused: {e}");
            Error::PolicyNotSatisfied
        })
    }
}

/// Random identifier binding the attribute keys of one decryption request.
fn fresh_global_id(rng: &mut CsRng) -> String {
    use cosmian_crypto_core::reexport::rand_core::RngCore;

    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

mod serialization {
    use super::*;
    use cosmian_crypto_core::bytes_ser_de::{Deserializer, Serializable, Serializer};

    const SINGLE: u64 = 0;
    const MULTI: u64 = 1;

    impl Serializable for DocumentCiphertext {
        type Error = Error;

        fn length(&self) -> usize {
            1 + match self {
                Self::Single(ct) => ct.length(),
                Self::Multi(ct) => ct.length(),
            }
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            match self {
                Self::Single(ct) => Ok(ser.write_leb128_u64(SINGLE)? + ser.write(ct)?),
                Self::Multi(ct) => Ok(ser.write_leb128_u64(MULTI)? + ser.write(ct)?),
            }
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            match de.read_leb128_u64()? {
                SINGLE => Ok(Self::Single(de.read()?)),
                MULTI => Ok(Self::Multi(de.read()?)),
                tag => Err(Error::Deserialization(format!("unknown ciphertext tag {tag}"))),
            }
        }
    }

    impl Serializable for AuthorityMaterial {
        type Error = Error;

        fn length(&self) -> usize {
            1 + match self {
                Self::Single(keys) => keys.length(),
                Self::Multi { department, level } => department.length() + level.length(),
            }
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            match self {
                Self::Single(keys) => Ok(ser.write_leb128_u64(SINGLE)? + ser.write(keys)?),
                Self::Multi { department, level } => Ok(ser.write_leb128_u64(MULTI)?
                    + ser.write(department)?
                    + ser.write(level)?),
            }
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            match de.read_leb128_u64()? {
                SINGLE => Ok(Self::Single(de.read()?)),
                MULTI => {
                    let department = de.read::<multi::Authority>()?;
                    let level = de.read::<multi::Authority>()?;
                    Ok(Self::Multi { department, level })
                },
                tag => Err(Error::Deserialization(format!("unknown authority material tag {tag}"))),
            }
        }
    }
}
