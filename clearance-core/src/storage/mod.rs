//! Persistence of accumulator state.
//!
//! The authorization service never touches files or databases directly; it
//! goes through an injected [`AccumulatorStore`]. Two implementations ship with
//! the crate: [`MemoryAccumulatorStore`] for tests and single-process
//! deployments, and [`DirectoryAccumulatorStore`] which keeps one file per
//! accumulator on disk.

mod directory;
mod error;
mod memory;
mod traits;

pub use directory::DirectoryAccumulatorStore;
pub use error::StorageError;
pub use memory::MemoryAccumulatorStore;
pub use traits::AccumulatorStore;

use crate::accumulator::{self, Accumulator, Element, ElementBytes, PublicKey, SecretKey};
use std::collections::BTreeSet;

/// Which dimension an accumulator tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccumulatorKind {
    Level,
    Department,
}

impl AccumulatorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AccumulatorKind::Level => "level",
            AccumulatorKind::Department => "department",
        }
    }
}

impl std::fmt::Display for AccumulatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of one accumulator: a security level or a department number.
///
/// The derived ordering (kind first, then value) is the global lock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccumulatorId {
    pub kind: AccumulatorKind,
    pub value: u32,
}

impl AccumulatorId {
    #[must_use]
    pub fn level(value: u32) -> Self {
        Self { kind: AccumulatorKind::Level, value }
    }

    #[must_use]
    pub fn department(value: u32) -> Self {
        Self { kind: AccumulatorKind::Department, value }
    }

    /// Seed the accumulator secret key is derived from.
    #[must_use]
    pub fn key_seed(&self, deployment_seed: &[u8]) -> Vec<u8> {
        let mut seed = deployment_seed.to_vec();
        seed.extend_from_slice(format!("/{}/{}", self.kind, self.value).as_bytes());
        seed
    }
}

impl std::fmt::Display for AccumulatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.value, self.kind)
    }
}

/// Persisted state of one accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorRecord {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub accumulator: Accumulator,
    /// Encoded elements currently accumulated.
    pub members: BTreeSet<ElementBytes>,
}

impl AccumulatorRecord {
    #[must_use]
    pub fn new(secret_key: SecretKey, public_key: PublicKey, accumulator: Accumulator) -> Self {
        Self { secret_key, public_key, accumulator, members: BTreeSet::new() }
    }

    #[must_use]
    pub fn contains(&self, element: &Element) -> bool {
        self.members.contains(&element.to_bytes())
    }
}

mod serialization {
    use super::*;
    use crate::crypto::pairing::SCALAR_BYTES;
    use cosmian_crypto_core::bytes_ser_de::{
        Deserializer, Serializable, Serializer, to_leb128_len,
    };

    impl Serializable for AccumulatorRecord {
        type Error = accumulator::Error;

        fn length(&self) -> usize {
            self.secret_key.length()
                + self.public_key.length()
                + self.accumulator.length()
                + to_leb128_len(self.members.len())
                + self.members.len() * SCALAR_BYTES
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            let mut n = ser.write(&self.secret_key)?;
            n += ser.write(&self.public_key)?;
            n += ser.write(&self.accumulator)?;
            n += ser.write_leb128_u64(self.members.len() as u64)?;
            for member in &self.members {
                n += ser.write_array(member)?;
            }
            Ok(n)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let secret_key = de.read::<SecretKey>()?;
            let public_key = de.read::<PublicKey>()?;
            let accumulator = de.read::<Accumulator>()?;
            if secret_key.public_key() != public_key {
                return Err(accumulator::Error::Deserialization(
                    "public key does not match secret key".to_string(),
                ));
            }
            let members = (0..de.read_leb128_u64()?)
                .map(|_| {
                    let bytes = de.read_array::<SCALAR_BYTES>()?;
                    Element::from_bytes(&bytes)?;
                    Ok(bytes)
                })
                .collect::<Result<BTreeSet<_>, Self::Error>>()?;
            Ok(Self { secret_key, public_key, accumulator, members })
        }
    }

    #[test]
    fn test_record_serialization() {
        use cosmian_crypto_core::{CsRng, reexport::rand_core::SeedableRng};

        let (sk, pk, acc) = accumulator::create(b"level/1", &mut CsRng::from_entropy()).unwrap();
        let mut record = AccumulatorRecord::new(sk, pk, acc);
        let y = Element::hash(b"user_id");
        let (acc, _) = record.accumulator.add(&record.secret_key, &y).unwrap();
        record.accumulator = acc;
        record.members.insert(y.to_bytes());

        let bytes = record.serialize().expect("serialization failed");
        assert_eq!(bytes.len(), record.length());
        let restored = AccumulatorRecord::deserialize(&bytes).expect("deserialization failed");
        assert_eq!(restored, record);
        assert!(restored.contains(&y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_order() {
        let mut ids = vec![
            AccumulatorId::department(0),
            AccumulatorId::level(4),
            AccumulatorId::level(1),
        ];
        ids.sort();
        assert_eq!(ids, vec![
            AccumulatorId::level(1),
            AccumulatorId::level(4),
            AccumulatorId::department(0),
        ]);
    }

    #[test]
    fn test_key_seeds_are_distinct() {
        let seed = b"deployment";
        assert_ne!(
            AccumulatorId::level(1).key_seed(seed),
            AccumulatorId::department(1).key_seed(seed)
        );
        assert_eq!(AccumulatorId::department(3).to_string(), "3_department");
    }
}
