use crate::accumulator;
use serde::{Deserialize, Serialize};

/// Credential returned on enrollment: one encoded membership witness per
/// dimension.
///
/// Both halves are opaque to the holder. They must witness the same
/// element, so halves from two different credentials never combine.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualWitness {
    pub level: Vec<u8>,
    pub department: Vec<u8>,
}

impl std::fmt::Debug for DualWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualWitness")
            .field("level", &format_args!("{} bytes", self.level.len()))
            .field("department", &format_args!("{} bytes", self.department.len()))
            .finish()
    }
}

mod serialization {
    use super::*;
    use cosmian_crypto_core::bytes_ser_de::{
        Deserializer, Serializable, Serializer, to_leb128_len,
    };

    impl Serializable for DualWitness {
        type Error = accumulator::Error;

        fn length(&self) -> usize {
            to_leb128_len(self.level.len())
                + self.level.len()
                + to_leb128_len(self.department.len())
                + self.department.len()
        }

        fn write(&self, ser: &mut Serializer) -> Result<usize, Self::Error> {
            let mut n = ser.write_vec(&self.level)?;
            n += ser.write_vec(&self.department)?;
            Ok(n)
        }

        fn read(de: &mut Deserializer) -> Result<Self, Self::Error> {
            let level = de.read_vec()?;
            let department = de.read_vec()?;
            Ok(Self { level, department })
        }
    }

    #[test]
    fn test_dual_witness_serialization() {
        let witness = DualWitness { level: vec![1; 80], department: vec![2; 80] };
        let bytes = Serializable::serialize(&witness).expect("serialization failed");
        assert_eq!(bytes.len(), witness.length());
        let decoded =
            <DualWitness as Serializable>::deserialize(&bytes).expect("deserialization failed");
        assert_eq!(decoded, witness);

        let json = serde_json::to_string(&witness).unwrap();
        assert_eq!(serde_json::from_str::<DualWitness>(&json).unwrap(), witness);
    }
}
