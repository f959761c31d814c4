//! Boundary facade combining authorization and document encryption.
//!
//! Front-ends (HTTP handlers, bots) talk to a [`DocumentGateway`] only. Byte
//! payloads crossing the boundary are produced by the binary encoders of the
//! underlying types.

use crate::{
    abe::{self, AuthorityMaterial, DocumentCiphertext, EncryptionService},
    authorization::{AuthorizationService, AuthzError, DualWitness},
    configuration::{ClearanceConfiguration, ConfigurationError},
    log::info,
    policy::Department,
    storage::AccumulatorStore,
};
use cosmian_crypto_core::bytes_ser_de::Serializable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error(transparent)]
    Encryption(#[from] abe::Error),
}

/// An encrypted document together with the authority state needed to open it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedDocument {
    pub ciphertext: Vec<u8>,
    pub authority: Vec<u8>,
}

impl std::fmt::Debug for SealedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedDocument")
            .field("ciphertext", &format_args!("{} bytes", self.ciphertext.len()))
            .field("authority", &"<redacted>")
            .finish()
    }
}

impl SealedDocument {
    fn seal(
        ciphertext: &DocumentCiphertext,
        authority: &AuthorityMaterial,
    ) -> Result<Self, abe::Error> {
        Ok(Self {
            ciphertext: ciphertext.serialize()?.to_vec(),
            authority: authority.serialize()?.to_vec(),
        })
    }

    fn open(&self) -> Result<(DocumentCiphertext, AuthorityMaterial), abe::Error> {
        Ok((
            DocumentCiphertext::deserialize(&self.ciphertext)?,
            AuthorityMaterial::deserialize(&self.authority)?,
        ))
    }
}

#[derive(Debug)]
pub struct DocumentGateway<S: AccumulatorStore> {
    authorization: AuthorizationService<S>,
    encryption: EncryptionService,
}

impl<S: AccumulatorStore> DocumentGateway<S> {
    pub fn new(store: Arc<S>, config: &ClearanceConfiguration) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let hierarchy = config.hierarchy()?;
        info!(
            "starting gateway: {} levels, {:?} ordering, {:?} ABE",
            hierarchy.count(),
            hierarchy.ordering(),
            config.abe_mode
        );
        Ok(Self {
            authorization: AuthorizationService::new(
                store,
                hierarchy,
                config.accumulator_seed.as_bytes(),
            ),
            encryption: EncryptionService::new(hierarchy, config.abe_mode),
        })
    }

    #[must_use]
    pub fn authorization(&self) -> &AuthorizationService<S> {
        &self.authorization
    }

    #[must_use]
    pub fn encryption(&self) -> &EncryptionService {
        &self.encryption
    }

    pub async fn enroll(
        &self,
        identifier: &[u8],
        level: u32,
        department: Department,
    ) -> Result<DualWitness, AuthzError> {
        self.authorization.enroll(identifier, level, department).await
    }

    pub async fn check_access(
        &self,
        level: u32,
        department: Department,
        witness: &DualWitness,
    ) -> Result<(), AuthzError> {
        self.authorization.verify(level, department, witness).await
    }

    pub async fn revoke(
        &self,
        identifier: &[u8],
        level: u32,
        department: Department,
    ) -> Result<(), AuthzError> {
        self.authorization.revoke(identifier, level, department).await
    }

    pub async fn refresh(
        &self,
        identifier: &[u8],
        level: u32,
        department: Department,
    ) -> Result<DualWitness, AuthzError> {
        self.authorization.refresh(identifier, level, department).await
    }

    /// Encrypt `plaintext` so that only `department` members with at least
    /// `level` clearance can read it.
    pub fn encrypt_document(
        &self,
        department: Department,
        level: u32,
        plaintext: &[u8],
    ) -> Result<SealedDocument, GatewayError> {
        let (ciphertext, authority) =
            self.encryption.encrypt_document(department, level, plaintext)?;
        Ok(SealedDocument::seal(&ciphertext, &authority)?)
    }

    /// Decrypt as a holder of `(department, level)`.
    pub fn decrypt_document(
        &self,
        department: Department,
        level: u32,
        document: &SealedDocument,
    ) -> Result<Zeroizing<Vec<u8>>, GatewayError> {
        let (ciphertext, authority) = document.open()?;
        Ok(self.encryption.decrypt_document(department, level, &ciphertext, &authority)?)
    }

    /// Upload flow: the writer's credential is checked before the document is
    /// encrypted at the writer's own level.
    pub async fn store_document(
        &self,
        level: u32,
        department: Department,
        witness: &DualWitness,
        plaintext: &[u8],
    ) -> Result<SealedDocument, GatewayError> {
        self.check_access(level, department, witness).await?;
        self.encrypt_document(department, level, plaintext)
    }

    /// Download flow: the reader's credential is checked before decryption.
    pub async fn read_document(
        &self,
        level: u32,
        department: Department,
        witness: &DualWitness,
        document: &SealedDocument,
    ) -> Result<Zeroizing<Vec<u8>>, GatewayError> {
        self.check_access(level, department, witness).await?;
        self.decrypt_document(department, level, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryAccumulatorStore;

    fn gateway() -> DocumentGateway<MemoryAccumulatorStore> {
        let config = ClearanceConfiguration {
            accumulator_seed: "gateway tests".to_string(),
            ..Default::default()
        };
        DocumentGateway::new(Arc::new(MemoryAccumulatorStore::new()), &config).unwrap()
    }

    #[test]
    fn test_unseeded_deployment_is_refused() {
        assert!(matches!(
            DocumentGateway::new(
                Arc::new(MemoryAccumulatorStore::new()),
                &ClearanceConfiguration::default(),
            ),
            Err(ConfigurationError::MissingSeed)
        ));
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let gateway = gateway();
        gateway.enroll(b"writer", 2, Department(1)).await.unwrap();
        let reader = gateway.enroll(b"reader", 3, Department(1)).await.unwrap();
        // enrolling the reader changed the department accumulator
        let writer = gateway.refresh(b"writer", 2, Department(1)).await.unwrap();

        let doc = gateway.store_document(2, Department(1), &writer, b"memo").await.unwrap();
        let plaintext = gateway.read_document(3, Department(1), &reader, &doc).await.unwrap();
        assert_eq!(&plaintext[..], b"memo");

        let json = serde_json::to_string(&doc).unwrap();
        let doc: SealedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(&gateway.decrypt_document(Department(1), 2, &doc).unwrap()[..], b"memo");
    }

    #[tokio::test]
    async fn test_read_is_gated_twice() {
        let gateway = gateway();
        let low = gateway.enroll(b"low", 1, Department(1)).await.unwrap();
        let doc = gateway.encrypt_document(Department(1), 3, b"secret").unwrap();

        // a valid credential is not enough without the clearance
        assert_eq!(
            gateway.read_document(1, Department(1), &low, &doc).await,
            Err(GatewayError::Encryption(abe::Error::PolicyNotSatisfied))
        );
        // claiming a higher level fails the witness check
        assert_eq!(
            gateway.read_document(3, Department(1), &low, &doc).await,
            Err(GatewayError::Authorization(AuthzError::LevelWitnessInvalid))
        );
    }

    #[tokio::test]
    async fn test_revoked_writer_cannot_store() {
        let gateway = gateway();
        let writer = gateway.enroll(b"writer", 0, Department(4)).await.unwrap();
        gateway.revoke(b"writer", 0, Department(4)).await.unwrap();
        assert!(matches!(
            gateway.store_document(0, Department(4), &writer, b"x").await,
            Err(GatewayError::Authorization(_))
        ));
    }

    #[test]
    fn test_malformed_document() {
        let gateway = gateway();
        let doc = gateway.encrypt_document(Department(1), 0, b"x").unwrap();
        let broken = SealedDocument { authority: doc.authority[..8].to_vec(), ..doc };
        assert!(matches!(
            gateway.decrypt_document(Department(1), 0, &broken),
            Err(GatewayError::Encryption(_))
        ));
    }
}
