use super::{AuthzError, DualWitness};
use crate::{
    accumulator::{self, Accumulator, Element, MembershipWitness, PublicKey, decode_witness},
    log::{debug, info, warn},
    policy::{Department, LevelHierarchy},
    storage::{AccumulatorId, AccumulatorRecord, AccumulatorStore},
};
use cosmian_crypto_core::{CsRng, bytes_ser_de::Serializable, reexport::rand_core::SeedableRng};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use zeroize::Zeroizing;

/// Issues and checks dual (level, department) membership credentials.
///
/// Every accumulator has its own async lock; operations touching both of a
/// requester's accumulators take the two locks in [`AccumulatorId`] order.
/// Verification reads snapshots without locking.
pub struct AuthorizationService<S: AccumulatorStore> {
    store: Arc<S>,
    hierarchy: LevelHierarchy,
    seed: Zeroizing<Vec<u8>>,
    locks: DashMap<AccumulatorId, Arc<AsyncMutex<()>>>,
    rng: Mutex<CsRng>,
}

impl<S: AccumulatorStore> std::fmt::Debug for AuthorizationService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationService")
            .field("hierarchy", &self.hierarchy)
            .field("locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}

/// Both locks of an operation, released on drop.
struct PairGuard {
    _first: OwnedMutexGuard<()>,
    _second: OwnedMutexGuard<()>,
}

impl<S: AccumulatorStore> AuthorizationService<S> {
    /// `seed` is the deployment secret every accumulator key is derived from.
    pub fn new(store: Arc<S>, hierarchy: LevelHierarchy, seed: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            hierarchy,
            seed: Zeroizing::new(seed.into()),
            locks: DashMap::new(),
            rng: Mutex::new(CsRng::from_entropy()),
        }
    }

    #[must_use]
    pub fn hierarchy(&self) -> &LevelHierarchy {
        &self.hierarchy
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn lock_rng(&self) -> Result<MutexGuard<'_, CsRng>, AuthzError> {
        self.rng.lock().map_err(|_| AuthzError::MutexPoisoned)
    }

    fn check_level(&self, level: u32) -> Result<(), AuthzError> {
        self.hierarchy
            .check(level)
            .map(|_| ())
            .map_err(|_| AuthzError::LevelOutOfRange { level, count: self.hierarchy.count() })
    }

    fn ids(level: u32, department: Department) -> (AccumulatorId, AccumulatorId) {
        (AccumulatorId::level(level), AccumulatorId::department(department.0))
    }

    async fn lock_pair(&self, a: AccumulatorId, b: AccumulatorId) -> PairGuard {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        // clone the handles out so no map shard is held across the await
        let first = self.locks.entry(first).or_default().clone();
        let second = self.locks.entry(second).or_default().clone();
        PairGuard { _first: first.lock_owned().await, _second: second.lock_owned().await }
    }

    async fn load_or_create(&self, id: AccumulatorId) -> Result<AccumulatorRecord, AuthzError> {
        if let Some(record) = self.store.load(&id).await? {
            return Ok(record);
        }
        let (sk, pk, acc) = {
            let mut rng = self.lock_rng()?;
            accumulator::create(&id.key_seed(&self.seed), &mut *rng)?
        };
        info!("initialized accumulator {}", id);
        Ok(AccumulatorRecord::new(sk, pk, acc))
    }

    async fn load_existing(&self, id: AccumulatorId) -> Result<AccumulatorRecord, AuthzError> {
        self.store.load(&id).await?.ok_or(AuthzError::NotFound)
    }

    fn issue(
        element: &Element,
        level: &AccumulatorRecord,
        department: &AccumulatorRecord,
    ) -> Result<DualWitness, AuthzError> {
        let encode = |record: &AccumulatorRecord| -> Result<Vec<u8>, AuthzError> {
            let witness = MembershipWitness::new(element, &record.accumulator, &record.secret_key)?;
            Ok(witness.serialize()?.to_vec())
        };
        Ok(DualWitness { level: encode(level)?, department: encode(department)? })
    }

    /// Add `element` to `record` and persist it. On error `record` may hold
    /// the addition while the store does not.
    async fn add_and_save(
        &self,
        id: AccumulatorId,
        record: &mut AccumulatorRecord,
        element: &Element,
    ) -> Result<(), AuthzError> {
        let (acc, _) = record.accumulator.add(&record.secret_key, element)?;
        record.accumulator = acc;
        record.members.insert(element.to_bytes());
        self.store.save(&id, record).await?;
        Ok(())
    }

    /// Enroll `identifier` at `level` in `department` and return its
    /// credential.
    ///
    /// Missing accumulators are created on first use. The level accumulator is
    /// updated and persisted first; if updating or persisting the department
    /// side fails the level addition is undone. An identifier that is already enrolled gets
    /// fresh witnesses without either accumulator changing.
    #[tracing::instrument(skip_all, fields(clearance = level, department = department.0))]
    pub async fn enroll(
        &self,
        identifier: &[u8],
        level: u32,
        department: Department,
    ) -> Result<DualWitness, AuthzError> {
        self.check_level(level)?;
        let element = Element::hash(identifier);
        let (level_id, department_id) = Self::ids(level, department);
        let _guard = self.lock_pair(level_id, department_id).await;

        let mut level_record = self.load_or_create(level_id).await?;
        let mut department_record = self.load_or_create(department_id).await?;

        let level_added = !level_record.contains(&element);
        let department_added = !department_record.contains(&element);
        if !level_added && !department_added {
            debug!("identifier already enrolled, re-issuing");
            return Self::issue(&element, &level_record, &department_record);
        }

        if level_added {
            self.add_and_save(level_id, &mut level_record, &element).await?;
        }

        if department_added {
            let added = self.add_and_save(department_id, &mut department_record, &element).await;
            if let Err(err) = added {
                warn!("updating {} failed, rolling back {}: {}", department_id, level_id, err);
                if level_added {
                    level_record.accumulator =
                        level_record.accumulator.remove(&level_record.secret_key, &element)?;
                    level_record.members.remove(&element.to_bytes());
                    if let Err(rollback) = self.store.save(&level_id, &level_record).await {
                        return Err(AuthzError::PartialEnrollment(format!(
                            "{level_id} holds the identifier but {department_id} does not: \
                             {err}; rollback failed: {rollback}"
                        )));
                    }
                }
                return Err(err);
            }
        }

        info!("enrolled identifier in {} and {}", level_id, department_id);
        Self::issue(&element, &level_record, &department_record)
    }

    /// Check both halves of `witness` against the current accumulators.
    ///
    /// A missing accumulator or an undecodable half fails that half. The
    /// department half must witness the same element as the level half.
    #[tracing::instrument(skip_all, fields(clearance = level, department = department.0))]
    pub async fn verify(
        &self,
        level: u32,
        department: Department,
        witness: &DualWitness,
    ) -> Result<(), AuthzError> {
        self.check_level(level)?;
        let (level_id, department_id) = Self::ids(level, department);

        let level_witness =
            decode_witness(&witness.level).map_err(|_| AuthzError::LevelWitnessInvalid)?;
        if !self.verify_half(level_id, &level_witness).await? {
            debug!("level witness rejected");
            return Err(AuthzError::LevelWitnessInvalid);
        }

        let department_witness = decode_witness(&witness.department)
            .map_err(|_| AuthzError::DepartmentWitnessInvalid)?;
        if department_witness.element() != level_witness.element() {
            debug!("witness halves belong to different identifiers");
            return Err(AuthzError::DepartmentWitnessInvalid);
        }
        if !self.verify_half(department_id, &department_witness).await? {
            debug!("department witness rejected");
            return Err(AuthzError::DepartmentWitnessInvalid);
        }
        Ok(())
    }

    async fn verify_half(
        &self,
        id: AccumulatorId,
        witness: &MembershipWitness,
    ) -> Result<bool, AuthzError> {
        Ok(match self.store.load(&id).await? {
            Some(record) => witness.verify(&record.public_key, &record.accumulator),
            None => false,
        })
    }

    /// Remove `identifier` from both of its accumulators.
    ///
    /// Fails with [`AuthzError::NotFound`], changing nothing, unless the
    /// identifier is a member of both.
    #[tracing::instrument(skip_all, fields(clearance = level, department = department.0))]
    pub async fn revoke(
        &self,
        identifier: &[u8],
        level: u32,
        department: Department,
    ) -> Result<(), AuthzError> {
        self.check_level(level)?;
        let element = Element::hash(identifier);
        let (level_id, department_id) = Self::ids(level, department);
        let _guard = self.lock_pair(level_id, department_id).await;

        let mut level_record = self.load_existing(level_id).await?;
        let mut department_record = self.load_existing(department_id).await?;
        if !level_record.contains(&element) || !department_record.contains(&element) {
            return Err(AuthzError::NotFound);
        }

        level_record.accumulator =
            level_record.accumulator.remove(&level_record.secret_key, &element)?;
        level_record.members.remove(&element.to_bytes());
        self.store.save(&level_id, &level_record).await?;

        department_record.accumulator =
            department_record.accumulator.remove(&department_record.secret_key, &element)?;
        department_record.members.remove(&element.to_bytes());
        if let Err(err) = self.store.save(&department_id, &department_record).await {
            warn!("saving {} failed, restoring {}: {}", department_id, level_id, err);
            let (acc, _) = level_record.accumulator.add(&level_record.secret_key, &element)?;
            level_record.accumulator = acc;
            level_record.members.insert(element.to_bytes());
            if let Err(rollback) = self.store.save(&level_id, &level_record).await {
                return Err(AuthzError::PartialRevocation(format!(
                    "{department_id} holds the identifier but {level_id} does not: \
                     {err}; rollback failed: {rollback}"
                )));
            }
            return Err(err.into());
        }

        info!("revoked identifier from {} and {}", level_id, department_id);
        Ok(())
    }

    /// Re-issue witnesses for a still enrolled identifier against the current
    /// accumulator values.
    #[tracing::instrument(skip_all, fields(clearance = level, department = department.0))]
    pub async fn refresh(
        &self,
        identifier: &[u8],
        level: u32,
        department: Department,
    ) -> Result<DualWitness, AuthzError> {
        self.check_level(level)?;
        let element = Element::hash(identifier);
        let (level_id, department_id) = Self::ids(level, department);
        let _guard = self.lock_pair(level_id, department_id).await;

        let level_record = self.load_existing(level_id).await?;
        let department_record = self.load_existing(department_id).await?;
        if !level_record.contains(&element) || !department_record.contains(&element) {
            return Err(AuthzError::NotFound);
        }
        Self::issue(&element, &level_record, &department_record)
    }

    /// Public state of one accumulator, as needed for holder-side witness
    /// updates. `None` until the accumulator is first used.
    pub async fn public_state(
        &self,
        id: AccumulatorId,
    ) -> Result<Option<(PublicKey, Accumulator)>, AuthzError> {
        Ok(self.store.load(&id).await?.map(|record| (record.public_key, record.accumulator)))
    }
}
