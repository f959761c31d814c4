use super::*;

pub const DEPLOYMENT_SEED: &str = "clearance-core scenario tests";

pub fn configuration(mode: AbeMode, ordering: LevelOrdering) -> ClearanceConfiguration {
    ClearanceConfiguration {
        level_count: 5,
        ordering,
        abe_mode: mode,
        accumulator_seed: DEPLOYMENT_SEED.to_string(),
    }
}

pub fn memory_gateway(
    mode: AbeMode,
    ordering: LevelOrdering,
) -> Result<DocumentGateway<MemoryAccumulatorStore>> {
    Ok(DocumentGateway::new(
        Arc::new(MemoryAccumulatorStore::new()),
        &configuration(mode, ordering),
    )?)
}

/// Every mode and ordering combination a deployment can run.
pub fn deployments() -> Vec<(AbeMode, LevelOrdering)> {
    let mut res = Vec::new();
    for mode in [AbeMode::Single, AbeMode::Multi] {
        for ordering in [LevelOrdering::Ascending, LevelOrdering::Descending] {
            res.push((mode, ordering));
        }
    }
    res
}

#[derive(Debug, Clone)]
pub struct Employee {
    pub id: String,
    pub level: u32,
    pub department: Department,
}

impl Employee {
    pub fn new(id: &str, level: u32, department: u32) -> Self {
        Self { id: id.to_string(), level, department: Department(department) }
    }

    pub async fn enroll<S: AccumulatorStore>(
        &self,
        gateway: &DocumentGateway<S>,
    ) -> Result<DualWitness, AuthzError> {
        gateway.enroll(self.id.as_bytes(), self.level, self.department).await
    }

    pub async fn refresh<S: AccumulatorStore>(
        &self,
        gateway: &DocumentGateway<S>,
    ) -> Result<DualWitness, AuthzError> {
        gateway.refresh(self.id.as_bytes(), self.level, self.department).await
    }

    pub async fn check<S: AccumulatorStore>(
        &self,
        gateway: &DocumentGateway<S>,
        witness: &DualWitness,
    ) -> Result<(), AuthzError> {
        gateway.check_access(self.level, self.department, witness).await
    }
}
