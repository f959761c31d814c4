use super::Error;
use serde::{Deserialize, Serialize};

/// Smallest supported number of security levels.
pub const MIN_LEVELS: u8 = 3;

/// Largest supported number of security levels.
pub const MAX_LEVELS: u8 = 5;

/// Ordinal of a security level inside a [`LevelHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SecurityLevel(pub(crate) u8);

impl SecurityLevel {
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque department partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Department(pub u32);

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction in which clearance grows along the level ordinals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelOrdering {
    /// A higher ordinal is a higher clearance.
    #[default]
    Ascending,
    /// Ordinal 0 is the highest clearance.
    Descending,
}

/// The configured set of security levels and their ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelHierarchy {
    count: u8,
    ordering: LevelOrdering,
}

impl Default for LevelHierarchy {
    fn default() -> Self {
        Self { count: MAX_LEVELS, ordering: LevelOrdering::default() }
    }
}

impl LevelHierarchy {
    pub fn new(count: u8, ordering: LevelOrdering) -> Result<Self, Error> {
        if !(MIN_LEVELS..=MAX_LEVELS).contains(&count) {
            return Err(Error::InvalidHierarchy(format!(
                "level count must be between {MIN_LEVELS} and {MAX_LEVELS}, got {count}"
            )));
        }
        Ok(Self { count, ordering })
    }

    #[must_use]
    pub fn count(&self) -> u8 {
        self.count
    }

    #[must_use]
    pub fn ordering(&self) -> LevelOrdering {
        self.ordering
    }

    /// Validate a caller-supplied level ordinal.
    pub fn check(&self, level: u32) -> Result<SecurityLevel, Error> {
        u8::try_from(level)
            .ok()
            .filter(|l| *l < self.count)
            .map(SecurityLevel)
            .ok_or(Error::UnknownLevel { level, count: self.count })
    }

    /// All levels, in ascending ordinal order.
    pub fn levels(&self) -> impl Iterator<Item = SecurityLevel> {
        (0..self.count).map(SecurityLevel)
    }

    /// Position of `level` on the clearance scale, 0 being the lowest.
    fn rank(&self, level: SecurityLevel) -> u8 {
        match self.ordering {
            LevelOrdering::Ascending => level.0,
            LevelOrdering::Descending => self.count - 1 - level.0,
        }
    }

    /// Whether a holder cleared at `holder` may read material requiring `required`.
    #[must_use]
    pub fn covers(&self, holder: SecurityLevel, required: SecurityLevel) -> bool {
        self.rank(holder) >= self.rank(required)
    }

    /// `level` and every level of higher clearance, in ascending ordinal order.
    #[must_use]
    pub fn permissive_levels(&self, level: SecurityLevel) -> Vec<SecurityLevel> {
        self.levels().filter(|holder| self.covers(*holder, level)).collect()
    }
}
