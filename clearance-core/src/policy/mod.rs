mod access_policy;
mod attribute;
mod compiler;
mod errors;
mod hierarchy;

pub use access_policy::AccessPolicy;
pub use attribute::{QualifiedAttribute, SEPARATOR};
pub use compiler::{
    DEPARTMENT_DIMENSION, LEVEL_DIMENSION, compile, compile_policy, create_attribs,
    department_attribute, level_attribute, policy_attributes,
};
pub use errors::PolicyError as Error;
pub use hierarchy::{
    Department, LevelHierarchy, LevelOrdering, MAX_LEVELS, MIN_LEVELS, SecurityLevel,
};
