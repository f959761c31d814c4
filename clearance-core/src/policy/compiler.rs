//! Mapping of `(department, level)` pairs to access policies and to the
//! attributes a holder is granted.
//!
//! [`compile`] and [`create_attribs`] are two views of the same relation and
//! must agree: the policy for `(d, L)` is satisfied by the attributes of
//! `(d', H)` exactly when `d == d'` and `H` covers `L`.

use super::{
    AccessPolicy, Department, Error, LevelHierarchy, QualifiedAttribute, SecurityLevel,
};

/// Dimension of department attributes.
pub const DEPARTMENT_DIMENSION: &str = "department";

/// Dimension of level attributes.
pub const LEVEL_DIMENSION: &str = "level";

#[must_use]
pub fn department_attribute(department: Department) -> QualifiedAttribute {
    QualifiedAttribute::new(DEPARTMENT_DIMENSION, &department.to_string())
}

#[must_use]
pub fn level_attribute(level: SecurityLevel) -> QualifiedAttribute {
    QualifiedAttribute::new(LEVEL_DIMENSION, &level.to_string())
}

/// Policy text protecting a document of `department` at `level`.
///
/// `department:<d> AND (level:<l0> OR level:<l1> ...)`, the disjunction listing
/// `level` and every level of higher clearance in ascending ordinal order.
pub fn compile(hierarchy: &LevelHierarchy, department: Department, level: u32) -> Result<String, Error> {
    let level = hierarchy.check(level)?;
    let levels = hierarchy
        .permissive_levels(level)
        .into_iter()
        .map(|l| level_attribute(l).to_string())
        .collect::<Vec<_>>();

    let disjunction = match levels.as_slice() {
        [single] => single.clone(),
        _ => format!("({})", levels.join(" OR ")),
    };
    Ok(format!("{} AND {disjunction}", department_attribute(department)))
}

/// Parsed form of [`compile`].
pub fn compile_policy(
    hierarchy: &LevelHierarchy,
    department: Department,
    level: u32,
) -> Result<AccessPolicy, Error> {
    AccessPolicy::parse(&compile(hierarchy, department, level)?)
}

/// Attributes granted to a holder of `department` cleared at `level`, split by
/// issuing authority: `(["department:<d>"], ["level:<l>"])`.
pub fn create_attribs(
    hierarchy: &LevelHierarchy,
    department: Department,
    level: u32,
) -> Result<(Vec<String>, Vec<String>), Error> {
    let level = hierarchy.check(level)?;
    Ok((
        vec![department_attribute(department).to_string()],
        vec![level_attribute(level).to_string()],
    ))
}

/// Every attribute the policy for `(department, level)` mentions, split by
/// issuing authority.
pub fn policy_attributes(
    hierarchy: &LevelHierarchy,
    department: Department,
    level: u32,
) -> Result<(Vec<QualifiedAttribute>, Vec<QualifiedAttribute>), Error> {
    let level = hierarchy.check(level)?;
    Ok((
        vec![department_attribute(department)],
        hierarchy.permissive_levels(level).into_iter().map(level_attribute).collect(),
    ))
}
