use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Separator between the dimension and the name of an attribute.
pub const SEPARATOR: char = ':';

/// An attribute string of the form `dimension:name`, e.g. `level:3`.
#[derive(Hash, PartialEq, Eq, Clone, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedAttribute {
    pub dimension: String,
    pub name: String,
}

impl QualifiedAttribute {
    #[must_use]
    pub fn new(dimension: &str, name: &str) -> Self {
        Self { dimension: dimension.to_owned(), name: name.to_owned() }
    }

    /// Bytes hashed into the attribute's group element.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl Debug for QualifiedAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.dimension, self.name)
    }
}

impl std::fmt::Display for QualifiedAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.dimension, self.name)
    }
}

impl From<QualifiedAttribute> for String {
    fn from(attr: QualifiedAttribute) -> Self {
        attr.to_string()
    }
}

impl From<(&str, &str)> for QualifiedAttribute {
    fn from(input: (&str, &str)) -> Self {
        Self::new(input.0, input.1)
    }
}

impl TryFrom<&str> for QualifiedAttribute {
    type Error = crate::policy::errors::PolicyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let (dimension, name) = s.split_once(SEPARATOR).ok_or_else(|| {
            crate::policy::errors::PolicyError::InvalidAttribute(format!(
                "at least one separator '{SEPARATOR}' expected in {s}"
            ))
        })?;

        if name.contains(SEPARATOR) {
            return Err(crate::policy::errors::PolicyError::InvalidAttribute(format!(
                "separator '{SEPARATOR}' expected only once in {s}"
            )));
        }

        let (dimension, name) = (dimension.trim(), name.trim());
        if dimension.is_empty() || name.is_empty() {
            return Err(crate::policy::errors::PolicyError::InvalidAttribute(format!(
                "empty dimension or empty name in {s}"
            )));
        }

        Ok(Self::new(dimension, name))
    }
}

impl TryFrom<String> for QualifiedAttribute {
    type Error = crate::policy::errors::PolicyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}
