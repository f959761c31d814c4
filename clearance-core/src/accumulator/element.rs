use super::Error;
use crate::crypto::{
    Scalar,
    hash::{DOMAIN_ELEMENT, hash_to_scalar},
    pairing::{SCALAR_BYTES, scalar_from_bytes, scalar_to_bytes},
};

/// Encoded form of an [`Element`], used as a set key.
pub type ElementBytes = [u8; SCALAR_BYTES];

/// A member of an accumulated set.
///
/// Elements are derived from caller identifiers (typically a base64 public
/// key); identical identifiers always map to the same element, which is what
/// makes later removal possible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element(pub(crate) Scalar);

impl Element {
    #[must_use]
    pub fn hash(identifier: &[u8]) -> Self {
        Self(hash_to_scalar(DOMAIN_ELEMENT, identifier))
    }

    #[must_use]
    pub fn to_bytes(&self) -> ElementBytes {
        scalar_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &ElementBytes) -> Result<Self, Error> {
        Ok(Self(scalar_from_bytes(bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_determinism() {
        assert_eq!(Element::hash(b"alskjdfhiuaf"), Element::hash(b"alskjdfhiuaf"));
        assert_ne!(Element::hash(b"alskjdfhiuaf"), Element::hash(b"wrong_user"));
    }

    #[test]
    fn test_element_bytes() {
        let element = Element::hash(b"user_id");
        assert_eq!(Element::from_bytes(&element.to_bytes()).unwrap(), element);
    }
}
