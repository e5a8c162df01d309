use std::fmt;
use thiserror::Error as ThisError;

///
/// IndexName
///
/// A validated collection name: non-empty and free of embedded NUL bytes,
/// since the name crosses into the engine as a C-style identifier. No other
/// formatting constraint is imposed at this layer.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexName(String);

impl IndexName {
    pub fn try_new(name: &str) -> Result<Self, NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.bytes().any(|b| b == 0) {
            return Err(NameError::EmbeddedNul);
        }
        Ok(Self(name.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// NameError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum NameError {
    #[error("index name contains an embedded NUL byte")]
    EmbeddedNul,

    #[error("index name must not be empty")]
    Empty,
}

///
/// TESTS
///
