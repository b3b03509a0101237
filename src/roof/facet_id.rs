use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a roof facet or flat-roof zone ("front", "left", "center", ...).
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct FacetId(String);

impl From<&str> for FacetId {
    fn from(value: &str) -> Self {
        Self(value.to_lowercase())
    }
}

impl From<String> for FacetId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl FacetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl PartialEq<&str> for FacetId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
