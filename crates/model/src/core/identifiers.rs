use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Identifier of a stored record.
pub type RecordId = i64;

/// Name of an entity type, e.g. `res.partner`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityName(Arc<str>);

impl EntityName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::from(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default table name: dots become underscores.
    pub fn default_table(&self) -> String {
        self.0.replace('.', "_")
    }
}

impl From<String> for EntityName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for EntityName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
