use model::core::identifiers::EntityName;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Ordered optimization stages. A domain optimized at some level is also
/// optimized at every lower level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptLevel {
    Basic,
    SearchAndAccess,
    ToSql,
}

impl OptLevel {
    pub const ALL: [OptLevel; 3] = [OptLevel::Basic, OptLevel::SearchAndAccess, OptLevel::ToSql];

    /// Levels up to and including `self`, lowest first.
    pub fn up_to(self) -> impl Iterator<Item = OptLevel> {
        Self::ALL.into_iter().filter(move |level| *level <= self)
    }
}

impl fmt::Display for OptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptLevel::Basic => write!(f, "basic"),
            OptLevel::SearchAndAccess => write!(f, "search"),
            OptLevel::ToSql => write!(f, "sql"),
        }
    }
}

impl FromStr for OptLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(OptLevel::Basic),
            "search" | "search_and_access" => Ok(OptLevel::SearchAndAccess),
            "sql" | "to_sql" => Ok(OptLevel::ToSql),
            other => Err(format!("unknown optimization level '{other}'")),
        }
    }
}

/// Records the entity and level a node was produced for.
///
/// Marks ride along on freshly built nodes and never take part in
/// equality or hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptMark {
    pub entity: EntityName,
    pub level: OptLevel,
}

impl OptMark {
    pub fn new(entity: EntityName, level: OptLevel) -> Self {
        Self { entity, level }
    }

    /// Whether a node carrying this mark already satisfies a request.
    pub fn covers(&self, entity: &EntityName, level: OptLevel) -> bool {
        &self.entity == entity && self.level >= level
    }
}
