use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;

/// Declared storage type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Integer,
    Float,
    Monetary,
    Char,
    Text,
    Html,
    Selection,
    Date,
    Datetime,
    Binary,
    Json,
    Many2one,
    One2many,
    Many2many,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown field type: {0}")]
pub struct UnknownFieldType(pub String);

lazy_static! {
    static ref FIELD_TYPE_MAP: HashMap<&'static str, FieldType> = build_field_type_map();
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Monetary => "monetary",
            FieldType::Char => "char",
            FieldType::Text => "text",
            FieldType::Html => "html",
            FieldType::Selection => "selection",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Binary => "binary",
            FieldType::Json => "json",
            FieldType::Many2one => "many2one",
            FieldType::One2many => "one2many",
            FieldType::Many2many => "many2many",
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            FieldType::Many2one | FieldType::One2many | FieldType::Many2many
        )
    }

    pub fn is_x2many(&self) -> bool {
        matches!(self, FieldType::One2many | FieldType::Many2many)
    }

    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::Char | FieldType::Text | FieldType::Html | FieldType::Selection
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Float | FieldType::Monetary
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Datetime)
    }
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FIELD_TYPE_MAP
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn build_field_type_map() -> HashMap<&'static str, FieldType> {
    use FieldType::*;

    let entries = [
        ("boolean", Boolean),
        ("bool", Boolean),
        ("integer", Integer),
        ("int", Integer),
        ("float", Float),
        ("monetary", Monetary),
        ("char", Char),
        ("varchar", Char),
        ("text", Text),
        ("html", Html),
        ("selection", Selection),
        ("date", Date),
        ("datetime", Datetime),
        ("timestamp", Datetime),
        ("binary", Binary),
        ("json", Json),
        ("many2one", Many2one),
        ("one2many", One2many),
        ("many2many", Many2many),
    ];

    let mut map = HashMap::new();
    for (name, field_type) in entries {
        map.insert(name, field_type);
    }
    map
}
