use crate::{error::PlannerError, schema::field::Field};
use domain_syntax::Condition;
use lazy_static::lazy_static;
use model::core::{field_type::FieldType, identifiers::EntityName};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref ID_FIELD: Field = Field::new(ID, FieldType::Integer);
}

/// Name of the identifier field every entity has.
pub const ID: &str = "id";

/// Name of the materialized hierarchy path column.
pub const PARENT_PATH: &str = "parent_path";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: EntityName,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Field matched when a relation is searched by label.
    #[serde(default = "default_rec_name")]
    pub rec_name: String,
    /// Many2one to the parent record in a hierarchy.
    #[serde(default = "default_parent_name")]
    pub parent_name: String,
    /// Whether the entity maintains `parent_path`.
    #[serde(default)]
    pub parent_store: bool,
}

fn default_rec_name() -> String {
    "name".to_string()
}

fn default_parent_name() -> String {
    "parent_id".to_string()
}

impl Entity {
    pub fn new(name: impl Into<EntityName>) -> Self {
        Self {
            name: name.into(),
            table: None,
            fields: Vec::new(),
            rec_name: default_rec_name(),
            parent_name: default_parent_name(),
            parent_store: false,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_rec_name(mut self, rec_name: impl Into<String>) -> Self {
        self.rec_name = rec_name.into();
        self
    }

    pub fn with_parent_name(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = parent_name.into();
        self
    }

    /// Enables the `parent_path` shortcut and adds the column if missing.
    pub fn with_parent_store(mut self) -> Self {
        self.parent_store = true;
        if self.field(PARENT_PATH).is_none() {
            self.fields.push(Field::new(PARENT_PATH, FieldType::Char));
        }
        self
    }

    pub fn table(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| self.name.default_table())
    }

    /// Looks a field up by name. `id` always resolves.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| (name == ID).then_some(&*ID_FIELD))
    }

    /// The field a condition's expression starts with.
    pub fn condition_field(&self, condition: &Condition) -> Result<&Field, PlannerError> {
        let (head, _) = condition.split_path();
        self.field(head).ok_or_else(|| PlannerError::UnknownField {
            entity: self.name.to_string(),
            field: head.to_string(),
            condition: condition.to_string(),
        })
    }
}
