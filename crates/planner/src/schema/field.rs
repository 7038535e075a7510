use crate::{error::PlannerError, query::lower::SqlContext, schema::entity::Entity};
use domain_syntax::{Condition, ConditionValue, Domain, Operator};
use model::core::{field_type::FieldType, identifiers::EntityName};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

type SearchFn =
    dyn Fn(&Entity, Operator, &ConditionValue) -> Result<Domain, PlannerError> + Send + Sync;
type SqlFn = dyn Fn(&Condition, &str, &mut SqlContext<'_>) -> Result<(), PlannerError> + Send + Sync;

/// Rewrites a condition on a non-stored field into a domain over stored fields.
#[derive(Clone)]
pub struct SearchHook(Arc<SearchFn>);

/// Writes the SQL for one normalized condition, given the table alias.
#[derive(Clone)]
pub struct SqlHook(Arc<SqlFn>);

impl SearchHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Entity, Operator, &ConditionValue) -> Result<Domain, PlannerError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(
        &self,
        entity: &Entity,
        operator: Operator,
        value: &ConditionValue,
    ) -> Result<Domain, PlannerError> {
        (self.0)(entity, operator, value)
    }
}

impl SqlHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Condition, &str, &mut SqlContext<'_>) -> Result<(), PlannerError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(
        &self,
        condition: &Condition,
        alias: &str,
        ctx: &mut SqlContext,
    ) -> Result<(), PlannerError> {
        (self.0)(condition, alias, ctx)
    }
}

impl fmt::Debug for SearchHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SearchHook")
    }
}

impl fmt::Debug for SqlHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SqlHook")
    }
}

/// The link table behind a many2many field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub table: String,
    /// Column pointing at the owning record.
    pub column1: String,
    /// Column pointing at the related record.
    pub column2: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "default_stored")]
    pub stored: bool,
    #[serde(default)]
    pub comodel: Option<EntityName>,
    /// Many2one on the comodel pointing back here (one2many only).
    #[serde(default)]
    pub inverse_name: Option<String>,
    #[serde(default)]
    pub relation: Option<Relation>,
    /// Binary content kept outside the table.
    #[serde(default)]
    pub attachment: bool,
    /// Many2one through which the field is inherited from a parent entity.
    #[serde(default)]
    pub delegated_via: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(skip)]
    pub search: Option<SearchHook>,
    #[serde(skip)]
    pub sql: Option<SqlHook>,
}

fn default_stored() -> bool {
    true
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            stored: true,
            comodel: None,
            inverse_name: None,
            relation: None,
            attachment: false,
            delegated_via: None,
            column: None,
            search: None,
            sql: None,
        }
    }

    pub fn many2one(name: impl Into<String>, comodel: impl Into<EntityName>) -> Self {
        Self::new(name, FieldType::Many2one).with_comodel(comodel)
    }

    pub fn one2many(
        name: impl Into<String>,
        comodel: impl Into<EntityName>,
        inverse_name: impl Into<String>,
    ) -> Self {
        let mut field = Self::new(name, FieldType::One2many).with_comodel(comodel);
        field.inverse_name = Some(inverse_name.into());
        field
    }

    pub fn many2many(name: impl Into<String>, comodel: impl Into<EntityName>) -> Self {
        Self::new(name, FieldType::Many2many).with_comodel(comodel)
    }

    pub fn with_comodel(mut self, comodel: impl Into<EntityName>) -> Self {
        self.comodel = Some(comodel.into());
        self
    }

    pub fn with_relation(
        mut self,
        table: impl Into<String>,
        column1: impl Into<String>,
        column2: impl Into<String>,
    ) -> Self {
        self.relation = Some(Relation {
            table: table.into(),
            column1: column1.into(),
            column2: column2.into(),
        });
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Marks the field as computed, with no column of its own.
    pub fn computed(mut self) -> Self {
        self.stored = false;
        self
    }

    pub fn as_attachment(mut self) -> Self {
        self.attachment = true;
        self
    }

    pub fn delegated(mut self, link: impl Into<String>) -> Self {
        self.delegated_via = Some(link.into());
        self.stored = false;
        self
    }

    pub fn with_search(mut self, hook: SearchHook) -> Self {
        self.search = Some(hook);
        self
    }

    pub fn with_sql(mut self, hook: SqlHook) -> Self {
        self.sql = Some(hook);
        self
    }

    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    pub fn is_relational(&self) -> bool {
        self.field_type.is_relational()
    }

    /// Whether conditions on the field can be lowered to SQL.
    pub fn is_searchable(&self) -> bool {
        self.stored || self.sql.is_some()
    }
}
