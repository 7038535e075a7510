//! Lowers an optimized domain into one parameterized SQL boolean expression.

use crate::{
    error::PlannerError,
    optimizer::driver::OptimizedDomain,
    query::{
        dialect::Dialect,
        renderer::{ColumnRef, Ident, Renderer},
    },
    schema::{
        catalog::Catalog,
        entity::{Entity, ID},
        field::{Field, Relation},
    },
};
use domain_syntax::{Condition, ConditionValue, Domain, NaryKind, OptLevel, Operator, ValueSet};
use model::core::{field_type::FieldType, value::Value};
use tracing::debug;

/// State shared while lowering one domain, nested sub-selects included.
pub struct SqlContext<'a> {
    pub renderer: Renderer<'a>,
    catalog: &'a dyn Catalog,
    aliases: usize,
}

impl<'a> SqlContext<'a> {
    pub fn new(catalog: &'a dyn Catalog, dialect: &'a dyn Dialect) -> Self {
        Self {
            renderer: Renderer::new(dialect),
            catalog,
            aliases: 0,
        }
    }

    pub fn catalog(&self) -> &'a dyn Catalog {
        self.catalog
    }

    /// A fresh alias for a table joined in a sub-select.
    pub fn next_alias(&mut self, table: &str) -> String {
        self.aliases += 1;
        format!("{table}__{}", self.aliases)
    }

    pub fn push_sql(&mut self, sql: &str) {
        self.renderer.sql.push_str(sql);
    }

    pub fn add_param(&mut self, value: Value) {
        self.renderer.add_param(value);
    }

    /// Renders `"alias"."column"`.
    pub fn column(&mut self, alias: &str, column: &str) -> String {
        self.renderer.fragment(&Ident::qualified(alias, column))
    }

    /// Appends the SQL for `domain`, evaluated on the rows of `entity`
    /// reachable as `alias`.
    pub fn lower(&mut self, domain: &Domain, entity: &Entity, alias: &str) -> Result<(), PlannerError> {
        match domain {
            Domain::Constant(true) => self.push_sql("TRUE"),
            Domain::Constant(false) => self.push_sql("FALSE"),
            Domain::Not(inner) => {
                self.push_sql("(");
                self.lower(inner, entity, alias)?;
                self.push_sql(") IS NOT TRUE");
            }
            Domain::And(_) | Domain::Or(_) => {
                let separator = match domain.nary_kind() {
                    Some(NaryKind::And) => " AND ",
                    _ => " OR ",
                };
                self.push_sql("(");
                for (i, child) in domain.children().iter().enumerate() {
                    if i > 0 {
                        self.push_sql(separator);
                    }
                    self.lower(child, entity, alias)?;
                }
                self.push_sql(")");
            }
            Domain::Condition(condition) => self.lower_condition(condition, entity, alias)?,
        }
        Ok(())
    }

    fn lower_condition(
        &mut self,
        condition: &Condition,
        entity: &Entity,
        alias: &str,
    ) -> Result<(), PlannerError> {
        let field = entity.condition_field(condition)?;
        if let Some(hook) = &field.sql {
            return hook.call(condition, alias, self);
        }

        match condition.operator {
            Operator::Any | Operator::NotAny => self.lower_traversal(condition, field, entity, alias),
            _ => {
                let column = column_ref(condition, field, alias);
                let textual = field.field_type.is_textual() || matches!(column, ColumnRef::JsonPath { .. });
                let column = self.renderer.fragment(&column);
                self.lower_comparison(condition, &column, textual)
            }
        }
    }

    fn lower_comparison(
        &mut self,
        condition: &Condition,
        column: &str,
        textual: bool,
    ) -> Result<(), PlannerError> {
        let value = match (&condition.value, condition.operator) {
            (ConditionValue::Set(set), Operator::In | Operator::NotIn) => {
                self.lower_membership(column, set, condition.operator == Operator::NotIn);
                return Ok(());
            }
            (ConditionValue::Scalar(value), _) => value,
            (other, op) => {
                return Err(PlannerError::type_mismatch(
                    condition,
                    format!("cannot lower '{op}' with a {}", other.kind()),
                ));
            }
        };

        if condition.operator.is_pattern() {
            return self.lower_pattern(condition, column, value, textual);
        }

        match (condition.operator, value) {
            (Operator::Equal, Value::Null) => self.push_sql(&format!("{column} IS NULL")),
            (Operator::NotEqual, Value::Null) => self.push_sql(&format!("{column} IS NOT NULL")),
            (Operator::Equal, value) => {
                let p = self.renderer.fragment(value);
                self.push_sql(&format!("{column} = {p}"));
            }
            (Operator::NotEqual, value) => {
                let p = self.renderer.fragment(value);
                self.push_sql(&format!("({column} <> {p} OR {column} IS NULL)"));
            }
            (op, value) if op.is_ordering() => {
                let p = self.renderer.fragment(value);
                self.push_sql(&format!("{column} {op} {p}"));
            }
            (op, _) => {
                return Err(PlannerError::invalid(
                    condition,
                    format!("operator '{op}' has no SQL form"),
                ));
            }
        }
        Ok(())
    }

    /// `in`/`not in`, where a null member stands for "not set".
    fn lower_membership(&mut self, column: &str, set: &ValueSet, negated: bool) {
        let values: Vec<&Value> = set.iter().filter(|v| !v.is_null()).collect();
        let has_null = set.contains_null();

        if values.is_empty() {
            let sql = match (negated, has_null) {
                (false, true) => format!("{column} IS NULL"),
                (true, true) => format!("{column} IS NOT NULL"),
                (false, false) => "FALSE".to_string(),
                (true, false) => "TRUE".to_string(),
            };
            self.push_sql(&sql);
            return;
        }

        let list = if let [value] = values.as_slice() {
            let p = self.renderer.fragment(*value);
            let op = if negated { "<>" } else { "=" };
            format!("{column} {op} {p}")
        } else {
            let placeholders = values
                .iter()
                .map(|value| self.renderer.fragment(*value))
                .collect::<Vec<_>>()
                .join(", ");
            let op = if negated { "NOT IN" } else { "IN" };
            format!("{column} {op} ({placeholders})")
        };

        let sql = match (negated, has_null) {
            (false, false) => list,
            (false, true) | (true, false) => format!("({list} OR {column} IS NULL)"),
            (true, true) => format!("({list} AND {column} IS NOT NULL)"),
        };
        self.push_sql(&sql);
    }

    fn lower_pattern(
        &mut self,
        condition: &Condition,
        column: &str,
        value: &Value,
        textual: bool,
    ) -> Result<(), PlannerError> {
        let text = value.as_str().ok_or_else(|| {
            PlannerError::type_mismatch(condition, format!("{value} is not a pattern"))
        })?;
        let positive = condition.operator.positive();
        let negated = condition.operator.is_negative();

        let pattern = match positive {
            Operator::Like | Operator::ILike => format!("%{text}%"),
            _ => text.to_string(),
        };
        let expr = if textual {
            column.to_string()
        } else {
            self.renderer.dialect.cast_to_text(column)
        };
        let p = self.renderer.fragment(&Value::String(pattern));

        let test = match positive {
            Operator::ILike | Operator::EqILike => self.renderer.dialect.ilike(&expr, &p, negated),
            _ if negated => format!("{expr} NOT LIKE {p}"),
            _ => format!("{expr} LIKE {p}"),
        };
        if negated {
            self.push_sql(&format!("({test} OR {column} IS NULL)"));
        } else {
            self.push_sql(&test);
        }
        Ok(())
    }

    fn lower_traversal(
        &mut self,
        condition: &Condition,
        field: &Field,
        entity: &Entity,
        alias: &str,
    ) -> Result<(), PlannerError> {
        let negated = condition.operator == Operator::NotAny;
        let not = if negated { "NOT " } else { "" };
        let catalog = self.catalog;

        if field.name == ID {
            let id = self.column(alias, ID);
            self.push_sql(&format!("{id} {not}IN ("));
            self.select_ids(condition, entity)?;
            self.push_sql(")");
            return Ok(());
        }

        let comodel = field.comodel.as_ref().ok_or_else(|| {
            PlannerError::invalid(condition, format!("'{}' has no related entity", field.name))
        })?;
        let target = catalog.require_entity(comodel)?;

        match field.field_type {
            FieldType::Many2one => {
                let column = self.column(alias, field.column_name());
                if negated {
                    self.push_sql(&format!("({column} IS NULL OR {column} NOT IN ("));
                    self.select_ids(condition, target)?;
                    self.push_sql("))");
                } else {
                    self.push_sql(&format!("{column} IN ("));
                    self.select_ids(condition, target)?;
                    self.push_sql(")");
                }
            }
            FieldType::One2many => {
                let inverse = field.inverse_name.as_deref().ok_or_else(|| {
                    PlannerError::invalid(condition, format!("'{}' has no inverse field", field.name))
                })?;
                let inverse = target
                    .field(inverse)
                    .map(|f| f.column_name().to_string())
                    .unwrap_or_else(|| inverse.to_string());
                let table = target.table();
                let sub = self.next_alias(&table);
                let head = format!(
                    "{not}EXISTS (SELECT 1 FROM {} AS {} WHERE {} = {} AND ",
                    self.renderer.fragment(&Ident::new(&table)),
                    self.renderer.fragment(&Ident::new(&sub)),
                    self.column(&sub, &inverse),
                    self.column(alias, ID),
                );
                self.push_sql(&head);
                self.filter(condition, target, &sub)?;
                self.push_sql(")");
            }
            FieldType::Many2many => {
                let relation = match &field.relation {
                    Some(relation) => relation.clone(),
                    None => default_relation(condition, entity, target)?,
                };
                let rel = self.next_alias(&relation.table);
                let head = format!(
                    "{not}EXISTS (SELECT 1 FROM {} AS {} WHERE {} = {} AND {} IN (",
                    self.renderer.fragment(&Ident::new(&relation.table)),
                    self.renderer.fragment(&Ident::new(&rel)),
                    self.column(&rel, &relation.column1),
                    self.column(alias, ID),
                    self.column(&rel, &relation.column2),
                );
                self.push_sql(&head);
                self.select_ids(condition, target)?;
                self.push_sql("))");
            }
            other => {
                return Err(PlannerError::invalid(
                    condition,
                    format!("cannot traverse a {other} field"),
                ));
            }
        }
        Ok(())
    }

    /// `SELECT id FROM target WHERE <sub-domain>`, or the opaque query itself.
    fn select_ids(&mut self, condition: &Condition, target: &Entity) -> Result<(), PlannerError> {
        match &condition.value {
            ConditionValue::SubDomain(domain) => {
                let table = target.table();
                let sub = self.next_alias(&table);
                let head = format!(
                    "SELECT {} FROM {} AS {} WHERE ",
                    self.column(&sub, ID),
                    self.renderer.fragment(&Ident::new(&table)),
                    self.renderer.fragment(&Ident::new(&sub)),
                );
                self.push_sql(&head);
                self.lower(domain, target, &sub)
            }
            ConditionValue::Query(query) => self.renderer.push_query(query),
            other => Err(PlannerError::type_mismatch(
                condition,
                format!("'{}' expects a domain, got {}", condition.operator, other.kind()),
            )),
        }
    }

    /// Restriction on rows of `target` already bound to `alias`.
    fn filter(&mut self, condition: &Condition, target: &Entity, alias: &str) -> Result<(), PlannerError> {
        match &condition.value {
            ConditionValue::SubDomain(domain) => self.lower(domain, target, alias),
            ConditionValue::Query(query) => {
                let id = self.column(alias, ID);
                self.push_sql(&format!("{id} IN ("));
                self.renderer.push_query(query)?;
                self.push_sql(")");
                Ok(())
            }
            other => Err(PlannerError::type_mismatch(
                condition,
                format!("'{}' expects a domain, got {}", condition.operator, other.kind()),
            )),
        }
    }
}

fn column_ref(condition: &Condition, field: &Field, alias: &str) -> ColumnRef {
    let column = Ident::qualified(alias, field.column_name());
    match condition.split_path() {
        (_, Some(rest)) if field.field_type == FieldType::Json => ColumnRef::JsonPath {
            column,
            path: rest.split('.').map(str::to_string).collect(),
        },
        _ => ColumnRef::Column(column),
    }
}

/// Link table used when a many2many declares none: both tables sorted and
/// joined, with `<table>_id` columns.
///
/// A many2many onto its own table must declare its relation, since both
/// columns would otherwise share one name.
pub fn default_relation(
    condition: &Condition,
    entity: &Entity,
    comodel: &Entity,
) -> Result<Relation, PlannerError> {
    let (table, cotable) = (entity.table(), comodel.table());
    if table == cotable {
        return Err(PlannerError::invalid(
            condition,
            format!(
                "many2many from '{}' to itself declares no relation table",
                entity.name
            ),
        ));
    }

    let mut tables = [table.as_str(), cotable.as_str()];
    tables.sort_unstable();
    Ok(Relation {
        table: format!("{}_{}_rel", tables[0], tables[1]),
        column1: format!("{table}_id"),
        column2: format!("{cotable}_id"),
    })
}

/// Lowers a domain optimized at the `ToSql` level into SQL text and its
/// bound parameters. The root table is referenced as `alias`, or by its
/// own name.
pub fn to_sql(
    domain: &OptimizedDomain,
    catalog: &dyn Catalog,
    dialect: &dyn Dialect,
    alias: Option<&str>,
) -> Result<(String, Vec<Value>), PlannerError> {
    domain.require_level(OptLevel::ToSql)?;
    let entity = catalog.require_entity(domain.entity())?;
    let alias = alias.map_or_else(|| entity.table(), str::to_string);

    let mut ctx = SqlContext::new(catalog, dialect);
    ctx.lower(domain.domain(), entity, &alias)?;
    let (sql, params) = ctx.renderer.finish();

    debug!(
        "Lowered domain for '{}' to {} SQL with {} parameters",
        entity.name,
        dialect.name(),
        params.len()
    );
    Ok((sql, params))
}
