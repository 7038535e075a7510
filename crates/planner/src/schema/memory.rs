//! A catalog holding entities and records in memory.
//!
//! Searches optimize the domain at the search level and evaluate it over
//! the stored records, following the same null semantics as the SQL
//! lowering.

use crate::{
    error::PlannerError,
    optimizer::driver::Optimizer,
    schema::{
        catalog::Catalog,
        entity::{Entity, ID},
        field::Field,
    },
};
use domain_syntax::{Condition, ConditionValue, Domain, OptLevel, Operator, ValueSet};
use model::core::{
    field_type::FieldType,
    identifiers::{EntityName, RecordId},
    utils::{parse_date, parse_datetime},
    value::Value,
};
use serde::Deserialize;
use std::{cmp::Ordering, collections::BTreeMap};
use tracing::debug;

pub type Record = serde_json::Map<String, serde_json::Value>;

/// On-disk form of a catalog.
#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub records: BTreeMap<String, Vec<Record>>,
}

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entities: BTreeMap<EntityName, Entity>,
    records: BTreeMap<EntityName, Vec<Record>>,
    optimizer: Optimizer,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: CatalogDocument) -> Self {
        let mut catalog = document
            .entities
            .into_iter()
            .fold(Self::new(), Self::with_entity);
        for (name, records) in document.records {
            catalog = catalog.with_records(name, records);
        }
        catalog
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::from_document)
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn with_records(mut self, entity: impl Into<EntityName>, records: Vec<Record>) -> Self {
        self.records.entry(entity.into()).or_default().extend(records);
        self
    }

    /// Adds records given as a JSON array of objects.
    pub fn with_json_records(
        self,
        entity: impl Into<EntityName>,
        records: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let records: Vec<Record> = serde_json::from_value(records)?;
        Ok(self.with_records(entity, records))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    fn records(&self, entity: &EntityName) -> &[Record] {
        self.records.get(entity).map(Vec::as_slice).unwrap_or_default()
    }

    fn record(&self, entity: &EntityName, id: RecordId) -> Option<&Record> {
        self.records(entity)
            .iter()
            .find(|record| record_id(record) == Some(id))
    }

    fn matches(&self, entity: &Entity, record: &Record, domain: &Domain) -> Result<bool, PlannerError> {
        match domain {
            Domain::Constant(v) => Ok(*v),
            Domain::Not(inner) => Ok(!self.matches(entity, record, inner)?),
            Domain::And(_) => {
                for child in domain.children() {
                    if !self.matches(entity, record, child)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Domain::Or(_) => {
                for child in domain.children() {
                    if self.matches(entity, record, child)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Domain::Condition(condition) => self.matches_condition(entity, record, condition),
        }
    }

    fn matches_condition(
        &self,
        entity: &Entity,
        record: &Record,
        condition: &Condition,
    ) -> Result<bool, PlannerError> {
        let field = entity.condition_field(condition)?;

        if matches!(condition.operator, Operator::Any | Operator::NotAny) {
            let any = self.matches_related(entity, record, field, condition)?;
            return Ok(any == (condition.operator == Operator::Any));
        }

        let value = match condition.split_path() {
            (_, Some(path)) => json_path(record.get(&field.name), path),
            (_, None) => field_value(field, record.get(&field.name)),
        };

        match (&condition.value, condition.operator) {
            (ConditionValue::Set(set), Operator::In) => Ok(contains(set, &value)),
            (ConditionValue::Set(set), Operator::NotIn) => Ok(!contains(set, &value)),
            (ConditionValue::Scalar(expected), Operator::Equal) => Ok(equals(&value, expected)),
            (ConditionValue::Scalar(expected), Operator::NotEqual) => Ok(!equals(&value, expected)),
            (ConditionValue::Scalar(expected), op) if op.is_ordering() => {
                Ok(match value.compare(expected) {
                    Some(ordering) => match op {
                        Operator::LessThan => ordering == Ordering::Less,
                        Operator::GreaterThan => ordering == Ordering::Greater,
                        Operator::LessOrEqual => ordering != Ordering::Greater,
                        _ => ordering != Ordering::Less,
                    },
                    None => false,
                })
            }
            (ConditionValue::Scalar(Value::String(pattern)), op) if op.is_pattern() => {
                Ok(matches_pattern(op, pattern, &value))
            }
            (other, op) => Err(PlannerError::Search(format!(
                "cannot evaluate '{op}' with a {} in memory: {condition}",
                other.kind()
            ))),
        }
    }

    /// Whether some record related through `field` satisfies the nested domain.
    fn matches_related(
        &self,
        entity: &Entity,
        record: &Record,
        field: &Field,
        condition: &Condition,
    ) -> Result<bool, PlannerError> {
        let domain = match &condition.value {
            ConditionValue::SubDomain(domain) => domain,
            other => {
                return Err(PlannerError::Search(format!(
                    "cannot evaluate a {} in memory: {condition}",
                    other.kind()
                )));
            }
        };

        if field.name == ID {
            return self.matches(entity, record, domain);
        }

        let target = self.require_entity(field.comodel.as_ref().ok_or_else(|| {
            PlannerError::invalid(condition, format!("'{}' has no related entity", field.name))
        })?)?;

        let related: Vec<&Record> = match field.field_type {
            FieldType::Many2one => record
                .get(&field.name)
                .and_then(serde_json::Value::as_i64)
                .and_then(|id| self.record(&target.name, id))
                .into_iter()
                .collect(),
            FieldType::One2many => {
                let (Some(id), Some(inverse)) = (record_id(record), field.inverse_name.as_deref())
                else {
                    return Ok(false);
                };
                self.records(&target.name)
                    .iter()
                    .filter(|r| r.get(inverse).and_then(serde_json::Value::as_i64) == Some(id))
                    .collect()
            }
            FieldType::Many2many => record
                .get(&field.name)
                .and_then(serde_json::Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(serde_json::Value::as_i64)
                .filter_map(|id| self.record(&target.name, id))
                .collect(),
            other => {
                return Err(PlannerError::invalid(
                    condition,
                    format!("cannot traverse a {other} field"),
                ));
            }
        };

        for related in related {
            if self.matches(target, related, domain)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Catalog for MemoryCatalog {
    fn entity(&self, name: &EntityName) -> Option<&Entity> {
        self.entities.get(name)
    }

    fn search(&self, entity: &Entity, domain: &Domain) -> Result<Vec<RecordId>, PlannerError> {
        let optimized = self
            .optimizer
            .optimize(domain.clone(), entity, self, OptLevel::SearchAndAccess)?;

        let mut ids = Vec::new();
        for record in self.records(&entity.name) {
            if let Some(id) = record_id(record)
                && self.matches(entity, record, optimized.domain())?
            {
                ids.push(id);
            }
        }

        debug!(
            "Searched '{}' with {}: {} records",
            entity.name,
            optimized,
            ids.len()
        );
        Ok(ids)
    }

    fn read(
        &self,
        entity: &Entity,
        ids: &[RecordId],
        field: &str,
    ) -> Result<Vec<(RecordId, Value)>, PlannerError> {
        let field = entity.field(field).ok_or_else(|| PlannerError::UnknownField {
            entity: entity.name.to_string(),
            field: field.to_string(),
            condition: format!("read({field})"),
        })?;

        Ok(ids
            .iter()
            .filter_map(|id| {
                self.record(&entity.name, *id)
                    .map(|record| (*id, field_value(field, record.get(&field.name))))
            })
            .collect())
    }
}

fn record_id(record: &Record) -> Option<RecordId> {
    record.get(ID).and_then(serde_json::Value::as_i64)
}

/// Converts a stored JSON value according to the declared field type.
fn field_value(field: &Field, json: Option<&serde_json::Value>) -> Value {
    let json = match (field.field_type, json) {
        (FieldType::Boolean, None | Some(serde_json::Value::Null)) => return Value::Boolean(false),
        (_, None) => return Value::Null,
        (_, Some(json)) => json,
    };
    match (field.field_type, json) {
        (FieldType::Date, serde_json::Value::String(raw)) => parse_date(raw)
            .map(Value::Date)
            .unwrap_or_else(|| Value::String(raw.clone())),
        (FieldType::Datetime, serde_json::Value::String(raw)) => parse_datetime(raw)
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::String(raw.clone())),
        _ => Value::from_json(json).unwrap_or(Value::Null),
    }
}

/// Property at a dotted path inside a JSON field, as text like the SQL
/// dialects return it.
fn json_path(json: Option<&serde_json::Value>, path: &str) -> Value {
    let Some(json) = json else {
        return Value::Null;
    };
    match path.split('.').try_fold(json, |node, key| node.get(key)) {
        None | Some(serde_json::Value::Null) => Value::Null,
        Some(serde_json::Value::String(s)) => Value::String(s.clone()),
        Some(other) => Value::String(other.to_string()),
    }
}

fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        _ => a.compare(b) == Some(Ordering::Equal),
    }
}

fn contains(set: &ValueSet, value: &Value) -> bool {
    set.iter().any(|member| equals(value, member))
}

fn matches_pattern(op: Operator, pattern: &str, value: &Value) -> bool {
    let text = match value {
        Value::Null => return op.is_negative(),
        Value::String(s) => s.clone(),
        other => other.to_json().to_string(),
    };

    let (pattern, text) = match op.positive() {
        Operator::ILike | Operator::EqILike => (pattern.to_lowercase(), text.to_lowercase()),
        _ => (pattern.to_string(), text),
    };
    let pattern = match op.positive() {
        Operator::Like | Operator::ILike => format!("%{pattern}%"),
        _ => pattern,
    };

    like(&pattern.chars().collect::<Vec<_>>(), &text.chars().collect::<Vec<_>>()) != op.is_negative()
}

/// SQL `LIKE`: `%` matches any run of characters, `_` exactly one.
fn like(pattern: &[char], text: &[char]) -> bool {
    // matched[j]: pattern prefix so far matches text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;

    for &p in pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut reachable = false;
                for j in 0..=text.len() {
                    reachable |= matched[j];
                    next[j] = reachable;
                }
            }
            _ => {
                for j in 0..text.len() {
                    next[j + 1] = matched[j] && (p == '_' || p == text[j]);
                }
            }
        }
        matched = next;
    }

    matched[text.len()]
}
