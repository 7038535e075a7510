use crate::ast::domain::Domain;
use model::core::value::Value;
use std::{collections::HashSet, fmt};

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionValue {
    /// A single literal.
    Scalar(Value),
    /// A collection of literals, unique and in insertion order.
    Set(ValueSet),
    /// A domain over the related entity (`any` / `not any`).
    SubDomain(Box<Domain>),
    /// A pre-built query selecting record identifiers.
    Query(SubQuery),
}

impl ConditionValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ConditionValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            ConditionValue::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_domain(&self) -> Option<&Domain> {
        match self {
            ConditionValue::SubDomain(domain) => Some(domain),
            _ => None,
        }
    }

    /// Sub-domains and queries both describe a set of related records.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            ConditionValue::SubDomain(_) | ConditionValue::Query(_)
        )
    }

    /// Legacy falsy test: null/false/empty scalar or empty collection.
    pub fn is_falsy(&self) -> bool {
        match self {
            ConditionValue::Scalar(v) => v.is_falsy(),
            ConditionValue::Set(set) => set.is_empty(),
            ConditionValue::SubDomain(_) | ConditionValue::Query(_) => false,
        }
    }

    /// Name of the value shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConditionValue::Scalar(_) => "scalar",
            ConditionValue::Set(_) => "collection",
            ConditionValue::SubDomain(_) => "domain",
            ConditionValue::Query(_) => "query",
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Scalar(v) => write!(f, "{v}"),
            ConditionValue::Set(set) => write!(f, "{set}"),
            ConditionValue::SubDomain(domain) => write!(f, "{domain}"),
            ConditionValue::Query(query) => write!(f, "{query}"),
        }
    }
}

impl From<Value> for ConditionValue {
    fn from(v: Value) -> Self {
        ConditionValue::Scalar(v)
    }
}

impl From<i64> for ConditionValue {
    fn from(v: i64) -> Self {
        ConditionValue::Scalar(Value::Int(v))
    }
}

impl From<i32> for ConditionValue {
    fn from(v: i32) -> Self {
        ConditionValue::Scalar(Value::from(v))
    }
}

impl From<bool> for ConditionValue {
    fn from(v: bool) -> Self {
        ConditionValue::Scalar(Value::Boolean(v))
    }
}

impl From<&str> for ConditionValue {
    fn from(v: &str) -> Self {
        ConditionValue::Scalar(Value::from(v))
    }
}

impl From<ValueSet> for ConditionValue {
    fn from(set: ValueSet) -> Self {
        ConditionValue::Set(set)
    }
}

impl<V: Into<Value>> From<Vec<V>> for ConditionValue {
    fn from(values: Vec<V>) -> Self {
        ConditionValue::Set(values.into_iter().map(Into::into).collect())
    }
}

impl From<Domain> for ConditionValue {
    fn from(domain: Domain) -> Self {
        ConditionValue::SubDomain(Box::new(domain))
    }
}

impl From<SubQuery> for ConditionValue {
    fn from(query: SubQuery) -> Self {
        ConditionValue::Query(query)
    }
}

/// Unique values kept in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValueSet {
    values: Vec<Value>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn singleton(value: Value) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// Inserts `value` unless already present. Returns whether it was added.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.values.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn contains_null(&self) -> bool {
        self.values.iter().any(Value::is_null)
    }

    /// Values present in both sets, in `self` order.
    pub fn intersection(&self, other: &ValueSet) -> ValueSet {
        self.iter().filter(|v| other.contains(v)).cloned().collect()
    }

    /// Values of `self` followed by the new values of `other`.
    pub fn union(&self, other: &ValueSet) -> ValueSet {
        self.iter().chain(other.iter()).cloned().collect()
    }

    /// Values of `self` absent from `other`.
    pub fn difference(&self, other: &ValueSet) -> ValueSet {
        self.iter().filter(|v| !other.contains(v)).cloned().collect()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let values = iter
            .into_iter()
            .filter(|v| seen.insert(v.clone()))
            .collect();
        Self { values }
    }
}

impl IntoIterator for ValueSet {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self
            .values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{items}]")
    }
}

/// An opaque sub-select returning record identifiers.
///
/// `sql` uses `%s` markers for its parameters; the renderer replaces them
/// with dialect placeholders when the query is spliced in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SubQuery {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl fmt::Display for SubQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<query {}>", self.sql)
    }
}
