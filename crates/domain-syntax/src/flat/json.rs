//! JSON wire form: `[["a", "=", 1], "|", ["b", "in", [1, 2]], ...]`.
//!
//! `true`/`false` are accepted for the constant domains. Values of `any` and
//! `not any` are nested domains; `{"query": "...", "params": [...]}` is an
//! opaque sub-select.

use crate::{
    ast::{
        condition::Condition,
        domain::Domain,
        operator::Operator,
        value::{ConditionValue, SubQuery, ValueSet},
    },
    errors::SyntaxError,
    flat::{
        parser::from_flat,
        term::FlatTerm,
    },
};
use model::core::value::Value;
use serde_json::{Value as JsonValue, json};

pub fn parse_json_str(input: &str) -> Result<Domain, SyntaxError> {
    let json: JsonValue = serde_json::from_str(input)?;
    parse_json(&json)
}

pub fn parse_json(json: &JsonValue) -> Result<Domain, SyntaxError> {
    match json {
        JsonValue::Bool(v) => Ok(Domain::Constant(*v)),
        JsonValue::Array(items) => from_flat(&terms_from_json(items)?),
        other => Err(SyntaxError::Json(format!(
            "expected a list of terms or a boolean, got {other}"
        ))),
    }
}

pub fn terms_from_json(items: &[JsonValue]) -> Result<Vec<FlatTerm>, SyntaxError> {
    items.iter().map(term_from_json).collect()
}

fn term_from_json(item: &JsonValue) -> Result<FlatTerm, SyntaxError> {
    match item {
        JsonValue::String(token) => {
            FlatTerm::token(token).ok_or_else(|| SyntaxError::InvalidTerm(item.to_string()))
        }
        JsonValue::Array(parts) if parts.len() == 3 => leaf_from_json(&parts[0], &parts[1], &parts[2]),
        other => Err(SyntaxError::InvalidTerm(other.to_string())),
    }
}

fn leaf_from_json(
    field: &JsonValue,
    operator: &JsonValue,
    value: &JsonValue,
) -> Result<FlatTerm, SyntaxError> {
    if operator.as_str() == Some("=") && value.as_i64() == Some(1) {
        match field.as_i64() {
            Some(1) => return Ok(FlatTerm::True),
            Some(0) => return Ok(FlatTerm::False),
            _ => {}
        }
    }

    let field = field
        .as_str()
        .ok_or_else(|| SyntaxError::InvalidFieldExpression(field.to_string()))?;
    let operator: Operator = operator
        .as_str()
        .ok_or_else(|| SyntaxError::InvalidOperator(operator.to_string()))?
        .parse()?;

    let value = if matches!(operator, Operator::Any | Operator::NotAny) {
        match value {
            JsonValue::Object(_) => query_from_json(value)?,
            _ => ConditionValue::SubDomain(Box::new(parse_json(value)?)),
        }
    } else {
        value_from_json(value)?
    };

    Condition::new(field, operator, value).map(FlatTerm::Leaf)
}

fn value_from_json(json: &JsonValue) -> Result<ConditionValue, SyntaxError> {
    match json {
        // A non-empty flat domain always holds at least one leaf array,
        // whatever operator tokens precede it.
        JsonValue::Array(items) if items.iter().any(JsonValue::is_array) => {
            Ok(ConditionValue::SubDomain(Box::new(parse_json(json)?)))
        }
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                Value::from_json(item).ok_or_else(|| SyntaxError::InvalidTerm(json.to_string()))
            })
            .collect::<Result<ValueSet, _>>()
            .map(ConditionValue::Set),
        JsonValue::Object(_) => query_from_json(json),
        scalar => Value::from_json(scalar)
            .map(ConditionValue::Scalar)
            .ok_or_else(|| SyntaxError::InvalidTerm(json.to_string())),
    }
}

fn query_from_json(json: &JsonValue) -> Result<ConditionValue, SyntaxError> {
    let sql = json
        .get("query")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| SyntaxError::Json(format!("sub-query without 'query' text: {json}")))?;

    let params = match json.get("params") {
        None => Vec::new(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| {
                Value::from_json(item).ok_or_else(|| SyntaxError::InvalidTerm(item.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(SyntaxError::Json(format!(
                "sub-query params must be a list, got {other}"
            )));
        }
    };

    Ok(ConditionValue::Query(SubQuery::new(sql, params)))
}

/// Serializes a domain to its JSON wire form.
pub fn to_json(domain: &Domain) -> JsonValue {
    JsonValue::Array(domain.to_flat().iter().map(term_to_json).collect())
}

fn term_to_json(term: &FlatTerm) -> JsonValue {
    match term {
        FlatTerm::And => json!("&"),
        FlatTerm::Or => json!("|"),
        FlatTerm::Not => json!("!"),
        FlatTerm::True => json!([1, "=", 1]),
        FlatTerm::False => json!([0, "=", 1]),
        FlatTerm::Leaf(c) => json!([c.field_expr, c.operator.as_str(), condition_value_to_json(&c.value)]),
    }
}

fn condition_value_to_json(value: &ConditionValue) -> JsonValue {
    match value {
        ConditionValue::Scalar(v) => v.to_json(),
        ConditionValue::Set(set) => JsonValue::Array(set.iter().map(Value::to_json).collect()),
        ConditionValue::SubDomain(domain) => to_json(domain),
        ConditionValue::Query(query) => json!({
            "query": query.sql,
            "params": query.params.iter().map(Value::to_json).collect::<Vec<_>>(),
        }),
    }
}
