//! `child_of` / `parent_of` resolution.

use crate::{
    error::PlannerError,
    optimizer::context::PassContext,
    schema::entity::{Entity, ID, PARENT_PATH},
};
use domain_syntax::{Condition, ConditionValue, Domain, Operator, ValueSet};
use model::core::{field_type::FieldType, identifiers::RecordId, value::Value};
use std::collections::HashSet;
use tracing::debug;

/// Replaces a hierarchy operator by a condition on the records found by
/// walking the parent relation of the target entity.
///
/// On `id` the result is used as is, and so is a many2one pointing back
/// to its own entity, which then serves as the parent link. Any other
/// relational field is wrapped in `field any (...)`.
pub fn resolve_hierarchy(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let field = ctx.field(condition)?;
    let recursive = field.name != ID
        && field.field_type == FieldType::Many2one
        && field.comodel.as_ref() == Some(&ctx.entity.name);

    let (target, parent) = if recursive {
        (ctx.entity, field.name.as_str())
    } else {
        let target = ctx.target(condition, field)?;
        (target, target.parent_name.as_str())
    };

    let ids = resolve_ids(condition, ctx, target)?;
    if ids.is_empty() {
        return Ok(Some(Domain::FALSE));
    }

    let domain = match condition.operator {
        Operator::ChildOf => descendants(condition, ctx, target, parent, &ids)?,
        _ => ancestors(condition, ctx, target, parent, &ids)?,
    };
    debug!(
        "Resolved {} on '{}' through '{}' into {}",
        condition, target.name, parent, domain
    );

    if field.name == ID || recursive {
        return Ok(Some(domain));
    }
    Ok(Some(Domain::Condition(condition.with_parts(
        field.name.clone(),
        Operator::Any,
        domain,
    ))))
}

/// Starting ids: integers are kept, labels are searched on `rec_name`.
fn resolve_ids(
    condition: &Condition,
    ctx: &PassContext<'_>,
    target: &Entity,
) -> Result<Vec<RecordId>, PlannerError> {
    let values: Vec<Value> = match &condition.value {
        ConditionValue::Scalar(v) => vec![v.clone()],
        ConditionValue::Set(set) => set.iter().cloned().collect(),
        other => {
            return Err(PlannerError::type_mismatch(
                condition,
                format!(
                    "operator '{}' expects ids or labels, got {}",
                    condition.operator,
                    other.kind()
                ),
            ));
        }
    };

    let mut ids = Vec::new();
    for value in values {
        match value {
            Value::Int(id) => ids.push(id),
            Value::String(label) => {
                let by_label = Domain::Condition(condition.with_parts(
                    target.rec_name.clone(),
                    Operator::ILike,
                    Value::String(label),
                ));
                ids.extend(ctx.catalog.search(target, &by_label)?);
            }
            v if v.is_falsy() => {}
            other => {
                return Err(PlannerError::type_mismatch(
                    condition,
                    format!("{other} is neither an id nor a label"),
                ));
            }
        }
    }

    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    Ok(ids)
}

fn id_in(condition: &Condition, ids: Vec<RecordId>) -> Domain {
    Domain::Condition(condition.with_parts(
        ID,
        Operator::In,
        ids.into_iter().map(Value::Int).collect::<ValueSet>(),
    ))
}

fn parent_paths(
    ctx: &PassContext<'_>,
    target: &Entity,
    ids: &[RecordId],
) -> Result<Vec<String>, PlannerError> {
    Ok(ctx
        .catalog
        .read(target, ids, PARENT_PATH)?
        .into_iter()
        .filter_map(|(_, path)| path.as_str().map(str::to_string))
        .collect())
}

/// Whether `parent_path` materializes the walk over `parent`.
fn uses_parent_path(target: &Entity, parent: &str) -> bool {
    target.parent_store && parent == target.parent_name
}

fn require_parent(condition: &Condition, target: &Entity, parent: &str) -> Result<(), PlannerError> {
    if target.field(parent).is_none() {
        return Err(PlannerError::invalid(
            condition,
            format!("'{}' has no parent field '{}'", target.name, parent),
        ));
    }
    Ok(())
}

fn descendants(
    condition: &Condition,
    ctx: &PassContext<'_>,
    target: &Entity,
    parent: &str,
    ids: &[RecordId],
) -> Result<Domain, PlannerError> {
    if uses_parent_path(target, parent) {
        let prefixes = parent_paths(ctx, target, ids)?
            .into_iter()
            .map(|path| {
                Domain::Condition(condition.with_parts(
                    PARENT_PATH,
                    Operator::EqLike,
                    Value::String(format!("{path}%")),
                ))
            });
        return Ok(Domain::or(prefixes));
    }

    require_parent(condition, target, parent)?;
    let mut visited: Vec<RecordId> = ids.to_vec();
    let mut seen: HashSet<RecordId> = ids.iter().copied().collect();
    let mut frontier = visited.clone();

    while !frontier.is_empty() {
        let children = Domain::Condition(condition.with_parts(
            parent,
            Operator::In,
            frontier.iter().copied().map(Value::Int).collect::<ValueSet>(),
        ));
        frontier = ctx
            .catalog
            .search(target, &children)?
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        visited.extend(&frontier);
    }

    Ok(id_in(condition, visited))
}

fn ancestors(
    condition: &Condition,
    ctx: &PassContext<'_>,
    target: &Entity,
    parent: &str,
    ids: &[RecordId],
) -> Result<Domain, PlannerError> {
    let mut seen: HashSet<RecordId> = HashSet::new();
    let mut found: Vec<RecordId> = Vec::new();

    if uses_parent_path(target, parent) {
        for path in parent_paths(ctx, target, ids)? {
            for id in path.split('/').filter_map(|part| part.parse::<RecordId>().ok()) {
                if seen.insert(id) {
                    found.push(id);
                }
            }
        }
        return Ok(id_in(condition, found));
    }

    require_parent(condition, target, parent)?;
    let mut frontier: Vec<RecordId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    found.extend(&frontier);

    while !frontier.is_empty() {
        frontier = ctx
            .catalog
            .read(target, &frontier, parent)?
            .into_iter()
            .filter_map(|(_, value)| value.as_i64())
            .filter(|id| seen.insert(*id))
            .collect();
        found.extend(&frontier);
    }

    Ok(id_in(condition, found))
}
