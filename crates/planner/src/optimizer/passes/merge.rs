//! Passes fusing several children of an AND/OR node.

use crate::{error::PlannerError, optimizer::context::PassContext};
use domain_syntax::{Condition, ConditionValue, Domain, NaryKind, Operator, ValueSet};
use std::collections::HashSet;

/// Drops children structurally equal to an earlier one.
pub fn merge_duplicates(
    _kind: NaryKind,
    children: Vec<Domain>,
    _ctx: &PassContext<'_>,
) -> Result<Vec<Domain>, PlannerError> {
    let mut seen = HashSet::with_capacity(children.len());
    Ok(children
        .into_iter()
        .filter(|child| seen.insert(child.clone()))
        .collect())
}

/// Fuses `in`/`not in` conditions on one field into a single condition.
///
/// Under AND, included sets intersect and excluded sets unite; under OR
/// it is the other way around.
pub fn merge_sets(
    kind: NaryKind,
    run: Vec<Domain>,
    _ctx: &PassContext<'_>,
) -> Result<Vec<Domain>, PlannerError> {
    let mut included: Option<ValueSet> = None;
    let mut excluded: Option<ValueSet> = None;
    let mut template: Option<Condition> = None;
    let mut rest = Vec::new();

    for child in run {
        let Some((condition, set)) = child
            .as_condition()
            .and_then(|c| c.value.as_set().map(|s| (c.clone(), s.clone())))
        else {
            rest.push(child);
            continue;
        };

        let slot = if condition.operator == Operator::In {
            &mut included
        } else {
            &mut excluded
        };
        let widen = (kind == NaryKind::And) != (condition.operator == Operator::In);
        *slot = Some(match slot.take() {
            None => set,
            Some(acc) if widen => acc.union(&set),
            Some(acc) => acc.intersection(&set),
        });
        template.get_or_insert(condition);
    }

    let Some(template) = template else {
        return Ok(rest);
    };

    let merged = match (kind, included, excluded) {
        (_, Some(inc), None) => template.with_parts(template.field_expr.clone(), Operator::In, inc),
        (_, None, Some(exc)) => {
            template.with_parts(template.field_expr.clone(), Operator::NotIn, exc)
        }
        (NaryKind::And, Some(inc), Some(exc)) => template.with_parts(
            template.field_expr.clone(),
            Operator::In,
            inc.difference(&exc),
        ),
        (NaryKind::Or, Some(inc), Some(exc)) => template.with_parts(
            template.field_expr.clone(),
            Operator::NotIn,
            exc.difference(&inc),
        ),
        (_, None, None) => return Ok(rest),
    };

    rest.insert(0, Domain::Condition(merged));
    Ok(rest)
}

/// Fuses `any`/`not any` conditions on one relation.
///
/// * `any` under OR and `not any` under AND merge for every relation:
///   `f any A | f any B` is `f any (A | B)`.
/// * `any` under AND and `not any` under OR merge only on many2one,
///   where a single related record is involved:
///   `f any A & f any B` is `f any (A & B)`.
pub fn merge_any(
    kind: NaryKind,
    run: Vec<Domain>,
    ctx: &PassContext<'_>,
) -> Result<Vec<Domain>, PlannerError> {
    let Some(field_expr) = run.first().and_then(Domain::as_condition).map(|c| c.field_expr.clone())
    else {
        return Ok(run);
    };
    let single_valued = ctx
        .entity
        .field(&field_expr)
        .is_some_and(|f| !f.field_type.is_x2many());

    // OR of sub-domains for `any` under OR and `not any` under AND.
    let unites = |operator: Operator| (operator == Operator::Any) == (kind == NaryKind::Or);
    let mergeable = |operator: Operator| {
        (unites(operator) || single_valued)
            && run.iter().filter(|child| has_sub_domain(child, operator)).count() > 1
    };
    if !mergeable(Operator::Any) && !mergeable(Operator::NotAny) {
        return Ok(run);
    }

    let mut out = Vec::with_capacity(run.len());
    for operator in [Operator::Any, Operator::NotAny] {
        let group: Vec<Condition> = run
            .iter()
            .filter(|child| has_sub_domain(child, operator))
            .filter_map(|child| child.as_condition().cloned())
            .collect();

        if !mergeable(operator) {
            out.extend(group.into_iter().map(Domain::Condition));
            continue;
        }

        let template = group[0].clone();
        let subs = group.into_iter().filter_map(|c| match c.value {
            ConditionValue::SubDomain(sub) => Some(*sub),
            _ => None,
        });
        let combined = if unites(operator) {
            Domain::or(subs)
        } else {
            Domain::and(subs)
        };
        out.push(Domain::Condition(template.with_value(combined)));
    }

    // Traversals through opaque queries are kept as they are.
    out.extend(
        run.into_iter()
            .filter(|child| !has_sub_domain(child, Operator::Any) && !has_sub_domain(child, Operator::NotAny)),
    );
    Ok(out)
}

fn has_sub_domain(child: &Domain, operator: Operator) -> bool {
    child
        .as_condition()
        .is_some_and(|c| c.operator == operator && matches!(c.value, ConditionValue::SubDomain(_)))
}
