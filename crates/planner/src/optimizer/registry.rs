//! Where optimization passes are looked up.
//!
//! Condition passes are keyed by level and then by operator, by the
//! declared type of the targeted field, or by nothing at all. Merge passes
//! work on the children of an AND/OR node.

use crate::{error::PlannerError, optimizer::context::PassContext, optimizer::passes};
use domain_syntax::{Condition, Domain, NaryKind, OptLevel, Operator, OperatorFamily};
use model::core::field_type::FieldType;
use std::collections::{BTreeMap, HashMap};

/// Rewrites one condition. `None` leaves it unchanged.
pub type ConditionPass =
    fn(&Condition, &PassContext<'_>) -> Result<Option<Domain>, PlannerError>;

/// Replaces a list of children with an equivalent list of the same or
/// smaller length.
pub type MergePass =
    fn(NaryKind, Vec<Domain>, &PassContext<'_>) -> Result<Vec<Domain>, PlannerError>;

#[derive(Debug, Clone)]
pub struct NamedPass {
    pub name: &'static str,
    pub pass: ConditionPass,
}

/// Which children a merge pass is handed.
#[derive(Debug, Clone)]
pub enum MergeScope {
    /// The whole sorted child list.
    Children,
    /// Each run of adjacent conditions on the same field expression using
    /// one of `operators`, optionally restricted to some field types.
    FieldRun {
        operators: Vec<Operator>,
        field_types: Option<Vec<FieldType>>,
    },
}

#[derive(Debug, Clone)]
pub struct MergeRule {
    pub name: &'static str,
    pub level: OptLevel,
    pub scope: MergeScope,
    pub pass: MergePass,
}

impl MergeScope {
    /// Field expression of the run `child` belongs to, if any.
    pub(crate) fn run_key(&self, child: &Domain) -> Option<String> {
        let MergeScope::FieldRun { operators, .. } = self else {
            return None;
        };
        child
            .as_condition()
            .filter(|c| operators.contains(&c.operator))
            .map(|c| c.field_expr.clone())
    }

    pub(crate) fn accepts_type(&self, field_type: Option<FieldType>) -> bool {
        match self {
            MergeScope::FieldRun {
                field_types: Some(types),
                ..
            } => field_type.is_some_and(|t| types.contains(&t)),
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PassRegistry {
    generic: BTreeMap<OptLevel, Vec<NamedPass>>,
    by_operator: BTreeMap<OptLevel, HashMap<Operator, Vec<NamedPass>>>,
    by_type: BTreeMap<OptLevel, HashMap<FieldType, Vec<NamedPass>>>,
    merges: Vec<MergeRule>,
}

impl Default for PassRegistry {
    /// A registry holding every built-in pass.
    fn default() -> Self {
        let mut registry = Self::empty();
        passes::register_builtin(&mut registry);
        registry
    }
}

impl PassRegistry {
    pub fn empty() -> Self {
        Self {
            generic: BTreeMap::new(),
            by_operator: BTreeMap::new(),
            by_type: BTreeMap::new(),
            merges: Vec::new(),
        }
    }

    /// Registers a pass run on every condition at `level`.
    pub fn register_generic(
        &mut self,
        level: OptLevel,
        name: &'static str,
        pass: ConditionPass,
    ) -> &mut Self {
        self.generic
            .entry(level)
            .or_default()
            .push(NamedPass { name, pass });
        self
    }

    pub fn register_operators(
        &mut self,
        level: OptLevel,
        operators: &[Operator],
        name: &'static str,
        pass: ConditionPass,
    ) -> &mut Self {
        let by_operator = self.by_operator.entry(level).or_default();
        for op in operators {
            by_operator
                .entry(*op)
                .or_default()
                .push(NamedPass { name, pass });
        }
        self
    }

    pub fn register_types(
        &mut self,
        level: OptLevel,
        field_types: &[FieldType],
        name: &'static str,
        pass: ConditionPass,
    ) -> &mut Self {
        let by_type = self.by_type.entry(level).or_default();
        for field_type in field_types {
            by_type
                .entry(*field_type)
                .or_default()
                .push(NamedPass { name, pass });
        }
        self
    }

    pub fn register_merge(&mut self, rule: MergeRule) -> &mut Self {
        self.merges.push(rule);
        self
    }

    /// Candidate passes for a condition at one level: field-agnostic
    /// passes first, then operator passes, then field type passes.
    pub fn condition_passes(
        &self,
        level: OptLevel,
        operator: Operator,
        field_type: Option<FieldType>,
    ) -> Vec<&NamedPass> {
        let generic = self.generic.get(&level).into_iter().flatten();
        let by_operator = self
            .by_operator
            .get(&level)
            .and_then(|m| m.get(&operator))
            .into_iter()
            .flatten();
        let by_type = field_type
            .and_then(|t| self.by_type.get(&level).and_then(|m| m.get(&t)))
            .into_iter()
            .flatten();

        generic.chain(by_operator).chain(by_type).collect()
    }

    pub fn merge_rules(&self, level: OptLevel) -> impl Iterator<Item = &MergeRule> {
        self.merges.iter().filter(move |rule| rule.level == level)
    }
}

/// Canonical position of a child inside an AND/OR node.
///
/// Conditions come first, grouped by field expression, then by operator
/// family, then by operator. Everything else follows in original order.
fn sort_key(child: &Domain) -> (bool, String, Option<OperatorFamily>, Option<Operator>) {
    match child.as_condition() {
        Some(c) => (
            false,
            c.field_expr.clone(),
            Some(c.operator.family()),
            Some(c.operator),
        ),
        None => (true, String::new(), None, None),
    }
}

/// Stable sort of children into canonical order.
pub fn sort_children(children: &mut [Domain]) {
    children.sort_by_cached_key(sort_key);
}
