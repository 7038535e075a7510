//! The predicate tree and its boolean algebra.

use crate::{
    ast::{condition::Condition, level::OptMark, value::ConditionValue},
    errors::SyntaxError,
};
use std::{
    hash::{Hash, Hasher},
    ops::{BitAnd, BitOr, Not},
};

/// A boolean predicate tree over record fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Domain {
    Constant(bool),
    Not(Box<Domain>),
    And(Nary),
    Or(Nary),
    Condition(Condition),
}

/// Which n-ary connective a node uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaryKind {
    And,
    Or,
}

/// Children of an AND/OR node: at least two, flattened, no constants.
#[derive(Debug, Clone)]
pub struct Nary {
    children: Vec<Domain>,
    mark: Option<OptMark>,
}

impl Domain {
    pub const TRUE: Domain = Domain::Constant(true);
    pub const FALSE: Domain = Domain::Constant(false);

    /// Builds a leaf condition from an operator string.
    pub fn condition(
        field_expr: impl Into<String>,
        operator: &str,
        value: impl Into<ConditionValue>,
    ) -> Result<Domain, SyntaxError> {
        Condition::parse(field_expr, operator, value).map(Domain::Condition)
    }

    pub fn and(children: impl IntoIterator<Item = Domain>) -> Domain {
        NaryKind::And.apply(children)
    }

    pub fn or(children: impl IntoIterator<Item = Domain>) -> Domain {
        NaryKind::Or.apply(children)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Domain::Constant(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Domain::Constant(false))
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Domain::Condition(c) => Some(c),
            _ => None,
        }
    }

    pub fn nary_kind(&self) -> Option<NaryKind> {
        match self {
            Domain::And(_) => Some(NaryKind::And),
            Domain::Or(_) => Some(NaryKind::Or),
            _ => None,
        }
    }

    /// Direct children of an n-ary node, empty for every other variant.
    pub fn children(&self) -> &[Domain] {
        match self {
            Domain::And(nary) | Domain::Or(nary) => &nary.children,
            _ => &[],
        }
    }

    pub fn mark(&self) -> Option<&OptMark> {
        match self {
            Domain::And(nary) | Domain::Or(nary) => nary.mark.as_ref(),
            Domain::Condition(c) => c.mark(),
            Domain::Constant(_) | Domain::Not(_) => None,
        }
    }

    /// Attaches an optimization mark. Constants and negations carry none.
    pub fn with_mark(self, mark: OptMark) -> Domain {
        match self {
            Domain::And(nary) => Domain::And(nary.with_mark(mark)),
            Domain::Or(nary) => Domain::Or(nary.with_mark(mark)),
            Domain::Condition(c) => Domain::Condition(c.with_mark(mark)),
            other => other,
        }
    }

    /// Boolean complement, pushed as far down as the algebra allows.
    pub fn negate(self) -> Domain {
        match self {
            Domain::Constant(v) => Domain::Constant(!v),
            Domain::Not(inner) => *inner,
            Domain::And(nary) => NaryKind::Or.apply(nary.children.into_iter().map(Domain::negate)),
            Domain::Or(nary) => NaryKind::And.apply(nary.children.into_iter().map(Domain::negate)),
            Domain::Condition(c) => c.negate(),
        }
    }

    /// Number of nodes in the tree, nested sub-domains included.
    pub fn size(&self) -> usize {
        match self {
            Domain::Constant(_) => 1,
            Domain::Not(inner) => 1 + inner.size(),
            Domain::And(nary) | Domain::Or(nary) => {
                1 + nary.children.iter().map(Domain::size).sum::<usize>()
            }
            Domain::Condition(c) => match &c.value {
                ConditionValue::SubDomain(sub) => 1 + sub.size(),
                _ => 1,
            },
        }
    }
}

impl NaryKind {
    /// The neutral constant: TRUE for AND, FALSE for OR.
    pub fn identity(self) -> bool {
        matches!(self, NaryKind::And)
    }

    /// The constant that decides the whole node on its own.
    pub fn absorbing(self) -> bool {
        !self.identity()
    }

    pub fn inverse(self) -> NaryKind {
        match self {
            NaryKind::And => NaryKind::Or,
            NaryKind::Or => NaryKind::And,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            NaryKind::And => "&",
            NaryKind::Or => "|",
        }
    }

    /// Combines children, flattening same-kind nodes and folding constants.
    pub fn apply(self, children: impl IntoIterator<Item = Domain>) -> Domain {
        let mut out = Vec::new();

        for child in children {
            match child {
                Domain::Constant(v) if v == self.identity() => {}
                Domain::Constant(_) => return Domain::Constant(self.absorbing()),
                Domain::And(nary) if self == NaryKind::And => out.extend(nary.children),
                Domain::Or(nary) if self == NaryKind::Or => out.extend(nary.children),
                other => out.push(other),
            }
        }

        match out.len() {
            0 => Domain::Constant(self.identity()),
            1 => out.pop().unwrap_or(Domain::Constant(self.identity())),
            _ => self.wrap(Nary::new(out)),
        }
    }

    pub(crate) fn wrap(self, nary: Nary) -> Domain {
        match self {
            NaryKind::And => Domain::And(nary),
            NaryKind::Or => Domain::Or(nary),
        }
    }
}

impl Nary {
    fn new(children: Vec<Domain>) -> Self {
        Self {
            children,
            mark: None,
        }
    }

    pub fn children(&self) -> &[Domain] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Domain> {
        self.children
    }

    pub fn mark(&self) -> Option<&OptMark> {
        self.mark.as_ref()
    }

    fn with_mark(mut self, mark: OptMark) -> Self {
        self.mark = Some(mark);
        self
    }
}

impl PartialEq for Nary {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for Nary {}

impl Hash for Nary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.children.hash(state);
    }
}

impl BitAnd for Domain {
    type Output = Domain;

    fn bitand(self, rhs: Domain) -> Domain {
        NaryKind::And.apply([self, rhs])
    }
}

impl BitOr for Domain {
    type Output = Domain;

    fn bitor(self, rhs: Domain) -> Domain {
        NaryKind::Or.apply([self, rhs])
    }
}

impl Not for Domain {
    type Output = Domain;

    fn not(self) -> Domain {
        self.negate()
    }
}

impl From<bool> for Domain {
    fn from(v: bool) -> Self {
        Domain::Constant(v)
    }
}

impl From<Condition> for Domain {
    fn from(c: Condition) -> Self {
        Domain::Condition(c)
    }
}
