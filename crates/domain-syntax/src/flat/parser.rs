//! Conversion between the prefix-notation term list and the AST.

use crate::{
    ast::domain::{Domain, NaryKind},
    errors::SyntaxError,
    flat::term::{FlatTerm, display_terms},
};
use tracing::debug;

/// Anything a caller may hand over where a domain is expected.
#[derive(Debug, Clone)]
pub enum DomainInput {
    Domain(Domain),
    /// `true` is the always-true domain, `false` the always-false one.
    Bool(bool),
    /// Prefix-notation terms; an empty list is the always-true domain.
    Flat(Vec<FlatTerm>),
}

impl DomainInput {
    pub fn into_domain(self) -> Result<Domain, SyntaxError> {
        match self {
            DomainInput::Domain(domain) => Ok(domain),
            DomainInput::Bool(v) => Ok(Domain::Constant(v)),
            DomainInput::Flat(terms) => from_flat(&terms),
        }
    }
}

impl From<Domain> for DomainInput {
    fn from(domain: Domain) -> Self {
        DomainInput::Domain(domain)
    }
}

impl From<bool> for DomainInput {
    fn from(v: bool) -> Self {
        DomainInput::Bool(v)
    }
}

impl From<Vec<FlatTerm>> for DomainInput {
    fn from(terms: Vec<FlatTerm>) -> Self {
        DomainInput::Flat(terms)
    }
}

impl TryFrom<DomainInput> for Domain {
    type Error = SyntaxError;

    fn try_from(input: DomainInput) -> Result<Self, Self::Error> {
        input.into_domain()
    }
}

/// Parses prefix-notation terms into a domain.
///
/// Consecutive top-level expressions are implicitly joined with `&`.
/// Reduction runs a stack machine over the reversed terms: leaves are
/// pushed, `&`/`|` pop two operands and `!` pops one.
pub fn from_flat(terms: &[FlatTerm]) -> Result<Domain, SyntaxError> {
    if terms.is_empty() {
        return Ok(Domain::TRUE);
    }

    let normalized = insert_implicit_and(terms);
    if normalized.len() != terms.len() {
        debug!(
            "Inserted {} implicit '&' into domain {}",
            normalized.len() - terms.len(),
            display_terms(terms)
        );
    }

    let mut stack: Vec<Domain> = Vec::with_capacity(normalized.len());
    for term in normalized.iter().rev() {
        match term {
            FlatTerm::And | FlatTerm::Or => {
                let kind = if *term == FlatTerm::And {
                    NaryKind::And
                } else {
                    NaryKind::Or
                };
                let (Some(first), Some(second)) = (stack.pop(), stack.pop()) else {
                    return Err(SyntaxError::malformed(
                        display_terms(terms),
                        format!("operator {term} is missing operands"),
                    ));
                };
                stack.push(kind.apply([first, second]));
            }
            FlatTerm::Not => {
                let Some(operand) = stack.pop() else {
                    return Err(SyntaxError::malformed(
                        display_terms(terms),
                        "operator '!' is missing its operand",
                    ));
                };
                stack.push(!operand);
            }
            FlatTerm::True => stack.push(Domain::TRUE),
            FlatTerm::False => stack.push(Domain::FALSE),
            FlatTerm::Leaf(condition) => stack.push(Domain::Condition(condition.clone())),
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(domain), true) => Ok(domain),
        (None, _) => Err(SyntaxError::malformed(
            display_terms(terms),
            "no expression left after reduction",
        )),
        (Some(_), false) => Err(SyntaxError::malformed(
            display_terms(terms),
            format!("{} expressions left after reduction", stack.len() + 1),
        )),
    }
}

/// Prepends `&` whenever a complete expression is followed by another one.
fn insert_implicit_and(terms: &[FlatTerm]) -> Vec<FlatTerm> {
    let mut result = Vec::with_capacity(terms.len());
    let mut implicit = 0;
    let mut expected = 1usize;

    for term in terms {
        if expected == 0 {
            implicit += 1;
            expected = 1;
        }
        expected = expected + term.arity() - 1;
        result.push(term.clone());
    }

    let mut out = vec![FlatTerm::And; implicit];
    out.extend(result);
    out
}

impl Domain {
    /// Prefix-notation form of the domain.
    ///
    /// The always-true domain is the empty list; n-ary nodes emit one
    /// operator token per extra child.
    pub fn to_flat(&self) -> Vec<FlatTerm> {
        let mut out = Vec::new();
        if !self.is_true() {
            self.write_flat(&mut out);
        }
        out
    }

    fn write_flat(&self, out: &mut Vec<FlatTerm>) {
        match self {
            Domain::Constant(true) => out.push(FlatTerm::True),
            Domain::Constant(false) => out.push(FlatTerm::False),
            Domain::Not(inner) => {
                out.push(FlatTerm::Not);
                inner.write_flat(out);
            }
            Domain::And(nary) | Domain::Or(nary) => {
                let token = if matches!(self, Domain::And(_)) {
                    FlatTerm::And
                } else {
                    FlatTerm::Or
                };
                let children = nary.children();
                out.extend(std::iter::repeat_n(token, children.len().saturating_sub(1)));
                for child in children {
                    child.write_flat(out);
                }
            }
            Domain::Condition(c) => out.push(FlatTerm::Leaf(c.with_operator(c.operator))),
        }
    }

    /// Parses any accepted domain input.
    pub fn parse(input: impl Into<DomainInput>) -> Result<Domain, SyntaxError> {
        input.into().into_domain()
    }
}
