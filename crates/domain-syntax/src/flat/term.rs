use crate::ast::{condition::Condition, domain::Domain};
use std::fmt;

/// One token of the legacy prefix-notation form.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatTerm {
    /// `&`, binary conjunction.
    And,
    /// `|`, binary disjunction.
    Or,
    /// `!`, unary negation.
    Not,
    /// The always-true leaf `(1, '=', 1)`.
    True,
    /// The always-false leaf `(0, '=', 1)`.
    False,
    Leaf(Condition),
}

impl FlatTerm {
    /// How many operands the term consumes from the expression that follows it.
    pub fn arity(&self) -> usize {
        match self {
            FlatTerm::And | FlatTerm::Or => 2,
            FlatTerm::Not => 1,
            FlatTerm::True | FlatTerm::False | FlatTerm::Leaf(_) => 0,
        }
    }

    /// Parses one of the three operator tokens.
    pub fn token(s: &str) -> Option<FlatTerm> {
        match s {
            "&" => Some(FlatTerm::And),
            "|" => Some(FlatTerm::Or),
            "!" => Some(FlatTerm::Not),
            _ => None,
        }
    }
}

impl From<Condition> for FlatTerm {
    fn from(c: Condition) -> Self {
        FlatTerm::Leaf(c)
    }
}

impl fmt::Display for FlatTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatTerm::And => write!(f, "'&'"),
            FlatTerm::Or => write!(f, "'|'"),
            FlatTerm::Not => write!(f, "'!'"),
            FlatTerm::True => write!(f, "(1, '=', 1)"),
            FlatTerm::False => write!(f, "(0, '=', 1)"),
            FlatTerm::Leaf(c) => write!(f, "{c}"),
        }
    }
}

/// Renders a term list the way it is written in source: `['&', (...), (...)]`.
pub fn display_terms(terms: &[FlatTerm]) -> String {
    let items = terms
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{items}]")
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_terms(&self.to_flat()))
    }
}
