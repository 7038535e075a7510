use crate::{
    ast::{domain::Domain, level::OptMark, operator::Operator, value::ConditionValue},
    errors::SyntaxError,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// A leaf comparison `(field_expr, operator, value)`.
///
/// `field_expr` may be a dotted path (`partner_id.country_id.code`).
#[derive(Debug, Clone)]
pub struct Condition {
    pub field_expr: String,
    pub operator: Operator,
    pub value: ConditionValue,
    mark: Option<OptMark>,
}

impl Condition {
    pub fn new(
        field_expr: impl Into<String>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Result<Self, SyntaxError> {
        let field_expr = field_expr.into();
        if field_expr.trim().is_empty() || field_expr.split('.').any(|part| part.trim().is_empty())
        {
            return Err(SyntaxError::InvalidFieldExpression(field_expr));
        }

        Ok(Self {
            field_expr,
            operator,
            value: value.into(),
            mark: None,
        })
    }

    /// Builds a condition from an operator string, rejecting unknown operators.
    pub fn parse(
        field_expr: impl Into<String>,
        operator: &str,
        value: impl Into<ConditionValue>,
    ) -> Result<Self, SyntaxError> {
        Self::new(field_expr, operator.parse()?, value)
    }

    /// Rebuilds the condition with new parts, dropping any mark.
    ///
    /// Used by rewrites that start from an already validated condition.
    pub fn with_parts(
        &self,
        field_expr: impl Into<String>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            field_expr: field_expr.into(),
            operator,
            value: value.into(),
            mark: None,
        }
    }

    pub fn with_operator(&self, operator: Operator) -> Self {
        self.with_parts(self.field_expr.clone(), operator, self.value.clone())
    }

    pub fn with_value(&self, value: impl Into<ConditionValue>) -> Self {
        self.with_parts(self.field_expr.clone(), self.operator, value)
    }

    pub fn mark(&self) -> Option<&OptMark> {
        self.mark.as_ref()
    }

    pub fn with_mark(mut self, mark: OptMark) -> Self {
        self.mark = Some(mark);
        self
    }

    pub fn is_dotted(&self) -> bool {
        self.field_expr.contains('.')
    }

    /// Splits `a.b.c` into `("a", Some("b.c"))`.
    pub fn split_path(&self) -> (&str, Option<&str>) {
        match self.field_expr.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (&self.field_expr, None),
        }
    }

    /// Negation: the inverse operator when the field is not a path,
    /// otherwise an explicit `Not`.
    pub fn negate(self) -> Domain {
        match self.operator.inverse() {
            Some(inverse) if !self.is_dotted() => {
                Domain::Condition(self.with_operator(inverse))
            }
            _ => Domain::Not(Box::new(Domain::Condition(self))),
        }
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.field_expr == other.field_expr
            && self.operator == other.operator
            && self.value == other.value
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field_expr.hash(state);
        self.operator.hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "('{}', '{}', {})",
            self.field_expr, self.operator, self.value
        )
    }
}
