//! Defines the core rendering trait and context for building SQL text.

use crate::{error::PlannerError, query::dialect::Dialect};
use domain_syntax::SubQuery;
use model::core::value::Value;

/// Marker for parameters inside opaque sub-queries.
const QUERY_PARAM: &str = "%s";

/// A trait for any SQL fragment that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A possibly qualified identifier, `"alias"."column"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub qualifier: Option<String>,
    pub name: String,
}

/// Where a condition reads its value from: a column, or a property inside
/// a JSON column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnRef {
    Column(Ident),
    JsonPath { column: Ident, path: Vec<String> },
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for ColumnRef {
    fn render(&self, r: &mut Renderer) {
        match self {
            ColumnRef::Column(ident) => ident.render(r),
            ColumnRef::JsonPath { column, path } => {
                let column = r.fragment(column);
                let path: Vec<&str> = path.iter().map(String::as_str).collect();
                let sql = r.dialect.json_text(&column, &path);
                r.sql.push_str(&sql);
            }
        }
    }
}

impl Render for Value {
    fn render(&self, r: &mut Renderer) {
        r.add_param(self.clone());
    }
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the parameters, and provides
/// access to the dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.get_placeholder(self.params.len() - 1);
        self.sql.push_str(&placeholder);
    }

    /// Renders `node` on its own and returns the text instead of appending it.
    /// Parameters are still collected in order.
    pub fn fragment(&mut self, node: &dyn Render) -> String {
        let start = self.sql.len();
        node.render(self);
        self.sql.split_off(start)
    }

    /// Splices an opaque sub-query, replacing each `%s` with a placeholder
    /// bound to the matching parameter.
    pub fn push_query(&mut self, query: &SubQuery) -> Result<(), PlannerError> {
        let markers = query.sql.matches(QUERY_PARAM).count();
        if markers != query.params.len() {
            return Err(PlannerError::Sql(format!(
                "query has {} parameter markers but {} parameters: {}",
                markers,
                query.params.len(),
                query.sql
            )));
        }

        let mut params = query.params.iter();
        let mut pieces = query.sql.split(QUERY_PARAM).peekable();
        while let Some(piece) = pieces.next() {
            self.sql.push_str(piece);
            if pieces.peek().is_some()
                && let Some(param) = params.next()
            {
                self.add_param(param.clone());
            }
        }
        Ok(())
    }
}
