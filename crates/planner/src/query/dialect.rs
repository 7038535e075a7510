//! Defines the `Dialect` trait for database-specific SQL syntax.

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes: `"my_column"`
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL uses `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;

    /// Case-insensitive pattern match of `expr` against `pattern`, both
    /// already rendered.
    fn ilike(&self, expr: &str, pattern: &str, negated: bool) -> String;

    /// Text value found at `path` inside the JSON column `column`.
    fn json_text(&self, column: &str, path: &[&str]) -> String;

    /// Casts a non-textual expression so it can be pattern matched.
    fn cast_to_text(&self, expr: &str) -> String;
}

fn quote_literal(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }

    fn ilike(&self, expr: &str, pattern: &str, negated: bool) -> String {
        let not = if negated { "NOT " } else { "" };
        format!("{expr} {not}ILIKE {pattern}")
    }

    fn json_text(&self, column: &str, path: &[&str]) -> String {
        let mut sql = column.to_string();
        for (i, key) in path.iter().enumerate() {
            let arrow = if i + 1 == path.len() { "->>" } else { "->" };
            sql.push_str(arrow);
            sql.push_str(&quote_literal(key));
        }
        sql
    }

    fn cast_to_text(&self, expr: &str) -> String {
        format!("CAST({expr} AS VARCHAR)")
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        // MySQL uses ?
        "?".into()
    }

    fn name(&self) -> String {
        "MySQL".into()
    }

    fn ilike(&self, expr: &str, pattern: &str, negated: bool) -> String {
        let not = if negated { "NOT " } else { "" };
        format!("LOWER({expr}) {not}LIKE LOWER({pattern})")
    }

    fn json_text(&self, column: &str, path: &[&str]) -> String {
        let path = path
            .iter()
            .map(|key| format!(r#""{}""#, key.replace('"', r#"\""#)))
            .collect::<Vec<_>>()
            .join(".");
        format!(
            "JSON_UNQUOTE(JSON_EXTRACT({column}, {}))",
            quote_literal(&format!("$.{path}"))
        )
    }

    fn cast_to_text(&self, expr: &str) -> String {
        format!("CAST({expr} AS CHAR)")
    }
}

/// Looks a dialect up by name, case-insensitively.
pub fn dialect_by_name(name: &str) -> Option<Box<dyn Dialect>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => Some(Box::new(Postgres)),
        "mysql" | "mariadb" => Some(Box::new(MySql)),
        _ => None,
    }
}
