use crate::error::CliError;
use domain_syntax::{OptLevel, to_json};
use model::core::value::Value;
use planner::OptimizedDomain;
use serde::Serialize;

/// What `compile` prints.
#[derive(Debug, Serialize)]
pub struct CompileReport {
    pub entity: String,
    pub level: OptLevel,
    pub domain: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<serde_json::Value>,
}

impl CompileReport {
    pub fn new(optimized: &OptimizedDomain, lowered: Option<(String, Vec<Value>)>) -> Self {
        let (sql, params) = match lowered {
            Some((sql, params)) => (Some(sql), params.iter().map(Value::to_json).collect()),
            None => (None, Vec::new()),
        };

        Self {
            entity: optimized.entity().to_string(),
            level: optimized.level(),
            domain: to_json(optimized.domain()),
            sql,
            params,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("{:<8} {}\n{:<8} {}\n", "Entity", self.entity, "Level", self.level);
        out.push_str(&format!("{:<8} {}\n", "Domain", self.domain));
        if let Some(sql) = &self.sql {
            out.push_str(&format!("{:<8} {}\n", "SQL", sql));
            out.push_str(&format!(
                "{:<8} {}\n",
                "Params",
                serde_json::Value::Array(self.params.clone())
            ));
        }
        out
    }
}

pub fn print_report(report: &CompileReport, as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json = serde_json::to_string_pretty(report)?;
        println!("{json}");
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
