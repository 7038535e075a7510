use crate::{
    error::CliError,
    output::{CompileReport, print_report},
};
use clap::Parser;
use commands::Commands;
use domain_syntax::{Domain, OptLevel, parse_json_str};
use model::core::identifiers::EntityName;
use planner::{Catalog, MemoryCatalog, Optimizer, dialect_by_name, to_sql};
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "domainc", version = "0.1.0", about = "Query domain compiler")]
struct Cli {
    #[arg(long, global = true, help = "Log optimizer rewrites")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    // RUST_LOG wins over the default level
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            catalog,
            entity,
            domain,
            dialect,
            level,
            alias,
            json,
        } => {
            info!(
                "Compiling domain for '{}' against catalog {}, level: {}",
                entity, catalog, level
            );

            let catalog = load_catalog(&catalog)?;
            let domain = read_domain(&domain)?;
            let level = OptLevel::from_str(&level).map_err(CliError::InvalidLevel)?;
            let report = compile(&catalog, &entity, domain, level, &dialect, alias.as_deref())?;
            print_report(&report, json)?;
        }
        Commands::Parse { domain } => {
            let domain = read_domain(&domain)?;
            println!("{domain}");
        }
    }

    Ok(())
}

fn load_catalog(path: &str) -> Result<MemoryCatalog, CliError> {
    let source = std::fs::read_to_string(path)?;
    let catalog = MemoryCatalog::from_json(&source).map_err(CliError::CatalogParse)?;
    debug!("Loaded {} entities from {}", catalog.entities().count(), path);
    Ok(catalog)
}

/// Reads a domain given inline, or from a file when prefixed with `@`.
fn read_domain(arg: &str) -> Result<Domain, CliError> {
    let source = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => arg.to_string(),
    };
    Ok(parse_json_str(&source)?)
}

fn compile(
    catalog: &MemoryCatalog,
    entity: &str,
    domain: Domain,
    level: OptLevel,
    dialect: &str,
    alias: Option<&str>,
) -> Result<CompileReport, CliError> {
    let dialect = dialect_by_name(dialect).ok_or_else(|| CliError::UnknownDialect(dialect.to_string()))?;
    let entity = catalog.require_entity(&EntityName::from(entity))?;

    let optimized = Optimizer::default().optimize(domain, entity, catalog, level)?;
    let lowered = if level == OptLevel::ToSql {
        Some(to_sql(&optimized, catalog, dialect.as_ref(), alias)?)
    } else {
        None
    };

    Ok(CompileReport::new(&optimized, lowered))
}
