use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Optimize a domain against a catalog and lower it to SQL
    Compile {
        #[arg(long, help = "Catalog file path (JSON entities and optional records)")]
        catalog: String,

        #[arg(long, help = "Entity the domain filters, e.g. res.partner")]
        entity: String,

        #[arg(
            long,
            help = "Domain in its JSON wire form, or @path to read it from a file"
        )]
        domain: String,

        #[arg(long, default_value = "postgres", help = "SQL dialect: postgres or mysql")]
        dialect: String,

        #[arg(
            long,
            default_value = "sql",
            help = "Optimization level: basic, search or sql"
        )]
        level: String,

        #[arg(long, help = "Alias of the root table, defaults to the table name")]
        alias: Option<String>,

        #[arg(long, help = "If set, prints one JSON object instead of text")]
        json: bool,
    },
    /// Parse a domain and print its canonical flat form
    Parse {
        #[arg(
            long,
            help = "Domain in its JSON wire form, or @path to read it from a file"
        )]
        domain: String,
    },
}
