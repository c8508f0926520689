use async_graphql::{Request, Response, Variables};
use bookshelf::{build_schema, Store};
use clap::{Parser, Subcommand, ValueEnum};
use std::process;
use std::sync::Arc;

/// bookshelf CLI: run GraphQL operations against a bookshelf database
#[derive(Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "bookshelf.db")]
    database: String,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a GraphQL query or mutation
    Query {
        /// GraphQL document
        document: String,
        /// Variables as a JSON object (e.g. --variables '{"id": 1}')
        #[arg(long)]
        variables: Option<String>,
        /// Operation to run when the document defines several
        #[arg(long)]
        operation: Option<String>,
    },

    /// Print the GraphQL schema (SDL)
    Schema,

    /// Show the database path and row counts
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Query {
            document,
            variables,
            operation,
        } => {
            let store = Arc::new(Store::open(&cli.database)?);
            let response = execute(store, document, variables.as_deref(), operation).await?;
            print_output(&serde_json::to_value(&response)?, &cli.format)?;
            if response.is_err() {
                return Err(format!("response carries {} error(s)", response.errors.len()).into());
            }
        }

        Command::Schema => {
            // The SDL does not depend on stored data; avoid creating a database file.
            let schema = build_schema(Arc::new(Store::open_in_memory()?));
            print!("{}", schema.sdl());
        }

        Command::Status => {
            let store = Store::open(&cli.database)?;
            print_output(&store.status()?, &cli.format)?;
        }
    }

    Ok(())
}

async fn execute(
    store: Arc<Store>,
    document: String,
    variables: Option<&str>,
    operation: Option<String>,
) -> Result<Response, Box<dyn std::error::Error>> {
    let mut request = Request::new(document);
    if let Some(raw) = variables {
        let json: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| format!("Invalid --variables JSON: {e}"))?;
        request = request.variables(Variables::from_json(json));
    }
    if let Some(name) = operation {
        request = request.operation_name(name);
    }
    Ok(build_schema(store).execute(request).await)
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
