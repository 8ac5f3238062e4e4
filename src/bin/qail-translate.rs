//! qail-translate: the translator CLI
//!
//! Reads a JSON statement tree and prints the SQL a dialect would execute,
//! together with its parameter binders and pagination metadata.
//!
//! # Usage
//!
//! ```bash
//! # Translate a statement file for SQL Server
//! qail-translate query.json --dialect sqlserver
//!
//! # From stdin, with external paging and a pessimistic lock
//! cat query.json | qail-translate --offset 20 --limit 10 --lock pessimistic_write
//!
//! # Show a built-in profile as TOML
//! qail-translate capabilities oracle11
//! ```

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use qail_translator::prelude::*;
use qail_translator::transpiler::ParameterBinder;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qail-translate")]
#[command(author = "QAIL Contributors")]
#[command(version)]
#[command(about = "Translate resolved SQL statement trees into dialect SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    qail-translate query.json --dialect postgres
    qail-translate query.json --dialect oracle11 --offset 20 --limit 10
    qail-translate query.json --dialect informix --bind 1=25
    qail-translate dialects")]
struct Cli {
    /// JSON statement file; reads stdin when absent or `-`
    input: Option<PathBuf>,

    /// Built-in dialect or the name of a profile under the config directory
    #[arg(short, long, env = "QAIL_DIALECT", default_value = "postgres")]
    dialect: String,

    /// TOML capability profile; overrides --dialect
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// External first row for the root query
    #[arg(long)]
    offset: Option<u64>,

    /// External max rows for the root query
    #[arg(long)]
    limit: Option<u64>,

    /// Lock mode, e.g. pessimistic_write or upgrade_nowait
    #[arg(long)]
    lock: Option<String>,

    /// Force (true) or forbid (false) follow-on locking
    #[arg(long)]
    follow_on: Option<bool>,

    /// Parameter bindings as id=value
    #[arg(short, long, value_delimiter = ',')]
    bind: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in dialects
    Dialects,
    /// Print the capability profile of a dialect as TOML
    Capabilities {
        /// Dialect name
        dialect: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Dialects) => {
            show_dialects();
            Ok(())
        }
        Some(Commands::Capabilities { dialect }) => show_capabilities(dialect),
        None => translate(&cli),
    };
    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn translate(cli: &Cli) -> Result<()> {
    let caps = resolve_capabilities(&cli.dialect, cli.profile.as_deref())?;
    let statement = read_statement(cli.input.as_deref())?;
    let bindings = parse_bindings(&cli.bind)?;

    let mut options = QueryOptions::new();
    let limit = Limit::new(cli.offset, cli.limit);
    if !limit.is_empty() {
        options = options.with_limit(limit);
    }
    if let Some(name) = &cli.lock {
        let mode = LockMode::from_name(name).ok_or_else(|| anyhow!("Unknown lock mode '{}'", name))?;
        let mut lock = LockOptions::new(mode);
        lock.follow_on_locking = cli.follow_on;
        options = options.with_lock_options(lock);
    }

    if cli.verbose {
        eprintln!(
            "{} {} ({} statement)",
            "Dialect:".dimmed(),
            caps.name.yellow(),
            statement.kind()
        );
    }

    let translator = SqlAstTranslator::new(caps);
    let folded = (!bindings.is_empty()).then_some(&bindings);
    let operation = translator
        .translate(&statement, &options, folded)
        .context("translation failed")?;

    let ctx = ExecutionContext { limit: options.limit };
    let mut values: Vec<Value> = Vec::new();
    let bound = operation.bind_all(&mut values, &bindings, &ctx);

    match cli.format {
        OutputFormat::Json => {
            let binders: Vec<String> = operation
                .parameter_binders()
                .iter()
                .map(describe_binder)
                .collect();
            let output = serde_json::json!({
                "operation": operation,
                "binders": binders,
                "values": bound.is_ok().then_some(&values),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print_operation(&operation, &values, bound.err()),
    }
    Ok(())
}

/// Built-in dialect, profile file, or `<config_dir>/qail/dialects/<name>.toml`.
fn resolve_capabilities(dialect: &str, profile: Option<&Path>) -> Result<Capabilities> {
    if let Some(path) = profile {
        return Capabilities::from_file(path)
            .with_context(|| format!("Failed to load profile {}", path.display()));
    }
    if let Some(builtin) = Dialect::from_name(dialect) {
        return Ok(builtin.capabilities());
    }
    let path = dirs::config_dir()
        .map(|dir| dir.join("qail").join("dialects").join(format!("{}.toml", dialect)))
        .filter(|path| path.exists())
        .ok_or_else(|| anyhow!("Unknown dialect '{}'. Try: qail-translate dialects", dialect))?;
    tracing::debug!(path = %path.display(), "loading dialect profile");
    Capabilities::from_file(&path)
        .with_context(|| format!("Failed to load profile {}", path.display()))
}

fn read_statement(input: Option<&Path>) -> Result<Statement> {
    let text = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };
    Ok(Statement::from_json(&text)?)
}

fn parse_bindings(raw: &[String]) -> Result<ParameterBindings> {
    let mut bindings = ParameterBindings::new();
    for item in raw {
        let Some((id, value)) = item.split_once('=') else {
            bail!("Binding '{}' is not of the form id=value", item);
        };
        let id: u32 = id
            .trim()
            .parse()
            .with_context(|| format!("Invalid parameter id in '{}'", item))?;
        bindings.bind(ParameterId(id), parse_value(value.trim()));
    }
    Ok(bindings)
}

// Try number, then bool/null, otherwise string
fn parse_value(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        Value::Int(n)
    } else if let Ok(f) = text.parse::<f64>() {
        Value::Float(f)
    } else if text == "true" || text == "false" {
        Value::Bool(text == "true")
    } else if text.eq_ignore_ascii_case("null") {
        Value::Null
    } else {
        Value::String(text.to_string())
    }
}

fn describe_binder(binder: &ParameterBinder) -> String {
    match binder {
        ParameterBinder::Parameter(p) => format!("parameter {}", p.id.0),
        ParameterBinder::Literal(value) => format!("literal {}", value),
        ParameterBinder::Offset => "first row".to_string(),
        ParameterBinder::Limit => "max rows".to_string(),
        ParameterBinder::Filter(fp) => format!("filter value {}", fp.value),
        ParameterBinder::Sum(sources) => format!("sum of {} operands", sources.len()),
    }
}

fn print_operation(operation: &JdbcOperation, values: &[Value], bind_error: Option<TranslateError>) {
    println!("{}", "Generated SQL:".green().bold());
    println!("{}", operation.sql().white());

    let binders = operation.parameter_binders();
    if !binders.is_empty() {
        println!();
        println!("{}", "Binders:".cyan());
        for (i, binder) in binders.iter().enumerate() {
            match values.get(i) {
                Some(value) => println!(
                    "  {:>3}. {} = {}",
                    i + 1,
                    describe_binder(binder),
                    value.to_string().yellow()
                ),
                None => println!("  {:>3}. {}", i + 1, describe_binder(binder)),
            }
        }
        if let Some(e) = bind_error {
            println!("  {} {}", "⚠ unbound:".yellow(), e.to_string().dimmed());
        }
    }

    let applied = operation.applied_bindings();
    if !applied.is_empty() {
        println!();
        println!("{}", "Folded into SQL:".cyan());
        for (key, value) in applied {
            println!("  {:?} = {}", key, value.to_string().yellow());
        }
    }

    let tables: Vec<&str> = operation
        .affected_table_names()
        .iter()
        .map(String::as_str)
        .collect();
    println!();
    println!("{} {}", "Tables:".cyan(), tables.join(", "));

    if let Some(select) = operation.as_select() {
        if select.rows_to_skip() > 0 || select.max_rows().is_some() {
            println!(
                "{} skip {} rows, max {}",
                "Client paging:".cyan(),
                select.rows_to_skip(),
                select
                    .max_rows()
                    .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
            );
        }
        if select.lock_strategy() != LockStrategy::None {
            println!("{} {:?}", "Locking:".cyan(), select.lock_strategy());
        }
    }
}

fn show_dialects() {
    println!("{}", "Built-in dialects".cyan().bold());
    println!();
    println!(
        "{:16} {:18} {}",
        "Name".white().bold(),
        "Pagination".white().bold(),
        "Placeholder".white().bold()
    );
    println!("{}", "─".repeat(48).dimmed());
    for dialect in Dialect::all() {
        let caps = dialect.capabilities();
        println!(
            "{:16} {:18} {}",
            dialect.name().yellow(),
            format!("{:?}", caps.pagination),
            caps.placeholder.render(1).dimmed()
        );
    }
}

fn show_capabilities(dialect: &str) -> Result<()> {
    let caps = resolve_capabilities(dialect, None)?;
    print!("{}", caps.to_toml_string()?);
    Ok(())
}
