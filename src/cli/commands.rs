use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use regex::Regex;

use crate::error::Result;
use call_indexer::{
    load_checks, CallIndex, CallQuery, CallRecord, CheckRegistry, CheckRunner, ModelRegistry,
};

#[derive(Parser)]
#[command(name = "call-indexer")]
#[command(about = "Call-site index and query engine for security scanning")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Run configured checks over an extracted call-record batch
    call-indexer scan --calls calls.json --checks checks.yaml --model User --model Account

    # Every call to `find` on `User`
    call-indexer query calls.json --target User --method find

    # Calls with no explicit receiver
    call-indexer query calls.json --no-target --method render

    # Chain positions: calls reached through `User.active`
    call-indexer query calls.json --target User.active --method delete_all --chained

    # Show index statistics
    call-indexer stats calls.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run configured checks and print warnings
    Scan {
        /// Path to the extracted call records (JSON)
        #[arg(long)]
        calls: PathBuf,

        /// Path to the check configurations (YAML)
        #[arg(long)]
        checks: PathBuf,

        /// Known model class, repeatable; expands the @all_models wildcard
        #[arg(long = "model")]
        models: Vec<String>,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run an ad-hoc query against the index
    Query {
        /// Path to the extracted call records (JSON)
        calls: PathBuf,

        /// Receiver name to match
        #[arg(long, conflicts_with_all = ["target_pattern", "no_target"])]
        target: Option<String>,

        /// Receiver pattern to match
        #[arg(long, conflicts_with = "no_target")]
        target_pattern: Option<String>,

        /// Match only calls with no explicit receiver
        #[arg(long)]
        no_target: bool,

        /// Method name to match, repeatable
        #[arg(long = "method")]
        methods: Vec<String>,

        /// Match the target against call chains instead of receivers
        #[arg(long)]
        chained: bool,

        /// Include calls that are receiver sub-expressions of other calls
        #[arg(long)]
        nested: bool,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show index statistics
    Stats {
        /// Path to the extracted call records (JSON)
        calls: PathBuf,
    },
}

fn load_index(calls: &Path) -> Result<CallIndex> {
    let records: Vec<CallRecord> = serde_json::from_str(&fs::read_to_string(calls)?)?;
    tracing::info!("Indexed {} call record(s) from {}", records.len(), calls.display());
    Ok(CallIndex::from_records(records))
}

pub fn scan(calls: &Path, checks: &Path, models: &[String], format: &str) -> Result<()> {
    let index = load_index(calls)?;

    let mut registry = CheckRegistry::new();
    for check in load_checks(&fs::read_to_string(checks)?)? {
        registry.register(check)?;
    }
    let models = ModelRegistry::from_names(models.iter().cloned());

    let runner = CheckRunner::new(&index, &models);
    let warnings = runner.run_all(&registry)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&warnings)?);
    } else {
        for warning in &warnings {
            println!("{warning}");
        }
        println!(
            "{} warning(s) from {} check(s)",
            warnings.len(),
            registry.len()
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn query(
    calls: &Path,
    target: Option<&str>,
    target_pattern: Option<&str>,
    no_target: bool,
    methods: &[String],
    chained: bool,
    nested: bool,
    format: &str,
) -> Result<()> {
    let index = load_index(calls)?;

    let mut query = CallQuery::new();
    if let Some(target) = target {
        query = query.with_target(target);
    } else if let Some(pattern) = target_pattern {
        query = query.with_target_pattern(Regex::new(pattern)?);
    } else if no_target {
        query = query.with_absent_target();
    }
    query = match methods {
        [] => query,
        [method] => query.with_method(method.clone()),
        methods => query.with_methods(methods.iter().cloned()),
    };
    if chained {
        query = query.chained();
    }
    if nested {
        query = query.with_nested();
    }

    let found = index.find_calls(&query);

    if format == "json" {
        let records: Vec<&CallRecord> = found.iter().map(AsRef::as_ref).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for call in &found {
            match (&call.file, call.line) {
                (Some(file), Some(line)) => println!("{file}:{line}  {}", call.describe()),
                _ => println!("{}", call.describe()),
            }
        }
        println!("{} match(es)", found.len());
    }
    Ok(())
}

pub fn stats(calls: &Path) -> Result<()> {
    let index = load_index(calls)?;
    let stats = index.stats();
    println!("Calls:       {}", stats.calls);
    println!("Method keys: {}", stats.method_keys);
    println!("Target keys: {}", stats.target_keys);
    Ok(())
}
