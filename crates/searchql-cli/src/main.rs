//! searchql CLI
//!
//! Parses queries or statements and prints their IR.

mod render;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use searchql::{Node, Schema, parse_and_check, parse_canonical, parse_query, parse_statement};

use render::{Format, render};

#[derive(Parser)]
#[command(name = "searchql")]
#[command(about = "Parse search queries into their IR")]
#[command(after_help = "\
EXAMPLES:
    # Filter syntax, canonical output
    searchql '@genre:{scifi|fantasy} @year:[2000 inf]'

    # One query per line from stdin, as a tree
    cat queries.txt | searchql --format tree

    # Full statement checked against a schema
    searchql --statement --schema schema.json \\
        'select title from books where @year:[2000 (2010] sortby year, desc limit 0, 10'

    # Render a statement for graphviz
    searchql --statement --format dot 'select * from books where year >= 2000' | dot -Tsvg
")]
struct Args {
    /// Queries to parse. Reads one per line from stdin when none are given.
    queries: Vec<String>,

    /// Parse full `select ... from ...` statements instead of bare queries
    #[arg(long)]
    statement: bool,

    /// Parse queries in canonical (dump) form instead of filter syntax
    #[arg(long, conflicts_with = "statement")]
    canonical: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Dump)]
    format: Format,

    /// JSON schema to check statements against
    #[arg(long, requires = "statement")]
    schema: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let schema = args.schema.as_deref().map(load_schema).transpose()?;

    let queries = if args.queries.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read queries from stdin")?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    } else {
        args.queries.clone()
    };

    let mut failed = 0usize;
    for query in &queries {
        match parse_one(&args, schema.as_ref(), query) {
            Ok(node) => println!("{}", render(&node, args.format)?),
            Err(e) => {
                eprintln!("error: {query}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} queries rejected", queries.len());
    }
    Ok(())
}

fn parse_one(args: &Args, schema: Option<&Schema>, text: &str) -> anyhow::Result<Node> {
    let node = match (args.statement, schema) {
        (true, Some(schema)) => {
            let (stmt, resolution) = parse_and_check(text, schema)?;
            log::info!(
                "statement uses {} field(s) of index `{}`",
                resolution.fields.len(),
                resolution.index.name
            );
            stmt.into()
        }
        (true, None) => parse_statement(text)?.into(),
        (false, _) if args.canonical => parse_canonical(text)?.into(),
        (false, _) => parse_query(text)?.into(),
    };
    Ok(node)
}

fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let schema: Schema = serde_json::from_str(&text)
        .with_context(|| format!("invalid schema {}", path.display()))?;
    log::info!("loaded {} index(es) from {}", schema.indexes().count(), path.display());
    Ok(schema)
}
