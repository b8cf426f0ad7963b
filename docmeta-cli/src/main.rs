//! docmeta command-line tool
//!
//! Loads entity metadata documents, validates and registers them, then
//! prints a derived view:
//!
//! Usage:
//!   docmeta entities orders.json
//!   docmeta schema orders.json --entity Order --version 1.0.0
//!   docmeta roles orders.json
//!   docmeta project orders.json --entity Order --projection '[{"field":"id"}]' order-1.json

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docmeta_cli::{entities, json_schema, load_registry, project, read_json, roles};
use docmeta_metadata::MetadataConfig;
use serde_json::Value;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "docmeta")]
#[command(about = "Inspect entity metadata and project documents")]
struct Args {
    /// Path to a docmeta.toml configuration file
    #[arg(short, long, default_value = "docmeta.toml")]
    config: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered entities and their versions
    Entities {
        /// Metadata document, or an array of them
        metadata: PathBuf,
    },
    /// Print the JSON-Schema of an entity version
    Schema {
        metadata: PathBuf,
        #[arg(short, long)]
        entity: String,
        /// Defaults to the entity's default version
        #[arg(long)]
        version: Option<String>,
    },
    /// Print the role → operation → paths map of every entity
    Roles { metadata: PathBuf },
    /// Project a document (or an array of documents)
    Project {
        metadata: PathBuf,
        #[arg(short, long)]
        entity: String,
        #[arg(long)]
        version: Option<String>,
        /// Projection rules as inline JSON
        #[arg(short, long)]
        projection: String,
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = MetadataConfig::load_from(&args.config);
    debug!("Using config {:?}", config);

    let output = match args.command {
        Command::Entities { metadata } => {
            let registry = load_registry(config, &read_json(&metadata)?)?;
            serde_json::to_value(entities(&registry)?)?
        }
        Command::Schema {
            metadata,
            entity,
            version,
        } => {
            let registry = load_registry(config, &read_json(&metadata)?)?;
            json_schema(&registry, &entity, version.as_deref())?
        }
        Command::Roles { metadata } => {
            let registry = load_registry(config, &read_json(&metadata)?)?;
            roles(&registry)?
        }
        Command::Project {
            metadata,
            entity,
            version,
            projection,
            document,
        } => {
            let registry = load_registry(config, &read_json(&metadata)?)?;
            let projection: Value =
                serde_json::from_str(&projection).context("Failed to parse --projection")?;
            project(
                &registry,
                &entity,
                version.as_deref(),
                &projection,
                &read_json(&document)?,
            )?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
