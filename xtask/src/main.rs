// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use schemars::schema_for;
use sce_config::ErrorsConfig;
use sce_templates::TemplateRegistry;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Repo maintenance tasks")]
struct Cli {
    /// Error-layer config file; `log_level` and `catalog_path` are read from it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate JSON Schemas for the error snapshot and config types.
    Schema {
        /// Output directory.
        #[arg(long, default_value = "contracts/schemas")]
        out_dir: PathBuf,
    },
    /// Load an error catalog and list its classes with their placeholders.
    CheckCatalog {
        /// Path to the JSON catalog; defaults to the configured `catalog_path`.
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = sce_config::load_config(cli.config.as_deref()).context("load config")?;
    sce_config::validate_config(&config).context("validate config")?;
    init_tracing(&config);

    match cli.command {
        Command::Schema { out_dir } => schema(out_dir),
        Command::CheckCatalog { path } => {
            let path = match path.or_else(|| config.catalog_path.as_ref().map(PathBuf::from)) {
                Some(p) => p,
                None => bail!("no catalog path given and none configured"),
            };
            check_catalog(path)
        }
    }
}

fn init_tracing(config: &ErrorsConfig) {
    let level = config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();
}

fn schema(out_dir: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&out_dir).context("create schema output dir")?;

    let dto = schema_for!(sce_error::SparkErrorDto);
    let config = schema_for!(sce_config::ErrorsConfig);

    write_schema(&out_dir.join("spark_error.schema.json"), &dto)?;
    write_schema(&out_dir.join("errors_config.schema.json"), &config)?;

    eprintln!("wrote schemas to {}", out_dir.display());
    Ok(())
}

fn write_schema(path: &Path, schema: &schemars::Schema) -> Result<()> {
    let s = serde_json::to_string_pretty(schema)?;
    std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn check_catalog(path: PathBuf) -> Result<()> {
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let registry = TemplateRegistry::from_json_str(&content)
        .with_context(|| format!("load {}", path.display()))?;
    if registry.is_empty() {
        bail!("{} defines no error classes", path.display());
    }
    for class in registry.class_ids() {
        let template = registry.template(class)?;
        let placeholders: Vec<_> = sce_templates::Template::parse(template)
            .placeholders()
            .map(str::to_owned)
            .collect();
        println!("{class}: {}", placeholders.join(", "));
    }
    println!("{} error classes", registry.len());
    Ok(())
}
