use anyhow::{Context, Result};
use clap::Parser;
use classdump_prune::cli::{Cli, Commands};
use classdump_prune::{config, pipeline};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};

fn init_logging() {
    let filter = EnvFilter::try_from_env("CLASSDUMP_PRUNE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let settings = match &cli.command {
        Commands::Prune(args) => config::prune_settings(args)?,
        Commands::Ant(args) => config::ant_settings(args)?,
    };

    let report = pipeline::run(&settings).context("classdump pruning failed")?;
    let content = report.render(cli.format)?;
    write_output(&content, cli.output.as_deref())
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
