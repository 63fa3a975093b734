use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::classpath::DEFAULT_DELIMITER;
use crate::reconcile::DEFAULT_EXCLUSION_NAME;

#[derive(Debug, Clone, Parser)]
#[command(name = "classdump-prune")]
#[command(about = "Prune a JaCoCo classdump down to the classes of the local build")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout.
    #[arg(short = 'o', long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Prune with explicitly given paths.
    Prune(PruneArgs),
    /// Prune with Ant-style build properties (jacoco.classdump.dir, build.classes.main).
    Ant(AntArgs),
}

#[derive(Debug, Clone, Args)]
pub struct PruneArgs {
    /// Classdump directory [env: CLASSDUMP_DIR] [default: build/jacoco/classdump]
    #[arg(long, value_name = "DIR")]
    pub classdump: Option<PathBuf>,

    /// Delimited local build output directories [env: CLASSDUMP_CLASSPATH]
    #[arg(long, value_name = "PATHS")]
    pub classpath: Option<String>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Debug, Clone, Args)]
pub struct AntArgs {
    /// Define a property, e.g. -Djacoco.classdump.dir=build/jacoco/classdump
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub define: Vec<String>,

    /// Read properties from a file; -D definitions take precedence.
    #[arg(long, value_name = "FILE")]
    pub property_file: Option<PathBuf>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Separator between classpath entries.
    #[arg(long, value_name = "CHAR", default_value_t = DEFAULT_DELIMITER)]
    pub delimiter: char,

    /// Name of the exclusion directory created next to the classdump.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_EXCLUSION_NAME)]
    pub exclusion_name: String,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
