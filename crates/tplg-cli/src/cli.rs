use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tplg",
    about = "ALSA SoC topology compiler",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a topology configuration into a binary image
    Compile(CompileArgs),
    /// Print the block layout of a binary image
    Dump(DumpArgs),
}

#[derive(Args)]
pub struct CompileArgs {
    /// Topology configuration file
    pub input: PathBuf,
    /// Where to write the binary image
    #[arg(short, long)]
    pub output: PathBuf,
    /// Compiler settings (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Topology version stamped into every block header
    #[arg(long = "version", value_name = "N")]
    pub topology_version: Option<u32>,
    /// Extra directory searched for data files
    #[arg(short = 'I', long = "include")]
    pub include: Vec<PathBuf>,
    /// Private data limit in bytes
    #[arg(long)]
    pub max_private_size: Option<usize>,
}

#[derive(Args)]
pub struct DumpArgs {
    /// Binary topology image
    pub file: PathBuf,
}
