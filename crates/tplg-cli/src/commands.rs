use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use tplg_sdk::{read_blocks, BlockInfo, CompilerConfig, Diagnostic, Project};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Compile(args) => cmd_compile(args, format),
        Command::Dump(args) => cmd_dump(args, format),
    }
}

#[derive(Serialize)]
struct CompileSummary<'a> {
    output: &'a Path,
    size: usize,
    blocks: &'a [BlockInfo],
    warnings: &'a [Diagnostic],
}

fn load_config(args: &CompileArgs) -> anyhow::Result<CompilerConfig> {
    let mut config = match &args.config {
        Some(path) => CompilerConfig::load(path)
            .with_context(|| format!("loading compiler config {}", path.display()))?,
        None => CompilerConfig::default(),
    };
    if let Some(version) = args.topology_version {
        config.version = version;
    }
    if let Some(max) = args.max_private_size {
        config.max_private_size = max;
    }
    config.include_dirs.extend(args.include.iter().cloned());
    Ok(config)
}

fn cmd_compile(args: CompileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    debug!(?config, "compiler configuration");

    let mut project = Project::new(config);
    let elements = project
        .load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let warnings = project
        .build()
        .with_context(|| format!("building {}", args.input.display()))?
        .diagnostics
        .clone();
    let image = project
        .write_file(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    match format {
        OutputFormat::Json => {
            let summary = CompileSummary {
                output: &args.output,
                size: image.len(),
                blocks: &image.blocks,
                warnings: &warnings,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            for warning in &warnings {
                eprintln!("{} {}", "warning:".yellow().bold(), warning);
            }
            println!(
                "{} Compiled {} elements into {}",
                "✓".green().bold(),
                elements,
                args.output.display().to_string().bold()
            );
            println!(
                "  {} bytes in {} blocks, {} warning(s)",
                image.len(),
                image.blocks.len(),
                warnings.len()
            );
        }
    }
    Ok(())
}

fn cmd_dump(args: DumpArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let blocks = read_blocks(&bytes)
        .with_context(|| format!("{} is not a valid topology image", args.file.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&blocks)?),
        OutputFormat::Text => {
            println!(
                "{:<12} {:>6} {:>6} {:>8} {:>10} {:>10}",
                "TYPE".bold(),
                "INDEX".bold(),
                "COUNT".bold(),
                "VENDOR".bold(),
                "PAYLOAD".bold(),
                "OFFSET".bold()
            );
            for block in &blocks {
                println!(
                    "{:<12} {:>6} {:>6} {:>8} {:>10} {:>10}",
                    block.block_type.to_string().cyan(),
                    block.index,
                    block.count,
                    block.vendor_type,
                    block.payload_size,
                    format!("{:#x}", block.offset).dimmed()
                );
            }
            println!(
                "{} blocks, {} bytes",
                blocks.len().to_string().bold(),
                bytes.len()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CONF: &str = r#"
        SectionWidget."PGA1" { type "pga" }
        SectionWidget."Speaker" { type "output" }
        SectionGraph."main" { lines [ "Speaker, , PGA1" ] }
    "#;

    fn compile_args(input: PathBuf, output: PathBuf) -> CompileArgs {
        CompileArgs {
            input,
            output,
            config: None,
            topology_version: None,
            include: Vec::new(),
            max_private_size: None,
        }
    }

    #[test]
    fn compile_then_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("top.conf");
        let output = dir.path().join("top.tplg");
        std::fs::write(&input, CONF).unwrap();

        cmd_compile(compile_args(input, output.clone()), OutputFormat::Text).unwrap();
        assert!(output.exists());
        cmd_dump(DumpArgs { file: output.clone() }, OutputFormat::Json).unwrap();

        let blocks = read_blocks(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn overrides_apply_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let toml = dir.path().join("tplg.toml");
        std::fs::write(&toml, "version = 2\ninclude_dirs = [\"/a\"]\n").unwrap();

        let mut args = compile_args(PathBuf::from("in.conf"), PathBuf::from("out.tplg"));
        args.config = Some(toml);
        args.topology_version = Some(9);
        args.include = vec![PathBuf::from("/b")];
        let config = load_config(&args).unwrap();
        assert_eq!(config.version, 9);
        assert_eq!(config.include_dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn compile_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.conf");
        let output = dir.path().join("bad.tplg");
        std::fs::write(&input, r#"SectionWidget."w" { type "pga" mixer "missing" }"#).unwrap();

        let err = cmd_compile(compile_args(input, output.clone()), OutputFormat::Text).unwrap_err();
        assert!(format!("{err:#}").contains("missing"));
        assert!(!output.exists());
    }

    #[test]
    fn dump_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("junk.tplg");
        std::fs::write(&file, [0u8; 40]).unwrap();
        assert!(cmd_dump(DumpArgs { file }, OutputFormat::Text).is_err());
    }
}
