use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use prosa_lib::config::{CONFIG_FILE_NAME, Config, SourceFormat};
use prosa_lib::parallel::{DocumentInput, segment_all};
use prosa_lib::segment::Document;

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the scoped segments of each file
    Segments {
        /// Files to segment
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Source format, overriding detection from the file extension
        #[arg(long)]
        format: Option<SourceFormat>,

        /// Print segments as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the prose summary of each file
    Summary {
        /// Files to summarize
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Source format, overriding detection from the file extension
        #[arg(long)]
        format: Option<SourceFormat>,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Serialize)]
struct FileSegments<'a> {
    path: String,
    #[serde(flatten)]
    document: &'a Document,
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }

    if let Some(path) = &cli.config {
        return Ok(Config::load(path)?);
    }

    let discovered = Path::new(CONFIG_FILE_NAME);
    if discovered.is_file() {
        log::debug!("Using configuration from {}", discovered.display());
        return Ok(Config::load(discovered)?);
    }

    Ok(Config::default())
}

fn segment_files(paths: &[PathBuf], format: Option<SourceFormat>, config: &Config) -> Result<Vec<Document>> {
    let inputs = paths
        .iter()
        .map(|path| {
            let source =
                fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let format = format.unwrap_or_else(|| config.format_for(path));
            Ok(DocumentInput::new(source, format))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(segment_all(&inputs, config))
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Segments { paths, format, json } => {
            let documents = segment_files(paths, *format, &config)?;

            if *json {
                let files: Vec<FileSegments> = paths
                    .iter()
                    .zip(&documents)
                    .map(|(path, document)| FileSegments {
                        path: path.display().to_string(),
                        document,
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&files)?);
                return Ok(());
            }

            for (path, document) in paths.iter().zip(&documents) {
                if paths.len() > 1 {
                    println!("{}", path.display().to_string().bold());
                }
                for segment in document.iter() {
                    println!("{}\t{}", segment.scope.cyan(), segment.text.replace('\n', "\\n"));
                }
            }
        }
        Commands::Summary { paths, format } => {
            let documents = segment_files(paths, *format, &config)?;
            for (path, document) in paths.iter().zip(&documents) {
                if paths.len() > 1 {
                    println!("{}", path.display().to_string().bold());
                }
                println!("{}", document.summary.trim_end());
            }
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    if let Err(e) = run(&cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
