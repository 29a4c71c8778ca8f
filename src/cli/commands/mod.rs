//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod build;
mod config_cmd;
mod explode;
mod extract;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cas_extract::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "casx")]
#[command(about = "Flatten WebAnno/INCEpTION clinical annotation exports into tables")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one annotation document to CSV
    Extract {
        /// CAS JSON file exported by WebAnno/INCEpTION
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write one row per word of the mention text
        #[arg(long)]
        explode: bool,
    },

    /// Extract the whole corpus (annotation + curation) to CSV
    Build {
        /// Annotation export root (overrides config)
        #[arg(long)]
        annotation_dir: Option<PathBuf>,
        /// Curation export root (overrides config)
        #[arg(long)]
        curation_dir: Option<PathBuf>,
        /// Table output file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Word-exploded table output file (overrides config)
        #[arg(long)]
        exploded_output: Option<PathBuf>,
        /// Number of extraction workers
        #[arg(short, long, env = "CASX_WORKERS")]
        workers: Option<usize>,
        /// Skip the expected file count check
        #[arg(long)]
        no_count_check: bool,
        /// Only list the selected files
        #[arg(long)]
        dry_run: bool,
    },

    /// Split the Texte column of a table CSV into one row per word
    Explode {
        /// Table CSV written by extract or build
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the loaded configuration and resolved settings
    Show,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (mut settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Extract {
            file,
            output,
            explode,
        } => extract::cmd_extract(&file, output.as_deref(), explode).await,
        Commands::Build {
            annotation_dir,
            curation_dir,
            output,
            exploded_output,
            workers,
            no_count_check,
            dry_run,
        } => {
            if let Some(dir) = annotation_dir {
                settings.annotation_dir = dir;
            }
            if let Some(dir) = curation_dir {
                settings.curation_dir = dir;
            }
            if let Some(path) = output {
                settings.output = path;
            }
            if let Some(path) = exploded_output {
                settings.exploded_output = path;
            }
            if let Some(n) = workers {
                settings.workers = n.max(1);
            }
            build::cmd_build(&settings, !no_count_check, dry_run).await
        }
        Commands::Explode { input, output } => {
            explode::cmd_explode(&input, output.as_deref()).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, &config).await,
        },
    }
}
