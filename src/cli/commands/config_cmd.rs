//! Configuration inspection.

use console::style;

use cas_extract::config::{Config, Settings};

use crate::cli::icons::{dim_arrow, info};

/// Show the loaded config file and the settings resolved from it.
pub async fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => println!("{} Config file: {}", info(), path.display()),
        None => println!("{} No config file found, using defaults", info()),
    }

    let rendered = config.to_toml()?;
    if !rendered.trim().is_empty() {
        println!();
        println!("{}", rendered.trim_end());
    }

    println!();
    println!("{}", style("Resolved settings").bold());
    println!("  {} annotation_dir: {}", dim_arrow(), settings.annotation_dir.display());
    println!("  {} curation_dir: {}", dim_arrow(), settings.curation_dir.display());
    println!(
        "  {} annotators: {}",
        dim_arrow(),
        if settings.annotators.is_empty() {
            "(all)".to_string()
        } else {
            settings.annotators.join(", ")
        }
    );
    println!(
        "  {} exclude_suffixes: {}",
        dim_arrow(),
        settings.exclude_suffixes.join(", ")
    );
    println!(
        "  {} expected files: {} annotation, {} curation",
        dim_arrow(),
        settings
            .expected_annotation_files
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string()),
        settings
            .expected_curation_files
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  {} output: {}", dim_arrow(), settings.output.display());
    println!(
        "  {} exploded_output: {}",
        dim_arrow(),
        settings.exploded_output.display()
    );
    println!("  {} workers: {}", dim_arrow(), settings.workers);

    Ok(())
}
