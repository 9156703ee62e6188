//! Command line front end over `seda_core`.
//!
//! # Responsibility
//! - Read a manifest, report its shape, rewrite or compact it.
//! - Keep output deterministic so runs can be diffed.

use clap::{Parser, Subcommand};
use log::info;
use seda_core::metadata::SedaMetadata;
use seda_core::service::CompactionCounters;
use seda_core::xml::{archive_transfer_from_str, archive_transfer_to_string, metadata_to_xml_string};
use seda_core::{compact, default_log_level, init_logging, ManifestLayout, SedaConfig, SedaError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Reads, rewrites and compacts SEDA 2.1/2.2 transfer manifests.
#[derive(Parser, Debug)]
#[command(name = "seda_cli", version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rotated log files; logging stays off when unset.
    #[arg(long, global = true, env = "SEDA_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the core crate version.
    Version,

    /// Report the shape of a manifest.
    Inspect {
        manifest: PathBuf,
    },

    /// Read a manifest and write it back with the configured layout and version.
    Rewrite {
        manifest: PathBuf,
        output: PathBuf,
    },

    /// Compact the subtree of one unit and print the copy plan.
    Compact {
        manifest: PathBuf,
        unit_id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("warning: {err}");
        }
    }
    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Command::Version => {
            println!("seda_core version={}", seda_core::core_version());
            Ok(())
        }
        Command::Inspect { manifest } => inspect(manifest, &config),
        Command::Rewrite { manifest, output } => rewrite(manifest, output, &config),
        Command::Compact { manifest, unit_id } => run_compact(manifest, unit_id, &config),
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error ({:?}): {err}", err.kind());
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SedaConfig, SedaError> {
    match path {
        Some(path) => SedaConfig::from_file(path),
        None => Ok(SedaConfig::default()),
    }
}

fn read_manifest(
    path: &Path,
    config: &SedaConfig,
) -> Result<seda_core::xml::ReadOutcome, SedaError> {
    let xml = std::fs::read_to_string(path)?;
    let outcome = archive_transfer_from_str(&xml, config.read_options())?;
    for failure in &outcome.failures {
        eprintln!("skipped: {failure}");
    }
    Ok(outcome)
}

fn inspect(manifest: &Path, config: &SedaConfig) -> Result<(), SedaError> {
    let outcome = read_manifest(manifest, config)?;
    let package = &outcome.transfer.package;
    println!("message_identifier={}", outcome.transfer.global.message_identifier);
    println!("layout={:?}", outcome.layout);
    println!("units={}", package.unit_count());
    println!("groups={}", package.group_count());
    println!("top_level={}", package.root_children().join(","));
    println!("back_references={}", package.back_references().len());
    println!("failures={}", outcome.failures.len());
    Ok(())
}

fn rewrite(manifest: &Path, output: &Path, config: &SedaConfig) -> Result<(), SedaError> {
    let outcome = read_manifest(manifest, config)?;
    let xml = archive_transfer_to_string(
        &outcome.transfer,
        config.layout,
        config.seda_version,
        config.indent,
    )?;
    std::fs::write(output, xml)?;
    info!(
        "event=cli_rewrite module=cli status=ok layout={:?} version={}",
        config.layout, config.seda_version
    );
    println!(
        "written {} ({} layout, SEDA {})",
        output.display(),
        match config.layout {
            ManifestLayout::Flat => "flat",
            ManifestLayout::Hierarchical => "hierarchical",
        },
        config.seda_version
    );
    Ok(())
}

fn run_compact(manifest: &Path, unit_id: &str, config: &SedaConfig) -> Result<(), SedaError> {
    let mut outcome = read_manifest(manifest, config)?;
    let compaction = compact(&mut outcome.transfer.package, unit_id, &config.compactor)?;
    print!("{}", compaction.summary());
    let CompactionCounters { documents, .. } = compaction.counters;
    if documents > 0 {
        let pack = compaction.to_document_pack()?;
        println!("{}", metadata_to_xml_string(&pack)?);
        info!(
            "event=cli_compact module=cli status=ok element={} copies={}",
            pack.element_name(),
            compaction.copy_plan.len()
        );
    }
    for copy in &compaction.copy_plan {
        println!("copy {} -> {}", copy.source.display(), copy.destination);
    }
    Ok(())
}
