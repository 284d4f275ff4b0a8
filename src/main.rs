//! `license-report`: group the source files of a build by detected license.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]) and compile the corpus and file
//!    classifier; any configuration problem aborts here.
//! 3. Build the file set ([`closure`]): ask the build tool for dependency
//!    manifests, read pre-generated ones, or walk a directory.
//! 4. Read and detect every file ([`scan`], [`license::detector`]).
//! 5. Render the finalized [`aggregator::LicenseAssignment`] ([`report`]).
//! 6. Exit `0`, or `1` with a one-line diagnostic on a fatal error.

mod aggregator;
mod classifier;
mod cli;
mod closure;
mod config;
mod error;
mod license;
mod models;
mod report;
mod scan;

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use classifier::FileClassifier;
use cli::{Cli, ReportFormat};
use closure::build_tool::{BuildTool, DEPS_ARGS, TARGETS_ARGS};
use closure::{manifest, walk, FileSet};
use config::load_config;
use license::detector::Detector;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { cli.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(&cli).await {
        if cli.debug {
            eprintln!("{e:?}");
        } else {
            eprintln!("{e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let root = match &cli.walk {
        Some(dir) => dir.clone(),
        None => match &cli.build_directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("cannot determine current directory")?,
        },
    };
    let root = root.canonicalize().unwrap_or(root);

    let config = load_config(&root, cli.config.as_deref())?;
    let classifier = FileClassifier::from_config(&config)?;
    let mut detector = Detector::from_config(&config)?;

    tracing::info!(
        root = %root.display(),
        licenses = detector.corpus().entries().len(),
        file_types = classifier.rules().len(),
        "configuration loaded"
    );

    let files = match &cli.walk {
        Some(_) => {
            let mut files = FileSet::new();
            let mut visited = HashSet::new();
            walk::find_files(&root, &classifier, &cli.mode, &mut files, &mut visited)?;
            files
        }
        None => collect_from_build(cli, &root).await?,
    };

    tracing::info!("Total dependent source files: {}", files.len());

    let show_progress = !cli.quiet && matches!(cli.report, ReportFormat::Terminal);
    let report = scan::scan_files(&files, &mut detector, show_progress).finalize();

    match cli.report {
        ReportFormat::Terminal => report::terminal::render(&report, &root, cli.verbose, cli.quiet)?,
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// File set from dependency manifests: the pre-generated ones when given,
/// otherwise fresh output of the build tool.
async fn collect_from_build(cli: &Cli, build_dir: &Path) -> Result<FileSet> {
    if cli.deps_file.is_some() || cli.targets_file.is_some() {
        return Ok(closure::collect_from_manifests(
            build_dir,
            cli.deps_file.as_deref(),
            cli.targets_file.as_deref(),
        )?);
    }

    let mut files = FileSet::new();

    let tool = BuildTool::new(&cli.ninja, build_dir, Duration::from_secs(cli.timeout));
    tool.validate()?;

    let deps = tool.run(DEPS_ARGS).await?;
    manifest::parse_deps(&deps, &format!("{} {}", cli.ninja, DEPS_ARGS.join(" ")), build_dir, &mut files)?;

    let targets = tool.run(TARGETS_ARGS).await?;
    manifest::parse_targets(&targets, build_dir, &mut files);

    Ok(files)
}
