use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use xlfsync::{Converter, RunReport};
use xlfsync_cli::{FileSettings, Overrides, classify, discover, resolve};

/// Keeps XLIFF translation memories in sync with .resx, .vsct, .xaml and
/// C# LocalizableStrings sources.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root directory to convert recursively
    root: PathBuf,

    /// Also write localized copies of .resx, .vsct and .xaml files
    #[arg(long)]
    two_way: bool,

    /// Target languages, comma separated (e.g. de,fr,zh-Hans)
    #[arg(short, long, value_delimiter = ',')]
    languages: Option<Vec<String>>,

    /// Language of the source artifacts
    #[arg(long)]
    source_language: Option<String>,

    /// Where localized copies are written (defaults to the root)
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Settings file (defaults to <ROOT>/xlfsync.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunReport> {
    if !args.root.is_dir() {
        anyhow::bail!("{} is not a directory", args.root.display());
    }

    let settings = FileSettings::discover(&args.root, args.config.as_deref())?;
    let overrides = Overrides {
        languages: args.languages.clone(),
        source_language: args.source_language.clone(),
        two_way: args.two_way,
        output_root: args.output_root.clone(),
    };
    let config = resolve(&args.root, settings, overrides);
    let converter = Converter::new(config)?;
    let config = converter.config();

    let artifacts = discover(&args.root, &config.languages, &config.xlf_directory)
        .with_context(|| format!("cannot walk {}", args.root.display()))?;
    info!("Found {} artifacts under {}", artifacts.len(), args.root.display());

    let mut run = RunReport::default();
    for path in &artifacts {
        let Some(format) = classify(path, &config.languages) else {
            continue;
        };
        let report = converter
            .convert_as(path, format)
            .with_context(|| format!("converting {}", path.display()))?;
        run.push(report);
    }

    print_summary(&run, args.json, &args.root)?;
    Ok(run)
}

fn print_summary(run: &RunReport, json: bool, root: &Path) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(run).context("cannot serialize run report")?;
        println!("{text}");
        return Ok(());
    }
    println!(
        "{}: {} artifacts, {} converted, {} skipped, {} documents written, {} localized files written",
        root.display(),
        run.artifacts,
        run.converted,
        run.skipped,
        run.documents_written,
        run.localized_written
    );
    println!(
        "units: {} added, {} updated, {} unchanged, {} removed, {} awaiting translation",
        run.merge.added, run.merge.updated, run.merge.unchanged, run.merge.removed, run.pending
    );
    Ok(())
}
