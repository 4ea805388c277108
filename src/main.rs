use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use signin_recon::cli::{Cli, Commands, MatchArgs};
use signin_recon::config::Config;
use signin_recon::directory::FileDirectory;
use signin_recon::error::ReconError;
use signin_recon::pipeline::{self, SheetOverrides, Snapshot};
use signin_recon::extractor;
use signin_recon::report::{self, console, ReportContext, SheetReport};
use signin_recon_common::{parse_textract_json, Matcher, TableOptions};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "signin_recon=info,signin_recon_common=debug"
    } else {
        "signin_recon=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Match { rows, matching, date, sheet_id } => {
            println!("signin-recon - match\n");
            let config = Config::load()?;

            let (matcher, snapshot, context) = prepare(&config, &matching)?;
            println!(
                "✔ Directory: {} entries from {}",
                snapshot.reference.len(),
                snapshot.description
            );

            let overrides = SheetOverrides { date, sheet_id };
            let report = pipeline::reconcile_file(
                &rows,
                &snapshot,
                &matcher,
                &context,
                table_options(&matching),
                &overrides,
            )?;

            let output_dir = matching
                .output
                .clone()
                .unwrap_or_else(|| rows.parent().unwrap_or(Path::new(".")).to_path_buf());
            emit(&report, &matching, &output_dir, &pipeline::report_stem(&rows))?;
        }

        Commands::Run { folder, matching } => {
            println!("signin-recon - run\n");

            let sheets = extractor::scan_folder(&folder)?;
            if sheets.is_empty() {
                return Err(ReconError::NoSheetsFound(folder.display().to_string()).into());
            }
            println!("✔ {} sheet files found", sheets.len());

            let config = Config::load()?;

            let (matcher, snapshot, context) = prepare(&config, &matching)?;
            println!(
                "✔ Directory: {} entries from {}\n",
                snapshot.reference.len(),
                snapshot.description
            );

            let progress = ProgressBar::new(sheets.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
                    .progress_chars("█▓░"),
            );
            let table = table_options(&matching);
            let outcomes: Vec<_> = sheets
                .par_iter()
                .map(|path| {
                    let result = pipeline::reconcile_file(
                        path,
                        &snapshot,
                        &matcher,
                        &context,
                        table,
                        &SheetOverrides::default(),
                    );
                    progress.inc(1);
                    result
                })
                .collect();
            progress.finish_and_clear();

            let output_dir = matching.output.clone().unwrap_or_else(|| folder.clone());
            let mut failed = 0;
            for (path, outcome) in sheets.iter().zip(outcomes) {
                match outcome {
                    Ok(report) => emit(&report, &matching, &output_dir, &pipeline::report_stem(path))?,
                    Err(e) => {
                        failed += 1;
                        warn!(sheet = %path.display(), "sheet failed: {}", e);
                        println!("✘ {}: {}", path.display(), e);
                    }
                }
            }

            if failed > 0 {
                anyhow::bail!("{} of {} sheets failed", failed, sheets.len());
            }
            println!("\n✅ {} sheets reconciled", sheets.len());
        }

        Commands::Extract { input, output, skip_blank_rows, date, sheet_id } => {
            let content = std::fs::read_to_string(&input)
                .map_err(|_| ReconError::FileNotFound(input.display().to_string()))?;
            let rows = parse_textract_json(&content, TableOptions { skip_blank_rows })
                .map_err(ReconError::from)?;

            let mut sheet = extractor::SheetInput {
                rows,
                ..Default::default()
            };
            SheetOverrides { date, sheet_id }.apply(&mut sheet)?;
            info!(rows = sheet.rows.len(), "table extracted");

            let json = serde_json::to_string_pretty(&sheet)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("✔ {} rows written to {}", sheet.rows.len(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Config { set_threshold, set_directory, show } => {
            let mut config = Config::load_for_edit(&Config::config_path()?);
            let editing = set_threshold.is_some() || set_directory.is_some();

            if let Some(threshold) = set_threshold {
                config.set_threshold(threshold)?;
                println!("✔ Name match threshold set to {}", threshold);
            }
            if let Some(path) = set_directory {
                config.set_directory(path)?;
                println!("✔ Directory source saved");
            }

            if show || !editing {
                println!("Configuration ({}):", Config::config_path()?.display());
                println!("  Name match threshold: {}", config.name_match_threshold);
                println!("  Valid confidence:     {}", config.valid_confidence);
                println!("  High confidence:      {}", config.high_confidence);
                println!("  Parallel matching:    {}", config.parallel);
                println!(
                    "  Directory source:     {}",
                    config
                        .directory
                        .source
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "not set".into())
                );
                println!("  Table name:           {}", config.directory.table_name);
            }
        }
    }

    Ok(())
}

/// Matcher, directory snapshot and report context for `match` / `run`
fn prepare(config: &Config, args: &MatchArgs) -> anyhow::Result<(Matcher, Snapshot, ReportContext)> {
    let mut options = config.matcher_options();
    if let Some(threshold) = args.threshold {
        options.name_match_threshold = threshold;
    }
    if args.sequential {
        options.parallel = false;
    }
    let matcher = Matcher::new(options).map_err(ReconError::from)?;

    let mut directory_config = config.directory.clone();
    if let Some(path) = &args.directory {
        directory_config.source = Some(path.clone());
    }
    if let Some(sheet) = &args.sheet {
        directory_config.sheet = Some(sheet.clone());
    }
    let directory = FileDirectory::from_config(&directory_config)?;
    let snapshot = pipeline::load_snapshot(&directory)?;
    let context = snapshot.context(&matcher, config.bands());

    Ok((matcher, snapshot, context))
}

fn table_options(args: &MatchArgs) -> TableOptions {
    TableOptions {
        skip_blank_rows: args.skip_blank_rows,
    }
}

fn emit(report: &SheetReport, args: &MatchArgs, output_dir: &Path, stem: &str) -> anyhow::Result<()> {
    if args.format.wants_text() {
        print!("{}", console::render(report));
    }
    for path in report::write_reports(report, args.format, output_dir, stem)? {
        println!("✔ Report saved: {}", path.display());
    }
    Ok(())
}
