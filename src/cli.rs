use crate::report::ReportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signin-recon")]
#[command(about = "Reconcile OCR'd sign-in sheets against an employee directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match one sheet against the directory
    Match {
        /// Sheet file: Textract response, rows array or rows document (JSON)
        #[arg(required = true)]
        rows: PathBuf,

        #[command(flatten)]
        matching: MatchArgs,

        /// Sheet date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Id printed on the sheet
        #[arg(long)]
        sheet_id: Option<String>,
    },

    /// Match every sheet file in a folder against one directory snapshot
    Run {
        /// Folder of sheet files
        #[arg(required = true)]
        folder: PathBuf,

        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Convert a Textract response into a rows document
    Extract {
        /// Saved Textract AnalyzeDocument response (JSON)
        #[arg(required = true)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop rows where every cell is blank
        #[arg(long)]
        skip_blank_rows: bool,

        /// Sheet date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Id printed on the sheet
        #[arg(long)]
        sheet_id: Option<String>,
    },

    /// Show or edit the saved configuration
    Config {
        /// Set the name match threshold (0.0-1.0)
        #[arg(long)]
        set_threshold: Option<f64>,

        /// Set the default directory file
        #[arg(long)]
        set_directory: Option<PathBuf>,

        /// Show the configuration
        #[arg(long)]
        show: bool,
    },
}

/// Options shared by `match` and `run`
#[derive(Args, Clone, Debug)]
pub struct MatchArgs {
    /// Directory file (.json / .csv / .xlsx); defaults to the configured one
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Worksheet to read from a spreadsheet directory
    #[arg(long)]
    pub sheet: Option<String>,

    /// Minimum name similarity (0.0-1.0), overrides the configured value
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Folder for JSON/Excel reports (default: next to the sheet)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Match rows one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Drop table rows where every cell is blank
    #[arg(long)]
    pub skip_blank_rows: bool,
}
