//! CLI argument definitions for the QC report generator.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use qc_core::DEFAULT_STREAMLINES;
use qc_model::ModuleKind;
use qc_report::DEFAULT_PDF_PROGRAM;

#[derive(Parser)]
#[command(
    name = "qc-report",
    version,
    about = "Generate per-module QC reports for a processed subject",
    long_about = "Generate one PDF quality-control report per completed pipeline module.\n\n\
                  Status records are read from <OUT>/<SUB>[/<SES>]/QC and each report is\n\
                  written next to its status record as <record>_qc-report.pdf."
)]
pub struct Cli {
    /// Subject identifier, with or without the `sub-` prefix.
    #[arg(long = "sub", value_name = "SUBJECT")]
    pub sub: String,

    /// Pipeline output directory holding the processed subjects.
    #[arg(long = "out", value_name = "DIR")]
    pub out: PathBuf,

    /// Raw BIDS dataset directory.
    #[arg(long = "bids", value_name = "DIR")]
    pub bids: PathBuf,

    /// Session identifier, with or without the `ses-` prefix.
    #[arg(long = "ses", value_name = "SESSION")]
    pub ses: Option<String>,

    /// Streamline count used when a tractography record does not name one.
    #[arg(long = "tracts", value_name = "COUNT", default_value = DEFAULT_STREAMLINES)]
    pub tracts: String,

    /// Directory for intermediate images.
    #[arg(long = "tmp-dir", value_name = "DIR", default_value = "/tmp")]
    pub tmp_dir: PathBuf,

    /// Directory holding the surface reconstructions (default: derived from --out).
    #[arg(long = "derivatives", value_name = "DIR")]
    pub derivatives: Option<PathBuf>,

    /// Only report these modules (repeatable; default: all).
    #[arg(long = "module", value_name = "MODULE", value_parser = parse_module)]
    pub modules: Vec<ModuleKind>,

    /// Pipeline installation root (templates, parcellations, helper scripts).
    #[arg(long = "pipeline-root", value_name = "DIR", env = "MICAPIPE")]
    pub pipeline_root: PathBuf,

    /// Volume screenshot program (default: <PIPELINE_ROOT>/functions/nifti_capture.py).
    #[arg(long = "capture-cmd", value_name = "PROGRAM")]
    pub capture_cmd: Option<PathBuf>,

    /// Surface plotting program (default: <PIPELINE_ROOT>/functions/surface_plot.py).
    #[arg(long = "surface-cmd", value_name = "PROGRAM")]
    pub surface_cmd: Option<PathBuf>,

    /// Matrix plotting program (default: <PIPELINE_ROOT>/functions/matrix_plot.py).
    #[arg(long = "matrix-cmd", value_name = "PROGRAM")]
    pub matrix_cmd: Option<PathBuf>,

    /// HTML to PDF converter.
    #[arg(long = "pdf-cmd", value_name = "PROGRAM", default_value = DEFAULT_PDF_PROGRAM)]
    pub pdf_cmd: PathBuf,

    /// Keep the HTML page next to each PDF.
    #[arg(long = "keep-html")]
    pub keep_html: bool,

    /// Keep intermediate images in the temporary directory.
    #[arg(long = "nocleanup")]
    pub nocleanup: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Modules to report, in driver order.
    pub fn selected_modules(&self) -> Vec<ModuleKind> {
        if self.modules.is_empty() {
            return ModuleKind::ALL.to_vec();
        }
        ModuleKind::ALL
            .into_iter()
            .filter(|module| self.modules.contains(module))
            .collect()
    }
}

fn parse_module(value: &str) -> Result<ModuleKind, String> {
    value.parse::<ModuleKind>().map_err(|error| error.to_string())
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
