//! HTML to PDF conversion.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::render::{RenderError, Result, ensure_output, run_program};

/// Default converter program, looked up on `PATH`.
pub const DEFAULT_PDF_PROGRAM: &str = "wkhtmltopdf";

/// Converts a finished HTML page into a PDF at `dest`.
pub trait PdfConverter {
    fn convert(&self, html: &str, dest: &Path) -> Result<()>;
}

/// Converter backed by an external program invoked as
/// `<program> --enable-local-file-access <page.html> <dest.pdf>`.
///
/// The page is staged in the scratch directory and removed afterwards.
#[derive(Debug, Clone)]
pub struct CommandPdfConverter {
    program: PathBuf,
    scratch_dir: PathBuf,
}

impl CommandPdfConverter {
    pub fn new(program: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    fn staging_path(&self, dest: &Path) -> PathBuf {
        let stem = dest
            .file_stem()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("report"));
        let mut name = stem;
        name.push(".html");
        self.scratch_dir.join(name)
    }
}

impl PdfConverter for CommandPdfConverter {
    fn convert(&self, html: &str, dest: &Path) -> Result<()> {
        let page = self.staging_path(dest);
        std::fs::write(&page, html).map_err(|source| RenderError::Io {
            path: page.clone(),
            source,
        })?;
        let args: Vec<OsString> = vec![
            "--enable-local-file-access".into(),
            page.clone().into(),
            dest.into(),
        ];
        let result =
            run_program(&self.program, &args).and_then(|()| ensure_output(&self.program, dest));
        let _ = std::fs::remove_file(&page);
        result
    }
}
