//! Visualization collaborators.
//!
//! Volume screenshots, surface plots and matrix images are produced by
//! external programs. Section builders only see the traits below; the
//! `Command*` implementations shell out and block until the program exits.
//!
//! Argument contracts of the default programs:
//!
//! ```text
//! nifti_capture.py -img [<reference>] <volume> [-roi] -out <png>
//! <surface-cmd> --lh <mesh> --rh <mesh> [--data <kind> <lh> <rh> | --values <txt>]
//!               --cmap <name> [--range <min> <max> | --range sym] --layout <row|grid>
//!               [--colorbar] --out <png>
//! <matrix-cmd>  --matrix <txt> --cmap <name> --out <png>
//! ```

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::debug;

use qc_ingest::HemiPair;
use qc_model::Matrix;

/// Errors raised by external collaborators.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Program could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Program exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Program exited successfully but did not write its output.
    #[error("{program} did not produce {path}")]
    MissingOutput { program: String, path: PathBuf },

    /// Intermediate input file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Matrix values could not be serialized.
    #[error("failed to write {path}: {source}")]
    Delimited {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, RenderError>;

// === Requests ===

/// Screenshot request for a NIfTI volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeShot {
    pub volume: PathBuf,
    /// Underlay drawn beneath `volume`.
    pub reference: Option<PathBuf>,
    /// Draw `volume` as a label map over `reference`. Ignored without one.
    pub roi: bool,
    pub output: PathBuf,
}

/// Per-vertex data drawn on a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceData {
    /// Plain mesh with a constant colour.
    Mesh,
    /// FreeSurfer morphometry files (`lh.thickness`).
    Morphometry(HemiPair),
    /// FreeSurfer annotation files.
    Annotation(HemiPair),
    /// GIFTI functional files.
    Gifti(HemiPair),
    /// Values computed by the report, both hemispheres concatenated.
    Values(Vec<f64>),
}

impl SurfaceData {
    fn kind(&self) -> &'static str {
        match self {
            SurfaceData::Mesh => "mesh",
            SurfaceData::Morphometry(_) => "morph",
            SurfaceData::Annotation(_) => "annot",
            SurfaceData::Gifti(_) => "gifti",
            SurfaceData::Values(_) => "values",
        }
    }
}

/// Colour scale limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorRange {
    /// Data minimum to maximum.
    #[default]
    Auto,
    /// Symmetric around zero.
    Symmetric,
    Fixed(f64, f64),
}

/// Arrangement of the hemisphere views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotLayout {
    /// Lateral and medial views in one row.
    #[default]
    Row,
    /// Two-by-two grid, used for degree maps.
    Grid,
}

/// Surface plot request.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePlot {
    pub surfaces: HemiPair,
    pub data: SurfaceData,
    pub cmap: String,
    pub range: ColorRange,
    pub layout: PlotLayout,
    pub color_bar: bool,
    pub output: PathBuf,
}

impl SurfacePlot {
    pub fn new(surfaces: HemiPair, data: SurfaceData, output: PathBuf) -> Self {
        Self {
            surfaces,
            data,
            cmap: "viridis".to_string(),
            range: ColorRange::Auto,
            layout: PlotLayout::Row,
            color_bar: false,
            output,
        }
    }

    #[must_use]
    pub fn cmap(mut self, cmap: impl Into<String>) -> Self {
        self.cmap = cmap.into();
        self
    }

    #[must_use]
    pub fn range(mut self, range: ColorRange) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: PlotLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn color_bar(mut self) -> Self {
        self.color_bar = true;
        self
    }
}

/// Heat-map request for a matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixPlot<'a> {
    pub matrix: &'a Matrix,
    pub cmap: &'a str,
    pub output: PathBuf,
}

// === Collaborators ===

/// Captures a screenshot of a volume.
pub trait VolumeCapture {
    fn capture(&self, shot: &VolumeShot) -> Result<()>;
}

/// Renders data on a pair of hemisphere surfaces.
pub trait SurfacePlotter {
    fn plot(&self, plot: &SurfacePlot) -> Result<()>;
}

/// Renders a matrix as an image.
pub trait MatrixPlotter {
    fn plot(&self, plot: &MatrixPlot<'_>) -> Result<()>;
}

/// The visualization collaborators used by section builders.
pub struct Renderers {
    pub volume: Box<dyn VolumeCapture>,
    pub surface: Box<dyn SurfacePlotter>,
    pub matrix: Box<dyn MatrixPlotter>,
}

impl Renderers {
    pub fn new(
        volume: Box<dyn VolumeCapture>,
        surface: Box<dyn SurfacePlotter>,
        matrix: Box<dyn MatrixPlotter>,
    ) -> Self {
        Self {
            volume,
            surface,
            matrix,
        }
    }

    /// Subprocess-backed collaborators.
    pub fn commands(volume: PathBuf, surface: PathBuf, matrix: PathBuf) -> Self {
        Self::new(
            Box::new(CommandVolumeCapture::new(volume)),
            Box::new(CommandSurfacePlotter::new(surface)),
            Box::new(CommandMatrixPlotter::new(matrix)),
        )
    }
}

// === Subprocess implementations ===

/// Runs `program` with `args`, failing on a non-zero exit status.
pub(crate) fn run_program(program: &Path, args: &[OsString]) -> Result<()> {
    let name = program.display().to_string();
    debug!(program = %name, args = ?args, "running collaborator");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| RenderError::Spawn {
            program: name.clone(),
            source,
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(RenderError::CommandFailed {
            program: name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Fails when `program` reported success without writing `output`.
pub(crate) fn ensure_output(program: &Path, output: &Path) -> Result<()> {
    if output.is_file() {
        Ok(())
    } else {
        Err(RenderError::MissingOutput {
            program: program.display().to_string(),
            path: output.to_path_buf(),
        })
    }
}

/// Volume screenshots through the pipeline's capture utility.
#[derive(Debug, Clone)]
pub struct CommandVolumeCapture {
    program: PathBuf,
}

impl CommandVolumeCapture {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(shot: &VolumeShot) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-img".into()];
        if let Some(reference) = &shot.reference {
            args.push(reference.into());
        }
        args.push(shot.volume.clone().into());
        if shot.roi && shot.reference.is_some() {
            args.push("-roi".into());
        }
        args.push("-out".into());
        args.push(shot.output.clone().into());
        args
    }
}

impl VolumeCapture for CommandVolumeCapture {
    fn capture(&self, shot: &VolumeShot) -> Result<()> {
        run_program(&self.program, &Self::args(shot))?;
        ensure_output(&self.program, &shot.output)
    }
}

/// Surface plots through an external plotting program.
#[derive(Debug, Clone)]
pub struct CommandSurfacePlotter {
    program: PathBuf,
}

impl CommandSurfacePlotter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(plot: &SurfacePlot, values_file: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--lh".into(),
            plot.surfaces.left.clone().into(),
            "--rh".into(),
            plot.surfaces.right.clone().into(),
        ];
        match &plot.data {
            SurfaceData::Mesh => {}
            SurfaceData::Morphometry(pair)
            | SurfaceData::Annotation(pair)
            | SurfaceData::Gifti(pair) => {
                args.push("--data".into());
                args.push(plot.data.kind().into());
                args.push(pair.left.clone().into());
                args.push(pair.right.clone().into());
            }
            SurfaceData::Values(_) => {
                if let Some(file) = values_file {
                    args.push("--values".into());
                    args.push(file.into());
                }
            }
        }
        args.push("--cmap".into());
        args.push(plot.cmap.clone().into());
        match plot.range {
            ColorRange::Auto => {}
            ColorRange::Symmetric => {
                args.push("--range".into());
                args.push("sym".into());
            }
            ColorRange::Fixed(min, max) => {
                args.push("--range".into());
                args.push(min.to_string().into());
                args.push(max.to_string().into());
            }
        }
        args.push("--layout".into());
        args.push(
            match plot.layout {
                PlotLayout::Row => "row",
                PlotLayout::Grid => "grid",
            }
            .into(),
        );
        if plot.color_bar {
            args.push("--colorbar".into());
        }
        args.push("--out".into());
        args.push(plot.output.clone().into());
        args
    }
}

impl SurfacePlotter for CommandSurfacePlotter {
    fn plot(&self, plot: &SurfacePlot) -> Result<()> {
        let values_file = match &plot.data {
            SurfaceData::Values(values) => {
                let path = plot.output.with_extension("values.txt");
                write_column(&path, values)?;
                Some(path)
            }
            _ => None,
        };
        let result = run_program(&self.program, &Self::args(plot, values_file.as_deref()))
            .and_then(|()| ensure_output(&self.program, &plot.output));
        if let Some(path) = values_file {
            let _ = std::fs::remove_file(path);
        }
        result
    }
}

/// Matrix images through an external plotting program.
#[derive(Debug, Clone)]
pub struct CommandMatrixPlotter {
    program: PathBuf,
}

impl CommandMatrixPlotter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MatrixPlotter for CommandMatrixPlotter {
    fn plot(&self, plot: &MatrixPlot<'_>) -> Result<()> {
        let matrix_file = plot.output.with_extension("matrix.txt");
        write_matrix(&matrix_file, plot.matrix)?;
        let args: Vec<OsString> = vec![
            "--matrix".into(),
            matrix_file.clone().into(),
            "--cmap".into(),
            plot.cmap.into(),
            "--out".into(),
            plot.output.clone().into(),
        ];
        let result = run_program(&self.program, &args)
            .and_then(|()| ensure_output(&self.program, &plot.output));
        let _ = std::fs::remove_file(&matrix_file);
        result
    }
}

/// Writes `matrix` space-delimited, one row per line.
pub fn write_matrix(path: &Path, matrix: &Matrix) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(path)
        .map_err(|source| RenderError::Delimited {
            path: path.to_path_buf(),
            source,
        })?;
    for row in matrix.iter_rows() {
        writer
            .write_record(row.iter().map(f64::to_string))
            .map_err(|source| RenderError::Delimited {
                path: path.to_path_buf(),
                source,
            })?;
    }
    writer.flush().map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes one value per line.
fn write_column(path: &Path, values: &[f64]) -> Result<()> {
    let io_error = |source: std::io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    for value in values {
        writeln!(writer, "{value}").map_err(io_error)?;
    }
    writer.flush().map_err(io_error)
}
