//! End-to-end report generation against a fake pipeline layout.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use qc_core::{ReportContext, ReportOptions};
use qc_ingest::{ArtifactLocator, PipelineResources};
use qc_model::{ModuleKind, SubjectIdentity};
use qc_report::render::Result as RenderResult;
use qc_report::{
    MatrixPlot, MatrixPlotter, PdfConverter, RenderError, Renderers, SurfacePlot, SurfacePlotter,
    VolumeCapture, VolumeShot, default_registry, generate_report,
};
use tempfile::TempDir;

struct TouchVolume;

impl VolumeCapture for TouchVolume {
    fn capture(&self, shot: &VolumeShot) -> RenderResult<()> {
        touch(&shot.output);
        Ok(())
    }
}

struct FailingVolume;

impl VolumeCapture for FailingVolume {
    fn capture(&self, shot: &VolumeShot) -> RenderResult<()> {
        Err(RenderError::MissingOutput {
            program: "capture".to_string(),
            path: shot.output.clone(),
        })
    }
}

struct TouchSurface;

impl SurfacePlotter for TouchSurface {
    fn plot(&self, plot: &SurfacePlot) -> RenderResult<()> {
        touch(&plot.output);
        Ok(())
    }
}

struct TouchMatrix;

impl MatrixPlotter for TouchMatrix {
    fn plot(&self, plot: &MatrixPlot<'_>) -> RenderResult<()> {
        touch(&plot.output);
        Ok(())
    }
}

/// Writes the HTML where the PDF would go and remembers every call.
#[derive(Default)]
struct HtmlConverter {
    calls: RefCell<Vec<PathBuf>>,
}

impl PdfConverter for HtmlConverter {
    fn convert(&self, html: &str, dest: &Path) -> RenderResult<()> {
        fs::write(dest, html).unwrap();
        self.calls.borrow_mut().push(dest.to_path_buf());
        Ok(())
    }
}

fn touch(path: &Path) {
    write(path, "");
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn renderers() -> Renderers {
    Renderers::new(
        Box::new(TouchVolume),
        Box::new(TouchSurface),
        Box::new(TouchMatrix),
    )
}

struct Fixture {
    _root: TempDir,
    ctx: ReportContext,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let out = root.path().join("out");
        let scratch = root.path().join("tmp");
        fs::create_dir_all(&scratch).unwrap();
        let subject = SubjectIdentity::new("01", Some("02")).unwrap();
        let locator = ArtifactLocator::new(&out, root.path().join("rawdata"), &scratch, subject);
        let resources = PipelineResources::new(root.path().join("micapipe"));
        for hemi in ["lh", "rh"] {
            touch(
                &resources
                    .root()
                    .join(format!("surfaces/{hemi}.conte69.inflated.gii")),
            );
        }
        let ctx = ReportContext::new(locator, resources).with_dataset_name("MICs");
        let fixture = Self { _root: root, ctx };
        fixture.write_surf_descriptor();
        fixture
    }

    fn out(&self) -> &Path {
        self.ctx.locator.out_root()
    }

    fn write_surf_descriptor(&self) {
        let surface_dir = self.out().join("freesurfer");
        write(
            &self.ctx.locator.surf_descriptor(),
            &format!(
                r#"{{"SurfRecon": "freesurfer", "SurfaceDir": "{}"}}"#,
                surface_dir.display()
            ),
        );
    }

    fn status(&self, module: &str, state: &str) -> PathBuf {
        let path = self
            .ctx
            .locator
            .qc_dir()
            .join(format!("sub-01_ses-02_module-{module}.json"));
        write(
            &path,
            &format!(
                r#"{{"Module": "{module}", "Status": "{state}", "Progress": 5,
                    "Processing.time": 12, "Threads": 4,
                    "micapipeVersion": "v0.2.3", "Date": "2024-01-02"}}"#
            ),
        );
        path
    }

    fn atlas(&self, name: &str, labels: Option<&str>) {
        let label_dir = self.ctx.locator.label_dir("freesurfer");
        touch(&label_dir.join(format!("lh.{name}_mics.annot")));
        touch(&label_dir.join(format!("rh.{name}_mics.annot")));
        if let Some(labels) = labels {
            write(&self.ctx.resources.conte69_labels(name), labels);
        }
    }

    fn generate(&self, module: ModuleKind, status: &Path, renderers: &Renderers) -> (Option<PathBuf>, HtmlConverter) {
        let converter = HtmlConverter::default();
        let builder = default_registry().get(module).unwrap();
        let report = generate_report(&self.ctx, renderers, &converter, builder, status).unwrap();
        (report, converter)
    }
}

#[test]
fn completed_gd_report_has_summary_and_atlas_rows() {
    let fixture = Fixture::new();
    let status = fixture.status("GD", "COMPLETED");
    fixture.atlas("aparc", Some("0\n1\n2\n2\n"));
    fixture.atlas("glasser-360", Some("1\n"));
    fixture.atlas("schaefer-100", None);
    write(
        &fixture.ctx.locator.gd_matrix("aparc"),
        "0 1 2\n1 0 3\n2 3 0\n",
    );

    let (report, converter) = fixture.generate(ModuleKind::GeodesicDistance, &status, &renderers());

    let report = report.expect("report written");
    assert_eq!(
        report.file_name().unwrap(),
        "sub-01_ses-02_module-GD_qc-report.pdf"
    );
    assert_eq!(converter.calls.borrow().len(), 1);

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("<p class=\"module\"><b>Module: Geodesic distance</b></p>"));
    assert!(html.contains("<td>COMPLETED: 5 steps completed</td>"));
    assert!(html.contains("<td>12 minutes</td>"));
    assert!(html.contains("<td>Number of threads</td><td>4</td>"));
    assert!(html.contains("<td>aparc</td><td><img src="));
    assert!(html.contains("sub-01_ses-02_space-fsnative_atlas-aparc_gd.png"));
    assert!(html.contains("sub-01_ses-02_space-fsnative_atlas-aparc_gd_degree.png"));
    assert!(html.contains(
        "<td>glasser-360</td><td class=\"missing\">does not exist</td><td class=\"missing\">does not exist</td>"
    ));
    assert!(!html.contains("schaefer-100"));

    // Intermediate figures are removed once the report is written.
    let scratch = fixture.ctx.locator.scratch_dir();
    assert!(!scratch.join("sub-01_ses-02_space-fsnative_atlas-aparc_gd.png").exists());
}

#[test]
fn incomplete_module_produces_no_report() {
    let fixture = Fixture::new();
    let status = fixture.status("GD", "INCOMPLETE");

    let (report, converter) = fixture.generate(ModuleKind::GeodesicDistance, &status, &renderers());

    assert!(report.is_none());
    assert!(converter.calls.borrow().is_empty());
    assert!(!status.with_file_name("sub-01_ses-02_module-GD_qc-report.pdf").exists());
}

#[test]
fn structural_report_marks_missing_outputs() {
    let fixture = Fixture::new();
    let status = fixture.status("proc_structural", "COMPLETED");
    let locator = &fixture.ctx.locator;
    write(
        &locator.nativepro_descriptor(),
        r#"{"inputsRawdata": "/raw/sub-01_T1w.nii.gz /raw/sub-01_run-2_T1w.nii.gz"}"#,
    );
    touch(&locator.nativepro_t1w());

    let (report, _) = fixture.generate(ModuleKind::ProcStructural, &status, &renderers());

    let html = fs::read_to_string(report.unwrap()).unwrap();
    assert!(html.contains("<li>/raw/sub-01_T1w.nii.gz</li><li>/raw/sub-01_run-2_T1w.nii.gz</li>"));
    let t1w = format!("Filepath: {}</p><div class=\"figure\">", locator.nativepro_t1w().display());
    assert!(html.contains(&t1w));
    let screenshot = locator.scratch_dir().join("sub-01_ses-02_nativepro_T1w_screenshot.png");
    assert!(html.contains(&format!("<img src=\"{}\"/>", screenshot.display())));
    assert!(html.contains(
        "<b>T1w nativepro brain mask</b></p><p class=\"filepath\">Filepath: does not exist</p>"
    ));
    assert_eq!(html.matches("Filepath: does not exist").count(), 5);
}

#[test]
fn capture_failure_keeps_existing_path() {
    let fixture = Fixture::new();
    let status = fixture.status("proc_structural", "COMPLETED");
    let locator = &fixture.ctx.locator;
    write(
        &locator.nativepro_descriptor(),
        r#"{"inputsRawdata": "t1.nii.gz"}"#,
    );
    touch(&locator.nativepro_t1w());
    let renderers = Renderers::new(
        Box::new(FailingVolume),
        Box::new(TouchSurface),
        Box::new(TouchMatrix),
    );

    let (report, _) = fixture.generate(ModuleKind::ProcStructural, &status, &renderers);

    let html = fs::read_to_string(report.unwrap()).unwrap();
    let t1w = format!(
        "<b>T1w nativepro</b></p><p class=\"filepath\">Filepath: {}</p><p class=\"failed\">figure could not be rendered</p>",
        locator.nativepro_t1w().display()
    );
    assert!(html.contains(&t1w));
    // Only the absent outputs use the missing placeholder.
    assert_eq!(html.matches("Filepath: does not exist").count(), 5);
    assert!(!html.contains("<div class=\"figure\">"));
}

#[test]
fn missing_descriptor_is_an_error() {
    let fixture = Fixture::new();
    let status = fixture.status("proc_structural", "COMPLETED");
    let converter = HtmlConverter::default();
    let builder = default_registry().get(ModuleKind::ProcStructural).unwrap();

    let result = generate_report(&fixture.ctx, &renderers(), &converter, builder, &status);

    assert!(result.is_err());
    assert!(converter.calls.borrow().is_empty());
}

#[test]
fn html_is_kept_next_to_pdf_on_request() {
    let root = Fixture::new();
    let fixture = Fixture {
        ctx: root.ctx.clone().with_options(ReportOptions {
            cleanup: true,
            keep_html: true,
        }),
        _root: root._root,
    };
    let status = fixture.status("GD", "COMPLETED");

    let (report, _) = fixture.generate(ModuleKind::GeodesicDistance, &status, &renderers());

    assert!(report.unwrap().with_extension("html").is_file());
}
