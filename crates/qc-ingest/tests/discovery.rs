//! Integration tests for locating and gating pipeline outputs.

use std::fs;
use std::path::Path;

use qc_ingest::{
    ArtifactLocator, IngestError, discover_atlases, find_status_files, is_module_complete,
    read_json, read_matrix, report_path_for,
};
use qc_model::{ModuleKind, SubjectIdentity, TractographyDescriptor};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn layout() -> (TempDir, ArtifactLocator) {
    let root = TempDir::new().unwrap();
    let out = root.path().join("derivatives").join("micapipe_v0.2.0");
    let bids = root.path().join("rawdata");
    let subject = SubjectIdentity::new("sub-01", Some("ses-02")).unwrap();
    let locator = ArtifactLocator::new(&out, &bids, root.path().join("tmp"), subject);
    (root, locator)
}

#[test]
fn gates_each_status_file_in_qc_dir() {
    let (_root, locator) = layout();
    let qc = locator.qc_dir();
    write(
        &qc.join("sub-01_ses-02_module-proc_func-desc-se_task-rest.json"),
        r#"{"Module": "proc_func", "Status": "COMPLETED"}"#,
    );
    write(
        &qc.join("sub-01_ses-02_module-proc_func-desc-me_task-rest.json"),
        r#"{"Module": "proc_func", "Status": "INCOMPLETE"}"#,
    );

    let files = find_status_files(&qc, locator.bids_id(), ModuleKind::ProcFunc).unwrap();
    let gates: Vec<bool> = files
        .iter()
        .map(|path| is_module_complete(path).unwrap())
        .collect();
    assert_eq!(gates, vec![false, true]);

    let report = report_path_for(&files[1]);
    assert_eq!(
        report.file_name().unwrap(),
        "sub-01_ses-02_module-proc_func-desc-se_task-rest_qc-report.pdf"
    );
    assert_eq!(report.parent(), Some(qc.as_path()));
}

#[test]
fn discovers_atlases_beside_pipeline_dir() {
    let (root, locator) = layout();
    let label_dir = locator.label_dir("freesurfer");
    assert!(label_dir.starts_with(root.path().join("derivatives").join("freesurfer")));
    for name in [
        "lh.schaefer-400_mics.annot",
        "rh.schaefer-400_mics.annot",
        "lh.aparc_mics.annot",
    ] {
        write(&label_dir.join(name), "");
    }
    assert_eq!(
        discover_atlases(&label_dir).unwrap(),
        vec!["aparc".to_string(), "schaefer-400".to_string()]
    );
}

#[test]
fn reads_descriptor_and_connectome() {
    let (_root, locator) = layout();
    write(
        &locator.tractography_descriptor("40M"),
        r#"{"fileInfo": {"Name": "/out/tdi.nii.gz"}, "Tractography": {"weighted_SC": "TRUE"}}"#,
    );
    let descriptor: TractographyDescriptor =
        read_json(&locator.tractography_descriptor("40M")).unwrap();
    assert!(descriptor.weighted_sc());

    let gd = locator.gd_matrix("aparc");
    write(&gd, "0 1\n1 0\n");
    let m = read_matrix(&gd).unwrap();
    assert!(m.is_square());
}

#[test]
fn missing_descriptor_is_reported() {
    let (_root, locator) = layout();
    let err = read_json::<TractographyDescriptor>(&locator.tractography_descriptor("40M"))
        .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
