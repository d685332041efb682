//! Tests for qc-model types.

use qc_model::{CompletionState, ModuleKind, ModuleStatus, SubjectIdentity, display_value};

#[test]
fn status_round_trips_through_json() {
    let json = r#"{
        "Module": "proc_surf",
        "Status": "INCOMPLETE",
        "Progress": 2,
        "Processing.time": 31.4,
        "Threads": 6,
        "micapipeVersion": "v0.2.0",
        "Date": "2023-01-10"
    }"#;
    let status: ModuleStatus = serde_json::from_str(json).expect("parse status");
    assert_eq!(status.status, CompletionState::Incomplete);
    assert!(!status.is_complete());

    let encoded = serde_json::to_value(&status).expect("serialize status");
    assert_eq!(encoded["Status"], "INCOMPLETE");
    assert_eq!(encoded["Processing.time"], 31.4);
}

#[test]
fn status_requires_status_field() {
    let result = serde_json::from_str::<ModuleStatus>(r#"{"Module": "GD"}"#);
    assert!(result.is_err());
}

#[test]
fn display_value_keeps_strings_unquoted() {
    assert_eq!(display_value(&serde_json::json!("12")), "12");
    assert_eq!(display_value(&serde_json::json!(12)), "12");
    assert_eq!(display_value(&serde_json::Value::Null), "-");
}

#[test]
fn every_module_tag_parses_back() {
    for kind in ModuleKind::ALL {
        assert_eq!(kind.tag().parse::<ModuleKind>().unwrap(), kind);
    }
}

#[test]
fn connectome_modules() {
    let connectome: Vec<ModuleKind> = ModuleKind::ALL
        .into_iter()
        .filter(ModuleKind::has_connectomes)
        .collect();
    assert_eq!(
        connectome,
        vec![
            ModuleKind::ProcFunc,
            ModuleKind::StructuralConnectome,
            ModuleKind::Microstructural,
            ModuleKind::GeodesicDistance,
        ]
    );
}

#[test]
fn subject_display_is_bids_id() {
    let id = SubjectIdentity::new("PX001", Some("02")).unwrap();
    assert_eq!(id.to_string(), "sub-PX001_ses-02");
}
