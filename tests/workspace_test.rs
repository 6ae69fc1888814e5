// tests/workspace_test.rs — Integration test: workspace reset and snapshots

use tempfile::TempDir;

use catg::workspace::{self, CopyOutcome, RealInput, Workspace};

#[test]
fn test_reset_twice_yields_empty_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("catg_tmp");
    std::fs::create_dir_all(root.join("deep/nested")).unwrap();
    std::fs::write(root.join("history"), "x").unwrap();
    std::fs::write(root.join("deep/nested/inputs"), "y").unwrap();

    workspace::reset(&root).unwrap();
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);

    workspace::reset(&root).unwrap();
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
}

#[test]
fn test_reset_on_absent_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("never-created");
    workspace::reset(&root).unwrap();
    assert!(root.is_dir());
}

#[test]
fn test_numbered_snapshot_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let ws = Workspace::new(dir.path().join("catg_tmp"));
    ws.reset().unwrap();

    let payload: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    std::fs::write(ws.artifact("inputs"), &payload).unwrap();
    std::fs::write(ws.artifact("isRealInput"), "true").unwrap();

    let snap = ws.snapshot_inputs(9);
    assert_eq!(snap.marker.value(), RealInput::Real);
    assert!(matches!(snap.numbered, CopyOutcome::Copied { bytes: 4096 }));
    assert_eq!(std::fs::read(ws.artifact("inputs9")).unwrap(), payload);
    assert_eq!(std::fs::read(ws.artifact("inputs.old")).unwrap(), payload);
}

#[test]
fn test_false_marker_skips_numbered_snapshot_only() {
    let dir = TempDir::new().unwrap();
    let ws = Workspace::new(dir.path().join("catg_tmp"));
    ws.reset().unwrap();
    std::fs::write(ws.artifact("inputs"), "1 2 3").unwrap();
    std::fs::write(ws.artifact("inputs.old"), "older").unwrap();
    std::fs::write(ws.artifact("isRealInput"), "false").unwrap();

    let snap = ws.snapshot_inputs(2);
    assert_eq!(snap.marker.value(), RealInput::Synthetic);
    assert!(!ws.artifact("inputs2").exists());
    assert_eq!(
        std::fs::read_to_string(ws.artifact("inputs.old")).unwrap(),
        "1 2 3"
    );
}
