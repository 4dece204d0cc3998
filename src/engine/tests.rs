use super::EngineError;
use super::sink::open_source;

#[test]
fn open_source_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.mp3");
    let err = open_source(&path).err().unwrap();
    assert!(matches!(err, EngineError::Open { .. }));
    assert!(err.to_string().contains("missing.mp3"));
}

#[test]
fn open_source_reports_undecodable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.mp3");
    std::fs::write(&path, b"definitely not audio").unwrap();
    let err = open_source(&path).err().unwrap();
    match err {
        EngineError::Decode { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected decode error, got {other:?}"),
    }
}
