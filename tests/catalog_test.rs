//! カタログ読み込みの統合テスト

use elcom_match::catalog;
use elcom_match::error::MatchAppError;
use elcom_match_common::CatalogIndex;
use std::path::Path;
use tempfile::tempdir;

const SNAPSHOT: &str = r#"{
  "products": [
    {"id": 101, "header": "Кабель ВВГнг(А)-LS 3х2,5", "articul": "ELC-0100203802",
     "syncUid": "9f1c", "unitHeader": "м",
     "flatCodes": {"elcom": "0100203802", "manufacturer": "VVG325", "raec": "1234567"}},
    {"id": 102, "header": "Автомат ВА47-29 1P 16А", "articul": "MVA20-1-016-C",
     "analogCodes": ["ВА47-29-16"]},
    {"id": 103, "header": ""},
    {"id": 101, "header": "Повтор"}
  ]
}"#;

#[test]
fn test_load_snapshot_from_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, SNAPSHOT).unwrap();

    let snapshot = catalog::load_snapshot(&path).expect("カタログ読み込み失敗");
    assert_eq!(snapshot.products.len(), 2);
    assert_eq!(snapshot.rejected, 2);
    assert_eq!(snapshot.fingerprint, catalog::fingerprint(SNAPSHOT.as_bytes()));

    let index = CatalogIndex::build(snapshot.products);
    assert_eq!(index.len(), 2);
    assert_eq!(index.lookup_code("0100203802").len(), 1);
    assert_eq!(index.lookup_code("ВА47-29-16").len(), 1);
    assert_eq!(index.get(101).map(|p| p.unit_header.as_deref()), Some(Some("м")));
}

#[test]
fn test_load_snapshot_missing_file() {
    let result = catalog::load_snapshot(Path::new("/nonexistent/catalog.json"));
    assert!(matches!(result, Err(MatchAppError::FileNotFound(_))));
}

#[test]
fn test_load_snapshot_invalid_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"id\": 1,").unwrap();

    let result = catalog::load_snapshot(&path);
    assert!(matches!(result, Err(MatchAppError::Json(_))));
}

#[test]
fn test_fingerprint_changes_with_content() {
    let a = catalog::fingerprint(br#"[{"id":1,"header":"A"}]"#);
    let b = catalog::fingerprint(br#"[{"id":1,"header":"B"}]"#);
    assert_ne!(a, b);
}
