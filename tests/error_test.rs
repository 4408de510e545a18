//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use elcom_match::error::MatchAppError;
use elcom_match::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_inquiries(Path::new("/nonexistent/path/12345"), false);
    assert!(matches!(result, Err(MatchAppError::FolderNotFound(_))));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_inquiries(dir.path(), true);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// MatchAppErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        MatchAppError::Config("テスト設定エラー".to_string()),
        MatchAppError::FileNotFound("catalog.json".to_string()),
        MatchAppError::FolderNotFound("/path/to/folder".to_string()),
        MatchAppError::InvalidCatalog("products 配列がありません".to_string()),
        MatchAppError::NoInquiriesFound("inbox".to_string()),
        MatchAppError::InvalidLine("---".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 照合エンジンのエラーが変換されること
#[test]
fn test_engine_error_conversion() {
    let engine_err = elcom_match_common::MatchThresholds::from_json(r#"{"okThreshold": 2.0}"#)
        .unwrap_err();
    let err: MatchAppError = engine_err.into();
    assert!(matches!(err, MatchAppError::Engine(_)));
    assert!(err.to_string().contains("okThreshold"));
}

/// IOエラーの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: MatchAppError = io_err.into();
    assert!(matches!(err, MatchAppError::Io(_)));
}

/// 明細として解釈できない行のメッセージ
#[test]
fn test_invalid_line_display() {
    let err = MatchAppError::InvalidLine("С уважением".to_string());
    assert_eq!(err.to_string(), "明細として解釈できません: С уважением");
}
