//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use artwork_match::catalog::load_catalog;
use artwork_match::error::ArtworkMatchError;
use artwork_match::normalizer::{normalize_path, NormalizeOptions};
use artwork_match::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(ArtworkMatchError::FolderNotFound(_))));
}

/// 存在しない入力パス
#[test]
fn test_collect_missing_input() {
    let result = scanner::collect_inputs(Path::new("/nonexistent/painting.jpg"));
    assert!(matches!(result, Err(ArtworkMatchError::NotFound(_))));
}

/// 画像のないフォルダを入力にした場合
#[test]
fn test_collect_folder_without_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let result = scanner::collect_inputs(dir.path());
    assert!(matches!(result, Err(ArtworkMatchError::NoImagesFound(_))));
}

/// 画像でないファイルはデコード失敗（該当なしではない）
#[test]
fn test_undecodable_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("fake.png");
    std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();

    let err = normalize_path(&path, NormalizeOptions::default()).unwrap_err();
    assert!(matches!(err, ArtworkMatchError::ImageDecode(_)));
    assert!(!err.is_service_failure());
}

/// 不正なカタログファイル
#[test]
fn test_invalid_catalog_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, r#"{"artworks": []}"#).unwrap();

    let result = load_catalog(Some(&path));
    assert!(matches!(result, Err(ArtworkMatchError::Catalog(_))));

    let result = load_catalog(Some(&dir.path().join("missing.json")));
    assert!(matches!(result, Err(ArtworkMatchError::NotFound(_))));
}

/// ArtworkMatchErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ArtworkMatchError::Config("テスト設定エラー".to_string()),
        ArtworkMatchError::NotFound("test.jpg".to_string()),
        ArtworkMatchError::FolderNotFound("/path/to/folder".to_string()),
        ArtworkMatchError::NoImagesFound("フォルダ".to_string()),
        ArtworkMatchError::ImageDecode("壊れた画像".to_string()),
        ArtworkMatchError::ServiceCall("接続失敗".to_string()),
        ArtworkMatchError::ServiceResponse("空の応答".to_string()),
        ArtworkMatchError::Catalog("重複".to_string()),
        ArtworkMatchError::PartialFailure { failed: 1, total: 3 },
        ArtworkMatchError::Camera("開けません".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = ArtworkMatchError::MissingApiKey.to_string();

    assert!(display.contains("APIキー"));
    assert!(display.contains("OPENAI_API_KEY"));
    assert!(display.contains("artwork-match config"));
}

#[test]
fn test_partial_failure_message() {
    let err = ArtworkMatchError::PartialFailure { failed: 2, total: 5 };
    assert_eq!(err.to_string(), "2/5件の画像で判定に失敗しました");
}

/// サービス障害の判定
#[test]
fn test_service_failure_classification() {
    assert!(ArtworkMatchError::ServiceCall("timeout".into()).is_service_failure());
    assert!(ArtworkMatchError::ServiceResponse("empty".into()).is_service_failure());
    assert!(!ArtworkMatchError::MissingApiKey.is_service_failure());
    assert!(!ArtworkMatchError::NotFound("a.jpg".into()).is_service_failure());
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ArtworkMatchError = io_err.into();

    assert!(matches!(err, ArtworkMatchError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ArtworkMatchError = json_err.into();

    assert!(matches!(err, ArtworkMatchError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = artwork_match_common::Error::Parse("パースエラー".to_string());
    let err: ArtworkMatchError = common_err.into();

    assert!(matches!(err, ArtworkMatchError::Common(_)));
    assert!(err.to_string().contains("パースエラー"));
}
