use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchAppError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("カタログファイルが不正: {0}")]
    InvalidCatalog(String),

    #[error("問い合わせファイルが見つかりません: {0}")]
    NoInquiriesFound(String),

    #[error("明細として解釈できません: {0}")]
    InvalidLine(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("照合エンジンエラー: {0}")]
    Engine(#[from] elcom_match_common::Error),
}

pub type Result<T> = std::result::Result<T, MatchAppError>;
