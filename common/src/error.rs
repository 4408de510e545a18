//! エラー型定義

use thiserror::Error;

/// 照合エンジンのエラー
///
/// 正常なカタログと明細に対してはエラーを返さない。
/// 失敗し得るのは閾値の読み込みと検証のみ。
#[derive(Error, Debug)]
pub enum Error {
    #[error("閾値JSONの解析に失敗: {0}")]
    Json(#[from] serde_json::Error),

    #[error("閾値設定が不正: {0}")]
    InvalidThresholds(String),
}

pub type Result<T> = std::result::Result<T, Error>;
