//! elcom-match
//!
//! カタログスナップショットの読み込み、問い合わせファイルの収集、
//! 一括照合、レポート出力を行う。照合エンジン本体は `elcom_match_common`。

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod matcher;
pub mod scanner;
