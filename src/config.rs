use crate::error::{MatchAppError, Result};
use elcom_match_common::ranker::DEFAULT_SCAN_CAP;
use elcom_match_common::MatchThresholds;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ok_threshold: f64,
    pub review_threshold: f64,
    pub gap_threshold: f64,
    pub scan_cap: usize,
    /// 数量なし明細の信頼度上限
    pub missing_qty_confidence_cap: f64,
    /// これ以下の数量は「数量なし」扱い
    pub min_valid_qty: f64,
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数の上書きを適用する
    pub fn load() -> Result<Self> {
        Ok(Self::load_file()?.with_env_overrides())
    }

    /// 設定ファイルのみ読み込む（無ければ既定値）
    pub fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MatchAppError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("elcom-match").join("config.json"))
    }

    fn default_config() -> Self {
        let thresholds = MatchThresholds::default();
        Self {
            ok_threshold: thresholds.ok_threshold,
            review_threshold: thresholds.review_threshold,
            gap_threshold: thresholds.gap_threshold,
            scan_cap: DEFAULT_SCAN_CAP,
            missing_qty_confidence_cap: thresholds.missing_qty_confidence_cap,
            min_valid_qty: thresholds.min_valid_qty,
            parallel: true,
        }
    }

    /// 環境変数で閾値を上書き（解釈できない値は無視）
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let float = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());

        if let Some(v) = float("MATCH_OK_THRESHOLD") {
            self.ok_threshold = v;
        }
        if let Some(v) = float("MATCH_REVIEW_THRESHOLD") {
            self.review_threshold = v;
        }
        if let Some(v) = float("MATCH_GAP_THRESHOLD") {
            self.gap_threshold = v;
        }
        if let Some(v) = lookup("MATCH_SCAN_CAP").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.scan_cap = v;
        }
        self
    }

    /// 照合エンジン用の閾値に変換（検証込み）
    pub fn thresholds(&self) -> Result<MatchThresholds> {
        let thresholds = MatchThresholds {
            ok_threshold: self.ok_threshold,
            review_threshold: self.review_threshold,
            gap_threshold: self.gap_threshold,
            scan_cap: self.scan_cap,
            missing_qty_confidence_cap: self.missing_qty_confidence_cap,
            min_valid_qty: self.min_valid_qty,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }
}
