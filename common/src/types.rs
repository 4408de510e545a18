//! 照合エンジンの型定義
//!
//! - ProductRecord: カタログスナップショットの1商品
//! - ExtractionItem / NormalizedItem: 問い合わせから抽出した明細行
//! - MatchResult: 明細1行に対する照合結果

use crate::text::normalize_header;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 商品ID
pub type ProductId = i64;

/// 照合結果に載せる候補の最大数
pub const MAX_CANDIDATES: usize = 5;

/// 商品のフラットコード（4方式 + メーカー品番）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFlatCodes {
    pub elcom: Option<String>,
    pub manufacturer: Option<String>,
    pub raec: Option<String>,
    pub pc: Option<String>,
    pub etm: Option<String>,
}

impl ProductFlatCodes {
    /// 設定済みのコードを方式順に列挙
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [&self.elcom, &self.manufacturer, &self.raec, &self.pc, &self.etm]
            .into_iter()
            .filter_map(|c| c.as_deref())
    }
}

/// カタログの1商品
///
/// インデックスに読み込んだ後は変更しない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub header: String,
    #[serde(default)]
    pub sync_uid: Option<String>,
    #[serde(default)]
    pub articul: Option<String>,
    #[serde(default)]
    pub unit_header: Option<String>,
    #[serde(default)]
    pub manufacturer_header: Option<String>,
    #[serde(default)]
    pub multiplicity_order: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analog_codes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flat_codes: ProductFlatCodes,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// 監査用の元JSON
    #[serde(default)]
    pub raw_json: String,
}

/// `null` は既定値として読む
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProductRecord {
    /// 識別コードをすべて列挙（articul, syncUid, フラットコード, アナログコード）
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.articul
            .as_deref()
            .into_iter()
            .chain(self.sync_uid.as_deref())
            .chain(self.flat_codes.iter())
            .chain(self.analog_codes.iter().map(|s| s.as_str()))
    }
}

/// 明細の抽出元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    EmailText,
    EmailHtmlTable,
    Xlsx,
    Pdf,
}

impl fmt::Display for ItemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSource::EmailText => write!(f, "email_text"),
            ItemSource::EmailHtmlTable => write!(f, "email_html_table"),
            ItemSource::Xlsx => write!(f, "xlsx"),
            ItemSource::Pdf => write!(f, "pdf"),
        }
    }
}

/// 抽出済みの明細行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionItem {
    pub line_no: usize,
    pub source: ItemSource,
    pub raw_line: String,
    #[serde(default)]
    pub name_or_code: Option<String>,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl ExtractionItem {
    pub fn new(line_no: usize, source: ItemSource, raw_line: impl Into<String>) -> Self {
        Self {
            line_no,
            source,
            raw_line: raw_line.into(),
            name_or_code: None,
            qty: None,
            unit: None,
            meta: BTreeMap::new(),
        }
    }
}

/// 正規化済みの明細行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    #[serde(flatten)]
    pub item: ExtractionItem,
    pub normalized_name_or_code: String,
}

impl NormalizedItem {
    /// 品名・コードを正規化（無ければ生の行を正規化）
    pub fn from_item(item: ExtractionItem) -> Self {
        let source = item.name_or_code.as_deref().unwrap_or(&item.raw_line);
        let normalized_name_or_code = normalize_header(source);
        Self {
            item,
            normalized_name_or_code,
        }
    }
}

/// 照合ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "REVIEW")]
    Review,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Ok => write!(f, "OK"),
            MatchStatus::Review => write!(f, "REVIEW"),
            MatchStatus::NotFound => write!(f, "NOT_FOUND"),
        }
    }
}

/// 照合の根拠
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchReason {
    Code,
    Header,
    Fuzzy,
    None,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::Code => write!(f, "CODE"),
            MatchReason::Header => write!(f, "HEADER"),
            MatchReason::Fuzzy => write!(f, "FUZZY"),
            MatchReason::None => write!(f, "NONE"),
        }
    }
}

/// 照合候補
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub id: ProductId,
    /// articul（無ければ syncUid）
    pub code: Option<String>,
    pub header: String,
    pub score: f64,
}

impl MatchCandidate {
    pub fn from_product(product: &ProductRecord, score: f64) -> Self {
        Self {
            id: product.id,
            code: product.articul.clone().or_else(|| product.sync_uid.clone()),
            header: product.header.clone(),
            score,
        }
    }
}

/// 照合された商品のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProduct {
    pub id: ProductId,
    pub sync_uid: Option<String>,
    pub header: String,
    pub articul: Option<String>,
    pub unit_header: Option<String>,
    pub flat_codes: ProductFlatCodes,
}

impl From<&ProductRecord> for MatchProduct {
    fn from(p: &ProductRecord) -> Self {
        Self {
            id: p.id,
            sync_uid: p.sync_uid.clone(),
            header: p.header.clone(),
            articul: p.articul.clone(),
            unit_header: p.unit_header.clone(),
            flat_codes: p.flat_codes.clone(),
        }
    }
}

/// 照合結果
///
/// 明細1行につき1回生成し、以降は変更しない。
/// candidates はスコア降順で最大 [`MAX_CANDIDATES`] 件。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub status: MatchStatus,
    pub confidence: f64,
    pub reason: MatchReason,
    pub product: Option<MatchProduct>,
    pub candidates: Vec<MatchCandidate>,
}

impl MatchResult {
    /// 候補なしの NOT_FOUND
    pub fn not_found() -> Self {
        Self {
            status: MatchStatus::NotFound,
            confidence: 0.0,
            reason: MatchReason::None,
            product: None,
            candidates: Vec::new(),
        }
    }
}
