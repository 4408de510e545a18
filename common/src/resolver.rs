//! 照合判定
//!
//! 3段階を順に試し、最初に決まった段階で判定する。
//! 1. コード一致（コードらしい品名のみ）
//! 2. 品名の完全一致
//! 3. あいまい検索（[`crate::ranker`]）
//!
//! 判定後、数量が取れていない明細は REVIEW に落とす。
//! 状態を持たない純粋関数なので、同じ入力には常に同じ結果を返す。

use crate::error::{Error, Result};
use crate::index::CatalogIndex;
use crate::ranker::{rank_candidates, to_match_candidates, RankedCandidate, DEFAULT_SCAN_CAP};
use crate::text::{looks_like_code, normalize_code, normalize_header};
use crate::types::{
    MatchCandidate, MatchProduct, MatchReason, MatchResult, MatchStatus, NormalizedItem,
    ProductRecord, MAX_CANDIDATES,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// コード一意一致の確信度
pub const CODE_UNIQUE_CONFIDENCE: f64 = 0.99;
/// コード複数一致の確信度
pub const CODE_AMBIGUOUS_CONFIDENCE: f64 = 0.80;
/// 品名一意一致の確信度
pub const HEADER_UNIQUE_CONFIDENCE: f64 = 0.95;
/// 品名複数一致の確信度
pub const HEADER_AMBIGUOUS_CONFIDENCE: f64 = 0.78;

/// 判定の閾値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchThresholds {
    /// あいまい検索で OK とする最低スコア
    pub ok_threshold: f64,
    /// あいまい検索で REVIEW とする最低スコア
    pub review_threshold: f64,
    /// 1位と2位の最低スコア差
    pub gap_threshold: f64,
    /// 共通トークンが無い場合の走査上限
    pub scan_cap: usize,
    /// 数量なしの明細に許す確信度の上限
    pub missing_qty_confidence_cap: f64,
    /// これ以下の数量は数量なしとみなす
    pub min_valid_qty: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            ok_threshold: 0.90,
            review_threshold: 0.72,
            gap_threshold: 0.08,
            scan_cap: DEFAULT_SCAN_CAP,
            missing_qty_confidence_cap: 0.70,
            min_valid_qty: 0.0,
        }
    }
}

impl MatchThresholds {
    /// JSON文字列から読み込み（欠けた項目は既定値）
    pub fn from_json(json: &str) -> Result<Self> {
        let thresholds: Self = serde_json::from_str(json)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// 値の範囲を検証する
    pub fn validate(&self) -> Result<()> {
        let unit_range = [
            ("okThreshold", self.ok_threshold),
            ("reviewThreshold", self.review_threshold),
            ("gapThreshold", self.gap_threshold),
            ("missingQtyConfidenceCap", self.missing_qty_confidence_cap),
        ];
        for (name, value) in unit_range {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidThresholds(format!("{} は0〜1の範囲で指定してください: {}", name, value)));
            }
        }
        if self.review_threshold > self.ok_threshold {
            return Err(Error::InvalidThresholds(format!(
                "reviewThreshold ({}) が okThreshold ({}) を超えています",
                self.review_threshold, self.ok_threshold
            )));
        }
        if self.scan_cap == 0 {
            return Err(Error::InvalidThresholds("scanCap は1以上で指定してください".into()));
        }
        if !self.min_valid_qty.is_finite() {
            return Err(Error::InvalidThresholds("minValidQty が数値ではありません".into()));
        }
        Ok(())
    }
}

/// 明細1行をカタログと照合する
pub fn match_item(item: &NormalizedItem, index: &CatalogIndex, thresholds: &MatchThresholds) -> MatchResult {
    let result = decide(item, index, thresholds);
    let result = adjust_for_missing_qty(item, result, thresholds);

    debug!(
        line_no = item.item.line_no,
        status = %result.status,
        reason = %result.reason,
        confidence = result.confidence,
        candidates = result.candidates.len(),
        "item matched"
    );

    result
}

fn decide(item: &NormalizedItem, index: &CatalogIndex, thresholds: &MatchThresholds) -> MatchResult {
    let name_or_code = item.item.name_or_code.as_deref().unwrap_or("");

    // 1. コード一致
    let code = normalize_code(name_or_code);
    if looks_like_code(name_or_code) && !code.is_empty() {
        if let Some(result) = decide_exact(
            &index.lookup_code(&code),
            MatchReason::Code,
            CODE_UNIQUE_CONFIDENCE,
            CODE_AMBIGUOUS_CONFIDENCE,
        ) {
            return result;
        }
    }

    // 2. 品名の完全一致
    let query = if item.normalized_name_or_code.is_empty() {
        normalize_header(&item.item.raw_line)
    } else {
        item.normalized_name_or_code.clone()
    };
    if !query.is_empty() {
        if let Some(result) = decide_exact(
            &index.lookup_header(&query),
            MatchReason::Header,
            HEADER_UNIQUE_CONFIDENCE,
            HEADER_AMBIGUOUS_CONFIDENCE,
        ) {
            return result;
        }
    }

    // 3. あいまい検索
    decide_fuzzy(&query, index, thresholds)
}

/// 完全一致系の段階（コード・品名）の判定。一致なしなら None
fn decide_exact(
    hits: &[&ProductRecord],
    reason: MatchReason,
    unique_confidence: f64,
    ambiguous_confidence: f64,
) -> Option<MatchResult> {
    match hits {
        [] => None,
        [product] => Some(MatchResult {
            status: MatchStatus::Ok,
            confidence: unique_confidence,
            reason,
            product: Some(MatchProduct::from(*product)),
            candidates: vec![MatchCandidate::from_product(product, unique_confidence)],
        }),
        _ => Some(MatchResult {
            status: MatchStatus::Review,
            confidence: ambiguous_confidence,
            reason,
            product: None,
            candidates: hits
                .iter()
                .take(MAX_CANDIDATES)
                .map(|p| MatchCandidate::from_product(p, ambiguous_confidence))
                .collect(),
        }),
    }
}

fn decide_fuzzy(query: &str, index: &CatalogIndex, thresholds: &MatchThresholds) -> MatchResult {
    let ranked = rank_candidates(query, index, thresholds.scan_cap);
    classify(&ranked, index, thresholds)
}

/// ランキング結果を閾値で OK / REVIEW / NOT_FOUND に振り分ける
fn classify(ranked: &[RankedCandidate], index: &CatalogIndex, thresholds: &MatchThresholds) -> MatchResult {
    let Some(top1) = ranked.first() else {
        return MatchResult::not_found();
    };

    let gap = match ranked.get(1) {
        Some(top2) => top1.score - top2.score,
        None => top1.score,
    };
    let best = index.product(top1.position).map(MatchProduct::from);
    let candidates = to_match_candidates(ranked, index);

    if top1.score >= thresholds.ok_threshold && gap >= thresholds.gap_threshold {
        MatchResult {
            status: MatchStatus::Ok,
            confidence: top1.score,
            reason: MatchReason::Fuzzy,
            product: best,
            candidates,
        }
    } else if top1.score >= thresholds.review_threshold {
        MatchResult {
            status: MatchStatus::Review,
            confidence: top1.score,
            reason: MatchReason::Fuzzy,
            product: best,
            candidates,
        }
    } else {
        MatchResult {
            status: MatchStatus::NotFound,
            confidence: top1.score,
            reason: MatchReason::None,
            product: None,
            candidates,
        }
    }
}

/// 数量が無い（または閾値以下の）明細を REVIEW に落とす
///
/// 候補が1件も無い NOT_FOUND は確認しようがないのでそのまま返す。
fn adjust_for_missing_qty(
    item: &NormalizedItem,
    mut result: MatchResult,
    thresholds: &MatchThresholds,
) -> MatchResult {
    let has_qty = item
        .item
        .qty
        .map(|q| q > thresholds.min_valid_qty)
        .unwrap_or(false);
    if has_qty || result.candidates.is_empty() {
        return result;
    }

    result.status = MatchStatus::Review;
    if result.confidence > thresholds.missing_qty_confidence_cap {
        result.confidence = thresholds.missing_qty_confidence_cap;
    }
    result
}
