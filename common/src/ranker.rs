//! あいまい検索の候補ランキング
//!
//! スコア = 0.65 × Dice係数(問い合わせ, 品名) + 0.35 × トークン一致率
//!
//! 同点の並びは保証しない（現在は読み込み順の安定ソートだが、
//! 呼び出し側は順序に依存しないこと）。

use crate::index::{CatalogIndex, Position};
use crate::text::{dice_coefficient, tokenize};
use crate::types::{MatchCandidate, MAX_CANDIDATES};
use std::collections::{BTreeSet, HashSet};

/// Dice係数の重み
pub const DICE_WEIGHT: f64 = 0.65;
/// トークン一致率の重み
pub const TOKEN_WEIGHT: f64 = 0.35;
/// 共通トークンが無い場合に走査する商品数の既定値
pub const DEFAULT_SCAN_CAP: usize = 1500;

/// スコア付き候補（インデックス内の位置つき）
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub position: Position,
    pub score: f64,
}

/// 正規化済み問い合わせに対して上位候補を返す
///
/// 共通トークンを持つ商品を候補とし、1つも無ければ
/// 読み込み順の先頭 `scan_cap` 件を走査する。
pub fn rank_candidates(query: &str, index: &CatalogIndex, scan_cap: usize) -> Vec<RankedCandidate> {
    let query_tokens = tokenize(query);

    let mut positions: BTreeSet<Position> = BTreeSet::new();
    for token in &query_tokens {
        if let Some(posting) = index.postings(token) {
            positions.extend(posting.iter().copied());
        }
    }

    if positions.is_empty() {
        positions.extend(0..index.len().min(scan_cap));
    }

    let mut ranked: Vec<RankedCandidate> = positions
        .into_iter()
        .map(|pos| RankedCandidate {
            position: pos,
            score: score_header(
                query,
                index.normalized_header(pos),
                &query_tokens,
                index.header_tokens(pos),
            ),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(MAX_CANDIDATES);
    ranked
}

/// 上位候補を照合結果用の形に変換
pub fn to_match_candidates(ranked: &[RankedCandidate], index: &CatalogIndex) -> Vec<MatchCandidate> {
    ranked
        .iter()
        .filter_map(|c| {
            index
                .product(c.position)
                .map(|p| MatchCandidate::from_product(p, c.score))
        })
        .collect()
}

/// 問い合わせと品名のスコア
///
/// 問い合わせにトークンが無い場合はDice係数のみ。
pub fn score_header(
    query: &str,
    candidate: &str,
    query_tokens: &[String],
    candidate_tokens: &[String],
) -> f64 {
    let dice = dice_coefficient(query, candidate);
    if query_tokens.is_empty() {
        return dice;
    }

    let candidate_set: HashSet<&str> = candidate_tokens.iter().map(|t| t.as_str()).collect();
    let overlap = query_tokens
        .iter()
        .filter(|t| candidate_set.contains(t.as_str()))
        .count();
    let token_score = overlap as f64 / query_tokens.len() as f64;

    DICE_WEIGHT * dice + TOKEN_WEIGHT * token_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductRecord;

    fn catalog(headers: &[&str]) -> CatalogIndex {
        CatalogIndex::build(headers.iter().enumerate().map(|(i, h)| ProductRecord {
            id: i as i64 + 1,
            header: h.to_string(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_score_header_identical() {
        let tokens = tokenize("КАБЕЛЬ ВВГНГ 3X2.5");
        let score = score_header("КАБЕЛЬ ВВГНГ 3X2.5", "КАБЕЛЬ ВВГНГ 3X2.5", &tokens, &tokens);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_header_without_query_tokens_is_dice() {
        let score = score_header("5", "5", &[], &[]);
        assert_eq!(score, 0.0);
        let score = score_header("X", "X Y", &[], &tokenize("X Y"));
        assert_eq!(score, dice_coefficient("X", "X Y"));
    }

    #[test]
    fn test_rank_prefers_closer_header() {
        let index = catalog(&["Кабель ВВГнг 3x2.5", "Кабель ВВГнг 3x4", "Лампа накаливания"]);
        let ranked = rank_candidates("КАБЕЛЬ ВВГНГ 3X2.5 ЧЕРНЫЙ", &index, DEFAULT_SCAN_CAP);

        assert_eq!(ranked.len(), 2);
        assert_eq!(index.product(ranked[0].position).map(|p| p.id), Some(1));
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_rank_truncates_to_five() {
        let headers: Vec<String> = (0..8).map(|i| format!("Кабель вариант {}", i)).collect();
        let refs: Vec<&str> = headers.iter().map(|s| s.as_str()).collect();
        let index = catalog(&refs);

        let ranked = rank_candidates("КАБЕЛЬ", &index, DEFAULT_SCAN_CAP);
        assert_eq!(ranked.len(), MAX_CANDIDATES);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_falls_back_to_bounded_scan() {
        let index = catalog(&["Кабель", "Провод", "Лампа", "Щит"]);
        let ranked = rank_candidates("НЕИЗВЕСТНОЕ", &index, 2);

        assert_eq!(ranked.len(), 2);
        let ids: HashSet<i64> = ranked
            .iter()
            .filter_map(|c| index.product(c.position).map(|p| p.id))
            .collect();
        assert_eq!(ids, HashSet::from([1, 2]));
    }

    #[test]
    fn test_rank_empty_index() {
        let index = catalog(&[]);
        assert!(rank_candidates("КАБЕЛЬ", &index, DEFAULT_SCAN_CAP).is_empty());
    }
}
