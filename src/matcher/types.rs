use elcom_match_common::{MatchResult, MatchStatus, NormalizedItem};
use serde::{Deserialize, Serialize};

/// 明細1行と照合結果の組
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedLine {
    pub item: NormalizedItem,
    pub result: MatchResult,
}

/// ステータス別の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub total: usize,
    pub ok: usize,
    pub review: usize,
    pub not_found: usize,
}

impl MatchSummary {
    pub fn from_lines(lines: &[MatchedLine]) -> Self {
        lines.iter().fold(Self::default(), |mut acc, line| {
            acc.total += 1;
            match line.result.status {
                MatchStatus::Ok => acc.ok += 1,
                MatchStatus::Review => acc.review += 1,
                MatchStatus::NotFound => acc.not_found += 1,
            }
            acc
        })
    }

    /// 複数ファイル分を合算
    pub fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            ok: self.ok + other.ok,
            review: self.review + other.review,
            not_found: self.not_found + other.not_found,
        }
    }
}

/// 問い合わせファイル1件分の照合結果
#[derive(Debug, Clone)]
pub struct InquiryMatch {
    pub file_name: String,
    pub lines: Vec<MatchedLine>,
    pub summary: MatchSummary,
}
