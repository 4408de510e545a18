//! 一括照合
//!
//! インデックスは1回だけ構築し、全明細で共有する（読み取り専用）。
//! 並列実行しても出力は行番号順のまま。

pub mod types;

pub use types::{InquiryMatch, MatchSummary, MatchedLine};

use crate::error::Result;
use crate::scanner::InquiryFile;
use elcom_match_common::{
    dedupe_items, match_item, normalize_items, parse_plain_text, CatalogIndex, ItemSource,
    MatchThresholds, NormalizedItem,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

/// 照合の実行オプション
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub parallel: bool,
    pub show_progress: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            show_progress: false,
        }
    }
}

/// テキスト本文を照合用の明細に変換する
pub fn items_from_text(text: &str) -> Vec<NormalizedItem> {
    let items = parse_plain_text(text, ItemSource::EmailText);
    normalize_items(dedupe_items(items))
}

/// 明細をまとめて照合する
pub fn match_items(
    items: Vec<NormalizedItem>,
    index: &CatalogIndex,
    thresholds: &MatchThresholds,
    options: MatchOptions,
) -> Vec<MatchedLine> {
    let progress = if options.show_progress {
        create_progress_bar(items.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let match_one = |item: NormalizedItem| {
        let result = match_item(&item, index, thresholds);
        progress.inc(1);
        MatchedLine { item, result }
    };

    // par_iter の collect は入力順を保つ
    let lines: Vec<MatchedLine> = if options.parallel {
        items.into_par_iter().map(match_one).collect()
    } else {
        items.into_iter().map(match_one).collect()
    };

    progress.finish_and_clear();
    lines
}

/// 問い合わせファイル1件を読み込んで照合する
pub fn match_inquiry(
    file: &InquiryFile,
    index: &CatalogIndex,
    thresholds: &MatchThresholds,
    options: MatchOptions,
) -> Result<InquiryMatch> {
    let text = std::fs::read_to_string(&file.path)?;
    let items = items_from_text(&text);
    debug!(file = %file.file_name, items = items.len(), "inquiry parsed");

    let lines = match_items(items, index, thresholds, options);
    let summary = MatchSummary::from_lines(&lines);

    info!(
        file = %file.file_name,
        total = summary.total,
        ok = summary.ok,
        review = summary.review,
        not_found = summary.not_found,
        "inquiry matched"
    );

    Ok(InquiryMatch {
        file_name: file.file_name.clone(),
        lines,
        summary,
    })
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} 行 ({elapsed})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use elcom_match_common::{MatchStatus, ProductRecord};

    fn index() -> CatalogIndex {
        CatalogIndex::build(vec![
            ProductRecord {
                id: 1,
                header: "Кабель ВВГнг 3x2.5".to_string(),
                articul: Some("ELC0100203802".to_string()),
                ..Default::default()
            },
            ProductRecord {
                id: 2,
                header: "Автомат ВА47-29 16А".to_string(),
                ..Default::default()
            },
            ProductRecord {
                id: 3,
                header: "Кабель медный гибкий".to_string(),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn test_items_from_text_dedupes() {
        let items = items_from_text("Кабель 10 шт\nКабель 10 шт\nПровод ПВС 5 м");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].item.line_no, 2);
    }

    #[test]
    fn test_match_items_parallel_matches_sequential() {
        let index = index();
        let thresholds = MatchThresholds::default();
        let text = "ELC0100203802 2 шт\nАвтомат ВА47-29 16А 12 шт\nЛампа неизвестная 3 шт\nкабель медный гибкий";

        let parallel = match_items(
            items_from_text(text),
            &index,
            &thresholds,
            MatchOptions { parallel: true, show_progress: false },
        );
        let sequential = match_items(
            items_from_text(text),
            &index,
            &thresholds,
            MatchOptions { parallel: false, show_progress: false },
        );

        assert_eq!(parallel, sequential);
        let line_nos: Vec<usize> = parallel.iter().map(|l| l.item.item.line_no).collect();
        assert_eq!(line_nos, vec![1, 2, 3, 4]);
        assert_eq!(parallel[0].result.status, MatchStatus::Ok);
        assert_eq!(parallel[1].result.status, MatchStatus::Ok);
        // 数量なし
        assert_eq!(parallel[3].result.status, MatchStatus::Review);
    }

    #[test]
    fn test_summary_counts() {
        let index = index();
        let lines = match_items(
            items_from_text("ELC0100203802 2 шт\nЛампа неизвестная 3 шт"),
            &index,
            &MatchThresholds::default(),
            MatchOptions::default(),
        );
        let summary = MatchSummary::from_lines(&lines);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.ok + summary.review + summary.not_found, 2);
        assert_eq!(summary.ok, 1);

        let merged = summary.merge(summary);
        assert_eq!(merged.total, 4);
        assert_eq!(merged.ok, 2);
    }
}
