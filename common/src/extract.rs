//! プレーンテキストからの明細抽出
//!
//! メール本文などのテキストを1行ずつ明細に変換する。
//! PDF/XLSX/HTML表の解析はこのクレートの対象外。

use crate::qty::parse_qty;
use crate::types::{ExtractionItem, ItemSource, NormalizedItem};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref SPACES_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref UNIT_WORD_RE: Regex = Regex::new(
        r"(?i)(?:^|\s)(?:штук|шт|pcs|pc|метр|м|kg|кг|уп|компл)\.?(?:\s|$)"
    ).unwrap();
    static ref SEPARATORS_RE: Regex = Regex::new(r"[;|]+").unwrap();
    static ref LETTER_RE: Regex = Regex::new(r"[A-Za-zА-Яа-яЁё]").unwrap();
    // 署名・区切り線など明細ではない行
    static ref NOISE_RES: Vec<Regex> = vec![
        Regex::new(r"^--+$").unwrap(),
        Regex::new(r"(?i)^спасибо").unwrap(),
        Regex::new(r"(?i)^с уважением").unwrap(),
        Regex::new(r"(?i)^тел[:\s]").unwrap(),
        Regex::new(r"(?i)^e-?mail[:\s]").unwrap(),
        Regex::new(r"(?i)^http").unwrap(),
    ];
}

/// 数量なしでも明細とみなす最短の行長（バイト）
const MIN_LINE_LEN_WITHOUT_QTY: usize = 8;

/// メタ情報のキー: 一致した数量の部分文字列
pub const META_QTY_RAW: &str = "qtyRaw";

fn normalize_spaces(input: &str) -> String {
    SPACES_RE.replace_all(input, " ").trim().to_string()
}

/// テキストを空でない行に分割
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}

/// 明細ではない行か判定
pub fn is_likely_noise(line: &str) -> bool {
    let line = line.trim();
    NOISE_RES.iter().any(|re| re.is_match(line))
}

/// 1行を明細に変換する
///
/// 品名は行から数量と単位を取り除いたもの。
/// 残りが1文字以下なら行全体を品名とする。
pub fn line_to_item(source: ItemSource, line_no: usize, raw_line: &str) -> Option<ExtractionItem> {
    let compact = normalize_spaces(raw_line);
    if compact.is_empty() || is_likely_noise(&compact) {
        return None;
    }

    let parsed = parse_qty(&compact);
    let mut without_qty = compact.clone();
    if let Some(raw) = &parsed.qty_raw {
        if let Some(idx) = without_qty.rfind(raw.as_str()) {
            without_qty.replace_range(idx..idx + raw.len(), " ");
        }
    }

    // 単位語は隣接する空白ごと消えるので2回かけて連続する単位語も落とす
    let name = UNIT_WORD_RE.replace_all(&without_qty, " ");
    let name = UNIT_WORD_RE.replace_all(&name, " ");
    let name = SEPARATORS_RE.replace_all(&name, " ");
    let name = normalize_spaces(&name);

    let name_or_code = if name.chars().count() <= 1 {
        compact.clone()
    } else {
        name
    };

    let mut item = ExtractionItem::new(line_no, source, compact);
    item.name_or_code = Some(name_or_code);
    item.qty = parsed.qty;
    item.unit = parsed.unit;
    if let Some(raw) = parsed.qty_raw {
        item.meta.insert(META_QTY_RAW.to_string(), raw);
    }
    Some(item)
}

/// テキスト本文から明細を抽出する
///
/// 文字を含まない行と、数量が無く短すぎる行は捨てる。
pub fn parse_plain_text(text: &str, source: ItemSource) -> Vec<ExtractionItem> {
    split_lines(text)
        .iter()
        .enumerate()
        .filter_map(|(i, line)| line_to_item(source, i + 1, line))
        .filter(|item| {
            let has_letters = LETTER_RE.is_match(&item.raw_line);
            let has_qty = item.qty.is_some();
            has_letters && (has_qty || item.raw_line.len() >= MIN_LINE_LEN_WITHOUT_QTY)
        })
        .collect()
}

/// 同じ（抽出元, 行, 数量）の明細を除いて行番号を振り直す
pub fn dedupe_items(items: Vec<ExtractionItem>) -> Vec<ExtractionItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<ExtractionItem> = items
        .into_iter()
        .filter(|item| {
            let qty_key = item
                .qty
                .map(|q| q.to_string())
                .unwrap_or_else(|| "null".to_string());
            seen.insert(format!("{}|{}|{}", item.source, item.raw_line, qty_key))
        })
        .collect();

    for (i, item) in out.iter_mut().enumerate() {
        item.line_no = i + 1;
    }
    out
}

/// 明細を照合用に正規化する
pub fn normalize_items(items: Vec<ExtractionItem>) -> Vec<NormalizedItem> {
    items.into_iter().map(NormalizedItem::from_item).collect()
}
