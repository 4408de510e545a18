//! 数量・単位の抽出
//!
//! 明細行から数量と単位を取り出す。
//! 数量が取れないことはエラーではなく、照合側で REVIEW に回す合図になる。

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 数値: 3桁区切り（空白/ドット/カンマ）または小数
    static ref NUMBER_RE: Regex = Regex::new(
        r"(?:^|[^0-9.,])([0-9]{1,3}(?:[\s.,][0-9]{3})+|[0-9]+(?:[.,][0-9]+)?)"
    ).unwrap();
    // 数値 + 単位（長い表記を先に並べる）
    static ref WITH_UNIT_RE: Regex = Regex::new(
        r"(?i)(?:^|[^0-9.,])([0-9]{1,3}(?:[\s.,][0-9]{3})+|[0-9]+(?:[.,][0-9]+)?)\s*((?:штук|шт|pcs|pc|метр|м|kg|кг|уп|компл)\.?)"
    ).unwrap();
    static ref SPACES_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref DOT_GROUPED_RE: Regex = Regex::new(r"^[0-9]{1,3}(?:\.[0-9]{3})+$").unwrap();
    static ref COMMA_GROUPED_RE: Regex = Regex::new(r"^[0-9]{1,3}(?:,[0-9]{3})+$").unwrap();
}

/// 数量抽出結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQty {
    pub qty: Option<f64>,
    /// 正規化済み単位（шт/м/кг/уп など）
    pub unit: Option<String>,
    /// 行内で一致した部分文字列（品名から数量を取り除くのに使う）
    pub qty_raw: Option<String>,
}

/// 行から数量と単位を抽出する
///
/// 1. 「数値 + 単位」の一致があれば最も右のものを採用
/// 2. なければ最も右の単独の数値
/// 3. 数値トークンを正規化して f64 に変換
///
/// # Examples
/// ```
/// use elcom_match_common::qty::parse_qty;
///
/// let parsed = parse_qty("Кабель 1 000 шт");
/// assert_eq!(parsed.qty, Some(1000.0));
/// assert_eq!(parsed.unit.as_deref(), Some("шт"));
/// ```
pub fn parse_qty(input: &str) -> ParsedQty {
    let line = normalize_spaces(input);

    let with_unit = WITH_UNIT_RE
        .captures_iter(&line)
        .filter(|cap| {
            let end = cap.get(2).map(|m| m.end()).unwrap_or(0);
            // 「мм」「метров」のように単位の後に文字が続く場合は単位とみなさない
            !line[end..].chars().next().map(char::is_alphabetic).unwrap_or(false)
        })
        .last();

    let (token, unit, qty_raw) = if let Some(cap) = with_unit {
        let number = cap.get(1).map(|m| (m.start(), m.as_str()));
        let unit = cap.get(2).map(|m| (m.end(), m.as_str()));
        match (number, unit) {
            (Some((start, number)), Some((end, unit))) => (
                Some(number.to_string()),
                Some(normalize_unit(unit)),
                Some(line[start..end].to_string()),
            ),
            _ => (None, None, None),
        }
    } else if let Some(cap) = NUMBER_RE.captures_iter(&line).last() {
        let number = cap.get(1).map(|m| m.as_str().to_string());
        (number.clone(), None, number)
    } else {
        (None, None, None)
    };

    let qty = token.and_then(|t| normalize_numeric_token(&t).parse::<f64>().ok());

    ParsedQty { qty, unit, qty_raw }
}

/// NBSPを含む空白を1つの半角空白に畳む
fn normalize_spaces(input: &str) -> String {
    let replaced = input.replace(['\u{00A0}', '\u{202F}'], " ");
    SPACES_RE.replace_all(&replaced, " ").trim().to_string()
}

/// 単位を正規化する（未知の単位は小文字のまま通す）
pub fn normalize_unit(unit: &str) -> String {
    let u = unit.trim().to_lowercase();
    match u.trim_end_matches('.') {
        "шт" | "штук" | "pcs" | "pc" => "шт".to_string(),
        "м" | "метр" => "м".to_string(),
        "kg" | "кг" => "кг".to_string(),
        "уп" => "уп".to_string(),
        "компл" => "компл".to_string(),
        _ => u,
    }
}

/// 数値トークンを f64 に渡せる形にする
fn normalize_numeric_token(token: &str) -> String {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();

    if DOT_GROUPED_RE.is_match(&compact) {
        return compact.replace('.', "");
    }
    if COMMA_GROUPED_RE.is_match(&compact) {
        return compact.replace(',', "");
    }
    if compact.contains(',') && !compact.contains('.') {
        return compact.replace(',', ".");
    }
    compact
}
