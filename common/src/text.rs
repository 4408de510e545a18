//! テキスト正規化モジュール
//!
//! 品名・コードを比較可能な形に揃える。
//! インデックス構築と問い合わせの両方で同じ関数を使うこと。
//!
//! ## 品名（header）の正規化
//! 1. 大文字化、Ё→Е
//! 2. 乗算記号（×, Х, х, *）→ X
//! 3. 面積単位（мм², кв.мм, кв мм）→ MM2
//! 4. 引用符・許可外文字を空白に置換し、空白を畳む

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref SPACES_RE: Regex = Regex::new(r"\s+").unwrap();
}

const QUOTES: &[char] = &['"', '\'', '`', '«', '»'];

fn map_multiplication(c: char) -> char {
    match c {
        '×' | 'Х' | 'х' | '*' => 'X',
        _ => c,
    }
}

fn is_cyrillic_upper(c: char) -> bool {
    ('А'..='Я').contains(&c)
}

fn is_header_char(c: char) -> bool {
    c.is_ascii_uppercase()
        || c.is_ascii_digit()
        || is_cyrillic_upper(c)
        || matches!(c, '-' | '/' | '.')
        || c.is_whitespace()
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_uppercase()
        || c.is_ascii_digit()
        || is_cyrillic_upper(c)
        || matches!(c, '-' | '_' | '/' | '.')
}

fn collapse_spaces(s: &str) -> String {
    SPACES_RE.replace_all(s, " ").trim().to_string()
}

/// 品名を正規化する
///
/// 冪等: `normalize_header(&normalize_header(s)) == normalize_header(s)`
///
/// # Examples
/// ```
/// use elcom_match_common::text::normalize_header;
///
/// assert_eq!(normalize_header("Кабель  «ВВГнг» 3х2,5 мм²"), "КАБЕЛЬ ВВГНГ 3X2 5 MM2");
/// ```
pub fn normalize_header(input: &str) -> String {
    let upper: String = input
        .to_uppercase()
        .chars()
        .map(|c| if c == 'Ё' { 'Е' } else { map_multiplication(c) })
        .collect();

    // ² は許可外文字なので除去前に置換する
    let upper = upper.replace("ММ²", "MM2").replace("MM²", "MM2");

    let cleaned: String = upper
        .chars()
        .map(|c| if QUOTES.contains(&c) || !is_header_char(c) { ' ' } else { c })
        .collect();

    // 空白を畳んでから置換しないと「КВ  ММ」が2回目で初めて一致してしまう
    let collapsed = collapse_spaces(&cleaned);
    let replaced = collapsed.replace("КВ.ММ", "MM2").replace("КВ ММ", "MM2");
    collapse_spaces(&replaced)
}

/// コードを正規化する
///
/// 空白はすべて除去し、コードに使える文字だけを残す。
/// コードらしくない入力では空文字列になる。
pub fn normalize_code(input: &str) -> String {
    input
        .to_uppercase()
        .chars()
        .map(map_multiplication)
        .filter(|c| !c.is_whitespace())
        .filter(|c| is_code_char(*c))
        .collect()
}

/// 正規化した品名をトークンに分割（2文字未満は捨てる）
pub fn tokenize(input: &str) -> Vec<String> {
    normalize_header(input)
        .split(' ')
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_string())
        .collect()
}

/// コードらしい文字列か判定
///
/// 3文字以上で、文字（ラテン/キリル）と数字を両方含むこと
pub fn looks_like_code(input: &str) -> bool {
    if input.trim().chars().count() < 3 {
        return false;
    }

    let has_letter = input.chars().any(|c| {
        c.is_ascii_alphabetic() || ('А'..='я').contains(&c) || c == 'Ё' || c == 'ё'
    });
    let has_digit = input.chars().any(|c| c.is_ascii_digit());

    has_letter && has_digit
}

fn bigrams(s: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// バイグラムのDice係数
///
/// 共通バイグラムは多重集合として数える。
/// どちらかが2文字未満なら0、完全一致なら1。
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let a_pairs = bigrams(a);
    let b_pairs = bigrams(b);
    if a_pairs.is_empty() || b_pairs.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let mut b_counts: HashMap<(char, char), usize> = HashMap::new();
    for pair in &b_pairs {
        *b_counts.entry(*pair).or_insert(0) += 1;
    }

    let mut intersection = 0;
    for pair in &a_pairs {
        if let Some(count) = b_counts.get_mut(pair) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    (2 * intersection) as f64 / (a_pairs.len() + b_pairs.len()) as f64
}
