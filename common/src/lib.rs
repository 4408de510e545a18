//! Elcom Match Common Library
//!
//! 問い合わせ明細を電材カタログの商品に照合するエンジン。
//! I/Oを行わず、カタログのスナップショットと明細だけを入力にとる。
//!
//! ## 処理フロー
//! 1. 明細行から数量・単位を抽出（[`qty`]）し、品名を正規化（[`text`]）
//! 2. スナップショットからインデックスを構築（[`index`]）
//! 3. コード → 品名完全一致 → あいまい検索の順に判定（[`resolver`], [`ranker`]）

pub mod error;
pub mod extract;
pub mod index;
pub mod qty;
pub mod ranker;
pub mod resolver;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use extract::{dedupe_items, line_to_item, normalize_items, parse_plain_text};
pub use index::CatalogIndex;
pub use qty::{parse_qty, ParsedQty};
pub use ranker::rank_candidates;
pub use resolver::{match_item, MatchThresholds};
pub use text::{dice_coefficient, looks_like_code, normalize_code, normalize_header, tokenize};
pub use types::{
    ExtractionItem, ItemSource, MatchCandidate, MatchProduct, MatchReason, MatchResult,
    MatchStatus, NormalizedItem, ProductFlatCodes, ProductId, ProductRecord,
};
