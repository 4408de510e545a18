//! カタログインデックス
//!
//! 商品スナップショットから1回だけ構築し、以降は読み取り専用。
//! 構築済みインデックスは複数スレッドから共有して照合に使える。

use crate::text::{normalize_code, normalize_header, tokenize};
use crate::types::{ProductId, ProductRecord};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// 商品の位置（スナップショットの読み込み順）
pub type Position = usize;

/// カタログインデックス
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    /// 全商品（読み込み順）
    products: Vec<ProductRecord>,
    /// 正規化済み品名（products と同じ並び）
    normalized_headers: Vec<String>,
    /// 品名トークン（products と同じ並び）
    header_tokens: Vec<Vec<String>>,
    /// ID → 位置
    by_id: HashMap<ProductId, Position>,
    /// 正規化コード → 位置（衝突あり）
    by_code: HashMap<String, Vec<Position>>,
    /// 正規化品名 → 位置（完全一致用）
    by_header: HashMap<String, Vec<Position>>,
    /// トークン → 位置の集合（あいまい検索の事前絞り込み用）
    postings: HashMap<String, BTreeSet<Position>>,
}

impl CatalogIndex {
    /// スナップショットからインデックスを構築する
    ///
    /// 同じIDが重複した場合は最初の商品を採用する。
    pub fn build(products: impl IntoIterator<Item = ProductRecord>) -> Self {
        let mut index = Self::default();

        for product in products {
            if index.by_id.contains_key(&product.id) {
                warn!(id = product.id, "duplicate product id skipped");
                continue;
            }
            index.insert(product);
        }

        debug!(
            products = index.products.len(),
            codes = index.by_code.len(),
            headers = index.by_header.len(),
            tokens = index.postings.len(),
            "catalog index built"
        );

        index
    }

    fn insert(&mut self, product: ProductRecord) {
        let pos = self.products.len();

        let header = normalize_header(&product.header);
        if !header.is_empty() {
            self.by_header.entry(header.clone()).or_default().push(pos);
        }

        // 同じ商品の複数方式が同じコードに正規化されても1件として扱う
        let mut codes: Vec<String> = product
            .codes()
            .map(normalize_code)
            .filter(|c| !c.is_empty())
            .collect();
        codes.sort();
        codes.dedup();
        for code in codes {
            self.by_code.entry(code).or_default().push(pos);
        }

        let tokens = tokenize(&header);
        for token in &tokens {
            self.postings.entry(token.clone()).or_default().insert(pos);
        }

        self.by_id.insert(product.id, pos);
        self.normalized_headers.push(header);
        self.header_tokens.push(tokens);
        self.products.push(product);
    }

    /// 商品数
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn product(&self, pos: Position) -> Option<&ProductRecord> {
        self.products.get(pos)
    }

    pub fn get(&self, id: ProductId) -> Option<&ProductRecord> {
        self.by_id.get(&id).and_then(|&pos| self.products.get(pos))
    }

    pub fn normalized_header(&self, pos: Position) -> &str {
        self.normalized_headers.get(pos).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn header_tokens(&self, pos: Position) -> &[String] {
        self.header_tokens.get(pos).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// 正規化済みコードで検索
    pub fn lookup_code(&self, normalized_code: &str) -> Vec<&ProductRecord> {
        self.resolve(self.by_code.get(normalized_code))
    }

    /// 正規化済み品名の完全一致で検索
    pub fn lookup_header(&self, normalized_header: &str) -> Vec<&ProductRecord> {
        self.resolve(self.by_header.get(normalized_header))
    }

    /// トークンを含む商品の位置
    pub fn postings(&self, token: &str) -> Option<&BTreeSet<Position>> {
        self.postings.get(token)
    }

    fn resolve(&self, positions: Option<&Vec<Position>>) -> Vec<&ProductRecord> {
        positions
            .map(|v| v.iter().filter_map(|&pos| self.products.get(pos)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductFlatCodes;

    fn product(id: ProductId, header: &str, articul: Option<&str>) -> ProductRecord {
        ProductRecord {
            id,
            header: header.to_string(),
            articul: articul.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_indexes_all_code_schemes() {
        let mut p = product(1, "Кабель ВВГнг 3x2.5", Some("elc-100"));
        p.sync_uid = Some("sync 1".to_string());
        p.flat_codes = ProductFlatCodes {
            raec: Some("r 55".to_string()),
            ..Default::default()
        };
        p.analog_codes = vec!["AN1".to_string(), "   ".to_string()];
        let index = CatalogIndex::build(vec![p]);

        for code in ["ELC-100", "SYNC1", "R55", "AN1"] {
            assert_eq!(index.lookup_code(code).len(), 1, "code: {}", code);
        }
        assert!(index.lookup_code("").is_empty());
    }

    #[test]
    fn test_build_code_collisions_are_kept() {
        let index = CatalogIndex::build(vec![
            product(1, "Автомат 16А", Some("va47 16")),
            product(2, "Автомат 16А С", Some("VA4716")),
        ]);
        let hits = index.lookup_code("VA4716");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_same_product_duplicate_codes_count_once() {
        let mut p = product(1, "Кабель ВВГнг 3x2.5", Some("ELC-100"));
        p.flat_codes.elcom = Some("elc 100".to_string());
        p.analog_codes = vec!["ELC-100".to_string()];
        let index = CatalogIndex::build(vec![p]);

        assert_eq!(index.lookup_code("ELC100").len(), 1);
        assert_eq!(index.lookup_code("ELC-100").len(), 1);
    }

    #[test]
    fn test_build_header_exact_map() {
        let index = CatalogIndex::build(vec![
            product(1, "Кабель ВВГнг 3x2.5", None),
            product(2, "кабель  ввгнг 3х2.5", None),
        ]);
        assert_eq!(index.lookup_header("КАБЕЛЬ ВВГНГ 3X2.5").len(), 2);
        assert!(index.lookup_header("КАБЕЛЬ").is_empty());
    }

    #[test]
    fn test_build_postings_drop_short_tokens() {
        let index = CatalogIndex::build(vec![product(1, "Лампа Е 27", None)]);
        assert!(index.postings("ЛАМПА").is_some());
        assert!(index.postings("27").is_some());
        assert!(index.postings("Е").is_none());
    }

    #[test]
    fn test_build_skips_duplicate_ids() {
        let index = CatalogIndex::build(vec![
            product(1, "Первый", None),
            product(1, "Второй", None),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1).map(|p| p.header.as_str()), Some("Первый"));
    }

    #[test]
    fn test_empty_index() {
        let index = CatalogIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.lookup_header("").is_empty());
    }

    #[test]
    fn test_index_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CatalogIndex>();
    }
}
