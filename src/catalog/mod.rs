//! カタログスナップショットの読み込み
//!
//! 商品APIのスナップショット（JSON）を検証して `ProductRecord` に変換する。
//! 不正なレコードはここで除外し、インデックスには渡さない。

use crate::error::{MatchAppError, Result};
use elcom_match_common::{ProductFlatCodes, ProductId, ProductRecord};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// 読み込み済みスナップショット
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub products: Vec<ProductRecord>,
    /// 除外したレコード数
    pub rejected: usize,
    /// スナップショット本体のSHA-256（16進）
    pub fingerprint: String,
}

/// スナップショットファイルを読み込む
pub fn load_snapshot(path: &Path) -> Result<CatalogSnapshot> {
    if !path.exists() {
        return Err(MatchAppError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let snapshot = parse_snapshot(&bytes)?;

    info!(
        path = %path.display(),
        products = snapshot.products.len(),
        rejected = snapshot.rejected,
        "catalog snapshot loaded"
    );
    Ok(snapshot)
}

/// スナップショット本体を解釈する
///
/// 配列、または `products` 配列を持つオブジェクトを受け付ける。
pub fn parse_snapshot(bytes: &[u8]) -> Result<CatalogSnapshot> {
    let root: Value = serde_json::from_slice(bytes)?;

    let records = match root {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("products") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(MatchAppError::InvalidCatalog(
                    "products 配列がありません".into(),
                ))
            }
        },
        _ => {
            return Err(MatchAppError::InvalidCatalog(
                "配列またはオブジェクトが必要です".into(),
            ))
        }
    };

    let mut products = Vec::with_capacity(records.len());
    let mut seen: HashSet<ProductId> = HashSet::new();
    let mut rejected = 0;

    for (i, value) in records.into_iter().enumerate() {
        match product_from_value(&value) {
            Ok(product) if !seen.insert(product.id) => {
                warn!(record = i, id = product.id, "duplicate product id rejected");
                rejected += 1;
            }
            Ok(product) => products.push(product),
            Err(reason) => {
                warn!(record = i, %reason, "malformed product record rejected");
                rejected += 1;
            }
        }
    }

    Ok(CatalogSnapshot {
        products,
        rejected,
        fingerprint: fingerprint(bytes),
    })
}

/// バイト列のSHA-256を16進で返す
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// 1レコードを検証して変換する（不正な場合は理由を返す）
fn product_from_value(value: &Value) -> std::result::Result<ProductRecord, String> {
    if !value.is_object() {
        return Err("オブジェクトではありません".into());
    }

    let product: ProductRecord =
        serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
    let mut product = clean_product(product)?;
    product.raw_json = value.to_string();
    Ok(product)
}

/// 前後の空白を落とし、空の値は未設定にする。品名が空なら不正
fn clean_product(product: ProductRecord) -> std::result::Result<ProductRecord, String> {
    let header = product.header.trim().to_string();
    if header.is_empty() {
        return Err("header が空です".into());
    }

    let flat = product.flat_codes;
    Ok(ProductRecord {
        header,
        sync_uid: non_blank(product.sync_uid),
        articul: non_blank(product.articul),
        unit_header: non_blank(product.unit_header),
        manufacturer_header: non_blank(product.manufacturer_header),
        updated_at: non_blank(product.updated_at),
        analog_codes: product
            .analog_codes
            .into_iter()
            .filter_map(|c| non_blank(Some(c)))
            .collect(),
        flat_codes: ProductFlatCodes {
            elcom: non_blank(flat.elcom),
            manufacturer: non_blank(flat.manufacturer),
            raec: non_blank(flat.raec),
            pc: non_blank(flat.pc),
            etm: non_blank(flat.etm),
        },
        ..product
    })
}

/// 空白のみの文字列は未設定として扱う
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
