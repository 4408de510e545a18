//! 照合レポート出力
//!
//! 明細1行を1レコードに平坦化し、JSONで書き出す。

use crate::error::Result;
use crate::matcher::{InquiryMatch, MatchSummary, MatchedLine};
use elcom_match_common::{ItemSource, MatchReason, MatchStatus, ProductId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// レポートの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub line_no: usize,
    pub source: ItemSource,
    pub raw_line: String,
    pub name_or_code: Option<String>,
    pub qty: Option<f64>,
    pub unit: Option<String>,
    pub status: MatchStatus,
    pub confidence: f64,
    pub reason: MatchReason,
    pub product_id: Option<ProductId>,
    pub sync_uid: Option<String>,
    pub product_header: Option<String>,
    pub articul: Option<String>,
    pub unit_header: Option<String>,
    pub code_elcom: Option<String>,
    pub code_manufacturer: Option<String>,
    pub code_raec: Option<String>,
    pub code_pc: Option<String>,
    pub code_etm: Option<String>,
    /// 2位候補（照合の妥当性確認用）
    pub candidate2_header: Option<String>,
    pub candidate2_score: Option<f64>,
}

impl From<&MatchedLine> for ExportRow {
    fn from(line: &MatchedLine) -> Self {
        let item = &line.item.item;
        let result = &line.result;
        let product = result.product.as_ref();
        let flat = product.map(|p| &p.flat_codes);
        let second = result.candidates.get(1);

        Self {
            line_no: item.line_no,
            source: item.source,
            raw_line: item.raw_line.clone(),
            name_or_code: item.name_or_code.clone(),
            qty: item.qty,
            unit: item.unit.clone(),
            status: result.status,
            confidence: result.confidence,
            reason: result.reason,
            product_id: product.map(|p| p.id),
            sync_uid: product.and_then(|p| p.sync_uid.clone()),
            product_header: product.map(|p| p.header.clone()),
            articul: product.and_then(|p| p.articul.clone()),
            unit_header: product.and_then(|p| p.unit_header.clone()),
            code_elcom: flat.and_then(|c| c.elcom.clone()),
            code_manufacturer: flat.and_then(|c| c.manufacturer.clone()),
            code_raec: flat.and_then(|c| c.raec.clone()),
            code_pc: flat.and_then(|c| c.pc.clone()),
            code_etm: flat.and_then(|c| c.etm.clone()),
            candidate2_header: second.map(|c| c.header.clone()),
            candidate2_score: second.map(|c| c.score),
        }
    }
}

/// 問い合わせ1件分のレポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// RFC 3339
    pub generated_at: String,
    pub inquiry: String,
    pub catalog_fingerprint: String,
    pub summary: MatchSummary,
    pub rows: Vec<ExportRow>,
}

impl MatchReport {
    pub fn new(inquiry: &InquiryMatch, catalog_fingerprint: &str) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            inquiry: inquiry.file_name.clone(),
            catalog_fingerprint: catalog_fingerprint.to_string(),
            summary: inquiry.summary,
            rows: inquiry.lines.iter().map(ExportRow::from).collect(),
        }
    }
}

/// 出力先のパスを決める
///
/// ディレクトリ（または拡張子なし）なら `<問い合わせ名>.match.json` を作る。
pub fn output_path_for(output: &Path, inquiry: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        let stem = Path::new(inquiry)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("inquiry");
        output.join(format!("{}.match.json", stem))
    } else {
        output.to_path_buf()
    }
}

/// レポートをJSONで書き出す
pub fn write_report(report: &MatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 複数レポートを配列として1ファイルに書き出す
pub fn write_reports(reports: &[MatchReport], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 出力先がファイル指定か（既存ディレクトリでなく拡張子つき）
fn is_file_output(output: &Path) -> bool {
    !output.is_dir() && output.extension().is_some()
}

/// レポート群を出力先に書き出し、書いたパスを返す
///
/// 複数のレポートでファイルが指定された場合は配列として1ファイルにまとめる。
/// それ以外は問い合わせごとに1ファイル。
pub fn write_batch(reports: &[MatchReport], output: &Path) -> Result<Vec<PathBuf>> {
    if reports.len() > 1 && is_file_output(output) {
        write_reports(reports, output)?;
        return Ok(vec![output.to_path_buf()]);
    }

    let mut written = Vec::with_capacity(reports.len());
    for report in reports {
        let path = output_path_for(output, &report.inquiry);
        write_report(report, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use elcom_match_common::{
        ExtractionItem, MatchCandidate, MatchProduct, MatchResult, NormalizedItem,
        ProductFlatCodes,
    };

    fn matched_line() -> MatchedLine {
        let mut item = ExtractionItem::new(4, ItemSource::EmailText, "Кабель ВВГнг 3x2.5 100 м");
        item.name_or_code = Some("Кабель ВВГнг 3x2.5".to_string());
        item.qty = Some(100.0);
        item.unit = Some("м".to_string());

        MatchedLine {
            item: NormalizedItem::from_item(item),
            result: MatchResult {
                status: MatchStatus::Ok,
                confidence: 0.95,
                reason: MatchReason::Header,
                product: Some(MatchProduct {
                    id: 10,
                    sync_uid: Some("uid-10".to_string()),
                    header: "Кабель ВВГнг 3x2.5".to_string(),
                    articul: Some("ELC-10".to_string()),
                    unit_header: Some("м".to_string()),
                    flat_codes: ProductFlatCodes {
                        elcom: Some("0100203802".to_string()),
                        etm: Some("ETM1".to_string()),
                        ..Default::default()
                    },
                }),
                candidates: vec![
                    MatchCandidate {
                        id: 10,
                        code: Some("ELC-10".to_string()),
                        header: "Кабель ВВГнг 3x2.5".to_string(),
                        score: 0.95,
                    },
                    MatchCandidate {
                        id: 11,
                        code: None,
                        header: "Кабель ВВГнг 3x4".to_string(),
                        score: 0.81,
                    },
                ],
            },
        }
    }

    #[test]
    fn test_export_row_from_line() {
        let row = ExportRow::from(&matched_line());

        assert_eq!(row.line_no, 4);
        assert_eq!(row.qty, Some(100.0));
        assert_eq!(row.product_id, Some(10));
        assert_eq!(row.code_elcom.as_deref(), Some("0100203802"));
        assert_eq!(row.code_raec, None);
        assert_eq!(row.code_etm.as_deref(), Some("ETM1"));
        assert_eq!(row.candidate2_header.as_deref(), Some("Кабель ВВГнг 3x4"));
        assert_eq!(row.candidate2_score, Some(0.81));
    }

    #[test]
    fn test_export_row_not_found() {
        let mut line = matched_line();
        line.result = MatchResult::not_found();
        let row = ExportRow::from(&line);

        assert_eq!(row.status, MatchStatus::NotFound);
        assert_eq!(row.product_id, None);
        assert_eq!(row.candidate2_header, None);
    }

    #[test]
    fn test_export_row_json_keys() {
        let json = serde_json::to_value(ExportRow::from(&matched_line())).unwrap();
        assert_eq!(json["status"], "OK");
        assert_eq!(json["reason"], "HEADER");
        assert_eq!(json["source"], "email_text");
        assert_eq!(json["lineNo"], 4);
        assert!(json.get("candidate2Header").is_some());
    }

    #[test]
    fn test_output_path_for() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            output_path_for(dir.path(), "order-15.txt"),
            dir.path().join("order-15.match.json")
        );
        assert_eq!(
            output_path_for(Path::new("out/report.json"), "order-15.txt"),
            PathBuf::from("out/report.json")
        );
    }
}
