use clap::Parser;
use elcom_match::{catalog, cli, config, error, export, logging, matcher, scanner};
use elcom_match_common::{match_item, normalize_items, CatalogIndex, ItemSource};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::io::IsTerminal;
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("✖ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Match { catalog, input, output, recursive, sequential } => {
            let config = Config::load()?;
            let thresholds = config.thresholds()?;

            println!("🔎 elcom-match - カタログ照合\n");

            // 1. カタログ読み込み
            println!("[1/4] カタログを読み込み中...");
            let snapshot = catalog::load_snapshot(&catalog)?;
            let fingerprint = snapshot.fingerprint.clone();
            let rejected = snapshot.rejected;
            let index = CatalogIndex::build(snapshot.products);
            println!("✔ {}件の商品を読み込み（除外 {}件）\n", index.len(), rejected);

            // 2. 問い合わせスキャン
            println!("[2/4] 問い合わせをスキャン中...");
            let inquiries = scanner::scan_inquiries(&input, recursive)?;
            if inquiries.is_empty() {
                return Err(error::MatchAppError::NoInquiriesFound(
                    input.display().to_string(),
                ));
            }
            println!("✔ {}件の問い合わせを検出\n", inquiries.len());

            // 3. 照合
            println!("[3/4] 照合中...{}", if sequential { " (逐次)" } else { "" });
            let options = matcher::MatchOptions {
                parallel: config.parallel && !sequential,
                show_progress: std::io::stdout().is_terminal(),
            };
            let mut reports = Vec::with_capacity(inquiries.len());
            let mut total = matcher::MatchSummary::default();
            for inquiry in &inquiries {
                let matched = matcher::match_inquiry(inquiry, &index, &thresholds, options)?;
                println!(
                    "  {}: OK {} / REVIEW {} / NOT_FOUND {}",
                    matched.file_name,
                    matched.summary.ok,
                    matched.summary.review,
                    matched.summary.not_found
                );
                total = total.merge(matched.summary);
                reports.push(export::MatchReport::new(&matched, &fingerprint));
            }
            println!("✔ 照合完了\n");

            // 4. 出力
            println!("[4/4] レポートを保存中...");
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            for path in export::write_batch(&reports, &output_dir)? {
                println!("✔ レポート出力: {}", path.display());
            }

            println!(
                "\n✅ 完了: {}行 (OK {} / REVIEW {} / NOT_FOUND {})",
                total.total, total.ok, total.review, total.not_found
            );
        }

        Commands::Lookup { catalog, line } => {
            let config = Config::load()?;
            let thresholds = config.thresholds()?;

            let snapshot = catalog::load_snapshot(&catalog)?;
            let index = CatalogIndex::build(snapshot.products);

            let item = elcom_match_common::line_to_item(ItemSource::EmailText, 1, &line)
                .ok_or_else(|| error::MatchAppError::InvalidLine(line.clone()))?;
            let normalized = normalize_items(vec![item]);
            for item in &normalized {
                let result = match_item(item, &index, &thresholds);
                let line = matcher::MatchedLine { item: item.clone(), result };
                println!("{}", serde_json::to_string_pretty(&line)?);
            }
        }

        Commands::Config { show, ok_threshold, review_threshold, gap_threshold, scan_cap } => {
            let mut config = Config::load_file()?;
            let changed = ok_threshold.is_some()
                || review_threshold.is_some()
                || gap_threshold.is_some()
                || scan_cap.is_some();

            if let Some(v) = ok_threshold {
                config.ok_threshold = v;
            }
            if let Some(v) = review_threshold {
                config.review_threshold = v;
            }
            if let Some(v) = gap_threshold {
                config.gap_threshold = v;
            }
            if let Some(v) = scan_cap {
                config.scan_cap = v;
            }

            if changed {
                config.thresholds()?;
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                let effective = config.with_env_overrides();
                println!("設定:");
                println!("  OK閾値: {}", effective.ok_threshold);
                println!("  REVIEW閾値: {}", effective.review_threshold);
                println!("  スコア差閾値: {}", effective.gap_threshold);
                println!("  走査上限: {}", effective.scan_cap);
                println!("  数量なし確信度上限: {}", effective.missing_qty_confidence_cap);
                println!("  並列照合: {}", if effective.parallel { "有効" } else { "無効" });
            }
        }
    }

    Ok(())
}
