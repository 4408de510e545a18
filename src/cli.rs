use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "elcom-match")]
#[command(about = "問い合わせ明細・電材カタログ照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 問い合わせファイルをカタログと照合してレポートを出力
    Match {
        /// カタログスナップショット（JSON）
        #[arg(required = true)]
        catalog: PathBuf,

        /// 問い合わせファイルまたはフォルダ
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル/ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 並列照合を無効化
        #[arg(long)]
        sequential: bool,
    },

    /// 1行だけ照合して結果をJSONで表示
    Lookup {
        /// カタログスナップショット（JSON）
        #[arg(required = true)]
        catalog: PathBuf,

        /// 明細行（例: "Кабель ВВГнг 3x2.5 100 м"）
        #[arg(required = true)]
        line: String,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// OK判定の閾値
        #[arg(long)]
        ok_threshold: Option<f64>,

        /// REVIEW判定の閾値
        #[arg(long)]
        review_threshold: Option<f64>,

        /// 1位と2位の最低スコア差
        #[arg(long)]
        gap_threshold: Option<f64>,

        /// 共通トークンが無い場合の走査上限
        #[arg(long)]
        scan_cap: Option<usize>,
    },
}
