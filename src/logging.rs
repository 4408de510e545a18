use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 既定のログレベル指定（`RUST_LOG` が無い場合）
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "elcom_match=debug,elcom_match_common=debug"
    } else {
        "elcom_match=info,elcom_match_common=info"
    }
}

/// ログ出力を初期化する
///
/// 進捗表示は stdout に出すので、ログは stderr に書く。
/// 2回目以降の呼び出しは無視される。
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert!(default_directive(false).contains("elcom_match=info"));
        assert!(default_directive(true).contains("elcom_match=debug"));
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(false);
        init_logging(true);
    }
}
