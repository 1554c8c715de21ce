//! tracing 初期化
//!
//! RUST_LOG があればそれを優先し、なければ --verbose / 設定の log_level を使う。

use crate::error::{AnnotatorError, Result};
use tracing_subscriber::{fmt, EnvFilter};

pub fn filter_directive(verbose: bool, log_level: &str) -> String {
    if verbose {
        "debug".to_string()
    } else {
        log_level.to_string()
    }
}

pub fn init_tracing(verbose: bool, log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(verbose, log_level)))
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| AnnotatorError::Config(format!("ログフィルタの作成に失敗: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| AnnotatorError::Config(format!("tracing 初期化エラー: {err}")))?;
    Ok(())
}
