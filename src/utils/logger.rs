use crate::utils::error::Result;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rank_collector=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rank_collector=info"))
    }
}

/// 每日一個日誌檔: `collector_YYYYMMDD.log`
pub fn daily_log_file(log_dir: &Path) -> Result<File> {
    fs::create_dir_all(log_dir)?;
    let name = format!("collector_{}.log", chrono::Local::now().format("%Y%m%d"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(name))?;
    Ok(file)
}

pub fn init_cli_logger(verbose: bool, json: bool, log_file: Option<File>) {
    let stdout_layer = if json {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .json()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .boxed()
    };

    // 檔案輸出不帶 ANSI 色碼
    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(stdout_layer)
        .with(file_layer)
        .init();
}
