//! 日志管理模块
//!
//! 基于 tracing-subscriber：标准错误输出 + 可选的日志文件。
//! 远端返回的内容在写入日志前必须经过 [`sanitize_log_message`]。

use crate::config::Config;
use chrono::{Duration, Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;
const LOG_RETENTION_DAYS: i64 = 7;

/// 初始化全局日志
///
/// 过滤级别优先取 `RUST_LOG`，其次 `verbose`（debug），最后是配置中的级别。
pub fn init_logging(config: &Config, verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = if config.logging.enabled {
        let path = config.log_file_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        rotate_log_file_if_needed(&path, MAX_LOG_FILE_SIZE);
        prune_rotated_logs(&path, LOG_RETENTION_DAYS);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}

/// Renames the log file with a timestamp suffix once it exceeds `max_size`.
/// Returns whether a rotation happened.
pub fn rotate_log_file_if_needed(path: &Path, max_size: u64) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if metadata.len() <= max_size {
        return false;
    }

    let suffix = Local::now().format("%Y%m%d-%H%M%S");
    let rotated = path.with_file_name(format!(
        "{}.{}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        suffix
    ));
    fs::rename(path, rotated).is_ok()
}

/// Deletes rotated siblings (`<name>.<suffix>`) older than `retention_days`.
pub fn prune_rotated_logs(path: &Path, retention_days: i64) {
    let Some(dir) = path.parent() else {
        return;
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let cutoff = Utc::now() - Duration::days(retention_days);
    let prefix = format!(
        "{}.",
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        if !file_name.to_string_lossy().starts_with(&prefix) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if chrono::DateTime::<Utc>::from(modified) < cutoff {
            let _ = fs::remove_file(entry.path());
        }
    }
}

static REDACTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let patterns = [
        // Bearer token
        (r"Bearer\s+[A-Za-z0-9._-]+", "Bearer ***"),
        // Supabase apikey 头
        (
            r#"api[_-]?key["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#,
            "apikey: ***",
        ),
        (
            r#"access[_-]?token["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#,
            "access_token: ***",
        ),
        (
            r#"refresh[_-]?token["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#,
            "refresh_token: ***",
        ),
        (r#"password["']?\s*[:=]\s*["']?[^\s"',}]+"#, "password: ***"),
    ];
    patterns
        .into_iter()
        .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
        .collect()
});

/// 日志脱敏：token、apikey、密码
pub fn sanitize_log_message(message: &str) -> String {
    REDACTIONS
        .iter()
        .fold(message.to_string(), |text, (re, replacement)| {
            re.replace_all(&text, *replacement).into_owned()
        })
}
