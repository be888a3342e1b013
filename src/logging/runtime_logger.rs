// src/logging/runtime_logger.rs

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use chrono::{FixedOffset, Utc};
use serde_json::json;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tokio::task;
use tokio::time::{self, Duration};
use tracing_appender::rolling;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 4] = [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

enum Command {
    Entry { level: LogLevel, content: String },
    Flush(oneshot::Sender<()>),
}

/// 运行日志管理器（RuntimeLogger）
/// 服务生命周期与每次竞价的聚合日志按级别写入不同的滚动文件。
pub struct RuntimeLogger {
    sender: Sender<Command>,
}

impl RuntimeLogger {
    /// - `log_dir`: 日志文件存放目录
    /// - `file_prefix`: 文件前缀（最终文件名形如 runtime_info.json）
    /// - `buffer_size`: mpsc 通道缓冲区大小
    /// - `batch_size`: 每个级别累积多少条后写盘
    /// - `flush_interval`: 定时刷盘间隔（毫秒）
    pub fn new(
        log_dir: &str,
        file_prefix: &str,
        buffer_size: usize,
        batch_size: usize,
        flush_interval: u64,
    ) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let log_files: HashMap<LogLevel, Arc<RollingFileAppender>> = LogLevel::ALL
            .iter()
            .map(|level| {
                let file_name = format!("{}_{}.json", file_prefix, level.as_str().to_lowercase());
                (*level, Arc::new(rolling::hourly(log_dir, file_name)))
            })
            .collect();
        tokio::spawn(Self::background_log_writer(log_files, receiver, batch_size, flush_interval));

        let log_dir = log_dir.to_string();
        tokio::spawn(async move {
            let retention = Duration::from_secs(72 * 3600);
            loop {
                Self::cleanup_old_logs(&log_dir, retention).await;
                time::sleep(Duration::from_secs(3600)).await;
            }
        });

        Arc::new(Self { sender })
    }

    pub async fn log(&self, level: LogLevel, message: &str) {
        self.send(level, json!(message)).await;
    }

    /// 记录结构化日志，`message` 作为 JSON 对象嵌入
    pub async fn log_json<T: serde::Serialize>(&self, level: LogLevel, message: &T) {
        match serde_json::to_value(message) {
            Ok(value) => self.send(level, value).await,
            Err(e) => tracing::error!("Failed to serialize runtime log message: {}", e),
        }
    }

    async fn send(&self, level: LogLevel, message: serde_json::Value) {
        let timestamp = FixedOffset::east_opt(8 * 3600)
            .map(|tz| Utc::now().with_timezone(&tz).to_rfc3339())
            .unwrap_or_else(|| Utc::now().to_rfc3339());
        let content = json!({
            "timestamp": timestamp,
            "level": level.as_str(),
            "message": message,
        })
        .to_string();

        if let Err(e) = self.sender.send(Command::Entry { level, content }).await {
            tracing::error!("Failed to send runtime log message: {}", e);
        }
    }

    async fn background_log_writer(
        log_files: HashMap<LogLevel, Arc<RollingFileAppender>>,
        mut receiver: Receiver<Command>,
        batch_size: usize,
        flush_interval: u64,
    ) {
        let mut buffers: HashMap<LogLevel, Vec<String>> = HashMap::new();
        let mut interval = time::interval(Duration::from_millis(flush_interval));
        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Some(Command::Entry { level, content }) => {
                        let buffer = buffers.entry(level).or_default();
                        buffer.push(content);
                        if buffer.len() >= batch_size {
                            Self::flush(&log_files, level, buffer).await;
                        }
                    }
                    Some(Command::Flush(done)) => {
                        Self::flush_all(&log_files, &mut buffers).await;
                        let _ = done.send(());
                    }
                    None => {
                        Self::flush_all(&log_files, &mut buffers).await;
                        break;
                    }
                },
                _ = interval.tick() => Self::flush_all(&log_files, &mut buffers).await,
            }
        }
    }

    async fn flush_all(
        log_files: &HashMap<LogLevel, Arc<RollingFileAppender>>,
        buffers: &mut HashMap<LogLevel, Vec<String>>,
    ) {
        for (level, buffer) in buffers.iter_mut() {
            Self::flush(log_files, *level, buffer).await;
        }
    }

    async fn flush(
        log_files: &HashMap<LogLevel, Arc<RollingFileAppender>>,
        level: LogLevel,
        buffer: &mut Vec<String>,
    ) {
        if buffer.is_empty() {
            return;
        }
        let Some(appender) = log_files.get(&level).cloned() else {
            buffer.clear();
            return;
        };
        let content = buffer.join("\n") + "\n";
        buffer.clear();
        let written = task::spawn_blocking(move || appender.make_writer().write_all(content.as_bytes())).await;
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Failed to write runtime logs: {}", e),
            Err(e) => tracing::error!("Runtime log writer task failed: {}", e),
        }
    }

    async fn cleanup_old_logs(log_dir: &str, retention: Duration) {
        use std::time::SystemTime;
        let now = SystemTime::now();
        let mut dir = match tokio::fs::read_dir(log_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Failed to read log directory {}: {}", log_dir, e);
                return;
            }
        };
        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
                continue;
            };
            if now.duration_since(modified).unwrap_or_default() > retention {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => tracing::info!("Deleted old log file: {:?}", path),
                    Err(e) => tracing::warn!("Failed to delete old log file {:?}: {}", path, e),
                }
            }
        }
    }

    /// 将缓冲区中的日志全部写盘后返回
    pub async fn shutdown(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Command::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_entries_per_level() {
        let dir = std::env::temp_dir().join(format!("adg-runtime-{}", uuid::Uuid::new_v4()));
        let dir_str = dir.to_string_lossy().to_string();
        let logger = RuntimeLogger::new(&dir_str, "runtime", 16, 100, 60_000);

        logger.log(LogLevel::Info, "hello").await;
        logger.log_json(LogLevel::Error, &json!({"request_id": "r1"})).await;
        logger.shutdown().await;

        let mut names = Vec::new();
        let mut contents = String::new();
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            names.push(path.file_name().unwrap().to_string_lossy().to_string());
            contents.push_str(&std::fs::read_to_string(&path).unwrap());
        }
        assert!(names.iter().any(|n| n.starts_with("runtime_info.json")));
        assert!(names.iter().any(|n| n.starts_with("runtime_error.json")));
        assert!(contents.contains("\"message\":\"hello\""));
        assert!(contents.contains("\"request_id\":\"r1\""));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
