//! Global simulation logger.
//!
//! Симуляция — библиотека: хост (игровой клиент, headless runner, тесты)
//! решает куда писать логи. По умолчанию — консоль.

use once_cell::sync::Lazy;
use std::sync::Mutex;

static SINK: Lazy<Mutex<Option<Box<dyn LogSink>>>> = Lazy::new(|| Mutex::new(None));
static MIN_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

/// Уровни логирования (по возрастанию важности)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Приёмник логов (реализуется хостом: консоль, файл, engine console)
pub trait LogSink: Send + Sync {
    fn write(&self, level: LogLevel, message: &str);
}

pub fn set_sink(sink: Box<dyn LogSink>) {
    *SINK.lock().unwrap() = Some(sink);
}

pub fn set_sink_if_needed(sink: Box<dyn LogSink>) {
    let mut guard = SINK.lock().unwrap();
    if guard.is_none() {
        *guard = Some(sink);
    }
}

pub fn set_min_level(level: LogLevel) {
    *MIN_LEVEL.lock().unwrap() = level;
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    if level < *MIN_LEVEL.lock().unwrap() {
        return;
    }

    // Timestamp добавляем здесь, а не в sink — все приёмники получают одинаковый формат
    if let Some(sink) = SINK.lock().unwrap().as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        sink.write(level, &format!("[{}] {}", timestamp, message));
    }
}

struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

/// Консольный logger по умолчанию (не перетирает уже установленный sink)
pub fn init_logger() {
    set_sink_if_needed(Box::new(ConsoleSink));
}
