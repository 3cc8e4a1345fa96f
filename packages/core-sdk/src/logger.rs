use std::{
    fs::File,
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/**
 * \brief Log verbosity, ordered from quietest to loudest.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    None,
    Fatal,
    Error,
    Info,
    Debug,
    All,
}

impl Level {
    /**
     * \brief Parse the config value; anything unknown silences logging.
     */
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Level::All,
            "debug" => Level::Debug,
            "info" => Level::Info,
            "error" => Level::Error,
            _ => Level::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::None => "NONE",
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::All => "ALL",
        }
    }
}

/**
 * \brief Logging capability handed to each component at construction.
 */
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, category: &str, message: &str);

    fn debug(&self, category: &str, message: &str) {
        self.log(Level::Debug, category, message);
    }

    fn info(&self, category: &str, message: &str) {
        self.log(Level::Info, category, message);
    }

    fn error(&self, category: &str, message: &str, err: &dyn std::fmt::Display) {
        self.log(Level::Error, category, &format!("{message}: {err}"));
    }

    /**
     * \brief Always written. Terminating the process is the caller's job.
     */
    fn fatal(&self, category: &str, message: &str, err: &dyn std::fmt::Display) {
        self.log(Level::Fatal, category, &format!("{message}: {err}"));
    }
}

/**
 * \brief Discards everything.
 */
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: Level, _category: &str, _message: &str) {}
}

/**
 * \brief Level-filtered, timestamped lines to a file or stderr.
 */
pub struct FileLogger {
    level: Level,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl FileLogger {
    pub fn stderr(level: Level) -> Self {
        Self {
            level,
            sink: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /**
     * \brief Truncates `path`. Falls back to stderr (and says so) when the
     * file cannot be opened.
     */
    pub fn open(level: Level, path: &Path) -> Self {
        match File::create(path) {
            Ok(file) => Self {
                level,
                sink: Mutex::new(Box::new(file)),
            },
            Err(err) => {
                let logger = Self::stderr(level);
                logger.error(
                    "logger",
                    &format!("failed to open log file {}", path.display()),
                    &err,
                );
                logger
            }
        }
    }

    /**
     * \brief Build from the `log` config section; an empty file means stderr.
     */
    pub fn from_config(config: &crate::config::LogConfig) -> Self {
        let level = Level::parse(&config.level);
        if config.file.is_empty() {
            Self::stderr(level)
        } else {
            Self::open(level, Path::new(&config.file))
        }
    }

    fn enabled(&self, level: Level) -> bool {
        level == Level::Fatal || (level != Level::None && level <= self.level)
    }
}

impl Logger for FileLogger {
    fn log(&self, level: Level, category: &str, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let line = format_line(level, category, message);
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.write_all(line.as_bytes());
            let _ = sink.flush();
        }
    }
}

/**
 * \brief Keeps every line in memory.
 */
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, category: &str, message: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push((level, format!("{category} - {message}")));
        }
    }
}

fn format_line(level: Level, category: &str, message: &str) -> String {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    format!("{} [{}] {} - {}\n", timestamp, level.as_str(), category, message)
}
