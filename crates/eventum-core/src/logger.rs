//! Simulated-time-stamped logging
//!
//! Messages carry a source tag and are prefixed with the kernel clock
//! rendered as a fixed-width decimal. The logger hands structured records
//! to an abstract sink; formatting is the sink's concern. The default sink
//! writes styled lines to standard output.

use crate::time::SimTime;
use console::Style;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Severity levels, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record as handed to the sink
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub stime: SimTime,
    pub source: String,
    pub message: String,
}

/// Output abstraction for log records
pub trait LogSink {
    fn emit(&mut self, record: &LogRecord);
}

/// Styled standard-output sink
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Trace => Style::new().black().bright(),
        LogLevel::Debug => Style::new().white(),
        LogLevel::Info => Style::new().magenta(),
        LogLevel::Warning => Style::new().yellow(),
        LogLevel::Error => Style::new().red(),
    }
}

impl LogSink for StdoutSink {
    fn emit(&mut self, record: &LogRecord) {
        let style = level_style(record.level);
        let level = style
            .clone()
            .bold()
            .apply_to(format!("[{:7}]", record.level.as_str()));
        let time = Style::new()
            .cyan()
            .dim()
            .apply_to(format!("{}", record.stime));
        let source = if record.source.is_empty() {
            String::new()
        } else {
            format!("({}) ", Style::new().bold().apply_to(&record.source))
        };
        println!(
            "{} {} {}{}",
            level,
            time,
            source,
            style.apply_to(&record.message)
        );
    }
}

/// In-memory sink; tests read records back through the shared handle
#[derive(Default)]
pub struct MemorySink {
    records: Rc<RefCell<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that appends into an externally-owned record buffer
    pub fn shared(records: Rc<RefCell<Vec<LogRecord>>>) -> Self {
        Self { records }
    }

    /// Shared handle to the captured records
    pub fn records(&self) -> Rc<RefCell<Vec<LogRecord>>> {
        Rc::clone(&self.records)
    }
}

impl LogSink for MemorySink {
    fn emit(&mut self, record: &LogRecord) {
        self.records.borrow_mut().push(record.clone());
    }
}

/// Logger reading the kernel clock through a shared cell
pub struct Logger {
    level: Cell<LogLevel>,
    clock: Rc<Cell<SimTime>>,
    sink: RefCell<Box<dyn LogSink>>,
}

impl Logger {
    pub(crate) fn new(clock: Rc<Cell<SimTime>>, level: LogLevel, sink: Box<dyn LogSink>) -> Self {
        Self {
            level: Cell::new(level),
            clock,
            sink: RefCell::new(sink),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level.get()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    pub fn write(&self, level: LogLevel, source: &str, message: impl AsRef<str>) {
        if level < self.level.get() {
            return;
        }
        let record = LogRecord {
            level,
            stime: self.clock.get(),
            source: source.to_string(),
            message: message.as_ref().to_string(),
        };
        self.sink.borrow_mut().emit(&record);
    }

    pub fn trace(&self, source: &str, message: impl AsRef<str>) {
        self.write(LogLevel::Trace, source, message);
    }

    pub fn debug(&self, source: &str, message: impl AsRef<str>) {
        self.write(LogLevel::Debug, source, message);
    }

    pub fn info(&self, source: &str, message: impl AsRef<str>) {
        self.write(LogLevel::Info, source, message);
    }

    pub fn warning(&self, source: &str, message: impl AsRef<str>) {
        self.write(LogLevel::Warning, source, message);
    }

    pub fn error(&self, source: &str, message: impl AsRef<str>) {
        self.write(LogLevel::Error, source, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level.get())
            .field("stime", &self.clock.get())
            .finish()
    }
}
