//! Findings and actions reported while scanning.
//!
//! Actions never log directly. They push [`Event`]s into an [`EventSink`]
//! handed to them, so the caller decides whether events become log lines,
//! report entries or test assertions.

use std::fmt;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{Level, log};
use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    #[strum(to_string = "no license header")]
    MissingHeader,
    #[strum(to_string = "incorrect copyright text")]
    IncorrectText,
    #[strum(to_string = "multiple copyright blocks")]
    MultipleCopyrightBlocks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum ChangeKind {
    Inserted,
    Replaced,
    RemovedDuplicate,
    Unchanged,
    WriteFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[strum(to_string = "ignored file type")]
    Ignored,
    #[strum(to_string = "binary content")]
    Binary,
    #[strum(to_string = "not valid UTF-8")]
    NotUtf8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Violation {
        path: PathBuf,
        kind: ViolationKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Change {
        path: PathBuf,
        kind: ChangeKind,
        /// The change was computed but not written.
        dry_run: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// A copyright line whose years could not be parsed.
    YearParseWarning { path: PathBuf, line: String },
    Skipped { path: PathBuf, reason: SkipReason },
    /// No dialect could be determined. `halted` is set when this stopped the walk.
    Unrecognized { path: PathBuf, halted: bool },
    ReadFailed { path: PathBuf, error: String },
}

impl Event {
    pub fn path(&self) -> &Path {
        match self {
            Event::Violation { path, .. }
            | Event::Change { path, .. }
            | Event::YearParseWarning { path, .. }
            | Event::Skipped { path, .. }
            | Event::Unrecognized { path, .. }
            | Event::ReadFailed { path, .. } => path,
        }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Event::Violation { .. })
    }

    /// True for changes that altered (or in dry-run would alter) the file.
    pub fn is_modification(&self) -> bool {
        matches!(
            self,
            Event::Change {
                kind: ChangeKind::Inserted | ChangeKind::Replaced | ChangeKind::RemovedDuplicate,
                ..
            }
        )
    }

    /// Log level used when this event becomes a log line.
    pub fn level(&self) -> Level {
        match self {
            Event::Violation { .. } | Event::YearParseWarning { .. } => Level::Warn,
            Event::Change { kind: ChangeKind::WriteFailed, .. } => Level::Error,
            Event::Change { kind: ChangeKind::Unchanged, .. } => Level::Debug,
            Event::Change { .. } => Level::Info,
            Event::Skipped { reason: SkipReason::Ignored, .. } => Level::Debug,
            Event::Skipped { .. } => Level::Warn,
            Event::Unrecognized { halted: true, .. } | Event::ReadFailed { .. } => Level::Error,
            Event::Unrecognized { .. } => Level::Warn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path().display();
        match self {
            Event::Violation { kind, detail, .. } => {
                write!(f, "{path}: {kind}")?;
                if let Some(detail) = detail {
                    write!(f, "\n{detail}")?;
                }
                Ok(())
            }
            Event::Change {
                kind,
                dry_run,
                detail,
                ..
            } => {
                write!(f, "{path}: {kind}")?;
                if *dry_run {
                    write!(f, " (dry run)")?;
                }
                if let Some(detail) = detail {
                    write!(f, ": {detail}")?;
                }
                Ok(())
            }
            Event::YearParseWarning { line, .. } => {
                write!(f, "{path}: cannot parse copyright years in {line:?}")
            }
            Event::Skipped { reason, .. } => write!(f, "{path}: skipped, {reason}"),
            Event::Unrecognized { halted: true, .. } => {
                write!(f, "{path}: unrecognized file type, stopping")
            }
            Event::Unrecognized { .. } => write!(f, "{path}: unrecognized file type, skipped"),
            Event::ReadFailed { error, .. } => write!(f, "{path}: cannot read: {error}"),
        }
    }
}

pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: Event) {
        (**self).emit(event);
    }
}

/// Sends every event to both sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: Event) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}

/// Renders events as log lines, above the progress bar when there is one.
#[derive(Default)]
pub struct LogSink {
    progress: Option<ProgressBar>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(progress: ProgressBar) -> Self {
        Self {
            progress: Some(progress),
        }
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: Event) {
        let level = event.level();
        match &self.progress {
            Some(progress) => progress.suspend(|| log!(level, "{event}")),
            None => log!(level, "{event}"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn violations(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|event| event.is_violation())
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
