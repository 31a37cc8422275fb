use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::to_string_pretty;

use crate::header::Event;
use crate::scanner::ScanSummary;

pub const REPORT_FORMAT_VERSION: &str = "1.0.0";

#[derive(Serialize, Debug)]
pub struct Output {
    pub headers: Vec<Header>,
    pub files: Vec<FileReport>,
}

#[derive(Serialize, Debug)]
pub struct Header {
    pub start_timestamp: String,
    pub end_timestamp: String,
    /// Seconds.
    pub duration: f64,
    pub mode: Mode,
    pub roots: Vec<String>,
    pub summary: ScanSummary,
    pub errors: Vec<String>,
    pub output_format_version: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Validate,
    Modify,
    DryRun,
}

/// Everything reported for one file, in emission order.
#[derive(Serialize, Debug)]
pub struct FileReport {
    pub path: String,
    pub events: Vec<Event>,
}

impl Output {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        mode: Mode,
        roots: Vec<String>,
        summary: ScanSummary,
        events: Vec<Event>,
    ) -> Self {
        let duration = (end_time - start_time).num_nanoseconds().unwrap_or(0) as f64 / 1_000_000_000.0;

        let errors = events
            .iter()
            .filter(|event| matches!(event, Event::ReadFailed { .. } | Event::Unrecognized { halted: true, .. }))
            .map(ToString::to_string)
            .collect();

        Output {
            headers: vec![Header {
                start_timestamp: start_time.to_rfc3339(),
                end_timestamp: end_time.to_rfc3339(),
                duration,
                mode,
                roots,
                summary,
                errors,
                output_format_version: REPORT_FORMAT_VERSION.to_string(),
            }],
            files: group_by_file(events),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json_output = to_string_pretty(self).context("serialize report")?;
        fs::write(path, json_output).with_context(|| format!("write report {}", path.display()))
    }
}

/// Group events by path, keeping the order in which files were first seen.
fn group_by_file(events: Vec<Event>) -> Vec<FileReport> {
    let mut files: Vec<FileReport> = Vec::new();
    for event in events {
        let path = event.path().to_string_lossy().into_owned();
        match files.last_mut() {
            Some(last) if last.path == path => last.events.push(event),
            _ => files.push(FileReport {
                path,
                events: vec![event],
            }),
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ChangeKind, ViolationKind};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn events() -> Vec<Event> {
        vec![
            Event::Violation {
                path: PathBuf::from("a.c"),
                kind: ViolationKind::MissingHeader,
                detail: None,
            },
            Event::Violation {
                path: PathBuf::from("a.c"),
                kind: ViolationKind::MultipleCopyrightBlocks,
                detail: None,
            },
            Event::Change {
                path: PathBuf::from("b.c"),
                kind: ChangeKind::Unchanged,
                dry_run: false,
                detail: None,
            },
        ]
    }

    #[test]
    fn test_group_by_file() {
        let files = group_by_file(events());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "a.c");
        assert_eq!(files[0].events.len(), 2);
        assert_eq!(files[1].path, "b.c");
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        let start = Utc::now();
        let output = Output::new(
            start,
            start,
            Mode::Validate,
            vec!["src".to_string()],
            ScanSummary::default(),
            events(),
        );

        output.write(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["headers"][0]["mode"], "validate");
        assert_eq!(json["headers"][0]["duration"], 0.0);
        assert_eq!(json["files"][0]["events"][1]["kind"], "multiple_copyright_blocks");
    }
}
