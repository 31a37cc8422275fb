use crate::header::{Action, Event, EventSink, ParsedFile, SkipReason};
use crate::recognizer::Recognition;
use crate::scanner::{ScanOptions, ScanSummary, UnrecognizedPolicy};
use crate::utils::file::is_path_excluded;
use anyhow::{Context, Error};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Walk `path` depth-first, running `action` on every recognized file.
///
/// Entries are visited in name order. Excluded paths are pruned before
/// descending. The walk stops early when the action or the unrecognized
/// file policy asks it to; `ScanSummary::halted` is set in that case.
pub fn process<P: AsRef<Path>>(
    path: P,
    options: &ScanOptions,
    action: &dyn Action,
    sink: &mut dyn EventSink,
    progress_bar: &ProgressBar,
) -> Result<ScanSummary, Error> {
    let path = path.as_ref();
    let mut walker = Walker {
        options,
        action,
        tally: Tally {
            inner: sink,
            violations: 0,
            changes: 0,
        },
        progress_bar,
        summary: ScanSummary::default(),
    };

    if is_path_excluded(path, &options.exclude) {
        walker.summary.excluded += 1;
    } else {
        let metadata =
            fs::metadata(path).with_context(|| format!("cannot scan {}", path.display()))?;
        if metadata.is_file() {
            walker.process_file(path);
        } else {
            let entries =
                sorted_entries(path).with_context(|| format!("cannot read {}", path.display()))?;
            walker.process_entries(entries, options.max_depth);
        }
    }

    let mut summary = walker.summary;
    summary.violations = walker.tally.violations;
    summary.changes = walker.tally.changes;
    Ok(summary)
}

struct Walker<'a> {
    options: &'a ScanOptions,
    action: &'a dyn Action,
    tally: Tally<'a>,
    progress_bar: &'a ProgressBar,
    summary: ScanSummary,
}

impl Walker<'_> {
    /// Returns false once the walk has been halted.
    fn process_entries(&mut self, entries: Vec<PathBuf>, max_depth: usize) -> bool {
        let mut dirs = Vec::new();

        for path in entries {
            if is_path_excluded(&path, &self.options.exclude) {
                debug!("Excluded {}", path.display());
                self.summary.excluded += 1;
                continue;
            }
            match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => {
                    if !self.process_file(&path) {
                        return false;
                    }
                }
                Ok(metadata) if metadata.is_dir() => dirs.push(path),
                _ => continue,
            }
        }

        if max_depth == 0 {
            return true;
        }
        for dir in dirs {
            match sorted_entries(&dir) {
                Ok(entries) => {
                    if !self.process_entries(entries, max_depth - 1) {
                        return false;
                    }
                }
                Err(e) => warn!("Error processing directory {}: {}", dir.display(), e),
            }
        }
        true
    }

    fn process_file(&mut self, path: &Path) -> bool {
        self.summary.files_visited += 1;
        let keep_going = self.check_file(path);
        self.progress_bar.inc(1);
        if !keep_going {
            self.summary.halted = true;
        }
        keep_going
    }

    fn check_file(&mut self, path: &Path) -> bool {
        let options = self.options;
        let recognizer = &options.recognizer;

        // Ignored types are never opened.
        if recognizer.by_name(path).is_some_and(|kind| kind.dialect().is_none()) {
            self.skip(path, SkipReason::Ignored);
            return true;
        }

        let buffer = match fs::read(path) {
            Ok(buffer) => buffer,
            Err(e) => {
                self.summary.read_failures += 1;
                self.tally.emit(Event::ReadFailed {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
                return true;
            }
        };

        let dialect = match recognizer.recognize(path, &buffer) {
            Recognition::Dialect(dialect) => dialect,
            Recognition::Skip => {
                self.skip(path, SkipReason::Binary);
                return true;
            }
            Recognition::Unrecognized => {
                self.summary.unrecognized += 1;
                let halted = options.unrecognized == UnrecognizedPolicy::Halt;
                self.tally.emit(Event::Unrecognized {
                    path: path.to_path_buf(),
                    halted,
                });
                return !halted;
            }
        };

        let Ok(text) = String::from_utf8(buffer) else {
            self.skip(path, SkipReason::NotUtf8);
            return true;
        };

        self.summary.files_checked += 1;
        let mut file = ParsedFile::parse(path, &text, dialect);
        self.action.evaluate(&mut file, &mut self.tally)
    }

    fn skip(&mut self, path: &Path, reason: SkipReason) {
        self.summary.skipped += 1;
        self.tally.emit(Event::Skipped {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Forwards events while counting violations and modifications.
struct Tally<'a> {
    inner: &'a mut dyn EventSink,
    violations: usize,
    changes: usize,
}

impl EventSink for Tally<'_> {
    fn emit(&mut self, event: Event) {
        if event.is_violation() {
            self.violations += 1;
        }
        if event.is_modification() {
            self.changes += 1;
        }
        self.inner.emit(event);
    }
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}
