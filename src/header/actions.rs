//! Validate and Modify, the two actions run against every parsed file.

use log::debug;

use super::events::{ChangeKind, Event, EventSink, ViolationKind};
use super::parsed_file::{ParsedFile, WriteOutcome};
use super::segment::{SegmentId, Tag};
use super::template::Template;

/// One finding of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub detail: Option<String>,
}

/// Per-file step of a scan.
pub trait Action {
    /// Check or fix one file, reporting into `sink`.
    ///
    /// Returns false to stop the scan.
    fn evaluate(&self, file: &mut ParsedFile, sink: &mut dyn EventSink) -> bool;
}

/// The start year a canonical header for `file` should carry.
///
/// The year of the top comment's notice wins, then the first other
/// copyright block with a parsable year, then `default_year`.
pub fn expected_start_year<'a>(file: &'a ParsedFile, default_year: &'a str) -> &'a str {
    let from_top = file
        .top_comment()
        .and_then(|top| top.copyright())
        .map(|record| record.start_year.as_str());
    from_top
        .or_else(|| {
            file.copyright_blocks()
                .find_map(|block| block.copyright())
                .map(|record| record.start_year.as_str())
        })
        .unwrap_or(default_year)
}

/// Every way `file` deviates from the canonical header.
pub fn validate(file: &ParsedFile, template: &Template, default_year: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    let expected = file.render_comment(&template.instantiate(expected_start_year(file, default_year)));

    match file.top_comment() {
        None => violations.push(Violation {
            kind: ViolationKind::MissingHeader,
            detail: None,
        }),
        Some(top) if top.text() != expected => violations.push(Violation {
            kind: ViolationKind::IncorrectText,
            detail: Some(format!("expected:\n{expected}\nfound:\n{}", top.text())),
        }),
        Some(_) => {}
    }

    let copyright_blocks = file.copyright_blocks().count();
    if copyright_blocks > 1 {
        violations.push(Violation {
            kind: ViolationKind::MultipleCopyrightBlocks,
            detail: Some(format!("{copyright_blocks} comments carry a copyright notice")),
        });
    }
    violations
}

/// Rewrite `file` in memory so it carries exactly the canonical header.
///
/// A top comment holding a different copyright notice is replaced in place.
/// Otherwise the canonical header is inserted as the new top comment, ahead
/// of any existing non-copyright comment. Every other copyright block is
/// removed. Returns what was done; empty when the file already conforms.
pub fn modify(file: &mut ParsedFile, template: &Template, default_year: &str) -> Vec<ChangeKind> {
    let text = template.instantiate(expected_start_year(file, default_year));
    let expected = file.render_comment(&text);
    let mut changes = Vec::new();

    let top = file
        .top_comment()
        .map(|top| (top.id(), top.has_tag(Tag::CopyrightBlock), top.text() == expected));
    let keep = match top {
        Some((id, _, true)) => id,
        Some((id, true, false)) => {
            file.replace_comment(id, &text);
            changes.push(ChangeKind::Replaced);
            id
        }
        _ => {
            let id = file.insert_comment_block(&text);
            changes.push(ChangeKind::Inserted);
            id
        }
    };

    let duplicates: Vec<SegmentId> = file
        .copyright_blocks()
        .map(|block| block.id())
        .filter(|id| *id != keep)
        .collect();
    for id in duplicates {
        if file.remove(id).is_some() {
            changes.push(ChangeKind::RemovedDuplicate);
        }
    }
    changes
}

fn report_year_warnings(file: &ParsedFile, sink: &mut dyn EventSink) {
    for line in file.unparsed_copyright_lines() {
        sink.emit(Event::YearParseWarning {
            path: file.path().to_path_buf(),
            line: line.clone(),
        });
    }
}

/// Reports violations; never touches the file.
pub struct ValidateAction {
    template: Template,
    default_year: String,
}

impl ValidateAction {
    pub fn new(template: Template, default_year: impl Into<String>) -> Self {
        Self {
            template,
            default_year: default_year.into(),
        }
    }
}

impl Action for ValidateAction {
    fn evaluate(&self, file: &mut ParsedFile, sink: &mut dyn EventSink) -> bool {
        report_year_warnings(file, sink);
        for violation in validate(file, &self.template, &self.default_year) {
            sink.emit(Event::Violation {
                path: file.path().to_path_buf(),
                kind: violation.kind,
                detail: violation.detail,
            });
        }
        true
    }
}

/// Fixes headers and writes the result back, unless in dry-run.
pub struct ModifyAction {
    template: Template,
    default_year: String,
    dry_run: bool,
}

impl ModifyAction {
    pub fn new(template: Template, default_year: impl Into<String>, dry_run: bool) -> Self {
        Self {
            template,
            default_year: default_year.into(),
            dry_run,
        }
    }
}

impl Action for ModifyAction {
    fn evaluate(&self, file: &mut ParsedFile, sink: &mut dyn EventSink) -> bool {
        report_year_warnings(file, sink);
        let path = file.path().to_path_buf();
        let changes = modify(file, &self.template, &self.default_year);

        if changes.is_empty() {
            sink.emit(Event::Change {
                path,
                kind: ChangeKind::Unchanged,
                dry_run: self.dry_run,
                detail: None,
            });
            return true;
        }

        let mut keep_going = true;
        let failure = if self.dry_run {
            debug!("Dry run, not writing {}", path.display());
            None
        } else {
            match file.write() {
                Ok(WriteOutcome::Written) => None,
                Ok(WriteOutcome::NotWritable) => Some("file is not writable".to_string()),
                Err(e) => {
                    keep_going = false;
                    Some(format!("{e:#}"))
                }
            }
        };

        match failure {
            Some(detail) => sink.emit(Event::Change {
                path,
                kind: ChangeKind::WriteFailed,
                dry_run: false,
                detail: Some(detail),
            }),
            None => {
                for kind in changes {
                    sink.emit(Event::Change {
                        path: path.clone(),
                        kind,
                        dry_run: self.dry_run,
                        detail: None,
                    });
                }
            }
        }
        keep_going
    }
}
