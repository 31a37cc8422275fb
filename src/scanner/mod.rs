mod count;
mod process;

use glob::Pattern;
use serde::Serialize;

use crate::recognizer::Recognizer;

pub use self::count::{TreeCount, count};
pub use self::process::process;

/// What to do with a file no table or sniff recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnrecognizedPolicy {
    /// Stop the whole scan so the file type gets classified.
    Halt,
    /// Warn and move on.
    Skip,
}

pub struct ScanOptions {
    /// Maximum recursion depth (0 means only the roots' direct entries).
    pub max_depth: usize,
    pub exclude: Vec<Pattern>,
    pub recognizer: Recognizer,
    pub unrecognized: UnrecognizedPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 50,
            exclude: Vec::new(),
            recognizer: Recognizer::default(),
            unrecognized: UnrecognizedPolicy::Halt,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub files_visited: usize,
    /// Files parsed and handed to the action.
    pub files_checked: usize,
    pub skipped: usize,
    pub unrecognized: usize,
    pub excluded: usize,
    pub read_failures: usize,
    pub violations: usize,
    pub changes: usize,
    /// The walk stopped before visiting every file.
    pub halted: bool,
}

impl ScanSummary {
    /// Fold the summary of another root into this one.
    pub fn absorb(&mut self, other: ScanSummary) {
        self.files_visited += other.files_visited;
        self.files_checked += other.files_checked;
        self.skipped += other.skipped;
        self.unrecognized += other.unrecognized;
        self.excluded += other.excluded;
        self.read_failures += other.read_failures;
        self.violations += other.violations;
        self.changes += other.changes;
        self.halted |= other.halted;
    }
}
