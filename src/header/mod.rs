//! License header engine.
//!
//! Turns file text into segments for a comment dialect, finds the top
//! comment and copyright notices, and checks or rewrites the header against
//! a canonical template:
//! 1. Tokenizing (plain and comment segments, BOM/shebang/XML carve-outs)
//! 2. Tagging (top comment, copyright blocks and their years)
//! 3. Acting (validate or modify)
//! 4. Writing back atomically

mod actions;
mod copyright;
mod dialect;
mod events;
mod parsed_file;
mod segment;
mod template;
mod tokenizer;


pub use actions::{
    Action, ModifyAction, ValidateAction, Violation, expected_start_year, modify, validate,
};
pub use copyright::{Extraction, extract};
pub use dialect::{
    C_BLOCK, CommentParts, Dialect, DialectKind, FileKind, JAVA_LINE, Placement, SCHEME, SHELL,
    XML,
};
pub use events::{
    ChangeKind, Event, EventSink, LogSink, RecordingSink, SkipReason, ViolationKind,
};
pub use parsed_file::{ParsedFile, WriteOutcome};
pub use segment::{CopyrightRecord, Segment, SegmentId, SegmentKind, Tag};
pub use template::{START_YEAR_PLACEHOLDER, Template};
pub use tokenizer::{sniff_line_separator, split_lines_inclusive, tokenize};
