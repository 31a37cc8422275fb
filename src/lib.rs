pub mod cli;
pub mod config;
pub mod header;
pub mod models;
pub mod recognizer;
pub mod scanner;
pub mod utils;

pub use config::Config;
pub use header::{
    Action, Event, EventSink, LogSink, ModifyAction, ParsedFile, RecordingSink, Template,
    ValidateAction,
};
pub use models::{Mode, Output};
pub use recognizer::{Recognition, Recognizer};
pub use scanner::{ScanOptions, ScanSummary, UnrecognizedPolicy, count, process};
