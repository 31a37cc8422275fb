mod output;

pub use output::{FileReport, Header, Mode, Output, REPORT_FORMAT_VERSION};
