//! Copyright notice extraction from comment text.
//!
//! Scans a comment body line by line. The first line mentioning
//! "Copyright" or "(C)" marks the comment as a copyright block; the first
//! line that also has the `Copyright [(C)] <years> <licensor>` shape yields a
//! [`CopyrightRecord`].

use std::sync::LazyLock;

use regex::Regex;

use super::dialect::Dialect;
use super::segment::{CopyrightRecord, Segment, Tag};

/// Any mention of a copyright.
static COPYRIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcopyright\b|(?:^|\s)\(c\)(?:\s|$)").unwrap());

/// `Copyright[,] [(C)] <years>`; group 1 is the year expression.
static COPYRIGHT_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcopyright,?\s+(?:\(c\)\s+)?([0-9][-0-9, ]*)").unwrap());

/// A year or a list/range of years separated by `,` or `-`.
static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}(?:\s*[,-]\s*[0-9]{4})*$").unwrap());

static RESERVED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)all\s+rights\s+reserved\.?").unwrap());

/// Result of scanning one comment body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// The body mentions a copyright somewhere.
    pub is_copyright: bool,
    pub record: Option<CopyrightRecord>,
    /// The copyright line whose years could not be parsed.
    pub unparsed_line: Option<String>,
}

/// Scan a comment body for a copyright notice.
pub fn extract(body: &str) -> Extraction {
    let mut extraction = Extraction::default();
    for line in body.lines() {
        if !COPYRIGHT_RE.is_match(line) {
            continue;
        }
        extraction.is_copyright = true;

        let Some(caps) = COPYRIGHT_YEAR_RE.captures(line) else {
            continue;
        };
        let Some(years) = caps.get(1) else {
            continue;
        };
        match parse_years(years.as_str()) {
            Some((start_year, end_year)) => {
                extraction.record = Some(CopyrightRecord {
                    start_year,
                    end_year,
                    licensor: licensor(&line[years.end()..]),
                });
            }
            None => extraction.unparsed_line = Some(line.trim().to_string()),
        }
        break;
    }
    extraction
}

/// Parse `1997`, `1997-2007` or `1997, 2001, 2005` into start and end year.
fn parse_years(expression: &str) -> Option<(String, Option<String>)> {
    let expression = expression.trim_end_matches([',', ' ', '-']);
    if !YEARS_RE.is_match(expression) {
        return None;
    }
    let mut years = expression
        .split([',', '-'])
        .map(str::trim)
        .filter(|year| !year.is_empty());
    let start = years.next()?.to_string();
    let end = years.last().map(str::to_string);
    Some((start, end))
}

fn licensor(rest: &str) -> String {
    let rest = match RESERVED_RE.find(rest) {
        Some(found) => &rest[..found.start()],
        None => rest,
    };
    rest.trim_start_matches([',', ' ']).trim().to_string()
}

/// Tag `segment` as a copyright block and attach its record, if any.
///
/// Returns the offending line when a copyright line was found but its
/// years could not be parsed.
pub(crate) fn tag_segment(segment: &mut Segment, dialect: &Dialect) -> Option<String> {
    if !segment.is_comment() {
        return None;
    }
    let parts = dialect.split_comment(segment.text());
    let extraction = extract(&parts.body);
    if extraction.is_copyright {
        segment.add_tag(Tag::CopyrightBlock);
    }
    segment.set_copyright(extraction.record);
    extraction.unparsed_line
}
