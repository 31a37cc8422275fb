//! Splitting file text into segments.
//!
//! The tokenizer never looks at language syntax, only at comment markers.
//! Its one guarantee is that concatenating the produced segments gives back
//! the input byte for byte.

use log::debug;

use super::dialect::{Dialect, DialectKind, Placement};
use super::segment::{Segment, SegmentId, SegmentKind, Tag};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Hands out sequential segment ids while tokenizing.
struct SegmentList {
    segments: Vec<Segment>,
    next_id: u32,
}

impl SegmentList {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            next_id: 0,
        }
    }

    fn push(&mut self, kind: SegmentKind, text: &str) -> &mut Segment {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        self.segments.push(Segment::new(id, kind, text));
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }
}

/// Split `content` into segments according to `dialect`.
///
/// The result is never empty: an empty file yields one empty plain segment.
pub fn tokenize(content: &str, dialect: &Dialect) -> Vec<Segment> {
    let mut list = SegmentList::new();

    // A byte order mark stays first, ahead of any shebang or declaration.
    let bom = if content.starts_with(BYTE_ORDER_MARK) {
        BYTE_ORDER_MARK.len_utf8()
    } else {
        0
    };
    let body = &content[bom..];
    let carve_out = match dialect.placement {
        Placement::Immediate => None,
        Placement::AfterShebang => shebang_len(body).map(|len| (len, Tag::Shebang)),
        Placement::AfterXmlDeclaration => {
            xml_declaration_len(body).map(|len| (len, Tag::XmlDeclaration))
        }
    };
    let rest = match carve_out {
        Some((len, tag)) => {
            list.push(SegmentKind::Plain, &content[..bom + len]).add_tag(tag);
            &content[bom + len..]
        }
        None if bom > 0 => {
            list.push(SegmentKind::Plain, &content[..bom]).add_tag(Tag::ByteOrderMark);
            body
        }
        None => content,
    };

    match dialect.kind {
        DialectKind::Block { start, end, .. } => split_block(rest, start, end.trim_start(), &mut list),
        DialectKind::Line { prefix } => split_line(rest, prefix, &mut list),
    }

    if list.segments.is_empty() {
        list.push(SegmentKind::Plain, "");
    }
    list.segments
}

fn split_block(text: &str, start: &str, end: &str, list: &mut SegmentList) {
    let mut cursor = 0;
    while cursor < text.len() {
        let Some(offset) = text[cursor..].find(start) else {
            list.push(SegmentKind::Plain, &text[cursor..]);
            return;
        };
        let comment_start = cursor + offset;
        let search_from = comment_start + start.len();
        let Some(end_offset) = text[search_from..].find(end) else {
            debug!("Unclosed '{start}' comment at byte {comment_start}, treating the rest as text");
            list.push(SegmentKind::Plain, &text[cursor..]);
            return;
        };
        if comment_start > cursor {
            list.push(SegmentKind::Plain, &text[cursor..comment_start]);
        }
        let comment_end = search_from + end_offset + end.len();
        list.push(SegmentKind::Comment, &text[comment_start..comment_end]);
        cursor = comment_end;
    }
}

fn split_line(text: &str, prefix: &str, list: &mut SegmentList) {
    let mut run_start = 0;
    let mut run_is_comment = None;
    let mut offset = 0;
    for line in split_lines_inclusive(text) {
        let is_comment = line.starts_with(prefix);
        match run_is_comment {
            Some(current) if current != is_comment => {
                list.push(kind_of(current), &text[run_start..offset]);
                run_start = offset;
            }
            _ => {}
        }
        run_is_comment = Some(is_comment);
        offset += line.len();
    }
    if let Some(current) = run_is_comment {
        list.push(kind_of(current), &text[run_start..]);
    }
}

fn kind_of(is_comment: bool) -> SegmentKind {
    if is_comment {
        SegmentKind::Comment
    } else {
        SegmentKind::Plain
    }
}

/// Length of a leading `#!` line including its terminator.
fn shebang_len(content: &str) -> Option<usize> {
    if content.starts_with("#!") {
        split_lines_inclusive(content).first().map(|line| line.len())
    } else {
        None
    }
}

/// Length of a leading XML declaration, including the line terminator
/// directly after its closing `?>`.
///
/// The declaration ends at its first `>`; if that is not preceded by `?`
/// the declaration is malformed and nothing is carved out.
fn xml_declaration_len(content: &str) -> Option<usize> {
    let trimmed = content.trim_start_matches([' ', '\t']);
    if !trimmed.starts_with("<?xml") {
        return None;
    }
    let gt = content.find('>')?;
    if !content[..gt].ends_with('?') {
        return None;
    }
    let close = gt + 1;
    let rest = &content[close..];
    let terminator = if rest.starts_with("\r\n") {
        2
    } else if starts_with_line_break(rest) {
        1
    } else {
        0
    };
    Some(close + terminator)
}

/// Split text into lines, each keeping its own terminator (`\n`, `\r\n` or `\r`).
///
/// A final line without terminator is kept as is; empty input gives no lines.
pub fn split_lines_inclusive(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..=i]);
                start = i + 1;
            }
            b'\r' => {
                let end = if bytes.get(i + 1) == Some(&b'\n') { i + 1 } else { i };
                lines.push(&text[start..=end]);
                start = end + 1;
                i = end;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// The first line terminator used in `content`, or `\n` when it has none.
pub fn sniff_line_separator(content: &str) -> &'static str {
    match content.find(['\n', '\r']) {
        Some(pos) if content[pos..].starts_with("\r\n") => "\r\n",
        Some(pos) if content[pos..].starts_with('\r') => "\r",
        _ => "\n",
    }
}

/// True when `text` begins with a line terminator.
pub fn starts_with_line_break(text: &str) -> bool {
    text.starts_with('\n') || text.starts_with('\r')
}
