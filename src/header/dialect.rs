//! Comment dialects.
//!
//! A [`Dialect`] describes the comment syntax of a family of file types and
//! where a license header may be placed. Dialects are static values; the
//! recognizer maps files to them.

use serde::Deserialize;
use strum::Display;

use super::tokenizer::split_lines_inclusive;

/// Where a new top comment goes relative to the start of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// At the very beginning of the file.
    Immediate,
    /// After a leading `#!` line, if any.
    AfterShebang,
    /// After a leading `<?xml ... ?>` declaration, if any.
    AfterXmlDeclaration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    /// Delimited comments such as `/* ... */` or `<!-- ... -->`.
    ///
    /// `line_prefix` is written in front of every rendered body line and
    /// stripped from body lines when reading a comment back.
    Block {
        start: &'static str,
        line_prefix: &'static str,
        end: &'static str,
    },
    /// Comments made of consecutive lines starting with `prefix`.
    Line { prefix: &'static str },
}

#[derive(Debug, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    pub kind: DialectKind,
    pub placement: Placement,
    /// Whether a blank line separates a carve-out from the header.
    pub blank_line_after_carve_out: bool,
}

pub static C_BLOCK: Dialect = Dialect {
    name: "c",
    kind: DialectKind::Block {
        start: "/*",
        line_prefix: " * ",
        end: " */",
    },
    placement: Placement::Immediate,
    blank_line_after_carve_out: false,
};

pub static XML: Dialect = Dialect {
    name: "xml",
    kind: DialectKind::Block {
        start: "<!--",
        line_prefix: "  ",
        end: "-->",
    },
    placement: Placement::AfterXmlDeclaration,
    blank_line_after_carve_out: true,
};

pub static SHELL: Dialect = Dialect {
    name: "shell",
    kind: DialectKind::Line { prefix: "#" },
    placement: Placement::AfterShebang,
    blank_line_after_carve_out: false,
};

pub static SCHEME: Dialect = Dialect {
    name: "scheme",
    kind: DialectKind::Line { prefix: ";" },
    placement: Placement::AfterShebang,
    blank_line_after_carve_out: false,
};

pub static JAVA_LINE: Dialect = Dialect {
    name: "java-line",
    kind: DialectKind::Line { prefix: "//" },
    placement: Placement::AfterShebang,
    blank_line_after_carve_out: false,
};

/// Names accepted for file kinds in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FileKind {
    C,
    Xml,
    Shell,
    Scheme,
    JavaLine,
    /// Recognized but never parsed (binary or deliberately ignored files).
    Ignore,
}

impl FileKind {
    /// The dialect for this kind, or `None` for [`FileKind::Ignore`].
    pub fn dialect(self) -> Option<&'static Dialect> {
        match self {
            FileKind::C => Some(&C_BLOCK),
            FileKind::Xml => Some(&XML),
            FileKind::Shell => Some(&SHELL),
            FileKind::Scheme => Some(&SCHEME),
            FileKind::JavaLine => Some(&JAVA_LINE),
            FileKind::Ignore => None,
        }
    }
}

/// A comment split into its syntax and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentParts<'a> {
    /// Opening marker for block comments, or the prefix of line comments.
    pub start_marker: &'a str,
    /// Comment text without markers or per-line prefixes.
    pub body: String,
    /// Closing marker for block comments.
    pub end_marker: Option<&'a str>,
}

impl Dialect {
    /// Render `text` as a comment in this dialect.
    ///
    /// Lines are separated with `separator`. Block comments end at their
    /// closing marker; line comments end with a separator after every line.
    /// Trailing whitespace is trimmed from each rendered line.
    pub fn render(&self, text: &str, separator: &str) -> String {
        let mut out = String::new();
        match self.kind {
            DialectKind::Block {
                start,
                line_prefix,
                end,
            } => {
                out.push_str(start);
                out.push_str(separator);
                for line in text.lines() {
                    out.push_str(format!("{line_prefix}{line}").trim_end());
                    out.push_str(separator);
                }
                out.push_str(end);
            }
            DialectKind::Line { prefix } => {
                for line in text.lines() {
                    out.push_str(format!("{prefix} {line}").trim_end());
                    out.push_str(separator);
                }
            }
        }
        out
    }

    /// The marker that opens a comment in this dialect.
    pub fn opening_marker(&self) -> &'static str {
        match self.kind {
            DialectKind::Block { start, .. } => start,
            DialectKind::Line { prefix } => prefix,
        }
    }

    /// Split a comment's raw text into markers and body.
    ///
    /// The body keeps one line per source line, each ending with `\n`
    /// when the source line had a terminator.
    pub fn split_comment<'a>(&self, text: &'a str) -> CommentParts<'a> {
        match self.kind {
            DialectKind::Block {
                start,
                line_prefix,
                end,
            } => {
                let end_marker = end.trim_start();
                let start_marker = if text.starts_with(start) {
                    &text[..start.len()]
                } else {
                    ""
                };
                let inner = &text[start_marker.len()..];
                let (inner, closing) = match inner.strip_suffix(end_marker) {
                    Some(stripped) => (stripped, Some(&text[text.len() - end_marker.len()..])),
                    None => (inner, None),
                };
                let prefix = line_prefix.trim();
                let body = split_lines_inclusive(inner)
                    .into_iter()
                    .map(|line| strip_line_prefix(line.trim_start_matches([' ', '\t']), prefix))
                    .map(normalize_terminator)
                    .collect();
                CommentParts {
                    start_marker,
                    body,
                    end_marker: closing,
                }
            }
            DialectKind::Line { prefix } => {
                let body = split_lines_inclusive(text)
                    .into_iter()
                    .map(|line| strip_line_prefix(line, prefix))
                    .map(normalize_terminator)
                    .collect();
                CommentParts {
                    start_marker: prefix,
                    body,
                    end_marker: None,
                }
            }
        }
    }
}

/// Strip `prefix` and one following space from the start of `line`.
fn strip_line_prefix<'a>(line: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return line;
    }
    match line.strip_prefix(prefix) {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

fn normalize_terminator(line: &str) -> String {
    let content = line.trim_end_matches(['\r', '\n']);
    if content.len() == line.len() {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_block_comment() {
        let rendered = C_BLOCK.render("Copyright 1999 Bar\n\nLicensed.", "\n");
        assert_eq!(rendered, "/*\n * Copyright 1999 Bar\n *\n * Licensed.\n */");
    }

    #[test]
    fn test_render_block_comment_with_crlf() {
        let rendered = C_BLOCK.render("Copyright 1999 Bar", "\r\n");
        assert_eq!(rendered, "/*\r\n * Copyright 1999 Bar\r\n */");
    }

    #[test]
    fn test_render_line_comment() {
        let rendered = SHELL.render("Copyright 2020 Bar\n\nSecond", "\n");
        assert_eq!(rendered, "# Copyright 2020 Bar\n#\n# Second\n");
    }

    #[test]
    fn test_render_xml_comment() {
        let rendered = XML.render("Copyright 2020 Bar", "\n");
        assert_eq!(rendered, "<!--\n  Copyright 2020 Bar\n-->");
    }

    #[test]
    fn test_split_block_comment() {
        let parts = C_BLOCK.split_comment("/*\n * Copyright 1999 Bar\n *\n */");
        assert_eq!(parts.start_marker, "/*");
        assert_eq!(parts.end_marker, Some("*/"));
        assert_eq!(parts.body, "\nCopyright 1999 Bar\n\n");
    }

    #[test]
    fn test_split_single_line_block_comment() {
        let parts = C_BLOCK.split_comment("/* Copyright 1999 Foo */");
        assert_eq!(parts.body, "Copyright 1999 Foo ");
    }

    #[test]
    fn test_split_line_comment() {
        let parts = SHELL.split_comment("# Copyright 2001 Foo\r\n#\tindented\n");
        assert_eq!(parts.start_marker, "#");
        assert_eq!(parts.end_marker, None);
        assert_eq!(parts.body, "Copyright 2001 Foo\n\tindented\n");
    }

    #[test]
    fn test_file_kind_names() {
        assert_eq!(FileKind::JavaLine.to_string(), "java-line");
        assert_eq!(FileKind::Xml.to_string(), "xml");
        assert!(FileKind::Ignore.dialect().is_none());
        assert_eq!(FileKind::Scheme.dialect().map(|d| d.name), Some("scheme"));
    }
}
