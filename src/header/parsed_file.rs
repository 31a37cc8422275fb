//! A file split into segments, with the operations actions need.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;

use super::copyright;
use super::dialect::{Dialect, DialectKind};
use super::segment::{Segment, SegmentId, SegmentKind, Tag};
use super::tokenizer::{sniff_line_separator, starts_with_line_break, tokenize};
use crate::utils::file::{atomic_write, is_writable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The target exists but is read-only; nothing was written.
    NotWritable,
}

#[derive(Debug, Clone)]
pub struct ParsedFile {
    path: PathBuf,
    dialect: &'static Dialect,
    line_separator: &'static str,
    segments: Vec<Segment>,
    next_id: u32,
    unparsed_copyright_lines: Vec<String>,
}

impl ParsedFile {
    /// Tokenize `content`, tag the top comment and tag copyright blocks.
    pub fn parse(path: impl Into<PathBuf>, content: &str, dialect: &'static Dialect) -> Self {
        let mut segments = tokenize(content, dialect);
        let next_id = segments.iter().map(|s| s.id().0 + 1).max().unwrap_or(0);

        if let Some(index) = locate_top_comment(&segments) {
            segments[index].add_tag(Tag::TopCommentBlock);
        }

        let mut unparsed_copyright_lines = Vec::new();
        for segment in &mut segments {
            if let Some(line) = copyright::tag_segment(segment, dialect) {
                unparsed_copyright_lines.push(line);
            }
        }

        let file = Self {
            path: path.into(),
            dialect,
            line_separator: sniff_line_separator(content),
            segments,
            next_id,
            unparsed_copyright_lines,
        };
        debug!(
            "Parsed {} as {} into {} segments",
            file.path.display(),
            dialect.name,
            file.segments.len()
        );
        file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> &'static Dialect {
        self.dialect
    }

    pub fn line_separator(&self) -> &'static str {
        self.line_separator
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id() == id)
    }

    /// Copyright lines whose years could not be parsed.
    pub fn unparsed_copyright_lines(&self) -> &[String] {
        &self.unparsed_copyright_lines
    }

    pub fn top_comment(&self) -> Option<&Segment> {
        self.segments.iter().find(|s| s.has_tag(Tag::TopCommentBlock))
    }

    pub fn comments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_comment())
    }

    pub fn copyright_blocks(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.has_tag(Tag::CopyrightBlock))
    }

    /// `text` rendered as a comment in this file's dialect and line separator.
    pub fn render_comment(&self, text: &str) -> String {
        self.dialect.render(text, self.line_separator)
    }

    /// Insert `text` as the new top comment.
    ///
    /// The block goes first in the file, or right after a shebang or XML
    /// declaration. Line breaks are added around it as needed so that it
    /// parses back as a separate top comment.
    pub fn insert_comment_block(&mut self, text: &str) -> SegmentId {
        let rendered = self.render_comment(text);
        for segment in &mut self.segments {
            segment.remove_tag(Tag::TopCommentBlock);
        }

        let position = self.separate_from_carve_out();
        let id = self.allocate_id();
        let mut segment = Segment::new(id, SegmentKind::Comment, rendered).with_tag(Tag::TopCommentBlock);
        copyright::tag_segment(&mut segment, self.dialect);
        self.segments.insert(position, segment);

        let next = position + 1;
        let needs_break = match self.dialect.kind {
            DialectKind::Block { .. } => !self
                .segments
                .get(next)
                .is_some_and(|s| starts_with_line_break(s.text())),
            DialectKind::Line { .. } => self.segments.get(next).is_some_and(Segment::is_comment),
        };
        if needs_break {
            self.insert_plain(next, self.line_separator);
        }
        id
    }

    /// Replace the text of comment `id` with `text` rendered in this dialect.
    ///
    /// Returns false if `id` is not a comment of this file.
    pub fn replace_comment(&mut self, id: SegmentId, text: &str) -> bool {
        let rendered = self.render_comment(text);
        let Some(index) = self.segments.iter().position(|s| s.id() == id && s.is_comment()) else {
            return false;
        };
        let segment = &mut self.segments[index];
        segment.set_text(rendered);
        copyright::tag_segment(segment, self.dialect);
        if index == 1 {
            self.separate_from_carve_out();
        }
        true
    }

    /// Remove segment `id`; does nothing if it is not present.
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        let index = self.segments.iter().position(|s| s.id() == id)?;
        let removed = self.segments.remove(index);
        if self.segments.is_empty() {
            self.insert_plain(0, "");
        }
        Some(removed)
    }

    /// The file text: every segment concatenated in order.
    pub fn contents(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }

    /// Write back to the file this was parsed from.
    pub fn write(&self) -> Result<WriteOutcome> {
        self.write_to(&self.path)
    }

    /// Atomically replace `target` with this file's contents.
    pub fn write_to(&self, target: &Path) -> Result<WriteOutcome> {
        if target.exists() && !is_writable(target) {
            return Ok(WriteOutcome::NotWritable);
        }
        atomic_write(target, &self.contents())?;
        Ok(WriteOutcome::Written)
    }

    /// Put the line breaks a header needs between a leading carve-out and
    /// whatever follows it, and return the index just past them.
    ///
    /// A shebang or declaration must end its line. An XML declaration is
    /// also followed by a blank line. A lone byte order mark needs nothing.
    fn separate_from_carve_out(&mut self) -> usize {
        let Some(carve) = self.segments.first().filter(|s| s.is_carve_out()) else {
            return 0;
        };
        if carve.has_tag(Tag::ByteOrderMark) {
            return 1;
        }
        let needs_break = !ends_with_line_break(carve.text());
        let needs_blank_line =
            carve.has_tag(Tag::XmlDeclaration) && self.dialect.blank_line_after_carve_out;

        let mut position = 1;
        if needs_break {
            self.insert_plain(position, self.line_separator);
            position += 1;
        }
        if needs_blank_line {
            let has_blank_line = self
                .segments
                .get(position)
                .is_some_and(|next| !next.is_comment() && is_blank(next.text()));
            if !has_blank_line {
                self.insert_plain(position, self.line_separator);
            }
            position += 1;
        }
        position
    }

    fn allocate_id(&mut self) -> SegmentId {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_plain(&mut self, position: usize, text: &str) {
        let id = self.allocate_id();
        self.segments.insert(position, Segment::new(id, SegmentKind::Plain, text));
    }
}

/// Index of the comment sitting where a license header belongs.
///
/// That is the first segment, or the one after a byte order mark, shebang
/// or XML declaration. Blank lines between an XML declaration and the
/// comment are allowed.
fn locate_top_comment(segments: &[Segment]) -> Option<usize> {
    let mut index = 0;
    if let Some(carve) = segments.first().filter(|s| s.is_carve_out()) {
        index = 1;
        if carve.has_tag(Tag::XmlDeclaration) {
            while segments
                .get(index)
                .is_some_and(|s| !s.is_comment() && is_blank(s.text()))
            {
                index += 1;
            }
        }
    }
    segments.get(index).filter(|s| s.is_comment()).map(|_| index)
}

fn is_blank(text: &str) -> bool {
    !text.is_empty() && text.trim().is_empty()
}

fn ends_with_line_break(text: &str) -> bool {
    text.ends_with('\n') || text.ends_with('\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::dialect::{C_BLOCK, SHELL, XML};
    use std::fs;
    use tempfile::tempdir;

    fn parse(content: &str, dialect: &'static Dialect) -> ParsedFile {
        ParsedFile::parse("test", content, dialect)
    }

    #[test]
    fn test_top_comment_block_dialect() {
        let file = parse("/* Copyright 1999 Foo */\nclass X{}\n", &C_BLOCK);
        let top = file.top_comment().unwrap();
        assert_eq!(top.text(), "/* Copyright 1999 Foo */");
        assert!(top.has_tag(Tag::CopyrightBlock));
        assert_eq!(top.copyright().map(|c| c.start_year.as_str()), Some("1999"));
    }

    #[test]
    fn test_no_top_comment_when_code_comes_first() {
        let file = parse("class X{}\n/* Copyright 1999 Foo */\n", &C_BLOCK);
        assert!(file.top_comment().is_none());
        assert_eq!(file.copyright_blocks().count(), 1);
    }

    #[test]
    fn test_top_comment_after_shebang() {
        let file = parse("#!/bin/sh\n# Copyright 2001 Foo\necho hi\n", &SHELL);
        assert_eq!(file.top_comment().map(Segment::text), Some("# Copyright 2001 Foo\n"));
    }

    #[test]
    fn test_blank_line_after_shebang_means_no_top_comment() {
        let file = parse("#!/bin/sh\n\n# Copyright 2001 Foo\n", &SHELL);
        assert!(file.top_comment().is_none());
    }

    #[test]
    fn test_top_comment_after_xml_declaration_and_blank_lines() {
        let file = parse("<?xml version=\"1.0\"?>\n\n\n<!-- Copyright 2001 Foo -->\n<a/>\n", &XML);
        assert_eq!(file.top_comment().map(Segment::text), Some("<!-- Copyright 2001 Foo -->"));
    }

    #[test]
    fn test_xml_declaration_followed_by_content_has_no_top_comment() {
        let file = parse("<?xml version=\"1.0\"?>\n<a/>\n<!-- c -->\n", &XML);
        assert!(file.top_comment().is_none());
    }

    #[test]
    fn test_insert_into_empty_file() {
        let mut file = parse("", &C_BLOCK);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(file.contents(), "/*\n * Copyright 2020 Bar\n */\n");
        assert_eq!(file.top_comment().map(Segment::id), file.comments().next().map(Segment::id));
    }

    #[test]
    fn test_insert_before_code_adds_line_break() {
        let mut file = parse("public class X{}\r\n", &C_BLOCK);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(file.contents(), "/*\r\n * Copyright 2020 Bar\r\n */\r\npublic class X{}\r\n");
    }

    #[test]
    fn test_insert_after_shebang() {
        let mut file = parse("#!/bin/sh\necho hi\n", &SHELL);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(file.contents(), "#!/bin/sh\n# Copyright 2020 Bar\necho hi\n");
    }

    #[test]
    fn test_insert_after_shebang_without_newline() {
        let mut file = parse("#!/bin/sh", &SHELL);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(file.contents(), "#!/bin/sh\n# Copyright 2020 Bar\n");
    }

    #[test]
    fn test_insert_keeps_line_comments_apart() {
        let mut file = parse("# run the thing\nls\n", &SHELL);
        let id = file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(file.contents(), "# Copyright 2020 Bar\n\n# run the thing\nls\n");
        assert_eq!(file.top_comment().map(Segment::id), Some(id));
        assert_eq!(file.segments().iter().filter(|s| s.has_tag(Tag::TopCommentBlock)).count(), 1);
    }

    #[test]
    fn test_insert_after_xml_declaration_adds_blank_line() {
        let mut file = parse("<?xml version=\"1.0\"?>\n<root/>\n", &XML);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(
            file.contents(),
            "<?xml version=\"1.0\"?>\n\n<!--\n  Copyright 2020 Bar\n-->\n<root/>\n"
        );
    }

    #[test]
    fn test_insert_after_xml_declaration_reuses_blank_line() {
        let mut file = parse("<?xml version=\"1.0\"?>\n\n<!-- notes -->\n<root/>\n", &XML);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(
            file.contents(),
            "<?xml version=\"1.0\"?>\n\n<!--\n  Copyright 2020 Bar\n-->\n<!-- notes -->\n<root/>\n"
        );
    }

    #[test]
    fn test_replace_comment_retags() {
        let mut file = parse("/* Copyright 1999 Foo */\nclass X{}\n", &C_BLOCK);
        let id = file.top_comment().unwrap().id();
        assert!(file.replace_comment(id, "Copyright 1999 Bar"));
        let top = file.top_comment().unwrap();
        assert_eq!(top.copyright().map(|c| c.licensor.as_str()), Some("Bar"));
        assert_eq!(file.contents(), "/*\n * Copyright 1999 Bar\n */\nclass X{}\n");
    }

    #[test]
    fn test_replace_after_xml_declaration_adds_blank_line() {
        let mut file = parse("<?xml version=\"1.0\"?>\n<!-- Copyright 2001 Foo -->\n<a/>\n", &XML);
        let id = file.top_comment().unwrap().id();
        assert!(file.replace_comment(id, "Copyright 2001 Bar"));
        assert_eq!(
            file.contents(),
            "<?xml version=\"1.0\"?>\n\n<!--\n  Copyright 2001 Bar\n-->\n<a/>\n"
        );
        assert_eq!(file.top_comment().map(Segment::id), Some(id));
    }

    #[test]
    fn test_replace_after_xml_declaration_on_same_line() {
        let mut file = parse("<?xml version=\"1.0\"?><!-- Copyright 2001 Foo -->\n<a/>\n", &XML);
        let id = file.top_comment().unwrap().id();
        assert!(file.replace_comment(id, "Copyright 2001 Bar"));
        assert_eq!(
            file.contents(),
            "<?xml version=\"1.0\"?>\n\n<!--\n  Copyright 2001 Bar\n-->\n<a/>\n"
        );
    }

    #[test]
    fn test_top_comment_after_byte_order_mark() {
        let file = parse("\u{FEFF}/* Copyright 1999 Foo */\nclass X{}\n", &C_BLOCK);
        assert_eq!(file.top_comment().map(Segment::text), Some("/* Copyright 1999 Foo */"));
    }

    #[test]
    fn test_insert_after_byte_order_mark() {
        let mut file = parse("\u{FEFF}class X{}\n", &C_BLOCK);
        let id = file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(file.contents(), "\u{FEFF}/*\n * Copyright 2020 Bar\n */\nclass X{}\n");

        let reparsed = parse(&file.contents(), &C_BLOCK);
        assert_eq!(reparsed.top_comment().map(Segment::text), file.segment(id).map(Segment::text));
    }

    #[test]
    fn test_insert_after_byte_order_mark_and_xml_declaration() {
        let mut file = parse("\u{FEFF}<?xml version=\"1.0\"?>\n<a/>\n", &XML);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(
            file.contents(),
            "\u{FEFF}<?xml version=\"1.0\"?>\n\n<!--\n  Copyright 2020 Bar\n-->\n<a/>\n"
        );
    }

    #[test]
    fn test_insert_xml_without_declaration_after_byte_order_mark() {
        let mut file = parse("\u{FEFF}<a/>\n", &XML);
        file.insert_comment_block("Copyright 2020 Bar");
        assert_eq!(file.contents(), "\u{FEFF}<!--\n  Copyright 2020 Bar\n-->\n<a/>\n");
    }

    #[test]
    fn test_replace_plain_segment_is_refused() {
        let mut file = parse("class X{}\n", &C_BLOCK);
        let id = file.segments()[0].id();
        assert!(!file.replace_comment(id, "text"));
        assert_eq!(file.contents(), "class X{}\n");
    }

    #[test]
    fn test_remove_by_id() {
        let mut file = parse("/* a */\n/* Copyright 2001 X */\n", &C_BLOCK);
        let second = file.comments().nth(1).unwrap().id();
        assert!(file.remove(second).is_some());
        assert_eq!(file.contents(), "/* a */\n\n");
        assert!(file.remove(second).is_none());
    }

    #[test]
    fn test_remove_last_segment_keeps_sequence_non_empty() {
        let mut file = parse("/* only */", &C_BLOCK);
        let id = file.segments()[0].id();
        file.remove(id);
        assert_eq!(file.segments().len(), 1);
        assert_eq!(file.contents(), "");
    }

    #[test]
    fn test_write_to_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("X.java");
        fs::write(&path, "class X{}\n").unwrap();

        let mut file = ParsedFile::parse(&path, "class X{}\n", &C_BLOCK);
        file.insert_comment_block("Copyright 2020 Bar");

        assert_eq!(file.write().unwrap(), WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "/*\n * Copyright 2020 Bar\n */\nclass X{}\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_refuses_read_only_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("X.java");
        fs::write(&path, "class X{}\n").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let file = ParsedFile::parse(&path, "class X{}\n", &C_BLOCK);
        assert_eq!(file.write().unwrap(), WriteOutcome::NotWritable);
    }
}
