//! Segment types for parsed files.
//!
//! A file is split into an ordered list of [`Segment`]s. Each segment is a
//! contiguous span of the original text classified as plain text or a
//! comment, carrying a set of [`Tag`]s assigned while parsing. Concatenating
//! every segment's text in order reproduces the original file exactly.

use std::collections::BTreeSet;

use serde::Serialize;
use strum::{AsRefStr, Display};

/// Stable identity of a segment within one [`ParsedFile`](super::ParsedFile).
///
/// Ids are never reused inside a file, so removing by id cannot hit a
/// segment that was inserted later at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Plain,
    Comment,
}

/// Labels attached to segments while classifying a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr)]
pub enum Tag {
    /// The comment sitting where the license header belongs.
    TopCommentBlock,
    /// A comment containing a copyright notice.
    CopyrightBlock,
    /// A leading `#!` line kept ahead of the header.
    Shebang,
    /// A leading `<?xml ... ?>` declaration kept ahead of the header.
    XmlDeclaration,
    /// A UTF-8 byte order mark with nothing else to carve out after it.
    ByteOrderMark,
}

impl Tag {
    /// Tags marking a leading plain segment that must stay first in the file.
    pub fn is_carve_out(self) -> bool {
        matches!(self, Tag::Shebang | Tag::XmlDeclaration | Tag::ByteOrderMark)
    }
}

/// Copyright information extracted from a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyrightRecord {
    /// First year of the notice, e.g. `1997` in `Copyright 1997-2007`.
    pub start_year: String,
    /// Last year of a range or list, when one is present.
    pub end_year: Option<String>,
    /// Text following the years, without any "All rights reserved." suffix.
    pub licensor: String,
}

#[derive(Debug, Clone)]
pub struct Segment {
    id: SegmentId,
    kind: SegmentKind,
    text: String,
    tags: BTreeSet<Tag>,
    copyright: Option<CopyrightRecord>,
}

impl Segment {
    pub(crate) fn new(id: SegmentId, kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
            tags: BTreeSet::new(),
            copyright: None,
        }
    }

    pub(crate) fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn is_comment(&self) -> bool {
        self.kind == SegmentKind::Comment
    }

    /// Exact original text, including line terminators.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn copyright(&self) -> Option<&CopyrightRecord> {
        self.copyright.as_ref()
    }

    pub(crate) fn add_tag(&mut self, tag: Tag) {
        self.tags.insert(tag);
    }

    pub(crate) fn remove_tag(&mut self, tag: Tag) {
        self.tags.remove(&tag);
    }

    pub(crate) fn set_copyright(&mut self, copyright: Option<CopyrightRecord>) {
        self.copyright = copyright;
    }

    /// Replace the text of a comment. Copyright tagging is reset and must be
    /// recomputed by the caller.
    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
        self.tags.remove(&Tag::CopyrightBlock);
        self.copyright = None;
    }

    /// True when the segment is a carve-out (byte order mark, shebang or XML
    /// declaration).
    pub fn is_carve_out(&self) -> bool {
        self.tags.iter().any(|tag| tag.is_carve_out())
    }
}
