//! Mapping files to comment dialects.

use std::collections::HashMap;
use std::path::Path;

use content_inspector::{ContentType, inspect};

use crate::header::{Dialect, FileKind, SHELL};
use crate::utils::file::file_suffix;

/// What to do with one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognition {
    Dialect(&'static Dialect),
    /// Known binary or ignored type; never parsed.
    Skip,
    Unrecognized,
}

/// Suffix and filename tables plus the shebang fallback.
///
/// Lookups are exact and case-sensitive. File names are checked before
/// suffixes, configured entries before built-in ones.
#[derive(Debug, Clone, Default)]
pub struct Recognizer {
    suffixes: HashMap<String, FileKind>,
    filenames: HashMap<String, FileKind>,
}

impl Recognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>, kind: FileKind) -> Self {
        self.suffixes.insert(suffix.into(), kind);
        self
    }

    pub fn with_filename(mut self, name: impl Into<String>, kind: FileKind) -> Self {
        self.filenames.insert(name.into(), kind);
        self
    }

    /// Classify by name alone. `None` means the content has to be sniffed.
    pub fn by_name(&self, path: &Path) -> Option<FileKind> {
        let name = path.file_name().and_then(|name| name.to_str());
        if let Some(name) = name {
            if let Some(kind) = self.filenames.get(name).copied().or_else(|| builtin_filename(name)) {
                return Some(kind);
            }
        }
        let suffix = file_suffix(path)?;
        self.suffixes
            .get(&suffix)
            .copied()
            .or_else(|| builtin_suffix(&suffix))
    }

    /// Fallback for files the tables do not know: a `#!` first line makes a
    /// shell script. A UTF-8 byte order mark before it is allowed.
    pub fn sniff(&self, content: &[u8]) -> Option<&'static Dialect> {
        let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
        content.starts_with(b"#!").then_some(&SHELL)
    }

    /// Classify `path` with its full `content`.
    ///
    /// Binary content is skipped even when the name maps to a dialect.
    pub fn recognize(&self, path: &Path, content: &[u8]) -> Recognition {
        let dialect = match self.by_name(path) {
            Some(kind) => match kind.dialect() {
                Some(dialect) => dialect,
                None => return Recognition::Skip,
            },
            None => match self.sniff(content) {
                Some(dialect) => dialect,
                None => return Recognition::Unrecognized,
            },
        };
        if is_binary(content) {
            Recognition::Skip
        } else {
            Recognition::Dialect(dialect)
        }
    }
}

pub fn is_binary(content: &[u8]) -> bool {
    inspect(content) == ContentType::BINARY
}

fn builtin_suffix(suffix: &str) -> Option<FileKind> {
    let kind = match suffix {
        "c" | "h" | "java" | "sjava" | "idl" | "cc" | "cpp" | "hpp" | "cs" | "go" | "rs" | "js"
        | "ts" | "kt" | "scala" | "swift" | "css" => FileKind::C,
        "tdesc" | "policy" | "secure" => FileKind::JavaLine,
        "htm" | "html" | "xml" | "dtd" | "rng" | "xsd" | "sxd" | "vsd" => FileKind::Xml,
        "mc" | "mcd" | "scm" | "vthought" => FileKind::Scheme,
        "classlist" | "config" | "jmk" | "properties" | "prp" | "xjmk" | "set" | "data" | "txt"
        | "text" | "py" | "rb" | "pl" | "yml" | "yaml" | "toml" | "ksh" | "sh" | "bash" => {
            FileKind::Shell
        }
        "sxc" | "sxi" | "sxw" | "odp" | "gif" | "png" | "jar" | "zip" | "jpg" | "pom" | "pdf"
        | "doc" | "mif" | "fm" | "book" | "zargo" | "zuml" | "cvsignore" | "hgignore" | "list"
        | "old" | "orig" | "rej" | "swp" | "swo" | "class" | "o" | "javaref" | "idlref"
        | "DS_Store" | "jj" => FileKind::Ignore,
        _ => return None,
    };
    Some(kind)
}

fn builtin_filename(name: &str) -> Option<FileKind> {
    match name {
        "Makefile" | "Makefile.corba" | "Makefile.example" | "ExampleMakefile" => {
            Some(FileKind::Shell)
        }
        "NORENAME" | "errorfile" | "sed_pattern_file.version" => Some(FileKind::Ignore),
        _ => None,
    }
}
