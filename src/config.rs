//! Optional TOML configuration file.
//!
//! ```toml
//! start_year = "2005"
//! exclude = [".git", "target"]
//!
//! [suffixes]
//! rs = "c"
//!
//! [filenames]
//! Jenkinsfile = "c"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;

use crate::header::FileKind;
use crate::recognizer::Recognizer;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub start_year: Option<String>,
    pub exclude: Vec<String>,
    /// Extra or overriding suffix entries, e.g. `rs = "c"`.
    pub suffixes: BTreeMap<String, FileKind>,
    /// Extra or overriding file name entries.
    pub filenames: BTreeMap<String, FileKind>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        if let Some(year) = &config.start_year {
            check_year(year)?;
        }
        Ok(config)
    }

    /// A recognizer with this file's entries layered over the built-in tables.
    pub fn recognizer(&self) -> Recognizer {
        let with_suffixes = self
            .suffixes
            .iter()
            .fold(Recognizer::new(), |recognizer, (suffix, kind)| {
                recognizer.with_suffix(suffix.as_str(), *kind)
            });
        self.filenames
            .iter()
            .fold(with_suffixes, |recognizer, (name, kind)| {
                recognizer.with_filename(name.as_str(), *kind)
            })
    }
}

/// Start years are written into headers verbatim, so only plain four-digit
/// years are accepted.
pub fn check_year(year: &str) -> Result<()> {
    if !YEAR_RE.is_match(year) {
        bail!("start year must be four digits, got {year:?}");
    }
    Ok(())
}
