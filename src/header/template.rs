//! Canonical license template.
//!
//! The template is plain license text without comment syntax. It carries a
//! single `@StartYear@` placeholder that is replaced per file, either with
//! the run's default year or with the start year of the notice the file
//! already had.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::warn;

pub const START_YEAR_PLACEHOLDER: &str = "@StartYear@";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read license template {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid license template {}", path.display()))
    }

    /// Normalize line endings to `\n` and drop leading/trailing blank lines.
    pub fn parse(text: &str) -> Result<Self> {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = normalized.trim_matches('\n').to_string();
        if text.trim().is_empty() {
            bail!("template is empty");
        }
        match text.matches(START_YEAR_PLACEHOLDER).count() {
            0 => warn!("License template has no {START_YEAR_PLACEHOLDER} placeholder"),
            1 => {}
            n => bail!("template has {n} {START_YEAR_PLACEHOLDER} placeholders, expected one"),
        }
        Ok(Self { text })
    }

    /// The template text with the placeholder replaced by `start_year`.
    pub fn instantiate(&self, start_year: &str) -> String {
        self.text.replace(START_YEAR_PLACEHOLDER, start_year)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
