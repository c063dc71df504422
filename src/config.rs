//! The subset of `.git/config` the core reads: `core.repositoryformatversion`,
//! `core.filemode` and `core.bare`.

use super::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

static SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[\s*([A-Za-z0-9.-]+)(?:\s+"[^"]*")?\s*\]$"#).expect("valid section regex")
});
static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]*)\s*(?:=\s*(.*))?$").expect("valid entry regex"));

const SUPPORTED_VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    format_version: u32,
    filemode: bool,
    bare: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format_version: SUPPORTED_VERSION,
            filemode: false,
            bare: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Error::ConfigMissing(path.into()),
            _ => Error::Io(err),
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let values = entries(text);

        let version = values
            .get("core.repositoryformatversion")
            .ok_or_else(|| Error::ConfigVersionUnsupported("missing".into()))?;
        let format_version = version
            .parse::<u32>()
            .ok()
            .filter(|v| *v == SUPPORTED_VERSION)
            .ok_or_else(|| Error::ConfigVersionUnsupported(version.clone()))?;

        let filemode = match values.get("core.filemode") {
            Some(v) => parse_bool("core.filemode", v)?,
            None => false,
        };
        let bare = match values.get("core.bare") {
            Some(v) => parse_bool("core.bare", v)?,
            None => false,
        };

        Ok(Self {
            format_version,
            filemode,
            bare,
        })
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    pub fn filemode(&self) -> bool {
        self.filemode
    }

    pub fn bare(&self) -> bool {
        self.bare
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[core]")?;
        writeln!(f, "\trepositoryformatversion = {}", self.format_version)?;
        writeln!(f, "\tfilemode = {}", self.filemode)?;
        writeln!(f, "\tbare = {}", self.bare)
    }
}

/// Flattens the file into `section.key -> value`, last assignment wins.
fn entries(text: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut section = String::new();

    for line in text.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = SECTION.captures(line) {
            section = caps[1].to_lowercase();
        } else if let Some(caps) = ENTRY.captures(line) {
            let key = format!("{section}.{}", caps[1].to_lowercase());
            // a bare key means `true`
            let value = caps.get(2).map_or("true", |m| m.as_str()).trim();
            values.insert(key, value.trim_matches('"').to_string());
        } else {
            tracing::warn!(line, "ignoring unparseable config line");
        }
    }
    values
}

fn strip_comment(line: &str) -> &str {
    match line.find(['#', ';']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        _ => Err(Error::InvalidConfig(format!("{key} = {value:?} is not a boolean"))),
    }
}
