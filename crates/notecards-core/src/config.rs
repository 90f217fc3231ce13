// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The configuration describing the grammar of a notes file.
//!
//! The canonical format is line oriented:
//!
//! ```text
//! # grammar for biology.txt
//!
//! note_file = biology.txt
//! comments = //
//! separator = :
//! heading_char = #
//! levels = 2
//! level_names = chapter, section
//! extension_count = 1
//! extension = note [[ ]]
//! category_count = 1
//! category = important !
//! ```
//!
//! Files ending in `.toml` are read with serde instead, using the same keys
//! (`extensions` and `categories` become arrays of tables).

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A declared inline annotation, e.g. `note [[ ]]`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExtensionSpec {
    pub name: String,
    pub left_bound: String,
    pub right_bound: String,
}

/// A declared prefix tag, e.g. `important !`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub prefix: String,
}

/// Heading detection settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingSpec {
    pub heading_char: char,
    pub levels: usize,
    pub level_names: Vec<String>,
}

impl HeadingSpec {
    /// The name of a 1-based heading level.
    pub fn level_name(&self, level: usize) -> Option<&str> {
        level
            .checked_sub(1)
            .and_then(|i| self.level_names.get(i))
            .map(String::as_str)
    }
}

/// A validated configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The raw notes file.
    pub note_file: PathBuf,
    /// The canonical cleaned copy of `note_file`.
    pub nu_file: PathBuf,
    /// Quiz sidecar.
    pub quiz_file: PathBuf,
    /// Leitner sidecar.
    pub leitner_file: PathBuf,
    pub comments: Option<String>,
    pub separator: Option<String>,
    pub headings: Option<HeadingSpec>,
    pub extensions: Vec<ExtensionSpec>,
    pub categories: Vec<CategorySpec>,
    /// Whether a line may carry several category prefixes.
    pub category_stacking: bool,
    /// Review periods overriding the default Leitner schedule.
    pub leitner_times: Option<Vec<u64>>,
}

impl Config {
    /// Read and validate a configuration file. Relative paths inside it are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Fallible<Self> {
        let text = read_to_string(path)
            .map_err(|e| ErrorReport::new(format!("cannot read {}: {e}", path.display())))?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::parse_toml(&text, base_dir)
        } else {
            Self::parse(&text, base_dir).map_err(|e| {
                ErrorReport::new(format!("Config error in {}: {e}", path.display()))
            })
        }
    }

    /// Parse the line-oriented format.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        RawConfig::from_lines(text)?.validate(base_dir)
    }

    /// Parse the TOML format.
    pub fn parse_toml(text: &str, base_dir: &Path) -> Fallible<Self> {
        let raw: RawConfig = toml::from_str(text)?;
        Ok(raw.validate(base_dir)?)
    }

    /// A config with only the notes file set: no pairs, headings, or
    /// annotations.
    pub fn for_notes(note_file: impl Into<PathBuf>) -> Self {
        let note_file = note_file.into();
        Config {
            nu_file: note_file.with_extension("nu"),
            quiz_file: note_file.with_extension("qz"),
            leitner_file: note_file.with_extension("lt"),
            note_file,
            comments: None,
            separator: None,
            headings: None,
            extensions: Vec::new(),
            categories: Vec::new(),
            category_stacking: false,
            leitner_times: None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A blank line that does not follow a comment.
    BlankLine { line_num: usize },
    /// Two blank lines in a row.
    ConsecutiveBlankLines { line_num: usize },
    /// A line that is neither a comment nor `key = value`.
    MalformedLine { line_num: usize, line: String },
    UnknownKey { line_num: usize, key: String },
    DuplicateKey { line_num: usize, key: String },
    MissingKey { key: &'static str },
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
    /// A `*_count` key disagrees with the number of declarations.
    CountMismatch {
        key: &'static str,
        declared: usize,
        found: usize,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::BlankLine { line_num } => {
                write!(f, "unexpected blank line at line {}", line_num + 1)
            }
            ConfigError::ConsecutiveBlankLines { line_num } => {
                write!(f, "two consecutive blank lines at line {}", line_num + 1)
            }
            ConfigError::MalformedLine { line_num, line } => {
                write!(f, "malformed line {}: '{line}'", line_num + 1)
            }
            ConfigError::UnknownKey { line_num, key } => {
                write!(f, "unknown key '{key}' at line {}", line_num + 1)
            }
            ConfigError::DuplicateKey { line_num, key } => {
                write!(f, "key '{key}' set twice (line {})", line_num + 1)
            }
            ConfigError::MissingKey { key } => write!(f, "missing required key '{key}'"),
            ConfigError::InvalidValue { key, value, reason } => {
                write!(f, "invalid value '{value}' for '{key}': {reason}")
            }
            ConfigError::CountMismatch {
                key,
                declared,
                found,
            } => write!(f, "'{key}' is {declared} but {found} were declared"),
        }
    }
}

impl Error for ConfigError {}

/// The keys as written, before cross-field validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    note_file: Option<String>,
    comments: Option<String>,
    separator: Option<String>,
    heading_char: Option<String>,
    levels: Option<usize>,
    level_names: Option<Vec<String>>,
    extension_count: Option<usize>,
    #[serde(default)]
    extensions: Vec<ExtensionSpec>,
    category_count: Option<usize>,
    #[serde(default)]
    categories: Vec<CategorySpec>,
    category_stacking: Option<bool>,
    leitner_times: Option<Vec<u64>>,
}

#[derive(Clone, Copy)]
enum Previous {
    Start,
    Comment,
    Blank,
    Entry,
}

impl RawConfig {
    fn from_lines(text: &str) -> Result<Self, ConfigError> {
        let mut raw = RawConfig::default();
        let lines: Vec<&str> = text.lines().collect();
        // Blank lines at the end of the file carry no meaning.
        let end = lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |i| i + 1);
        let mut previous = Previous::Start;
        for (line_num, line) in lines[..end].iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                previous = match previous {
                    Previous::Comment => Previous::Blank,
                    Previous::Blank => {
                        return Err(ConfigError::ConsecutiveBlankLines { line_num });
                    }
                    Previous::Start | Previous::Entry => {
                        return Err(ConfigError::BlankLine { line_num });
                    }
                };
                continue;
            }
            if line.starts_with('#') {
                previous = Previous::Comment;
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::MalformedLine {
                    line_num,
                    line: line.to_string(),
                });
            };
            raw.set(key.trim(), value.trim(), line_num)?;
            previous = Previous::Entry;
        }
        Ok(raw)
    }

    fn set(&mut self, key: &str, value: &str, line_num: usize) -> Result<(), ConfigError> {
        if value.is_empty() {
            return Err(invalid(key, value, "value is empty"));
        }
        match key {
            "note_file" => set_once(&mut self.note_file, value.to_string(), key, line_num),
            "comments" => set_once(&mut self.comments, value.to_string(), key, line_num),
            "separator" => set_once(&mut self.separator, value.to_string(), key, line_num),
            "heading_char" => set_once(&mut self.heading_char, value.to_string(), key, line_num),
            "levels" => set_once(&mut self.levels, parse_count(key, value)?, key, line_num),
            "level_names" => set_once(&mut self.level_names, split_list(value), key, line_num),
            "extension_count" => set_once(
                &mut self.extension_count,
                parse_count(key, value)?,
                key,
                line_num,
            ),
            "category_count" => set_once(
                &mut self.category_count,
                parse_count(key, value)?,
                key,
                line_num,
            ),
            "category_stacking" => {
                let stacking = match value {
                    "true" | "yes" | "1" => true,
                    "false" | "no" | "0" => false,
                    _ => return Err(invalid(key, value, "expected true or false")),
                };
                set_once(&mut self.category_stacking, stacking, key, line_num)
            }
            "leitner_times" => {
                let times = split_list(value)
                    .iter()
                    .map(|t| t.parse::<u64>())
                    .collect::<Result<Vec<u64>, _>>()
                    .map_err(|_| invalid(key, value, "expected a list of integers"))?;
                set_once(&mut self.leitner_times, times, key, line_num)
            }
            "extension" => {
                let parts: Vec<&str> = value.split_whitespace().collect();
                let [name, left, right] = parts.as_slice() else {
                    return Err(invalid(key, value, "expected 'name left_bound right_bound'"));
                };
                self.extensions.push(ExtensionSpec {
                    name: name.to_string(),
                    left_bound: left.to_string(),
                    right_bound: right.to_string(),
                });
                Ok(())
            }
            "category" => {
                let parts: Vec<&str> = value.split_whitespace().collect();
                let [name, prefix] = parts.as_slice() else {
                    return Err(invalid(key, value, "expected 'name prefix'"));
                };
                self.categories.push(CategorySpec {
                    name: name.to_string(),
                    prefix: prefix.to_string(),
                });
                Ok(())
            }
            _ => Err(ConfigError::UnknownKey {
                line_num,
                key: key.to_string(),
            }),
        }
    }

    fn validate(self, base_dir: &Path) -> Result<Config, ConfigError> {
        let note_file = self
            .note_file
            .ok_or(ConfigError::MissingKey { key: "note_file" })?;
        let note_file = base_dir.join(note_file);

        let headings = match self.heading_char {
            None => {
                if self.levels.is_some() || self.level_names.is_some() {
                    return Err(ConfigError::MissingKey {
                        key: "heading_char",
                    });
                }
                None
            }
            Some(heading_char) => {
                let mut chars = heading_char.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    return Err(invalid(
                        "heading_char",
                        &heading_char,
                        "must be a single character",
                    ));
                };
                let levels = self.levels.ok_or(ConfigError::MissingKey { key: "levels" })?;
                if levels == 0 {
                    return Err(invalid("levels", "0", "must be at least 1"));
                }
                let level_names = self
                    .level_names
                    .ok_or(ConfigError::MissingKey { key: "level_names" })?;
                if level_names.len() != levels {
                    return Err(ConfigError::CountMismatch {
                        key: "levels",
                        declared: levels,
                        found: level_names.len(),
                    });
                }
                Some(HeadingSpec {
                    heading_char: c,
                    levels,
                    level_names,
                })
            }
        };

        for spec in &self.extensions {
            let bounds = [&spec.name, &spec.left_bound, &spec.right_bound];
            if bounds.iter().any(|part| part.is_empty()) {
                let shown = format!("{} {} {}", spec.name, spec.left_bound, spec.right_bound);
                return Err(invalid(
                    "extension",
                    shown.trim(),
                    "name and bounds must not be empty",
                ));
            }
        }
        for spec in &self.categories {
            if spec.name.is_empty() || spec.prefix.is_empty() {
                let shown = format!("{} {}", spec.name, spec.prefix);
                return Err(invalid(
                    "category",
                    shown.trim(),
                    "name and prefix must not be empty",
                ));
            }
        }
        for (key, value) in [("separator", &self.separator), ("comments", &self.comments)] {
            if value.as_deref() == Some("") {
                return Err(invalid(key, "", "must not be empty"));
            }
        }

        if let Some(declared) = self.extension_count {
            if declared != self.extensions.len() {
                return Err(ConfigError::CountMismatch {
                    key: "extension_count",
                    declared,
                    found: self.extensions.len(),
                });
            }
        }
        if let Some(declared) = self.category_count {
            if declared != self.categories.len() {
                return Err(ConfigError::CountMismatch {
                    key: "category_count",
                    declared,
                    found: self.categories.len(),
                });
            }
        }
        if let Some(times) = &self.leitner_times {
            let increasing = times.windows(2).all(|w| w[0] < w[1]);
            if times.is_empty() || times[0] == 0 || !increasing {
                let shown = times
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(invalid(
                    "leitner_times",
                    &shown,
                    "must be positive and strictly increasing",
                ));
            }
        }
        for (key, value) in [("comments", &self.comments), ("separator", &self.separator)] {
            if value.as_deref() == Some("") {
                return Err(invalid(key, "", "value is empty"));
            }
        }

        Ok(Config {
            nu_file: note_file.with_extension("nu"),
            quiz_file: note_file.with_extension("qz"),
            leitner_file: note_file.with_extension("lt"),
            note_file,
            comments: self.comments,
            separator: self.separator,
            headings,
            extensions: self.extensions,
            categories: self.categories,
            category_stacking: self.category_stacking.unwrap_or(false),
            leitner_times: self.leitner_times,
        })
    }
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    key: &str,
    line_num: usize,
) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::DuplicateKey {
            line_num,
            key: key.to_string(),
        });
    }
    *slot = Some(value);
    Ok(())
}

fn parse_count(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "expected a non-negative integer"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn invalid(key: &str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}
