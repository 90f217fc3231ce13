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

//! Turns a raw notes file into the canonical `.nu` line list.

use std::fs::metadata;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use log::debug;

use crate::config::Config;
use crate::error::Fallible;
use crate::storage::write_lines;

/// A surviving line and its 0-based position in the file it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanLine {
    pub line_num: usize,
    pub text: String,
}

impl CleanLine {
    pub fn new(line_num: usize, text: impl Into<String>) -> Self {
        Self {
            line_num,
            text: text.into(),
        }
    }
}

/// Cleaned lines together with the file they were read from.
#[derive(Debug)]
pub struct Source {
    pub path: PathBuf,
    pub lines: Vec<CleanLine>,
}

/// Trim every line and drop comments and blanks.
pub fn clean(text: &str, comments: Option<&str>) -> Vec<CleanLine> {
    text.lines()
        .enumerate()
        .filter_map(|(line_num, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            if comments.is_some_and(|prefix| line.starts_with(prefix)) {
                return None;
            }
            Some(CleanLine::new(line_num, line))
        })
        .collect()
}

/// Whether the `.nu` cache is missing or older than the notes file.
pub fn is_stale(config: &Config) -> bool {
    let Ok(nu) = metadata(&config.nu_file) else {
        return true;
    };
    let Ok(raw) = metadata(&config.note_file) else {
        // Nothing to regenerate from; the cache is all there is.
        return false;
    };
    match (raw.modified(), nu.modified()) {
        (Ok(raw), Ok(nu)) => raw > nu,
        _ => true,
    }
}

/// Clean the notes file and rewrite the `.nu` cache from it.
pub fn regenerate(config: &Config) -> Fallible<Vec<CleanLine>> {
    let lines = clean_file(&config.note_file, config.comments.as_deref())?;
    write_lines(&config.nu_file, lines.iter().map(|l| l.text.as_str()))?;
    debug!(
        "wrote {} lines to {}",
        lines.len(),
        config.nu_file.display()
    );
    Ok(lines)
}

/// The cleaned lines of the collection, regenerating the cache only when
/// it is stale. Line numbers refer to `Source::path`.
pub fn load_lines(config: &Config) -> Fallible<Source> {
    if is_stale(config) {
        Ok(Source {
            path: config.note_file.clone(),
            lines: regenerate(config)?,
        })
    } else {
        debug!("reusing {}", config.nu_file.display());
        Ok(Source {
            path: config.nu_file.clone(),
            lines: clean_file(&config.nu_file, config.comments.as_deref())?,
        })
    }
}

fn clean_file(path: &Path, comments: Option<&str>) -> Fallible<Vec<CleanLine>> {
    let text = read_to_string(path)?;
    Ok(clean(&text, comments))
}
