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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use log::debug;
use log::warn;

use crate::cleaner::clean;
use crate::error::Fallible;
use crate::model::Model;
use crate::parser::WarningKind;
use crate::parser::scan;
use crate::parser::split_pair;
use crate::storage::write_lines;
use crate::types::aliases::NIndex;
use crate::types::note::Note;
use crate::types::note::NoteKind;

#[derive(Debug, PartialEq, Eq)]
pub enum EditError {
    /// The new content would not make a valid pair. Can be overridden.
    Invalid(WarningKind),
    UnknownNote { nindex: NIndex },
    /// Another note already has the resulting line.
    DuplicateNote { rcontent: String },
    /// The resulting line would parse back as some other note: a comment,
    /// a heading, or one with different categories or extensions.
    Unstable { rcontent: String },
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::Invalid(kind) => write!(f, "{kind}"),
            EditError::UnknownNote { nindex } => write!(f, "no note at position {nindex}"),
            EditError::DuplicateNote { rcontent } => {
                write!(f, "another note already reads '{rcontent}'")
            }
            EditError::Unstable { rcontent } => {
                write!(f, "'{rcontent}' would not read back as the edited note")
            }
        }
    }
}

impl Error for EditError {}

impl Model {
    /// Replace the content of a note.
    ///
    /// Content holding the separator becomes a pair after validation.
    /// Problems are errors, unless `override_checks` is set: then they are
    /// logged, returned, and the edit goes through. Headings keep their
    /// level and take the new content as their name. Extensions and
    /// categories are kept as they were. A line that would parse back as a
    /// different note is refused even with `override_checks`.
    pub fn edit(
        &mut self,
        nindex: NIndex,
        new_content: &str,
        override_checks: bool,
    ) -> Result<Vec<WarningKind>, EditError> {
        let Some(note) = self.note(nindex) else {
            return Err(EditError::UnknownNote { nindex });
        };
        let content = new_content.trim().to_string();
        let mut problems = Vec::new();

        let kind = match &note.kind {
            NoteKind::Heading {
                heading_char,
                level,
                end_nindex,
                ..
            } => NoteKind::Heading {
                heading_char: *heading_char,
                level: *level,
                heading_name: content.clone(),
                end_nindex: *end_nindex,
            },
            _ => match self.config().separator.as_deref() {
                Some(separator) => {
                    let (kind, problem) = self.pair_kind(nindex, &content, separator);
                    problems.extend(problem);
                    kind
                }
                None => NoteKind::Line,
            },
        };

        let rcontent = render(self, note, &kind, &content);
        if !self.reads_back(note, &kind, &content, &rcontent) {
            return Err(EditError::Unstable { rcontent });
        }

        if let Some(problem) = problems.first() {
            if !override_checks {
                return Err(EditError::Invalid(problem.clone()));
            }
            warn!("overriding check on note {nindex}: {problem}");
        }
        if self
            .notes()
            .iter()
            .any(|other| other.nindex != nindex && other.rcontent == rcontent)
        {
            return Err(EditError::DuplicateNote { rcontent });
        }

        if let Some(note) = self.note_mut(nindex) {
            note.content = content;
            note.rcontent = rcontent;
            note.kind = kind;
        }
        self.reindex();
        Ok(problems)
    }

    /// The pair `content` would become, and what is wrong with it. When
    /// something is wrong the returned kind is what an override stores.
    fn pair_kind(
        &self,
        nindex: NIndex,
        content: &str,
        separator: &str,
    ) -> (NoteKind, Option<WarningKind>) {
        let pair = |term: &str, definition: &str| NoteKind::Pair {
            term: term.trim().to_string(),
            definition: definition.trim().to_string(),
            separator: separator.to_string(),
        };
        match split_pair(content, separator) {
            Ok(None) => (NoteKind::Line, None),
            Ok(Some((term, definition))) => {
                let taken = self
                    .pairs()
                    .iter()
                    .any(|other| other.nindex != nindex && other.term() == Some(term.as_str()));
                let problem = taken.then(|| WarningKind::DuplicateTerm { term: term.clone() });
                (pair(&term, &definition), problem)
            }
            Err(problem) => {
                let (term, definition) = content.split_once(separator).unwrap_or((content, ""));
                (pair(term, definition), Some(problem))
            }
        }
    }

    /// Whether `rcontent` survives cleaning as a single line and scans back
    /// into the same heading, content, extensions and categories.
    fn reads_back(&self, note: &Note, kind: &NoteKind, content: &str, rcontent: &str) -> bool {
        let config = self.config();
        let cleaned = clean(rcontent, config.comments.as_deref());
        let [line] = cleaned.as_slice() else {
            return false;
        };
        if line.text != rcontent {
            return false;
        }
        let heading = match kind {
            NoteKind::Heading {
                heading_char,
                level,
                ..
            } => Some((*heading_char, *level)),
            _ => None,
        };
        let mut missing = Vec::new();
        let scanned = scan(config, rcontent, &mut missing);
        missing.is_empty()
            && scanned.heading == heading
            && scanned.content == content
            && scanned.extensions == note.extensions
            && scanned.categories == note.category_names
    }

    /// Write the canonical `.nu` file: one `rcontent` per line, in order.
    pub fn reformat(&self) -> Fallible<()> {
        let path = &self.config().nu_file;
        write_lines(path, self.notes().iter().map(|n| n.rcontent()))?;
        debug!("reformatted {} notes into {}", self.len(), path.display());
        Ok(())
    }
}

/// The line a note with the given kind and content reads as: its heading
/// prefix, then category prefixes, the content, and its extensions.
fn render(model: &Model, note: &Note, kind: &NoteKind, content: &str) -> String {
    let mut line = String::new();
    if let NoteKind::Heading {
        heading_char,
        level,
        ..
    } = kind
    {
        line.extend(std::iter::repeat_n(*heading_char, *level));
        line.push(' ');
    }
    for name in &note.category_names {
        let prefix = model
            .config()
            .categories
            .iter()
            .find(|c| &c.name == name)
            .map(|c| c.prefix.as_str());
        if let Some(prefix) = prefix {
            line.push_str(prefix);
            line.push(' ');
        }
    }
    line.push_str(content);
    for extension in &note.extensions {
        line.push(' ');
        line.push_str(&extension.render());
    }
    line.trim().to_string()
}
