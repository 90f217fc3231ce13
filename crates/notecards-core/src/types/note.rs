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

use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Range;

use serde::Serialize;

use crate::types::aliases::NIndex;

/// An inline annotation cut out of a note line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Extension {
    /// The text between the bounds, trimmed.
    pub content: String,
    pub name: String,
    pub left_bound: String,
    pub right_bound: String,
}

impl Extension {
    /// The annotation as it appears in a note line.
    pub fn render(&self) -> String {
        format!("{}{}{}", self.left_bound, self.content, self.right_bound)
    }
}

/// What a note line turned out to be.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum NoteKind {
    /// A line with no further structure.
    Line,
    /// A `term <separator> definition` line.
    Pair {
        term: String,
        definition: String,
        separator: String,
    },
    /// A line opening a subtree. The subtree is `nindex..end_nindex`.
    Heading {
        heading_char: char,
        level: usize,
        heading_name: String,
        end_nindex: NIndex,
    },
}

/// The variant of a note, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Line,
    Pair,
    Heading,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Line => "line",
            Variant::Pair => "pair",
            Variant::Heading => "heading",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One non-empty, non-comment line of a notes file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Note {
    pub(crate) nindex: NIndex,
    pub(crate) content: String,
    pub(crate) rcontent: String,
    #[serde(flatten)]
    pub(crate) kind: NoteKind,
    pub(crate) extensions: Vec<Extension>,
    pub(crate) category_names: Vec<String>,
}

impl Note {
    pub fn nindex(&self) -> NIndex {
        self.nindex
    }

    /// The text with heading prefix, category prefixes and extensions removed.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The line as written in the canonical file.
    pub fn rcontent(&self) -> &str {
        &self.rcontent
    }

    pub fn kind(&self) -> &NoteKind {
        &self.kind
    }

    pub fn variant(&self) -> Variant {
        match self.kind {
            NoteKind::Line => Variant::Line,
            NoteKind::Pair { .. } => Variant::Pair,
            NoteKind::Heading { .. } => Variant::Heading,
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self.kind, NoteKind::Pair { .. })
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, NoteKind::Heading { .. })
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Distinct extension names, in order of first appearance.
    pub fn extension_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for ext in &self.extensions {
            if !names.contains(&ext.name.as_str()) {
                names.push(&ext.name);
            }
        }
        names
    }

    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.category_names.iter().any(|c| c == name)
    }

    pub fn term(&self) -> Option<&str> {
        match &self.kind {
            NoteKind::Pair { term, .. } => Some(term),
            _ => None,
        }
    }

    pub fn definition(&self) -> Option<&str> {
        match &self.kind {
            NoteKind::Pair { definition, .. } => Some(definition),
            _ => None,
        }
    }

    pub fn separator(&self) -> Option<&str> {
        match &self.kind {
            NoteKind::Pair { separator, .. } => Some(separator),
            _ => None,
        }
    }

    pub fn heading_char(&self) -> Option<char> {
        match &self.kind {
            NoteKind::Heading { heading_char, .. } => Some(*heading_char),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<usize> {
        match &self.kind {
            NoteKind::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn heading_name(&self) -> Option<&str> {
        match &self.kind {
            NoteKind::Heading { heading_name, .. } => Some(heading_name),
            _ => None,
        }
    }

    /// For headings, the note's own position.
    pub fn begin_nindex(&self) -> Option<NIndex> {
        self.is_heading().then_some(self.nindex)
    }

    /// For headings, the first position past the subtree.
    pub fn end_nindex(&self) -> Option<NIndex> {
        match &self.kind {
            NoteKind::Heading { end_nindex, .. } => Some(*end_nindex),
            _ => None,
        }
    }

    /// For headings, the subtree positions including the heading itself.
    pub fn nindexes(&self) -> Option<Range<NIndex>> {
        self.end_nindex().map(|end| self.nindex..end)
    }
}
