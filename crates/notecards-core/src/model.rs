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

//! The in-memory note model: the ordered note list plus the indices built
//! over it.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::Serialize;

use crate::cleaner::CleanLine;
use crate::cleaner::clean;
use crate::cleaner::load_lines;
use crate::config::Config;
use crate::error::Fallible;
use crate::parser::ParseWarning;
use crate::parser::Parser;
use crate::parser::ParserError;
use crate::types::aliases::NIndex;
use crate::types::note::Note;
use crate::types::note::NoteKind;

#[derive(Clone, Debug, Serialize)]
pub struct Model {
    #[serde(skip)]
    config: Config,
    notes: Vec<Note>,
    pairs: Vec<NIndex>,
    heading_order: Vec<NIndex>,
    /// Level name to the headings at that level.
    heading_level: BTreeMap<String, Vec<NIndex>>,
    /// Category name to the notes tagged with it.
    categories: BTreeMap<String, Vec<NIndex>>,
    #[serde(skip)]
    warnings: Vec<ParseWarning>,
}

impl Model {
    /// Clean the collection's notes (through the `.nu` cache) and build the
    /// model. Parse warnings are logged and kept on the model.
    pub fn load(config: Config) -> Fallible<Self> {
        let source = load_lines(&config)?;
        let model = Self::build(config, &source.path, &source.lines)?;
        for warning in &model.warnings {
            warn!("{}: {warning}", source.path.display());
        }
        Ok(model)
    }

    /// Build a model from already-cleaned lines. `source_path` is only
    /// used to locate errors.
    pub fn build(
        config: Config,
        source_path: &Path,
        lines: &[CleanLine],
    ) -> Result<Self, ParserError> {
        let (notes, warnings) = Parser::new(&config, source_path).parse(lines)?;
        Ok(Self::assemble(config, notes, warnings))
    }

    /// Clean and build from in-memory text.
    pub fn from_text(config: Config, text: &str) -> Result<Self, ParserError> {
        let lines = clean(text, config.comments.as_deref());
        let source_path = config.note_file.clone();
        Self::build(config, &source_path, &lines)
    }

    fn assemble(config: Config, notes: Vec<Note>, warnings: Vec<ParseWarning>) -> Self {
        let mut model = Model {
            config,
            notes,
            pairs: Vec::new(),
            heading_order: Vec::new(),
            heading_level: BTreeMap::new(),
            categories: BTreeMap::new(),
            warnings,
        };
        model.close_headings();
        model.reindex();
        model
    }

    /// Set every heading's `end_nindex` to the position of the next heading
    /// at the same or a shallower level, or to the end of the notes.
    fn close_headings(&mut self) {
        let len = self.notes.len();
        let mut open: Vec<(NIndex, usize)> = Vec::new();
        let mut ends: Vec<(NIndex, NIndex)> = Vec::new();
        for note in &self.notes {
            if let Some(level) = note.level() {
                while let Some(&(start, open_level)) = open.last() {
                    if open_level < level {
                        break;
                    }
                    ends.push((start, note.nindex));
                    open.pop();
                }
                open.push((note.nindex, level));
            }
        }
        ends.extend(open.into_iter().map(|(start, _)| (start, len)));
        for (start, end) in ends {
            if let NoteKind::Heading { end_nindex, .. } = &mut self.notes[start].kind {
                *end_nindex = end;
            }
        }
    }

    /// Rebuild the lookup indices from the note list.
    pub(crate) fn reindex(&mut self) {
        self.pairs.clear();
        self.heading_order.clear();
        self.heading_level.clear();
        self.categories.clear();
        for name in self.config.categories.iter().map(|c| &c.name) {
            self.categories.entry(name.clone()).or_default();
        }
        if let Some(headings) = &self.config.headings {
            for name in &headings.level_names {
                self.heading_level.entry(name.clone()).or_default();
            }
        }
        for note in &self.notes {
            match &note.kind {
                NoteKind::Pair { .. } => self.pairs.push(note.nindex),
                NoteKind::Heading { level, .. } => {
                    self.heading_order.push(note.nindex);
                    let name = self
                        .config
                        .headings
                        .as_ref()
                        .and_then(|h| h.level_name(*level));
                    if let Some(name) = name {
                        self.heading_level
                            .entry(name.to_string())
                            .or_default()
                            .push(note.nindex);
                    }
                }
                NoteKind::Line => {}
            }
            for category in &note.category_names {
                self.categories
                    .entry(category.clone())
                    .or_default()
                    .push(note.nindex);
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, nindex: NIndex) -> Option<&Note> {
        self.notes.get(nindex)
    }

    pub(crate) fn note_mut(&mut self, nindex: NIndex) -> Option<&mut Note> {
        self.notes.get_mut(nindex)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Warnings collected while building.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// The positions of all pairs, in order.
    pub fn pair_indexes(&self) -> &[NIndex] {
        &self.pairs
    }

    pub fn pairs(&self) -> Vec<&Note> {
        self.resolve(&self.pairs)
    }

    pub fn heading_order(&self) -> Vec<&Note> {
        self.resolve(&self.heading_order)
    }

    /// Headings at the level called `level_name`.
    pub fn heading_level(&self, level_name: &str) -> Vec<&Note> {
        self.heading_level
            .get(level_name)
            .map(|indexes| self.resolve(indexes))
            .unwrap_or_default()
    }

    pub fn heading_names(&self) -> Vec<&str> {
        self.heading_order
            .iter()
            .filter_map(|&i| self.notes[i].heading_name())
            .collect()
    }

    /// The first heading with the given name.
    pub fn heading(&self, heading_name: &str) -> Option<&Note> {
        self.heading_order
            .iter()
            .map(|&i| &self.notes[i])
            .find(|n| n.heading_name() == Some(heading_name))
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Notes tagged with a category.
    pub fn category(&self, name: &str) -> Vec<&Note> {
        self.categories
            .get(name)
            .map(|indexes| self.resolve(indexes))
            .unwrap_or_default()
    }

    /// The notes of a heading's subtree, the heading included. Empty for
    /// non-headings.
    pub fn subtree(&self, heading: &Note) -> &[Note] {
        match heading.nindexes() {
            Some(range) => &self.notes[range],
            None => &[],
        }
    }

    /// The headings directly below a heading.
    pub fn children(&self, heading: &Note) -> Vec<&Note> {
        let (Some(range), Some(level)) = (heading.nindexes(), heading.level()) else {
            return Vec::new();
        };
        self.heading_order
            .iter()
            .map(|&i| &self.notes[i])
            .filter(|n| range.contains(&n.nindex) && n.level() == Some(level + 1))
            .collect()
    }

    /// The note whose `rcontent` matches, if any.
    pub fn by_rcontent(&self, rcontent: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.rcontent == rcontent)
    }

    fn resolve(&self, indexes: &[NIndex]) -> Vec<&Note> {
        indexes.iter().map(|&i| &self.notes[i]).collect()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.notes == other.notes
    }
}
