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

//! Flat quizzing over a division of the pairs, tracking which were
//! answered correctly.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::rc::Rc;

use log::info;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::draw::Draw;
use crate::error::Fallible;
use crate::model::Model;
use crate::rng::TinyRng;
use crate::rng::shuffle;
use crate::storage::read_json;
use crate::storage::write_json;
use crate::types::aliases::NIndex;
use crate::types::note::Note;

#[derive(Debug, PartialEq, Eq)]
pub enum QuizError {
    NotAPair { nindex: NIndex },
    NotAHeading { nindex: NIndex },
    UnknownDivision { name: String },
}

impl Display for QuizError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::NotAPair { nindex } => {
                write!(f, "note {nindex} is not a pair of this collection")
            }
            QuizError::NotAHeading { nindex } => write!(f, "note {nindex} is not a heading"),
            QuizError::UnknownDivision { name } => {
                write!(f, "'{name}' is neither a division, a heading nor a category")
            }
        }
    }
}

impl Error for QuizError {}

/// The subset of pairs a quiz draws from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Division {
    #[default]
    All,
    Correct,
    Incorrect,
    /// Pairs in neither set.
    Unmarked,
    /// Pairs in the subtree of the heading at this position.
    Heading(NIndex),
    Category(String),
}

/// The `.qz` sidecar.
#[derive(Debug, Default, Serialize, Deserialize)]
struct QuizState {
    correct: Vec<String>,
    incorrect: Vec<String>,
}

pub struct Quiz {
    model: Rc<Model>,
    correct: BTreeSet<NIndex>,
    incorrect: BTreeSet<NIndex>,
    division: Division,
    pairs: Vec<NIndex>,
    last: Rc<Cell<Option<NIndex>>>,
    rng: TinyRng,
}

impl Quiz {
    pub fn new(model: Rc<Model>) -> Self {
        let pairs = model.pair_indexes().to_vec();
        Self {
            model,
            correct: BTreeSet::new(),
            incorrect: BTreeSet::new(),
            division: Division::All,
            pairs,
            last: Rc::new(Cell::new(None)),
            rng: TinyRng::from_clock(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = TinyRng::from_seed(seed);
    }

    pub fn model(&self) -> &Rc<Model> {
        &self.model
    }

    pub fn division(&self) -> &Division {
        &self.division
    }

    /// The pairs of the current division, in nindex order.
    pub fn pairs(&self) -> Vec<&Note> {
        self.resolve_all(&self.pairs)
    }

    pub fn correct(&self) -> Vec<&Note> {
        self.resolve_all(&self.correct)
    }

    pub fn incorrect(&self) -> Vec<&Note> {
        self.resolve_all(&self.incorrect)
    }

    /// The note most recently handed out by a draw.
    pub fn last(&self) -> Option<&Note> {
        self.last.get().and_then(|i| self.model.note(i))
    }

    /// Draw every pair of the division once. Random order is fixed when the
    /// draw is created.
    pub fn generate(&mut self, randomize: bool) -> Draw {
        let mut order = self.pairs.clone();
        if randomize {
            order = shuffle(order, &mut self.rng);
        }
        Draw::new(Rc::clone(&self.model), order, Rc::clone(&self.last), None)
    }

    /// Mark a pair. It leaves the other set.
    pub fn append(&mut self, note: &Note, correct: bool) -> Result<(), QuizError> {
        let nindex = self.own_pair(note)?;
        let (to, from) = if correct {
            (&mut self.correct, &mut self.incorrect)
        } else {
            (&mut self.incorrect, &mut self.correct)
        };
        from.remove(&nindex);
        to.insert(nindex);
        Ok(())
    }

    /// Unmark a pair in one of the sets. No-op when it is not there.
    pub fn remove(&mut self, note: &Note, correct: bool) {
        let Ok(nindex) = self.own_pair(note) else {
            return;
        };
        if correct {
            self.correct.remove(&nindex);
        } else {
            self.incorrect.remove(&nindex);
        }
    }

    pub fn clear(&mut self) {
        self.correct.clear();
        self.incorrect.clear();
    }

    /// Draw from `division` from now on. Marked divisions are captured as
    /// they stand.
    pub fn select_pairs(&mut self, division: Division) -> Result<(), QuizError> {
        self.pairs = self.resolve(&division)?;
        self.division = division;
        Ok(())
    }

    pub fn select_heading(&mut self, heading: &Note) -> Result<(), QuizError> {
        if !heading.is_heading() {
            return Err(QuizError::NotAHeading {
                nindex: heading.nindex(),
            });
        }
        self.select_pairs(Division::Heading(heading.nindex()))
    }

    /// Select by keyword (`none`, `correct`, `incorrect`, `unmarked`),
    /// then heading name, then category name.
    pub fn select_by_name(&mut self, name: &str) -> Result<(), QuizError> {
        let division = match name {
            "none" => Division::All,
            "correct" => Division::Correct,
            "incorrect" => Division::Incorrect,
            "unmarked" => Division::Unmarked,
            _ => {
                if let Some(heading) = self.model.heading(name) {
                    Division::Heading(heading.nindex())
                } else if self.model.has_category(name) {
                    Division::Category(name.to_string())
                } else {
                    return Err(QuizError::UnknownDivision {
                        name: name.to_string(),
                    });
                }
            }
        };
        self.select_pairs(division)
    }

    /// Write both sets to the `.qz` sidecar.
    pub fn save(&self) -> Fallible<()> {
        let state = QuizState {
            correct: self.rcontents(&self.correct),
            incorrect: self.rcontents(&self.incorrect),
        };
        let path = &self.model.config().quiz_file;
        write_json(path, &state)?;
        info!("saved quiz state to {}", path.display());
        Ok(())
    }

    /// Replace both sets with the `.qz` sidecar. `false` when there is none.
    pub fn load(&mut self) -> Fallible<bool> {
        let path = &self.model.config().quiz_file;
        let Some(state) = read_json::<QuizState>(path)? else {
            return Ok(false);
        };
        info!("loaded quiz state from {}", path.display());
        let correct = self.lookup(&state.correct);
        let mut incorrect = self.lookup(&state.incorrect);
        incorrect.retain(|i| !correct.contains(i));
        self.correct = correct;
        self.incorrect = incorrect;
        self.reselect();
        Ok(true)
    }

    /// Back to the state of a fresh quiz over the same model.
    pub fn reset(&mut self) {
        self.clear();
        self.division = Division::All;
        self.pairs = self.model.pair_indexes().to_vec();
        self.last.set(None);
    }

    /// Rebind to a rebuilt model. Marks survive for pairs whose line is
    /// unchanged; the division is resolved again.
    pub fn refresh(&mut self, model: Rc<Model>) {
        let carry = |set: &BTreeSet<NIndex>| -> BTreeSet<NIndex> {
            set.iter()
                .filter_map(|&i| carry_pair(&self.model, &model, i))
                .collect()
        };
        let correct = carry(&self.correct);
        let incorrect = carry(&self.incorrect);
        let division = match &self.division {
            Division::Heading(i) => self.model.note(*i).and_then(|old| {
                model
                    .by_rcontent(old.rcontent())
                    .filter(|n| n.is_heading())
                    .map(|n| Division::Heading(n.nindex()))
            }),
            Division::Category(name) => model
                .has_category(name)
                .then(|| Division::Category(name.clone())),
            division => Some(division.clone()),
        };
        self.model = model;
        self.correct = correct;
        self.incorrect = incorrect;
        self.division = division.unwrap_or_default();
        self.last.set(None);
        self.reselect();
    }

    fn reselect(&mut self) {
        match self.resolve(&self.division) {
            Ok(pairs) => self.pairs = pairs,
            Err(e) => {
                warn!("{e}; quizzing all pairs");
                self.division = Division::All;
                self.pairs = self.model.pair_indexes().to_vec();
            }
        }
    }

    fn resolve(&self, division: &Division) -> Result<Vec<NIndex>, QuizError> {
        let all = self.model.pair_indexes().iter().copied();
        let pairs = match division {
            Division::All => all.collect(),
            Division::Correct => self.correct.iter().copied().collect(),
            Division::Incorrect => self.incorrect.iter().copied().collect(),
            Division::Unmarked => all
                .filter(|i| !self.correct.contains(i) && !self.incorrect.contains(i))
                .collect(),
            Division::Heading(nindex) => {
                let range = self
                    .model
                    .note(*nindex)
                    .and_then(|n| n.nindexes())
                    .ok_or(QuizError::NotAHeading { nindex: *nindex })?;
                all.filter(|i| range.contains(i)).collect()
            }
            Division::Category(name) => {
                if !self.model.has_category(name) {
                    return Err(QuizError::UnknownDivision { name: name.clone() });
                }
                self.model
                    .category(name)
                    .iter()
                    .filter(|n| n.is_pair())
                    .map(|n| n.nindex())
                    .collect()
            }
        };
        Ok(pairs)
    }

    /// The position of `note` if it is a pair of this quiz's model.
    fn own_pair(&self, note: &Note) -> Result<NIndex, QuizError> {
        let nindex = note.nindex();
        match self.model.note(nindex) {
            Some(own) if own.is_pair() && own.rcontent() == note.rcontent() => Ok(nindex),
            _ => Err(QuizError::NotAPair { nindex }),
        }
    }

    fn resolve_all<'a>(&self, indexes: impl IntoIterator<Item = &'a NIndex>) -> Vec<&Note> {
        indexes
            .into_iter()
            .filter_map(|&i| self.model.note(i))
            .collect()
    }

    fn rcontents(&self, set: &BTreeSet<NIndex>) -> Vec<String> {
        self.resolve_all(set)
            .into_iter()
            .map(|n| n.rcontent().to_string())
            .collect()
    }

    fn lookup(&self, rcontents: &[String]) -> BTreeSet<NIndex> {
        let mut found = BTreeSet::new();
        for rcontent in rcontents {
            match self.model.by_rcontent(rcontent).filter(|n| n.is_pair()) {
                Some(note) => {
                    found.insert(note.nindex());
                }
                None => warn!("dropping unknown quiz entry '{rcontent}'"),
            }
        }
        found
    }
}

/// Where the pair at `nindex` in `old` lives in `new`, matched by line.
pub(crate) fn carry_pair(old: &Model, new: &Model, nindex: NIndex) -> Option<NIndex> {
    let note = old.note(nindex)?;
    new.by_rcontent(note.rcontent())
        .filter(|n| n.is_pair())
        .map(|n| n.nindex())
}
