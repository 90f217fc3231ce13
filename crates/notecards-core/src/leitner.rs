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

//! Leitner boxes: pairs move up a box when answered correctly and back to
//! the first box when not. Box `n` is reviewed on sessions divisible by
//! its period.

use std::cell::Cell;
use std::collections::BTreeMap;
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
use crate::quiz::carry_pair;
use crate::rng::TinyRng;
use crate::rng::shuffle;
use crate::storage::read_json;
use crate::storage::write_json;
use crate::types::aliases::BoxNumber;
use crate::types::aliases::NIndex;
use crate::types::aliases::Period;
use crate::types::aliases::Session;
use crate::types::note::Note;

/// Review periods of boxes 1 to 7.
pub const DEFAULT_TIMES: [Period; 7] = [1, 2, 3, 5, 11, 19, 29];

#[derive(Debug, PartialEq, Eq)]
pub enum LeitnerError {
    TimeTooShort { time: Period, min: Period },
    TimeTooLong { time: Period, max: Period },
    LastBox,
    UnknownBox { number: BoxNumber },
    NotBoxed { nindex: NIndex },
    InvalidState { reason: String },
}

impl Display for LeitnerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LeitnerError::TimeTooShort { time, min } => {
                write!(f, "period {time} is too short (at least {min})")
            }
            LeitnerError::TimeTooLong { time, max } => {
                write!(f, "period {time} is too long (at most {max})")
            }
            LeitnerError::LastBox => write!(f, "cannot remove the only box"),
            LeitnerError::UnknownBox { number } => write!(f, "there is no box {number}"),
            LeitnerError::NotBoxed { nindex } => write!(f, "note {nindex} is in no box"),
            LeitnerError::InvalidState { reason } => {
                write!(f, "invalid Leitner state: {reason}")
            }
        }
    }
}

impl Error for LeitnerError {}

/// The `.lt` sidecar.
#[derive(Debug, Serialize, Deserialize)]
struct LeitnerState {
    boxes: BTreeMap<BoxNumber, Vec<String>>,
    times: BTreeMap<BoxNumber, Period>,
    session: Session,
}

pub struct Leitner {
    model: Rc<Model>,
    /// Box number to its pairs, each list in nindex order.
    boxes: BTreeMap<BoxNumber, Vec<NIndex>>,
    times: BTreeMap<BoxNumber, Period>,
    session: Rc<Cell<Session>>,
    last: Rc<Cell<Option<NIndex>>>,
    rng: TinyRng,
}

impl Leitner {
    /// Every pair starts in box 1. Periods come from the configuration, or
    /// [`DEFAULT_TIMES`].
    pub fn new(model: Rc<Model>) -> Self {
        let times = initial_times(&model);
        let boxes = initial_boxes(&model, times.len());
        Self {
            model,
            boxes,
            times,
            session: Rc::new(Cell::new(1)),
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

    pub fn session(&self) -> Session {
        self.session.get()
    }

    pub fn times(&self) -> &BTreeMap<BoxNumber, Period> {
        &self.times
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// The pairs in a box, in nindex order.
    pub fn box_notes(&self, number: BoxNumber) -> Vec<&Note> {
        self.boxes
            .get(&number)
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|&i| self.model.note(i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Box number to the number of pairs in it.
    pub fn box_sizes(&self) -> BTreeMap<BoxNumber, usize> {
        self.boxes.iter().map(|(&n, v)| (n, v.len())).collect()
    }

    pub fn box_of(&self, note: &Note) -> Option<BoxNumber> {
        let nindex = self.own(note)?;
        self.boxes
            .iter()
            .find(|(_, indexes)| indexes.binary_search(&nindex).is_ok())
            .map(|(&number, _)| number)
    }

    pub fn last(&self) -> Option<&Note> {
        self.last.get().and_then(|i| self.model.note(i))
    }

    /// Draw the boxes due this session: ascending box number, nindex order
    /// within a box, unless randomized. Running the draw dry ends the
    /// session.
    pub fn generate(&mut self, randomize: bool) -> Draw {
        let session = self.session.get();
        let mut order: Vec<NIndex> = self
            .boxes
            .iter()
            .filter(|(number, _)| {
                self.times
                    .get(*number)
                    .is_some_and(|&t| session % t == 0)
            })
            .flat_map(|(_, indexes)| indexes.iter().copied())
            .collect();
        if randomize {
            order = shuffle(order, &mut self.rng);
        }
        Draw::new(
            Rc::clone(&self.model),
            order,
            Rc::clone(&self.last),
            Some(Rc::clone(&self.session)),
        )
    }

    /// Move a pair up one box. Stays put in the last box.
    pub fn correct(&mut self, note: &Note) -> Result<BoxNumber, LeitnerError> {
        let (nindex, number) = self.placement(note)?;
        let top = self.box_count();
        if number < top {
            self.relocate(nindex, number, number + 1);
            Ok(number + 1)
        } else {
            Ok(number)
        }
    }

    /// Send a pair back to box 1.
    pub fn incorrect(&mut self, note: &Note) -> Result<BoxNumber, LeitnerError> {
        let (nindex, number) = self.placement(note)?;
        if number > 1 {
            self.relocate(nindex, number, 1);
        }
        Ok(1)
    }

    /// Add a box after the last one. Its period must exceed the last box's.
    pub fn append_box(&mut self, time: Period) -> Result<BoxNumber, LeitnerError> {
        let last = self.times.values().next_back().copied().unwrap_or(0);
        if time <= last {
            return Err(LeitnerError::TimeTooShort {
                time,
                min: last + 1,
            });
        }
        let number = self.box_count() + 1;
        self.boxes.insert(number, Vec::new());
        self.times.insert(number, time);
        Ok(number)
    }

    /// Remove the last box. Its pairs drop into the box below.
    pub fn pop_box(&mut self) -> Result<(), LeitnerError> {
        let top = self.box_count();
        if top <= 1 {
            return Err(LeitnerError::LastBox);
        }
        let held = self.boxes.remove(&top).unwrap_or_default();
        self.times.remove(&top);
        if let Some(below) = self.boxes.get_mut(&(top - 1)) {
            below.extend(held);
            below.sort_unstable();
        }
        Ok(())
    }

    /// Change a box's period, keeping it between its neighbours' periods.
    pub fn edit_box(&mut self, number: BoxNumber, time: Period) -> Result<(), LeitnerError> {
        if !self.times.contains_key(&number) {
            return Err(LeitnerError::UnknownBox { number });
        }
        let min = self.times.get(&(number - 1)).copied().unwrap_or(1);
        if time < min {
            return Err(LeitnerError::TimeTooShort { time, min });
        }
        if let Some(&max) = self.times.get(&(number + 1)) {
            if time > max {
                return Err(LeitnerError::TimeTooLong { time, max });
            }
        }
        self.times.insert(number, time);
        Ok(())
    }

    /// Write boxes, periods and session to the `.lt` sidecar.
    pub fn save(&self) -> Fallible<()> {
        let boxes = self
            .boxes
            .iter()
            .map(|(&number, indexes)| {
                let rcontents = indexes
                    .iter()
                    .filter_map(|&i| self.model.note(i))
                    .map(|n| n.rcontent().to_string())
                    .collect();
                (number, rcontents)
            })
            .collect();
        let state = LeitnerState {
            boxes,
            times: self.times.clone(),
            session: self.session.get(),
        };
        let path = &self.model.config().leitner_file;
        write_json(path, &state)?;
        info!("saved Leitner state to {}", path.display());
        Ok(())
    }

    /// Restore from the `.lt` sidecar. Unknown lines are dropped and pairs
    /// missing from the file go to box 1. `false` when there is no file.
    pub fn load(&mut self) -> Fallible<bool> {
        let path = &self.model.config().leitner_file;
        let Some(state) = read_json::<LeitnerState>(path)? else {
            return Ok(false);
        };
        validate(&state)?;
        info!("loaded Leitner state from {}", path.display());

        let mut boxes: BTreeMap<BoxNumber, Vec<NIndex>> =
            state.boxes.keys().map(|&n| (n, Vec::new())).collect();
        let mut placed = vec![false; self.model.len()];
        for (number, rcontents) in &state.boxes {
            for rcontent in rcontents {
                let found = self.model.by_rcontent(rcontent).filter(|n| n.is_pair());
                match found {
                    Some(note) if !placed[note.nindex()] => {
                        placed[note.nindex()] = true;
                        boxes.entry(*number).or_default().push(note.nindex());
                    }
                    Some(_) => {}
                    None => warn!("dropping unknown Leitner entry '{rcontent}'"),
                }
            }
        }
        place_remaining(&self.model, &mut boxes, &placed);
        self.boxes = boxes;
        self.times = state.times;
        self.session.set(state.session);
        self.last.set(None);
        Ok(true)
    }

    /// Back to every pair in box 1 on session 1.
    pub fn reset(&mut self) {
        self.times = initial_times(&self.model);
        self.boxes = initial_boxes(&self.model, self.times.len());
        self.session.set(1);
        self.last.set(None);
    }

    /// Rebind to a rebuilt model. Pairs whose line is unchanged keep their
    /// box; new pairs enter box 1. The session starts over.
    pub fn refresh(&mut self, model: Rc<Model>) {
        let mut boxes: BTreeMap<BoxNumber, Vec<NIndex>> =
            self.boxes.keys().map(|&n| (n, Vec::new())).collect();
        let mut placed = vec![false; model.len()];
        for (number, indexes) in &self.boxes {
            for &i in indexes {
                if let Some(j) = carry_pair(&self.model, &model, i) {
                    placed[j] = true;
                    boxes.entry(*number).or_default().push(j);
                }
            }
        }
        place_remaining(&model, &mut boxes, &placed);
        self.model = model;
        self.boxes = boxes;
        self.session.set(1);
        self.last.set(None);
    }

    /// The position of `note` if it belongs to this engine's model.
    fn own(&self, note: &Note) -> Option<NIndex> {
        let nindex = note.nindex();
        self.model
            .note(nindex)
            .filter(|own| own.rcontent() == note.rcontent())
            .map(|_| nindex)
    }

    fn placement(&self, note: &Note) -> Result<(NIndex, BoxNumber), LeitnerError> {
        let nindex = note.nindex();
        match self.box_of(note) {
            Some(number) => Ok((nindex, number)),
            None => Err(LeitnerError::NotBoxed { nindex }),
        }
    }

    fn relocate(&mut self, nindex: NIndex, from: BoxNumber, to: BoxNumber) {
        if let Some(indexes) = self.boxes.get_mut(&from) {
            indexes.retain(|&i| i != nindex);
        }
        if let Some(indexes) = self.boxes.get_mut(&to) {
            if let Err(pos) = indexes.binary_search(&nindex) {
                indexes.insert(pos, nindex);
            }
        }
    }
}

fn initial_times(model: &Model) -> BTreeMap<BoxNumber, Period> {
    let times: &[Period] = match &model.config().leitner_times {
        Some(times) if !times.is_empty() => times.as_slice(),
        _ => &DEFAULT_TIMES,
    };
    times.iter().enumerate().map(|(i, &t)| (i + 1, t)).collect()
}

fn initial_boxes(model: &Model, count: usize) -> BTreeMap<BoxNumber, Vec<NIndex>> {
    let mut boxes: BTreeMap<BoxNumber, Vec<NIndex>> =
        (1..=count).map(|n| (n, Vec::new())).collect();
    boxes.insert(1, model.pair_indexes().to_vec());
    boxes
}

/// Put unplaced pairs in box 1 and restore nindex order in every box.
fn place_remaining(model: &Model, boxes: &mut BTreeMap<BoxNumber, Vec<NIndex>>, placed: &[bool]) {
    let first = boxes.entry(1).or_default();
    first.extend(model.pair_indexes().iter().filter(|&&i| !placed[i]));
    for indexes in boxes.values_mut() {
        indexes.sort_unstable();
    }
}

fn validate(state: &LeitnerState) -> Result<(), LeitnerError> {
    let invalid = |reason: &str| {
        Err(LeitnerError::InvalidState {
            reason: reason.to_string(),
        })
    };
    let count = state.boxes.len();
    if count == 0 {
        return invalid("there are no boxes");
    }
    if !state.boxes.keys().copied().eq(1..=count) {
        return invalid("boxes must be numbered from 1 without gaps");
    }
    if !state.times.keys().copied().eq(1..=count) {
        return invalid("every box needs exactly one period");
    }
    let periods: Vec<Period> = state.times.values().copied().collect();
    if periods[0] == 0 || periods.windows(2).any(|w| w[0] > w[1]) {
        return invalid("periods must be positive and must not decrease");
    }
    if state.session == 0 {
        return invalid("sessions start at 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::fs::write;

    use super::*;
    use crate::helper::HEADED_NOTES;
    use crate::helper::headed_config;
    use crate::helper::headed_model;
    use crate::helper::write_collection;

    const THREE: &str = "p1 : one\np2 : two\np3 : three\n";

    fn leitner(notes: &str) -> Fallible<Leitner> {
        Ok(Leitner::new(headed_model(notes)?).with_seed(3))
    }

    fn terms<T>(notes: impl IntoIterator<Item = T>) -> Vec<String>
    where
        T: std::ops::Deref<Target = Note>,
    {
        notes
            .into_iter()
            .map(|n| n.term().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_defaults() -> Fallible<()> {
        let leitner = leitner(THREE)?;
        assert_eq!(leitner.box_count(), 7);
        assert_eq!(
            leitner.times().values().copied().collect::<Vec<_>>(),
            DEFAULT_TIMES.to_vec()
        );
        assert_eq!(leitner.session(), 1);
        assert_eq!(terms(leitner.box_notes(1)), vec!["p1", "p2", "p3"]);
        Ok(())
    }

    #[test]
    fn test_promotion_scenario() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        let drawn: Vec<_> = leitner.generate(false).collect();
        assert_eq!(terms(drawn.iter().map(|n| &**n)), vec!["p1", "p2", "p3"]);
        assert_eq!(leitner.session(), 2);

        assert_eq!(leitner.correct(&drawn[0])?, 2);
        assert_eq!(leitner.incorrect(&drawn[1])?, 1);
        assert_eq!(leitner.correct(&drawn[2])?, 2);
        assert_eq!(terms(leitner.box_notes(1)), vec!["p2"]);
        assert_eq!(terms(leitner.box_notes(2)), vec!["p1", "p3"]);

        let mut second = terms(leitner.generate(false));
        second.sort();
        assert_eq!(second, vec!["p1", "p2", "p3"]);
        assert_eq!(leitner.session(), 3);

        // Session 3: 3 mod 2 != 0, so box 2 rests.
        assert_eq!(terms(leitner.generate(false)), vec!["p2"]);
        Ok(())
    }

    #[test]
    fn test_schedule() -> Fallible<()> {
        let text: String = (0..7).map(|i| format!("t{i} : d{i}\n")).collect();
        let mut leitner = leitner(&text)?;
        let model = Rc::clone(leitner.model());
        // Put the pair at nindex b - 1 into box b.
        for note in model.pairs() {
            for _ in 0..note.nindex() {
                leitner.correct(note)?;
            }
        }
        for session in 1..=60 {
            assert_eq!(leitner.session(), session);
            let drawn: Vec<NIndex> = leitner.generate(false).map(|n| n.nindex()).collect();
            let expected: Vec<NIndex> = (1..=7)
                .filter(|b| session % DEFAULT_TIMES[b - 1] == 0)
                .map(|b| b - 1)
                .collect();
            assert_eq!(drawn, expected);
        }
        Ok(())
    }

    #[test]
    fn test_partial_draw_keeps_session() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        let mut draw = leitner.generate(true);
        draw.next();
        drop(draw);
        assert_eq!(leitner.session(), 1);
        assert!(leitner.last().is_some());
        Ok(())
    }

    #[test]
    fn test_random_draw_is_a_permutation() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        let mut drawn = terms(leitner.generate(true));
        drawn.sort();
        assert_eq!(drawn, vec!["p1", "p2", "p3"]);
        Ok(())
    }

    #[test]
    fn test_progression_bounds() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        let model = Rc::clone(leitner.model());
        let p1 = model.note(0).unwrap();
        for expected in [2, 3, 4, 5, 6, 7, 7, 7] {
            assert_eq!(leitner.correct(p1)?, expected);
            assert_eq!(leitner.box_of(p1), Some(expected));
        }
        assert_eq!(leitner.incorrect(p1)?, 1);
        assert_eq!(leitner.box_of(p1), Some(1));
        assert_eq!(leitner.incorrect(p1)?, 1);
        assert_eq!(terms(leitner.box_notes(1)), vec!["p1", "p2", "p3"]);
        Ok(())
    }

    #[test]
    fn test_headings_are_not_boxed() -> Fallible<()> {
        let mut leitner = leitner(HEADED_NOTES)?;
        let model = Rc::clone(leitner.model());
        let heading = model.note(0).unwrap();
        assert_eq!(leitner.box_of(heading), None);
        assert_eq!(
            leitner.correct(heading),
            Err(LeitnerError::NotBoxed { nindex: 0 })
        );
        Ok(())
    }

    #[test]
    fn test_append_box() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        assert_eq!(
            leitner.append_box(29),
            Err(LeitnerError::TimeTooShort { time: 29, min: 30 })
        );
        assert_eq!(leitner.append_box(40)?, 8);
        assert_eq!(leitner.times()[&8], 40);
        assert_eq!(leitner.box_count(), 8);
        Ok(())
    }

    #[test]
    fn test_pop_box() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        let model = Rc::clone(leitner.model());
        let p1 = model.note(0).unwrap();
        for _ in 0..6 {
            leitner.correct(p1)?;
        }
        assert_eq!(leitner.box_of(p1), Some(7));
        leitner.pop_box()?;
        assert_eq!(leitner.box_of(p1), Some(6));
        assert_eq!(leitner.box_count(), 6);
        assert!(!leitner.times().contains_key(&7));
        for _ in 0..5 {
            leitner.pop_box()?;
        }
        assert_eq!(leitner.box_of(p1), Some(1));
        assert_eq!(leitner.pop_box(), Err(LeitnerError::LastBox));
        assert_eq!(terms(leitner.box_notes(1)), vec!["p1", "p2", "p3"]);
        Ok(())
    }

    #[test]
    fn test_edit_box() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        assert_eq!(
            leitner.edit_box(9, 4),
            Err(LeitnerError::UnknownBox { number: 9 })
        );
        assert_eq!(
            leitner.edit_box(3, 1),
            Err(LeitnerError::TimeTooShort { time: 1, min: 2 })
        );
        assert_eq!(
            leitner.edit_box(3, 6),
            Err(LeitnerError::TimeTooLong { time: 6, max: 5 })
        );
        assert_eq!(
            leitner.edit_box(1, 0),
            Err(LeitnerError::TimeTooShort { time: 0, min: 1 })
        );
        leitner.edit_box(3, 4)?;
        leitner.edit_box(7, 100)?;
        assert_eq!(leitner.times()[&3], 4);
        assert_eq!(leitner.times()[&7], 100);
        Ok(())
    }

    #[test]
    fn test_configured_times() -> Fallible<()> {
        let config = write_collection(
            "note_file = notes.txt\nseparator = :\nleitner_times = 1, 4, 9\n",
            THREE,
        )?;
        let leitner = Leitner::new(Rc::new(Model::load(config)?));
        assert_eq!(leitner.box_count(), 3);
        assert_eq!(leitner.times()[&2], 4);
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Fallible<()> {
        let config = headed_config(THREE)?;
        let model = Rc::new(Model::load(config.clone())?);
        let mut leitner = Leitner::new(Rc::clone(&model));
        leitner.correct(model.note(0).unwrap())?;
        leitner.correct(model.note(2).unwrap())?;
        leitner.correct(model.note(2).unwrap())?;
        leitner.edit_box(7, 31)?;
        leitner.generate(false).for_each(drop);
        leitner.save()?;

        let text = read_to_string(&config.leitner_file)?;
        assert!(text.contains("\"session\": 2"));
        assert!(text.contains("\"7\": 31"));

        let mut fresh = Leitner::new(model);
        assert!(fresh.load()?);
        assert_eq!(fresh.session(), 2);
        assert_eq!(fresh.times(), leitner.times());
        assert_eq!(fresh.box_sizes(), leitner.box_sizes());
        assert_eq!(terms(fresh.box_notes(1)), vec!["p2"]);
        assert_eq!(terms(fresh.box_notes(2)), vec!["p1"]);
        assert_eq!(terms(fresh.box_notes(3)), vec!["p3"]);
        Ok(())
    }

    #[test]
    fn test_load_drops_unknown_and_boxes_new() -> Fallible<()> {
        let config = headed_config(THREE)?;
        let state = r#"{
            "boxes": {"1": [], "2": ["p1 : one", "gone : away"]},
            "times": {"1": 1, "2": 3},
            "session": 4
        }"#;
        write(&config.leitner_file, state)?;
        let mut leitner = Leitner::new(Rc::new(Model::load(config)?));
        assert!(leitner.load()?);
        assert_eq!(leitner.box_count(), 2);
        assert_eq!(terms(leitner.box_notes(1)), vec!["p2", "p3"]);
        assert_eq!(terms(leitner.box_notes(2)), vec!["p1"]);
        assert_eq!(leitner.session(), 4);
        Ok(())
    }

    #[test]
    fn test_load_rejects_bad_state() -> Fallible<()> {
        let config = headed_config(THREE)?;
        let mut leitner = Leitner::new(Rc::new(Model::load(config.clone())?));
        let bad = [
            r#"{"boxes": {}, "times": {}, "session": 1}"#,
            r#"{"boxes": {"1": [], "3": []}, "times": {"1": 1, "3": 2}, "session": 1}"#,
            r#"{"boxes": {"1": [], "2": []}, "times": {"1": 1}, "session": 1}"#,
            r#"{"boxes": {"1": [], "2": []}, "times": {"1": 5, "2": 2}, "session": 1}"#,
            r#"{"boxes": {"1": []}, "times": {"1": 1}, "session": 0}"#,
        ];
        for state in bad {
            write(&config.leitner_file, state)?;
            assert!(leitner.load().is_err(), "accepted {state}");
        }
        assert_eq!(leitner.box_count(), 7);
        Ok(())
    }

    #[test]
    fn test_load_without_sidecar() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        assert!(!leitner.load()?);
        assert_eq!(leitner.box_count(), 7);
        Ok(())
    }

    #[test]
    fn test_reset() -> Fallible<()> {
        let mut leitner = leitner(THREE)?;
        let model = Rc::clone(leitner.model());
        leitner.correct(model.note(1).unwrap())?;
        leitner.pop_box()?;
        leitner.generate(false).for_each(drop);
        leitner.reset();
        assert_eq!(leitner.box_count(), 7);
        assert_eq!(leitner.session(), 1);
        assert_eq!(leitner.box_notes(1).len(), 3);
        Ok(())
    }

    #[test]
    fn test_refresh() -> Fallible<()> {
        let config = headed_config(THREE)?;
        let model = Rc::new(Model::load(config.clone())?);
        let mut leitner = Leitner::new(Rc::clone(&model));
        leitner.correct(model.note(0).unwrap())?;
        leitner.correct(model.note(2).unwrap())?;
        leitner.generate(false).for_each(drop);

        let rebuilt = Model::from_text(config, "p0 : zero\np1 : one\np3 : changed\n")?;
        leitner.refresh(Rc::new(rebuilt));
        assert_eq!(leitner.session(), 1);
        assert_eq!(terms(leitner.box_notes(1)), vec!["p0", "p3"]);
        assert_eq!(terms(leitner.box_notes(2)), vec!["p1"]);
        Ok(())
    }
}
