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

//! Single-pass draws of notes for the review engines.

use std::cell::Cell;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::ops::Deref;
use std::rc::Rc;
use std::vec::IntoIter;

use crate::model::Model;
use crate::types::aliases::NIndex;
use crate::types::aliases::Session;
use crate::types::note::Note;

/// A note handed out by a draw. Keeps its model alive and derefs to the
/// note itself.
#[derive(Clone)]
pub struct NoteRef {
    model: Rc<Model>,
    nindex: NIndex,
}

impl NoteRef {
    pub fn model(&self) -> &Rc<Model> {
        &self.model
    }
}

impl Deref for NoteRef {
    type Target = Note;

    fn deref(&self) -> &Note {
        &self.model.notes()[self.nindex]
    }
}

impl Debug for NoteRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteRef")
            .field("nindex", &self.nindex)
            .field("rcontent", &self.rcontent())
            .finish()
    }
}

/// The notes of one `generate` call, in the order fixed when it started.
pub struct Draw {
    model: Rc<Model>,
    order: IntoIter<NIndex>,
    last: Rc<Cell<Option<NIndex>>>,
    /// Bumped once, the first time the draw runs dry.
    session: Option<Rc<Cell<Session>>>,
}

impl Draw {
    pub(crate) fn new(
        model: Rc<Model>,
        order: Vec<NIndex>,
        last: Rc<Cell<Option<NIndex>>>,
        session: Option<Rc<Cell<Session>>>,
    ) -> Self {
        Self {
            model,
            order: order.into_iter(),
            last,
            session,
        }
    }
}

impl Iterator for Draw {
    type Item = NoteRef;

    fn next(&mut self) -> Option<NoteRef> {
        match self.order.next() {
            Some(nindex) => {
                self.last.set(Some(nindex));
                Some(NoteRef {
                    model: Rc::clone(&self.model),
                    nindex,
                })
            }
            None => {
                if let Some(session) = self.session.take() {
                    session.set(session.get() + 1);
                }
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}
