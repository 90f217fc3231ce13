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

//! notecards-core: the note model and review engines behind notecards.
//!
//! This library provides:
//! - Configuration loading and the lexical cleaner for notes files
//! - Parsing notes into lines, term/definition pairs and headings
//! - Attribute queries and in-place editing of the model
//! - Quiz and Leitner review engines with JSON sidecar persistence

pub mod cleaner;
pub mod config;
pub mod draw;
pub mod editor;
pub mod error;
pub mod leitner;
pub mod model;
pub mod parser;
pub mod query;
pub mod quiz;
pub mod rng;
pub mod storage;
pub mod types;

#[cfg(test)]
mod helper;

// Re-exports for convenience
pub use config::Config;
pub use draw::{Draw, NoteRef};
pub use editor::EditError;
pub use error::{ErrorReport, Fallible, fail};
pub use leitner::{Leitner, LeitnerError};
pub use model::Model;
pub use parser::{ParseWarning, ParserError, WarningKind};
pub use query::{Attribute, Compare, Query, Value};
pub use quiz::{Division, Quiz, QuizError};
pub use types::note::{Extension, Note, NoteKind, Variant};
