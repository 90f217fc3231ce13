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

//! Shared fixtures for unit tests.

use std::fs::write;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::tempdir;

use crate::config::Config;
use crate::error::Fallible;
use crate::model::Model;

/// Create a scratch directory that outlives the test's `TempDir` guard.
pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let dir = tempdir()?.keep();
    Ok(dir)
}

/// The S2 heading layout used across the engine tests.
pub const HEADED_NOTES: &str = "# A\n## A1\na : 1\n## A2\nb : 2\n# B\nc : 3\n";

/// Write `notes` and a matching config into a fresh directory and load the
/// configuration.
pub fn write_collection(config_text: &str, notes: &str) -> Fallible<Config> {
    let dir = create_tmp_directory()?;
    let config_path = dir.join("notes.cfg");
    write(&config_path, config_text)?;
    write(dir.join("notes.txt"), notes)?;
    Config::load(&config_path)
}

/// A collection with `:` pairs and two heading levels.
pub fn headed_config(notes: &str) -> Fallible<Config> {
    write_collection(
        "note_file = notes.txt\nseparator = :\nheading_char = #\nlevels = 2\nlevel_names = chapter, section\n",
        notes,
    )
}

/// Load a model from notes using [`headed_config`].
pub fn headed_model(notes: &str) -> Fallible<Rc<Model>> {
    let config = headed_config(notes)?;
    Ok(Rc::new(Model::load(config)?))
}
