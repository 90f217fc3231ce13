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

use std::fs::copy;
use std::fs::read_dir;
use std::path::PathBuf;

use notecards_core::error::Fallible;
use tempfile::tempdir;

/// Copy the `test` fixture collection into a scratch directory and return
/// the path of its config file.
pub fn create_tmp_copy_of_test_directory() -> Fallible<String> {
    let dir: PathBuf = tempdir()?.keep();
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test");
    for entry in read_dir(fixture)? {
        let entry = entry?;
        copy(entry.path(), dir.join(entry.file_name()))?;
    }
    Ok(dir.join("biology.cfg").display().to_string())
}
