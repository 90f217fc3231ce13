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

pub mod check;
pub mod export;
pub mod reformat;
pub mod stats;

use std::path::Path;

use log::debug;
use notecards_core::config::Config;
use notecards_core::error::Fallible;
use notecards_core::error::fail;

/// Load the config file of a collection.
pub fn open_collection(config: &str) -> Fallible<Config> {
    let path = Path::new(config);
    if !path.exists() {
        return fail("config file does not exist.");
    }
    debug!("using config {}", path.display());
    Config::load(path)
}
