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

use std::fs::write;

use notecards_core::error::Fallible;
use notecards_core::model::Model;

use crate::cmd::open_collection;

pub fn export_collection(config: &str, output: Option<String>) -> Fallible<()> {
    let config = open_collection(config)?;
    let model = Model::load(config)?;
    let json = serde_json::to_string_pretty(&model)?;
    match output {
        Some(path) => write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
