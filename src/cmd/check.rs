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

use notecards_core::cleaner::load_lines;
use notecards_core::error::Fallible;
use notecards_core::model::Model;

use crate::cmd::open_collection;

pub fn check_collection(config: &str) -> Fallible<()> {
    let config = open_collection(config)?;
    let source = load_lines(&config)?;
    // A fatal error already carries the warnings that preceded it.
    let model = Model::build(config, &source.path, &source.lines)?;
    print!("{}", report(&model));
    Ok(())
}

fn report(model: &Model) -> String {
    let mut out = String::new();
    for warning in model.warnings() {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out.push_str(&format!(
        "ok: {} notes, {} pairs, {} headings, {} warnings\n",
        model.len(),
        model.pair_indexes().len(),
        model.heading_names().len(),
        model.warnings().len()
    ));
    out
}
