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

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::rc::Rc;

use clap::ValueEnum;
use serde::Serialize;

use notecards_core::error::Fallible;
use notecards_core::leitner::Leitner;
use notecards_core::model::Model;
use notecards_core::quiz::Division;
use notecards_core::quiz::Quiz;
use notecards_core::types::aliases::BoxNumber;
use notecards_core::types::aliases::Session;

use crate::cmd::open_collection;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StatsFormat {
    Text,
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct Stats {
    notes: usize,
    pairs: usize,
    lines: usize,
    warnings: usize,
    /// Level name to the number of headings at that level.
    headings: BTreeMap<String, usize>,
    /// Category name to the number of notes in it.
    categories: BTreeMap<String, usize>,
    quiz: Option<QuizStats>,
    leitner: Option<LeitnerStats>,
}

#[derive(Debug, Serialize)]
struct QuizStats {
    correct: usize,
    incorrect: usize,
    unmarked: usize,
}

#[derive(Debug, Serialize)]
struct LeitnerStats {
    session: Session,
    boxes: BTreeMap<BoxNumber, usize>,
}

pub fn print_stats(config: &str, format: StatsFormat) -> Fallible<()> {
    let config = open_collection(config)?;
    let model = Rc::new(Model::load(config)?);
    let stats = collect_stats(model)?;
    match format {
        StatsFormat::Text => print!("{}", render_text(&stats)),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

fn collect_stats(model: Rc<Model>) -> Fallible<Stats> {
    let headings = match &model.config().headings {
        Some(spec) => spec
            .level_names
            .iter()
            .map(|name| (name.clone(), model.heading_level(name).len()))
            .collect(),
        None => BTreeMap::new(),
    };
    let categories = model
        .category_names()
        .into_iter()
        .map(|name| (name.to_string(), model.category(name).len()))
        .collect();

    let mut quiz = Quiz::new(Rc::clone(&model));
    let quiz = if quiz.load()? {
        quiz.select_pairs(Division::Unmarked)?;
        Some(QuizStats {
            correct: quiz.correct().len(),
            incorrect: quiz.incorrect().len(),
            unmarked: quiz.pairs().len(),
        })
    } else {
        None
    };

    let mut leitner = Leitner::new(Rc::clone(&model));
    let leitner = if leitner.load()? {
        Some(LeitnerStats {
            session: leitner.session(),
            boxes: leitner.box_sizes(),
        })
    } else {
        None
    };

    let pairs = model.pair_indexes().len();
    let headings_total = model.heading_names().len();
    Ok(Stats {
        notes: model.len(),
        pairs,
        lines: model.len() - pairs - headings_total,
        warnings: model.warnings().len(),
        headings,
        categories,
        quiz,
        leitner,
    })
}

fn render_text(stats: &Stats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Notes: {}\n", stats.notes));
    out.push_str(&format!("Pairs: {}\n", stats.pairs));
    out.push_str(&format!("Lines: {}\n", stats.lines));
    out.push_str(&format!("Warnings: {}\n", stats.warnings));
    for (name, count) in &stats.headings {
        out.push_str(&format!("Headings ({name}): {count}\n"));
    }
    for (name, count) in &stats.categories {
        out.push_str(&format!("Category {name}: {count}\n"));
    }
    if let Some(quiz) = &stats.quiz {
        out.push_str(&format!(
            "Quiz: {} correct, {} incorrect, {} unmarked\n",
            quiz.correct, quiz.incorrect, quiz.unmarked
        ));
    }
    if let Some(leitner) = &stats.leitner {
        let boxes: Vec<String> = leitner
            .boxes
            .iter()
            .map(|(number, size)| format!("{number}:{size}"))
            .collect();
        out.push_str(&format!(
            "Leitner: session {}, boxes {}\n",
            leitner.session,
            boxes.join(" ")
        ));
    }
    out
}
