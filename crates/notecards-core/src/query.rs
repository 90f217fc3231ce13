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

//! Attribute lookups over the notes of a model.

use std::borrow::Cow;

use crate::model::Model;
use crate::types::note::Note;

/// A queryable note attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Content,
    RContent,
    NIndex,
    /// `"line"`, `"pair"` or `"heading"`.
    Variant,
    Term,
    Definition,
    Separator,
    HeadingChar,
    Level,
    HeadingName,
    BeginNIndex,
    EndNIndex,
    ExtensionNames,
    CategoryNames,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compare {
    #[default]
    Equals,
    /// Equality after case folding.
    Similar,
    /// Substring of a text attribute, or member of a list attribute.
    In,
    /// `In` after case folding.
    SimilarIn,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

/// A queried value. `List` compares against the list attributes, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(usize),
    List(Vec<String>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value)
    }
}

/// An attribute as read off a note.
enum Field<'a> {
    Text(Cow<'a, str>),
    Int(usize),
    List(Vec<&'a str>),
}

fn text(s: &str) -> Field<'_> {
    Field::Text(Cow::Borrowed(s))
}

fn field(note: &Note, attr: Attribute) -> Option<Field<'_>> {
    match attr {
        Attribute::Content => Some(text(note.content())),
        Attribute::RContent => Some(text(note.rcontent())),
        Attribute::NIndex => Some(Field::Int(note.nindex())),
        Attribute::Variant => Some(text(note.variant().as_str())),
        Attribute::Term => note.term().map(text),
        Attribute::Definition => note.definition().map(text),
        Attribute::Separator => note.separator().map(text),
        Attribute::HeadingChar => note
            .heading_char()
            .map(|c| Field::Text(Cow::Owned(c.to_string()))),
        Attribute::Level => note.level().map(Field::Int),
        Attribute::HeadingName => note.heading_name().map(text),
        Attribute::BeginNIndex => note.begin_nindex().map(Field::Int),
        Attribute::EndNIndex => note.end_nindex().map(Field::Int),
        Attribute::ExtensionNames => Some(Field::List(note.extension_names())),
        Attribute::CategoryNames => Some(Field::List(
            note.category_names().iter().map(String::as_str).collect(),
        )),
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Compare one attribute against a queried value. Absent attributes and
/// mismatched kinds never match.
fn compare_field(field: Option<Field<'_>>, value: &Value, compare: Compare) -> bool {
    let Some(field) = field else {
        return false;
    };
    match (compare, &field, value) {
        (Compare::Equals, Field::Text(a), Value::Text(b)) => a == b,
        (Compare::Equals, Field::Int(a), Value::Int(b)) => a == b,
        (Compare::Equals, Field::List(a), Value::List(b)) => {
            a.iter().copied().eq(b.iter().map(String::as_str))
        }
        (Compare::Similar, Field::Text(a), Value::Text(b)) => fold(a) == fold(b),
        (Compare::Similar, Field::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| fold(x) == fold(y))
        }
        (Compare::In, Field::Text(a), Value::Text(b)) => a.contains(b.as_str()),
        (Compare::In, Field::List(a), Value::Text(b)) => a.contains(&b.as_str()),
        (Compare::SimilarIn, Field::Text(a), Value::Text(b)) => fold(a).contains(&fold(b)),
        (Compare::SimilarIn, Field::List(a), Value::Text(b)) => {
            let b = fold(b);
            a.iter().any(|x| fold(x) == b)
        }
        (Compare::Less, Field::Int(a), Value::Int(b)) => a < b,
        (Compare::LessOrEqual, Field::Int(a), Value::Int(b)) => a <= b,
        (Compare::Greater, Field::Int(a), Value::Int(b)) => a > b,
        (Compare::GreaterOrEqual, Field::Int(a), Value::Int(b)) => a >= b,
        _ => false,
    }
}

/// A predicate matching notes on which every attribute compares true.
pub fn predicate(
    attrs: &[(Attribute, Value)],
    compare: Compare,
) -> impl Fn(&Note) -> bool + '_ {
    move |note| {
        attrs
            .iter()
            .all(|(attr, value)| compare_field(field(note, *attr), value, compare))
    }
}

/// Lookups over one model.
pub struct Query<'m> {
    model: &'m Model,
}

impl<'m> Query<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    /// The first note matching all attributes.
    pub fn get(&self, attrs: &[(Attribute, Value)], compare: Compare) -> Option<&'m Note> {
        let matches = predicate(attrs, compare);
        self.model.notes().iter().find(|&note| matches(note))
    }

    /// Every note matching all attributes, in nindex order.
    pub fn get_list(&self, attrs: &[(Attribute, Value)], compare: Compare) -> Vec<&'m Note> {
        let matches = predicate(attrs, compare);
        self.model
            .notes()
            .iter()
            .filter(|&note| matches(note))
            .collect()
    }
}
