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

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;
use std::path::PathBuf;

use crate::cleaner::CleanLine;
use crate::config::CategorySpec;
use crate::config::Config;
use crate::config::ExtensionSpec;
use crate::types::note::Extension;
use crate::types::note::Note;
use crate::types::note::NoteKind;

/// A recoverable problem with a line. The line is still kept, demoted to
/// a plain note where it could not become a pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// More than one separator on the line.
    ExtraSeparator,
    /// Nothing after the separator.
    NoDefinition,
    /// Nothing before the separator.
    NoTerm,
    /// The term is already used by an earlier pair.
    DuplicateTerm { term: String },
    /// An opening bound with no closing bound after it.
    MissingBound { name: String },
    /// The exact line already appeared; the copy is dropped.
    DuplicateNote,
}

impl Display for WarningKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::ExtraSeparator => write!(f, "more than one separator"),
            WarningKind::NoDefinition => write!(f, "separator without a definition"),
            WarningKind::NoTerm => write!(f, "separator without a term"),
            WarningKind::DuplicateTerm { term } => write!(f, "duplicate term '{term}'"),
            WarningKind::MissingBound { name } => {
                write!(f, "extension '{name}' is missing its closing bound")
            }
            WarningKind::DuplicateNote => write!(f, "duplicate line dropped"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub line_num: usize,
    pub line: String,
}

impl Display for ParseWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}: '{}'",
            self.kind,
            self.line_num + 1,
            self.line
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParserErrorKind {
    /// A heading more than one level deeper than the previous heading.
    HeadingJump { from: usize, to: usize },
}

/// A fatal build error. Carries the warnings gathered before it so the
/// whole report can be shown at once.
#[derive(Debug)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub source_path: PathBuf,
    pub line_num: usize,
    pub line: String,
    pub warnings: Vec<ParseWarning>,
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        match self.kind {
            ParserErrorKind::HeadingJump { from, to } => write!(
                f,
                "Heading jumps from level {from} to level {to}: '{}'.",
                self.line
            )?,
        }
        write!(
            f,
            " Location: {}:{}",
            self.source_path.display(),
            self.line_num + 1
        )
    }
}

impl Error for ParserError {}

/// A line broken into its parts, before it becomes a note.
pub(crate) struct Scanned {
    pub heading: Option<(char, usize)>,
    pub content: String,
    pub extensions: Vec<Extension>,
    pub categories: Vec<String>,
}

/// Builds notes from cleaned lines in a single pass.
pub struct Parser<'c> {
    config: &'c Config,
    source_path: PathBuf,
}

struct State {
    notes: Vec<Note>,
    warnings: Vec<ParseWarning>,
    terms: HashSet<String>,
    rcontents: HashSet<String>,
    /// Level of the last heading; zero before the first one.
    level: usize,
}

impl<'c> Parser<'c> {
    pub fn new(config: &'c Config, source_path: &Path) -> Self {
        Parser {
            config,
            source_path: source_path.to_path_buf(),
        }
    }

    /// Parse all the notes in the given lines. Heading ranges are left
    /// open; the model closes them.
    pub fn parse(
        &self,
        lines: &[CleanLine],
    ) -> Result<(Vec<Note>, Vec<ParseWarning>), ParserError> {
        let mut state = State {
            notes: Vec::new(),
            warnings: Vec::new(),
            terms: HashSet::new(),
            rcontents: HashSet::new(),
            level: 0,
        };
        for line in lines {
            self.parse_line(line, &mut state)?;
        }
        Ok((state.notes, state.warnings))
    }

    fn parse_line(&self, line: &CleanLine, state: &mut State) -> Result<(), ParserError> {
        if state.rcontents.contains(&line.text) {
            state.warn(WarningKind::DuplicateNote, line);
            return Ok(());
        }

        let mut missing = Vec::new();
        let scanned = scan(self.config, &line.text, &mut missing);
        for name in missing {
            state.warn(WarningKind::MissingBound { name }, line);
        }

        let kind = match scanned.heading {
            Some((heading_char, level)) => {
                if level > state.level + 1 {
                    return Err(ParserError {
                        kind: ParserErrorKind::HeadingJump {
                            from: state.level,
                            to: level,
                        },
                        source_path: self.source_path.clone(),
                        line_num: line.line_num,
                        line: line.text.clone(),
                        warnings: std::mem::take(&mut state.warnings),
                    });
                }
                state.level = level;
                NoteKind::Heading {
                    heading_char,
                    level,
                    heading_name: scanned.content.clone(),
                    end_nindex: state.notes.len() + 1,
                }
            }
            None => match self.config.separator.as_deref() {
                Some(separator) => match split_pair(&scanned.content, separator) {
                    Ok(Some((term, definition))) => {
                        if state.terms.contains(&term) {
                            state.warn(WarningKind::DuplicateTerm { term }, line);
                            NoteKind::Line
                        } else {
                            state.terms.insert(term.clone());
                            NoteKind::Pair {
                                term,
                                definition,
                                separator: separator.to_string(),
                            }
                        }
                    }
                    Ok(None) => NoteKind::Line,
                    Err(kind) => {
                        state.warn(kind, line);
                        NoteKind::Line
                    }
                },
                None => NoteKind::Line,
            },
        };

        state.rcontents.insert(line.text.clone());
        state.notes.push(Note {
            nindex: state.notes.len(),
            content: scanned.content,
            rcontent: line.text.clone(),
            kind,
            extensions: scanned.extensions,
            category_names: scanned.categories,
        });
        Ok(())
    }
}

impl State {
    fn warn(&mut self, kind: WarningKind, line: &CleanLine) {
        self.warnings.push(ParseWarning {
            kind,
            line_num: line.line_num,
            line: line.text.clone(),
        });
    }
}

/// Strip the heading prefix, extensions and category prefixes from a line.
/// Names of extensions whose closing bound is missing go to `missing`.
pub(crate) fn scan(config: &Config, line: &str, missing: &mut Vec<String>) -> Scanned {
    let mut heading = None;
    let mut rest = line.to_string();
    if let Some(spec) = &config.headings {
        let count = line.chars().take_while(|&c| c == spec.heading_char).count();
        if count > 0 {
            let level = count.min(spec.levels);
            let prefix_len = level * spec.heading_char.len_utf8();
            rest = line[prefix_len..].trim_start().to_string();
            heading = Some((spec.heading_char, level));
        }
    }

    let mut extensions = Vec::new();
    for spec in &config.extensions {
        if let Err(name) = extract(spec, &mut rest, &mut extensions) {
            missing.push(name);
        }
    }

    let categories = strip_categories(&config.categories, config.category_stacking, &mut rest);

    Scanned {
        heading,
        content: rest,
        extensions,
        categories,
    }
}

/// Cut every occurrence of one extension out of `rest`, left to right.
/// Stops at the first opening bound with no closing bound.
fn extract(
    spec: &ExtensionSpec,
    rest: &mut String,
    extensions: &mut Vec<Extension>,
) -> Result<(), String> {
    while let Some(start) = rest.find(&spec.left_bound) {
        let inner_start = start + spec.left_bound.len();
        let Some(offset) = rest[inner_start..].find(&spec.right_bound) else {
            return Err(spec.name.clone());
        };
        let inner_end = inner_start + offset;
        let end = inner_end + spec.right_bound.len();
        extensions.push(Extension {
            content: rest[inner_start..inner_end].trim().to_string(),
            name: spec.name.clone(),
            left_bound: spec.left_bound.clone(),
            right_bound: spec.right_bound.clone(),
        });
        *rest = excise(rest, start, end);
    }
    Ok(())
}

/// Remove `text[start..end]`. Words on both sides are kept apart by a
/// single space; edges are trimmed.
fn excise(text: &str, start: usize, end: usize) -> String {
    let before = &text[..start];
    let after = &text[end..];
    let joins_words = before.chars().last().is_some_and(|c| !c.is_whitespace())
        && after.chars().next().is_some_and(|c| !c.is_whitespace());
    let joined = if joins_words {
        format!("{before} {after}")
    } else {
        format!("{before}{after}")
    };
    joined.trim().to_string()
}

fn strip_categories(
    categories: &[CategorySpec],
    stacking: bool,
    rest: &mut String,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    loop {
        let found = categories
            .iter()
            .find(|c| !names.contains(&c.name) && rest.starts_with(&c.prefix));
        let Some(category) = found else {
            break;
        };
        *rest = rest[category.prefix.len()..].trim_start().to_string();
        names.push(category.name.clone());
        if !stacking {
            break;
        }
    }
    names
}

/// Split `text` into a trimmed term and definition. `Ok(None)` when the
/// separator does not occur at all.
pub(crate) fn split_pair(
    text: &str,
    separator: &str,
) -> Result<Option<(String, String)>, WarningKind> {
    match text.matches(separator).count() {
        0 => Ok(None),
        1 => {
            let Some((term, definition)) = text.split_once(separator) else {
                return Ok(None);
            };
            let (term, definition) = (term.trim(), definition.trim());
            if term.is_empty() {
                Err(WarningKind::NoTerm)
            } else if definition.is_empty() {
                Err(WarningKind::NoDefinition)
            } else {
                Ok(Some((term.to_string(), definition.to_string())))
            }
        }
        _ => Err(WarningKind::ExtraSeparator),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::path::Path;

    use super::*;
    use crate::config::HeadingSpec;
    use crate::error::Fallible;
    use crate::helper::HEADED_NOTES;
    use crate::helper::headed_config;
    use crate::model::Model;
    use crate::types::note::Variant;

    fn make_config() -> Config {
        let mut config = Config::for_notes("notes.txt");
        config.separator = Some(":".to_string());
        config.headings = Some(HeadingSpec {
            heading_char: '#',
            levels: 2,
            level_names: vec!["chapter".to_string(), "section".to_string()],
        });
        config.extensions = vec![ExtensionSpec {
            name: "note".to_string(),
            left_bound: "[[".to_string(),
            right_bound: "]]".to_string(),
        }];
        config.categories = vec![
            CategorySpec {
                name: "important".to_string(),
                prefix: "!".to_string(),
            },
            CategorySpec {
                name: "review".to_string(),
                prefix: "?".to_string(),
            },
        ];
        config
    }

    fn parse(text: &str) -> Result<Model, ParserError> {
        Model::from_text(make_config(), text)
    }

    #[test]
    fn test_empty_string() -> Result<(), ParserError> {
        let model = parse("")?;
        assert!(model.is_empty());
        Ok(())
    }

    #[test]
    fn test_whitespace_string() -> Result<(), ParserError> {
        let model = parse("\n   \n\t\n")?;
        assert!(model.is_empty());
        Ok(())
    }

    #[test]
    fn test_basic_pair() -> Result<(), ParserError> {
        let model = parse("apple : red fruit")?;
        assert_eq!(model.len(), 1);
        let note = &model.notes()[0];
        assert_eq!(note.nindex(), 0);
        assert_eq!(note.variant(), Variant::Pair);
        assert_eq!(note.term(), Some("apple"));
        assert_eq!(note.definition(), Some("red fruit"));
        assert_eq!(note.separator(), Some(":"));
        assert_eq!(note.content(), "apple : red fruit");
        assert_eq!(note.rcontent(), "apple : red fruit");
        Ok(())
    }

    #[test]
    fn test_plain_line() -> Result<(), ParserError> {
        let model = parse("just a thought")?;
        assert_eq!(model.notes()[0].variant(), Variant::Line);
        assert!(model.pairs().is_empty());
        Ok(())
    }

    #[test]
    fn test_pairs_disabled_without_separator() -> Result<(), ParserError> {
        let model = Model::from_text(Config::for_notes("n.txt"), "apple : red")?;
        assert_eq!(model.notes()[0].variant(), Variant::Line);
        Ok(())
    }

    #[test]
    fn test_heading() -> Result<(), ParserError> {
        let model = parse("#   Cells\n## Membranes")?;
        let cells = &model.notes()[0];
        assert_eq!(cells.heading_name(), Some("Cells"));
        assert_eq!(cells.content(), "Cells");
        assert_eq!(cells.level(), Some(1));
        assert_eq!(cells.heading_char(), Some('#'));
        assert_eq!(model.notes()[1].level(), Some(2));
        Ok(())
    }

    #[test]
    fn test_heading_level_is_capped() -> Result<(), ParserError> {
        let model = parse("# A\n## B\n#### deep")?;
        let deep = &model.notes()[2];
        assert_eq!(deep.level(), Some(2));
        assert_eq!(deep.heading_name(), Some("## deep"));
        Ok(())
    }

    #[test]
    fn test_heading_wins_over_pair() -> Result<(), ParserError> {
        let model = parse("# term : definition")?;
        let note = &model.notes()[0];
        assert!(note.is_heading());
        assert_eq!(note.heading_name(), Some("term : definition"));
        assert!(model.pairs().is_empty());
        Ok(())
    }

    #[test]
    fn test_heading_jump() -> Result<(), ParserError> {
        // `levels` caps ### at 2, which is a legal step from 1.
        let model = parse("# A\n### C")?;
        assert_eq!(model.notes()[1].level(), Some(2));
        let mut config = make_config();
        config.headings = Some(HeadingSpec {
            heading_char: '#',
            levels: 3,
            level_names: vec!["a".into(), "b".into(), "c".into()],
        });
        let err = Model::from_text(config, "x : 1\n# A\n### C").unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::HeadingJump { from: 1, to: 3 });
        assert_eq!(err.line_num, 2);
        assert!(err.to_string().ends_with("Location: notes.txt:3"));
        Ok(())
    }

    #[test]
    fn test_first_heading_must_be_level_one() {
        let err = parse("## orphan").unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::HeadingJump { from: 0, to: 2 });
    }

    #[test]
    fn test_heading_may_climb_back_up() -> Result<(), ParserError> {
        let model = parse("# A\n## B\n# C\n## D")?;
        assert_eq!(model.heading_order().len(), 4);
        Ok(())
    }

    #[test]
    fn test_extension_extraction() -> Result<(), ParserError> {
        let model = parse("x : y [[hello]] z")?;
        let note = &model.notes()[0];
        assert_eq!(note.content(), "x : y  z");
        assert_eq!(note.extensions().len(), 1);
        assert_eq!(note.extensions()[0].name, "note");
        assert_eq!(note.extensions()[0].content, "hello");
        assert_eq!(note.term(), Some("x"));
        assert_eq!(note.definition(), Some("y  z"));
        assert_eq!(note.rcontent(), "x : y [[hello]] z");
        Ok(())
    }

    #[test]
    fn test_extension_at_edges_and_between_words() -> Result<(), ParserError> {
        let model = parse("[[ first ]]a[[mid]]b [[last]]")?;
        let note = &model.notes()[0];
        assert_eq!(note.content(), "a b");
        let contents: Vec<&str> = note.extensions().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "mid", "last"]);
        Ok(())
    }

    #[test]
    fn test_extensions_in_declaration_order() -> Result<(), ParserError> {
        let mut config = make_config();
        config.extensions.push(ExtensionSpec {
            name: "ref".to_string(),
            left_bound: "{{".to_string(),
            right_bound: "}}".to_string(),
        });
        let model = Model::from_text(config, "{{r1}} a [[n1]] b {{r2}} [[n2]]")?;
        let note = &model.notes()[0];
        let names: Vec<(&str, &str)> = note
            .extensions()
            .iter()
            .map(|e| (e.name.as_str(), e.content.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("note", "n1"), ("note", "n2"), ("ref", "r1"), ("ref", "r2")]
        );
        assert_eq!(note.extension_names(), vec!["note", "ref"]);
        assert_eq!(note.content(), "a  b");
        Ok(())
    }

    #[test]
    fn test_missing_bound() -> Result<(), ParserError> {
        let model = parse("a [[one]] b [[ two")?;
        let note = &model.notes()[0];
        assert_eq!(note.extensions().len(), 1);
        assert_eq!(note.content(), "a  b [[ two");
        assert_eq!(
            model.warnings()[0].kind,
            WarningKind::MissingBound {
                name: "note".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn test_category() -> Result<(), ParserError> {
        let model = parse("! mitosis : cell division\nplain : line")?;
        let note = &model.notes()[0];
        assert_eq!(note.category_names(), &["important".to_string()]);
        assert_eq!(note.content(), "mitosis : cell division");
        assert_eq!(note.term(), Some("mitosis"));
        let tagged = model.category("important");
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].nindex(), 0);
        assert!(model.category("review").is_empty());
        assert!(model.has_category("review"));
        Ok(())
    }

    #[test]
    fn test_categories_do_not_stack_by_default() -> Result<(), ParserError> {
        let model = parse("!? both")?;
        let note = &model.notes()[0];
        assert_eq!(note.category_names(), &["important".to_string()]);
        assert_eq!(note.content(), "? both");
        Ok(())
    }

    #[test]
    fn test_categories_stack_when_enabled() -> Result<(), ParserError> {
        let mut config = make_config();
        config.category_stacking = true;
        let model = Model::from_text(config, "? ! both")?;
        let note = &model.notes()[0];
        assert_eq!(
            note.category_names(),
            &["review".to_string(), "important".to_string()]
        );
        assert_eq!(note.content(), "both");
        Ok(())
    }

    #[test]
    fn test_category_on_heading() -> Result<(), ParserError> {
        let model = parse("# ! Key ideas")?;
        let note = &model.notes()[0];
        assert_eq!(note.heading_name(), Some("Key ideas"));
        assert!(note.has_category("important"));
        Ok(())
    }

    #[test]
    fn test_extra_separator() -> Result<(), ParserError> {
        let model = parse("a : b : c")?;
        assert_eq!(model.notes()[0].variant(), Variant::Line);
        assert_eq!(model.warnings()[0].kind, WarningKind::ExtraSeparator);
        assert_eq!(model.warnings()[0].line, "a : b : c");
        Ok(())
    }

    #[test]
    fn test_no_definition() -> Result<(), ParserError> {
        let model = parse("lonely :")?;
        assert_eq!(model.notes()[0].variant(), Variant::Line);
        assert_eq!(model.warnings()[0].kind, WarningKind::NoDefinition);
        Ok(())
    }

    #[test]
    fn test_no_term() -> Result<(), ParserError> {
        let model = parse(": orphan definition")?;
        assert_eq!(model.warnings()[0].kind, WarningKind::NoTerm);
        Ok(())
    }

    #[test]
    fn test_duplicate_term() -> Result<(), ParserError> {
        let model = parse("a : 1\nb : 2\na : 3")?;
        assert_eq!(model.pairs().len(), 2);
        assert_eq!(model.notes()[2].variant(), Variant::Line);
        assert_eq!(
            model.warnings()[0],
            ParseWarning {
                kind: WarningKind::DuplicateTerm {
                    term: "a".to_string()
                },
                line_num: 2,
                line: "a : 3".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_terms_are_case_sensitive() -> Result<(), ParserError> {
        let model = parse("a : 1\nA : 2")?;
        assert_eq!(model.pairs().len(), 2);
        assert!(model.warnings().is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_line_is_dropped() -> Result<(), ParserError> {
        let model = parse("a : 1\nnote\na : 1\nb : 2")?;
        assert_eq!(model.len(), 3);
        assert_eq!(model.notes()[2].term(), Some("b"));
        assert_eq!(model.notes()[2].nindex(), 2);
        assert_eq!(model.warnings()[0].kind, WarningKind::DuplicateNote);
        Ok(())
    }

    #[test]
    fn test_warnings_are_carried_into_fatal_error() {
        let err = parse("a : b : c\n## C").unwrap_err();
        assert_eq!(err.warnings.len(), 1);
        let report = err.to_string();
        assert!(report.starts_with("warning: more than one separator at line 1"));
        assert!(report.contains("Heading jumps from level 0 to level 2"));
    }

    #[test]
    fn test_rcontent_unique_and_nindex_dense() -> Result<(), ParserError> {
        let model = parse("# A\nx\nx\na : 1\n## B\nb : 2\nx\n# C")?;
        let mut seen = HashSet::new();
        for (i, note) in model.notes().iter().enumerate() {
            assert_eq!(note.nindex(), i);
            assert!(seen.insert(note.rcontent().to_string()));
        }
        Ok(())
    }

    #[test]
    fn test_roundtrip_through_reformat() -> Fallible<()> {
        let config = headed_config(HEADED_NOTES)?;
        let first = Model::load(config.clone())?;
        first.reformat()?;
        let text = read_to_string(&config.nu_file)?;
        let second = Model::from_text(config, &text)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_error_location_uses_source_path() {
        let config = make_config();
        let lines = vec![CleanLine::new(4, "## B")];
        let err = Model::build(config, Path::new("bio.nu"), &lines).unwrap_err();
        assert!(err.to_string().ends_with("Location: bio.nu:5"));
    }
}
