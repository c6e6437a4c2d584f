//! Compiler output parsing.
//!
//! Each line of compiler output is classified by an ordered list of grammars;
//! the first grammar that matches wins. Lines no grammar recognises are
//! translation-unit boundaries, section ends or message continuations
//! depending on the scan state.
//!
//! Recognised shapes (MSVC):
//!
//! ```text
//! <file>(<line>,<col>): error C<nnnn>: <message>
//! <file>[(<line>,<col>)] : fatal error C<nnnn>: <message>
//! <file>(<line>,<col>): warning C<nnnn>: <message>
//! <file>(<line>,<col>): note: <message>
//! <file>(<line>,<col>): <category>: <message>
//! ```

use super::config::FatalWithoutLocation;
use super::diagnostic::{Diagnostic, RelatedLocation, SOURCE_TAG, Severity};
use super::rebase::Rebase;
use crate::document::{Document, Position};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ERROR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*[^\(\)]*)\(([0-9]+),?([0-9]*)\): error C[0-9]{4,}: (.*)").unwrap());
static FATAL_ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\(\)]*)(\(([0-9]+),?([0-9]*)\))? ?: fatal error C[0-9]{4,}: (.*)").unwrap()
});
static WARNING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*[^\(\)]*)\(([0-9]+),?([0-9]*)\): warning C[0-9]{4,}: (.*)").unwrap());
static NOTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*[^\(\)]*)\(([0-9]+),?([0-9]*)\): note: (.*)").unwrap());
static UNKNOWN_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*[^\(\)]*)\(([0-9]+),?([0-9]*)\): ([^:]*): (.*)").unwrap());

/// File and 1-based line/column as written by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub file: &'a str,
    pub line: usize,
    pub column: Option<usize>,
}

/// Classification of one output line that matched a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Error {
        location: Location<'a>,
        message: &'a str,
    },
    /// `text` is the whole line.
    FatalError {
        location: Option<Location<'a>>,
        text: &'a str,
    },
    Warning {
        location: Location<'a>,
        message: &'a str,
    },
    /// `text` is the whole line.
    Note {
        location: Location<'a>,
        message: &'a str,
        text: &'a str,
    },
    Unknown {
        location: Location<'a>,
        category: &'a str,
        message: &'a str,
    },
}

type Classifier = for<'a> fn(&'a str) -> Option<LineKind<'a>>;

/// Grammars in precedence order.
const CLASSIFIERS: &[Classifier] = &[
    classify_error,
    classify_fatal_error,
    classify_warning,
    classify_note,
    classify_unknown,
];

/// Classify a line against every grammar, first match wins.
pub fn classify(line: &str) -> Option<LineKind<'_>> {
    CLASSIFIERS.iter().find_map(|classifier| classifier(line))
}

fn location<'a>(caps: &Captures<'a>, file: usize, line: usize, column: usize) -> Option<Location<'a>> {
    Some(Location {
        file: caps.get(file)?.as_str(),
        line: caps.get(line)?.as_str().parse().ok()?,
        column: caps
            .get(column)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok()),
    })
}

fn classify_error(line: &str) -> Option<LineKind<'_>> {
    let caps = ERROR_LINE.captures(line)?;
    Some(LineKind::Error {
        location: location(&caps, 1, 2, 3)?,
        message: caps.get(4)?.as_str(),
    })
}

fn classify_fatal_error(line: &str) -> Option<LineKind<'_>> {
    let caps = FATAL_ERROR_LINE.captures(line)?;
    let location = match caps.get(2) {
        Some(_) => Some(location(&caps, 1, 3, 4)?),
        None => None,
    };
    Some(LineKind::FatalError { location, text: line })
}

fn classify_warning(line: &str) -> Option<LineKind<'_>> {
    let caps = WARNING_LINE.captures(line)?;
    Some(LineKind::Warning {
        location: location(&caps, 1, 2, 3)?,
        message: caps.get(4)?.as_str(),
    })
}

fn classify_note(line: &str) -> Option<LineKind<'_>> {
    let caps = NOTE_LINE.captures(line)?;
    Some(LineKind::Note {
        location: location(&caps, 1, 2, 3)?,
        message: caps.get(4)?.as_str(),
        text: line,
    })
}

fn classify_unknown(line: &str) -> Option<LineKind<'_>> {
    let caps = UNKNOWN_LINE.captures(line)?;
    Some(LineKind::Unknown {
        location: location(&caps, 1, 2, 3)?,
        category: caps.get(4)?.as_str(),
        message: caps.get(5)?.as_str(),
    })
}

/// Scan state threaded through the lines of one compiler run.
#[derive(Debug, Clone, Default)]
pub struct ParserState {
    /// Name echoed by the compiler for the translation unit being reported,
    /// empty when no unit is open.
    pub tu_file_leaf: String,
    /// Index into `diagnostics` of the most recently emitted diagnostic.
    pub last: Option<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParserState {
    pub fn last_diagnostic(&self) -> Option<&Diagnostic> {
        self.last.and_then(|i| self.diagnostics.get(i))
    }

    fn last_diagnostic_mut(&mut self) -> Option<&mut Diagnostic> {
        self.last.and_then(|i| self.diagnostics.get_mut(i))
    }
}

/// Turns compiler output for one fragment into document diagnostics.
pub struct DiagnosticParser<'a> {
    document: &'a dyn Document,
    rebase: &'a Rebase,
    source_tag: String,
    fatal_without_location: FatalWithoutLocation,
}

impl<'a> DiagnosticParser<'a> {
    pub fn new(document: &'a dyn Document, rebase: &'a Rebase) -> Self {
        Self {
            document,
            rebase,
            source_tag: SOURCE_TAG.to_string(),
            fatal_without_location: FatalWithoutLocation::default(),
        }
    }

    pub fn with_source_tag(mut self, source_tag: impl Into<String>) -> Self {
        self.source_tag = source_tag.into();
        self
    }

    pub fn with_fatal_without_location(mut self, policy: FatalWithoutLocation) -> Self {
        self.fatal_without_location = policy;
        self
    }

    /// Parse newline-delimited compiler output. Diagnostics come back in the
    /// order the compiler reported them.
    pub fn parse(&self, text: &str) -> Vec<Diagnostic> {
        text.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .fold(ParserState::default(), |state, line| self.step(state, line))
            .diagnostics
    }

    /// Advance the scan by one line.
    pub fn step(&self, mut state: ParserState, line: &str) -> ParserState {
        match classify(line) {
            Some(LineKind::Error { location, message }) => {
                log::debug!("Found error line: {line}");
                let position = self.position(&location);
                self.emit(&mut state, Severity::Error, position, message);
            }
            Some(LineKind::FatalError { location, text }) => {
                log::debug!("Found fatal error line: {line}");
                match (location, self.fatal_without_location) {
                    (Some(location), _) => {
                        let position = self.position(&location);
                        self.emit(&mut state, Severity::Error, position, text);
                    }
                    (None, FatalWithoutLocation::Skip) => {
                        log::warn!("Fatal error without a location is not reported: {text}");
                    }
                    (None, FatalWithoutLocation::DocumentStart) => {
                        let position = self.document.position_at(1, 0);
                        self.emit(&mut state, Severity::Error, position, text);
                    }
                }
            }
            Some(LineKind::Warning { location, message }) => {
                log::debug!("Found warning line: {line}");
                let position = self.position(&location);
                self.emit(&mut state, Severity::Warning, position, message);
            }
            Some(LineKind::Note { location, message, text }) => {
                self.attach_note(&mut state, &location, message, text);
            }
            Some(LineKind::Unknown {
                location,
                category,
                message,
            }) => {
                log::warn!("Unrecognized diagnostic category '{category}': {line}");
                let position = self.position(&location);
                self.emit(&mut state, Severity::Error, position, message);
            }
            None => self.unmatched(&mut state, line),
        }
        state
    }

    fn emit(&self, state: &mut ParserState, severity: Severity, position: Position, message: &str) {
        let mut diagnostic = Diagnostic::new(severity, position, message);
        diagnostic.source.clone_from(&self.source_tag);
        state.diagnostics.push(diagnostic);
        state.last = Some(state.diagnostics.len() - 1);
    }

    /// Notes in the document become related locations of the last diagnostic;
    /// notes elsewhere (system headers) extend its message.
    fn attach_note(&self, state: &mut ParserState, location: &Location<'_>, message: &str, text: &str) {
        let related = self
            .rebase
            .is_document_file(location.file, self.document.identity())
            .then(|| self.position(location));

        let Some(last) = state.last_diagnostic_mut() else {
            log::error!("Note without a preceding diagnostic, dropped: {text}");
            return;
        };

        match related {
            Some(position) => {
                log::debug!("Found related location: {text}");
                last.related.push(RelatedLocation {
                    position,
                    message: message.to_string(),
                });
            }
            None => {
                log::debug!("Found note outside the document: {text}");
                last.push_message_line(text);
            }
        }
    }

    fn unmatched(&self, state: &mut ParserState, line: &str) {
        if state.tu_file_leaf.is_empty() {
            log::debug!("Found new translation unit: {line}");
            state.tu_file_leaf = line.to_string();
        } else if line.is_empty() {
            log::debug!("Found end of translation unit {}", state.tu_file_leaf);
            state.tu_file_leaf.clear();
        } else {
            match state.last_diagnostic_mut() {
                Some(last) => last.push_message_line(line),
                None => log::error!("Continuation without a preceding diagnostic, dropped: {line}"),
            }
        }
    }

    fn position(&self, location: &Location<'_>) -> Position {
        let (line, column) = self
            .rebase
            .rebased_position(location.line, location.column.unwrap_or(1));
        if line == 0 || line > self.document.line_count() {
            log::warn!(
                "Line {line} from {} is outside {}, clamping",
                location.file,
                self.document.identity()
            );
        }
        self.document.position_at(line, column.saturating_sub(1))
    }
}
