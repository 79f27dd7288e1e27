//! Diagnostics — Semantic error reporting.
//!
//! Every way compilation can fail is a [`DiagnosticKind`] with a stable
//! snake_case code. A [`Diagnostic`] attaches the kind to a file location,
//! except for the single global diagnostic (`missing_study_def`) which has none.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::base::{FileName, Location};
use crate::syntax::ParseError;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Whether a diagnostic belongs to a file or to the whole compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Global,
    Local,
}

/// Kind of named definition a diagnostic refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefType {
    Study,
    Milestone,
    Codelist,
    Interface,
    Dataset,
    Column,
}

impl DefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefType::Study => "study",
            DefType::Milestone => "milestone",
            DefType::Codelist => "codelist",
            DefType::Interface => "interface",
            DefType::Dataset => "dataset",
            DefType::Column => "column",
        }
    }
}

impl fmt::Display for DefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong. The `Display` output is the user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DiagnosticKind {
    #[error("unexpected token '{token}'")]
    ParseFailure { token: String },

    #[error("no study definition found")]
    MissingStudyDef,

    #[error("missing attribute '{name}'")]
    MissingAttribute { name: String },

    #[error("unknown attribute '{name}'")]
    ExtraAttribute { name: String },

    #[error("duplicate attribute '{name}'")]
    DuplicateAttribute { name: String },

    #[error("invalid type: expected {expected_type}, found {actual_type}")]
    InvalidType {
        actual_type: String,
        expected_type: String,
    },

    #[error("{def_type} '{name}' not found")]
    NotFound {
        def_type: DefType,
        name: String,
        /// Declaration stub the author could add
        #[serde(skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
    },

    #[error("directive '@{directive}' takes {expected} argument(s), found {actual}")]
    IncorrectNumberOfArgs {
        directive: String,
        expected: usize,
        actual: usize,
    },

    #[error("missing directive '@{directive}'")]
    MissingDirective { directive: String },

    #[error("unexpected directive '@{directive}'")]
    UnexpectedDirective { directive: String },

    #[error("duplicate {def_type} '{name}'")]
    DuplicateDefinition { def_type: DefType, name: String },
}

impl DiagnosticKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::ParseFailure { .. } => codes::PARSE_FAILURE,
            DiagnosticKind::MissingStudyDef => codes::MISSING_STUDY_DEF,
            DiagnosticKind::MissingAttribute { .. } => codes::MISSING_ATTRIBUTE,
            DiagnosticKind::ExtraAttribute { .. } => codes::EXTRA_ATTRIBUTE,
            DiagnosticKind::DuplicateAttribute { .. } => codes::DUPLICATE_ATTRIBUTE,
            DiagnosticKind::InvalidType { .. } => codes::INVALID_TYPE,
            DiagnosticKind::NotFound { .. } => codes::NOT_FOUND,
            DiagnosticKind::IncorrectNumberOfArgs { .. } => codes::INCORRECT_NUMBER_OF_ARGS,
            DiagnosticKind::MissingDirective { .. } => codes::MISSING_DIRECTIVE,
            DiagnosticKind::UnexpectedDirective { .. } => codes::UNEXPECTED_DIRECTIVE,
            DiagnosticKind::DuplicateDefinition { .. } => codes::DUPLICATE_DEFINITION,
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            DiagnosticKind::MissingStudyDef => Scope::Global,
            _ => Scope::Local,
        }
    }

    pub fn not_found(def_type: DefType, name: impl Into<String>) -> Self {
        DiagnosticKind::NotFound {
            def_type,
            name: name.into(),
            suggestion: None,
        }
    }

    pub fn invalid_type(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        DiagnosticKind::InvalidType {
            actual_type: actual.into(),
            expected_type: expected.into(),
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub scope: Scope,
    /// The file containing this diagnostic; `None` for global diagnostics.
    pub file: Option<FileName>,
    /// `None` if and only if `scope` is global.
    pub loc: Option<Location>,
    pub message: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a file-local diagnostic.
    pub fn local(file: FileName, loc: Location, kind: DiagnosticKind) -> Self {
        debug_assert_eq!(kind.scope(), Scope::Local);
        Self {
            scope: Scope::Local,
            file: Some(file),
            loc: Some(loc),
            message: kind.to_string(),
            kind,
        }
    }

    /// Create a global diagnostic.
    pub fn global(kind: DiagnosticKind) -> Self {
        debug_assert_eq!(kind.scope(), Scope::Global);
        Self {
            scope: Scope::Global,
            file: None,
            loc: None,
            message: kind.to_string(),
            kind,
        }
    }

    /// Build a `parse_failure` whose message points a caret at the offending token.
    ///
    /// `loc` columns are byte columns like every other location; the caret is
    /// indented by the characters that precede the token on its line.
    pub fn parse_failure(file: FileName, source: &str, error: &ParseError) -> Self {
        let first_line = error.token.lines().next().unwrap_or_default();
        let width = (first_line.len() as u32).max(1);
        let loc = Location::new(error.line, error.col, error.line, error.col + width);
        let line_text = source
            .lines()
            .nth(error.line.saturating_sub(1) as usize)
            .unwrap_or_default();
        let prefix = error.col.saturating_sub(1) as usize;
        let indent = line_text
            .get(..prefix)
            .map_or(prefix, |before| before.chars().count());
        let caret = " ".repeat(indent);
        let mut diagnostic = Self::local(
            file,
            loc,
            DiagnosticKind::ParseFailure {
                token: error.token.clone(),
            },
        );
        diagnostic.message = format!(
            "{}:{}: {}\n{}\n{}^",
            error.line, error.col, error.message, line_text, caret
        );
        diagnostic
    }

    /// Attach a suggested declaration to a `not_found` diagnostic.
    pub fn with_suggestion(mut self, stub: impl Into<String>) -> Self {
        if let DiagnosticKind::NotFound { suggestion, .. } = &mut self.kind {
            *suggestion = Some(stub.into());
        }
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Ordering used for the public diagnostic feed: global first, then by
    /// file, position and code.
    pub fn feed_order(&self, other: &Self) -> Ordering {
        let key = |d: &Self| (d.scope == Scope::Local, d.file.clone(), d.loc, d.code());
        key(self).cmp(&key(other))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, &self.loc) {
            (Some(file), Some(loc)) => write!(
                f,
                "{}:{}:{}: {} [{}]",
                file,
                loc.line,
                loc.col,
                self.message,
                self.code()
            ),
            _ => write!(f, "{} [{}]", self.message, self.code()),
        }
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable diagnostic codes.
pub mod codes {
    pub const PARSE_FAILURE: &str = "parse_failure";
    /// The only global-scope code.
    pub const MISSING_STUDY_DEF: &str = "missing_study_def";
    pub const MISSING_ATTRIBUTE: &str = "missing_attribute";
    pub const EXTRA_ATTRIBUTE: &str = "extra_attribute";
    pub const DUPLICATE_ATTRIBUTE: &str = "duplicate_attribute";
    pub const INVALID_TYPE: &str = "invalid_type";
    pub const NOT_FOUND: &str = "not_found";
    pub const INCORRECT_NUMBER_OF_ARGS: &str = "incorrect_number_of_args";
    pub const MISSING_DIRECTIVE: &str = "missing_directive";
    pub const UNEXPECTED_DIRECTIVE: &str = "unexpected_directive";
    pub const DUPLICATE_DEFINITION: &str = "duplicate_definition";
}

// ============================================================================
// TESTS
// ============================================================================
