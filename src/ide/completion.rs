//! Completion suggestions implementation.
//!
//! Context is recovered from the tokens before the cursor: which block the
//! cursor sits in and what the last few tokens of that block were. No prefix
//! filtering or ranking is applied.

use std::sync::Arc;

use crate::base::{LineCol, LineIndex};
use crate::config::CompilerOptions;
use crate::hir::ConfigState;
use crate::parser::keywords::{
    COLUMN_DIRECTIVES, DATASET_DIRECTIVES, DOMAIN_DIRECTIVES, ITEM_KEYWORDS, MEMBER_DIRECTIVES,
    MILESTONE_ATTRIBUTES, STUDY_ATTRIBUTES,
};
use crate::parser::{SyntaxKind, Token, tokenize};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Keyword,
    Attribute,
    Directive,
    Dataset,
    Interface,
    Codelist,
    ScalarType,
    Column,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Keyword => 14,    // Keyword
            CompletionKind::Attribute => 10,  // Property
            CompletionKind::Directive => 15,  // Snippet
            CompletionKind::Dataset => 7,     // Class
            CompletionKind::Interface => 8,   // Interface
            CompletionKind::Codelist => 13,   // Enum
            CompletionKind::ScalarType => 25, // TypeParameter
            CompletionKind::Column => 5,      // Field
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            sort_priority: 100,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the sort priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }
}

/// Block the cursor is nested in.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Block {
    Study,
    Milestone,
    Codelist,
    Interface,
    Domain,
    Dataset,
    Map { target: Option<String> },
    /// Braces the grammar does not expect; nothing is offered inside
    Unknown,
}

/// Cursor context: enclosing blocks plus the tokens since the last brace.
struct Context<'a> {
    stack: Vec<Block>,
    recent: Vec<Token<'a>>,
}

impl<'a> Context<'a> {
    fn scan(tokens: &[Token<'a>]) -> Self {
        let mut cx = Context {
            stack: Vec::new(),
            recent: Vec::new(),
        };
        for token in tokens {
            match token.kind {
                SyntaxKind::L_BRACE => {
                    let block = cx.opened_block();
                    cx.stack.push(block);
                    cx.recent.clear();
                }
                SyntaxKind::R_BRACE => {
                    cx.stack.pop();
                    cx.recent.clear();
                }
                _ => cx.recent.push(token.clone()),
            }
        }
        cx
    }

    fn opened_block(&self) -> Block {
        let first = self.recent.first().map(|t| t.kind);
        match (self.stack.last(), first) {
            (None, Some(SyntaxKind::STUDY_KW)) => Block::Study,
            (None, Some(SyntaxKind::MILESTONE_KW)) => Block::Milestone,
            (None, Some(SyntaxKind::CODELIST_KW)) => Block::Codelist,
            (None, Some(SyntaxKind::INTERFACE_KW)) => Block::Interface,
            (None, Some(SyntaxKind::DOMAIN_KW)) => Block::Domain,
            (None, Some(SyntaxKind::MAP_KW)) => Block::Map {
                target: self
                    .recent
                    .get(2)
                    .filter(|t| t.kind == SyntaxKind::IDENT)
                    .map(|t| t.text.to_string()),
            },
            (Some(Block::Domain), Some(SyntaxKind::DATASET_KW)) => Block::Dataset,
            _ => Block::Unknown,
        }
    }

    fn kinds(&self) -> Vec<SyntaxKind> {
        self.recent.iter().map(|t| t.kind).collect()
    }

    fn last(&self) -> Option<SyntaxKind> {
        self.recent.last().map(|t| t.kind)
    }

    /// At a `key:` position inside an attribute block
    fn at_key_position(&self) -> bool {
        !matches!(self.last(), Some(SyntaxKind::IDENT | SyntaxKind::COLON))
            || self.recent.len() >= 2
                && self.recent[self.recent.len() - 2].kind == SyntaxKind::COLON
    }

    /// Attribute keys already written in the current block
    fn written_keys(&self) -> Vec<&'a str> {
        self.recent
            .windows(2)
            .filter(|w| w[0].kind == SyntaxKind::IDENT && w[1].kind == SyntaxKind::COLON)
            .map(|w| w[0].text)
            .collect()
    }
}

fn keywords(words: &[&str]) -> Vec<CompletionItem> {
    words
        .iter()
        .map(|w| CompletionItem::new(*w, CompletionKind::Keyword).with_priority(10))
        .collect()
}

fn directives(names: &[&str]) -> Vec<CompletionItem> {
    names
        .iter()
        .map(|n| CompletionItem::new(*n, CompletionKind::Directive).with_priority(20))
        .collect()
}

fn attributes(allowed: &[&str], cx: &Context<'_>) -> Vec<CompletionItem> {
    if !cx.at_key_position() {
        return Vec::new();
    }
    let written = cx.written_keys();
    allowed
        .iter()
        .filter(|key| !written.contains(key))
        .map(|key| CompletionItem::new(*key, CompletionKind::Attribute).with_priority(10))
        .collect()
}

fn type_names(state: &ConfigState, options: &CompilerOptions) -> Vec<CompletionItem> {
    let scalars = options.scalar_types.iter().map(|t| {
        CompletionItem::new(t.as_str(), CompletionKind::ScalarType)
            .with_detail("scalar")
            .with_priority(30)
    });
    let codelists = state.codelists.keys().map(|name| {
        CompletionItem::new(name.as_str(), CompletionKind::Codelist)
            .with_detail("codelist")
            .with_priority(40)
    });
    scalars.chain(codelists).collect()
}

fn dataset_names(state: &ConfigState) -> Vec<CompletionItem> {
    state
        .domains
        .values()
        .flat_map(|domain| {
            domain.datasets.keys().map(|name| {
                CompletionItem::new(name.as_str(), CompletionKind::Dataset)
                    .with_detail(domain.name.as_str())
            })
        })
        .collect()
}

fn top_level(cx: &Context<'_>, state: &ConfigState) -> Vec<CompletionItem> {
    use SyntaxKind::*;
    let kinds = cx.kinds();
    match kinds.as_slice() {
        [] => keywords(ITEM_KEYWORDS),
        [MAP_KW] => keywords(&["dataset"]),
        [MAP_KW, DATASET_KW] => dataset_names(state),
        [MAP_KW, DATASET_KW, IDENT] => keywords(&["with"]),
        [MAP_KW, DATASET_KW, IDENT, WITH_KW, IDENT] => keywords(&["as"]),
        [DOMAIN_KW, STRING, ..] if cx.last() == Some(AT) => directives(DOMAIN_DIRECTIVES),
        _ => Vec::new(),
    }
}

fn in_domain(cx: &Context<'_>, state: &ConfigState) -> Vec<CompletionItem> {
    use SyntaxKind::*;
    let kinds = cx.kinds();
    match (kinds.as_slice(), cx.last()) {
        ([], _) => keywords(&["dataset"]),
        ([DATASET_KW, IDENT], _) => keywords(&["implements"]),
        ([DATASET_KW, ..], Some(AT)) => directives(DATASET_DIRECTIVES),
        ([DATASET_KW, IDENT, IMPLEMENTS_KW, ..], Some(IMPLEMENTS_KW | COMMA)) => state
            .interfaces
            .keys()
            .map(|name| CompletionItem::new(name.as_str(), CompletionKind::Interface))
            .collect(),
        _ => Vec::new(),
    }
}

fn in_columns(cx: &Context<'_>, state: &ConfigState, options: &CompilerOptions) -> Vec<CompletionItem> {
    match cx.last() {
        Some(SyntaxKind::COLON | SyntaxKind::PIPE) => type_names(state, options),
        Some(SyntaxKind::AT) => directives(COLUMN_DIRECTIVES),
        _ => Vec::new(),
    }
}

fn in_map(cx: &Context<'_>, target: Option<&str>, state: &ConfigState) -> Vec<CompletionItem> {
    let at_key = matches!(
        cx.last(),
        None | Some(SyntaxKind::STRING | SyntaxKind::RAW_STRING)
    );
    let Some(dataset) = target.filter(|_| at_key).and_then(|t| state.dataset(t)) else {
        return Vec::new();
    };
    let mapped: Vec<&str> = cx
        .recent
        .windows(2)
        .filter(|w| w[0].kind == SyntaxKind::IDENT && w[1].kind == SyntaxKind::COLON)
        .map(|w| w[0].text)
        .collect();
    dataset
        .columns
        .iter()
        .filter(|c| !mapped.contains(&c.name.as_str()))
        .map(|c| {
            let item = CompletionItem::new(c.name.as_str(), CompletionKind::Column);
            match &c.label {
                Some(label) => item.with_detail(label.as_str()),
                None => item,
            }
        })
        .collect()
}

/// Get completion suggestions at a 1-based cursor position.
///
/// # Arguments
/// * `state` - Names resolved by the last compilation
/// * `options` - Provides the scalar type names
/// * `source` - Full text of the document holding the cursor
/// * `line` - Cursor line (1-based)
/// * `col` - Cursor column (1-based)
pub fn completions(
    state: &ConfigState,
    options: &CompilerOptions,
    source: &str,
    line: u32,
    col: u32,
) -> Vec<CompletionItem> {
    let index = LineIndex::new(source);
    let cursor = index.offset(LineCol {
        line: line.saturating_sub(1),
        col: col.saturating_sub(1),
    });

    let mut tokens = Vec::new();
    for token in tokenize(source) {
        if token.offset >= cursor {
            break;
        }
        if token.end() >= cursor {
            // A word being typed is replaced by the completion; inside a
            // comment or literal nothing is offered.
            if token.kind.is_punct() {
                tokens.push(token);
            } else if !(token.kind == SyntaxKind::IDENT
                || token.kind.is_keyword()
                || token.kind == SyntaxKind::WHITESPACE)
            {
                return Vec::new();
            }
            break;
        }
        if !token.kind.is_trivia() {
            tokens.push(token);
        }
    }

    let cx = Context::scan(&tokens);
    if cx.last() == Some(SyntaxKind::ERROR) {
        return Vec::new();
    }
    match cx.stack.last() {
        None => top_level(&cx, state),
        Some(Block::Study) => attributes(STUDY_ATTRIBUTES, &cx),
        Some(Block::Milestone) => attributes(MILESTONE_ATTRIBUTES, &cx),
        Some(Block::Codelist) if cx.last() == Some(SyntaxKind::AT) => directives(MEMBER_DIRECTIVES),
        Some(Block::Domain) => in_domain(&cx, state),
        Some(Block::Interface | Block::Dataset) => in_columns(&cx, state, options),
        Some(Block::Map { target }) => in_map(&cx, target.as_deref(), state),
        Some(Block::Codelist | Block::Unknown) => Vec::new(),
    }
}
