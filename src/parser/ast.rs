//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for study definition nodes.
//! Each struct wraps a SyntaxNode and provides methods to access children.
//! Top-level declarations form the closed sum type [`Item`].

use rowan::TextRange;
use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Range of the node without surrounding trivia
    fn range(&self) -> TextRange {
        self.syntax().text_range()
    }
}

// ============================================================================
// Helper macros and functions
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

fn children<N: AstNode>(node: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    node.children().filter_map(N::cast)
}

fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Decode the body of a `"..."` literal, resolving escapes.
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn items(&self) -> impl Iterator<Item = Item> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// Items
// ============================================================================

/// Any top-level declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Study(Study),
    Milestone(Milestone),
    Codelist(Codelist),
    Interface(Interface),
    Domain(Domain),
    Mapping(Mapping),
}

impl AstNode for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::STUDY
                | SyntaxKind::MILESTONE
                | SyntaxKind::CODELIST
                | SyntaxKind::INTERFACE
                | SyntaxKind::DOMAIN
                | SyntaxKind::MAPPING
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::STUDY => Some(Self::Study(Study(node))),
            SyntaxKind::MILESTONE => Some(Self::Milestone(Milestone(node))),
            SyntaxKind::CODELIST => Some(Self::Codelist(Codelist(node))),
            SyntaxKind::INTERFACE => Some(Self::Interface(Interface(node))),
            SyntaxKind::DOMAIN => Some(Self::Domain(Domain(node))),
            SyntaxKind::MAPPING => Some(Self::Mapping(Mapping(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Study(n) => n.syntax(),
            Self::Milestone(n) => n.syntax(),
            Self::Codelist(n) => n.syntax(),
            Self::Interface(n) => n.syntax(),
            Self::Domain(n) => n.syntax(),
            Self::Mapping(n) => n.syntax(),
        }
    }
}

// ============================================================================
// Names
// ============================================================================

ast_node!(Name, NAME);

impl Name {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.first_token()
    }

    /// The declared name; string-literal names (domains) are unquoted.
    pub fn text(&self) -> SmolStr {
        match self.token() {
            Some(t) if t.kind() == SyntaxKind::STRING => SmolStr::new(unquote(t.text())),
            Some(t) => SmolStr::new(t.text()),
            None => SmolStr::default(),
        }
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> SmolStr {
        self.0
            .first_token()
            .map(|t| SmolStr::new(t.text()))
            .unwrap_or_default()
    }
}

// ============================================================================
// Attribute blocks (study, milestone)
// ============================================================================

ast_node!(Study, STUDY);

impl Study {
    pub fn keyword_range(&self) -> TextRange {
        child_token(&self.0, SyntaxKind::STUDY_KW)
            .map(|t| t.text_range())
            .unwrap_or_else(|| self.range())
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        child::<AttributeBlock>(&self.0)
            .into_iter()
            .flat_map(|block| block.attributes().collect::<Vec<_>>())
    }
}

ast_node!(Milestone, MILESTONE);

impl Milestone {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        child::<AttributeBlock>(&self.0)
            .into_iter()
            .flat_map(|block| block.attributes().collect::<Vec<_>>())
    }
}

ast_node!(AttributeBlock, ATTRIBUTE_BLOCK);

impl AttributeBlock {
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        children(&self.0)
    }
}

ast_node!(Attribute, ATTRIBUTE);

impl Attribute {
    pub fn key(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn value(&self) -> Option<Value> {
        child(&self.0)
    }
}

ast_node!(Value, VALUE);

/// The literal carried by a [`Value`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    String(String),
    Integer(i64),
    /// Raw body of a `t"..."` literal, without the `t"` prefix and closing quote
    Time(String),
    Ident(SmolStr),
    Boolean(bool),
}

impl Literal {
    /// Type name used in `invalid_type` diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Integer(_) => "integer",
            Literal::Time(_) => "time",
            Literal::Ident(_) => "identifier",
            Literal::Boolean(_) => "boolean",
        }
    }
}

impl Value {
    pub fn literal(&self) -> Option<Literal> {
        let token = self.0.first_token()?;
        let text = token.text();
        let literal = match token.kind() {
            SyntaxKind::STRING => Literal::String(unquote(text)),
            SyntaxKind::INTEGER => Literal::Integer(text.parse().ok()?),
            SyntaxKind::TIME => {
                let body = text.strip_prefix("t\"")?.strip_suffix('"')?;
                Literal::Time(body.to_string())
            }
            SyntaxKind::IDENT => Literal::Ident(SmolStr::new(text)),
            SyntaxKind::TRUE_KW => Literal::Boolean(true),
            SyntaxKind::FALSE_KW => Literal::Boolean(false),
            _ => return None,
        };
        Some(literal)
    }

    /// Range of the time body inside a `t"..."` literal, if this is one
    pub fn time_body_range(&self) -> Option<TextRange> {
        let token = self.0.first_token()?;
        if token.kind() != SyntaxKind::TIME {
            return None;
        }
        let range = token.text_range();
        let start = range.start() + rowan::TextSize::new(2);
        let end = range.end() - rowan::TextSize::new(1);
        (start <= end).then(|| TextRange::new(start, end))
    }
}

// ============================================================================
// Directives
// ============================================================================

ast_node!(Directive, DIRECTIVE);

impl Directive {
    /// Dotted directive name without the leading `@`, e.g. `milestone.name`
    pub fn name(&self) -> SmolStr {
        child::<DirectiveName>(&self.0)
            .map(|n| SmolStr::new(n.syntax().text().to_string().split_whitespace().collect::<String>()))
            .unwrap_or_default()
    }

    /// Arguments, or `None` when the directive has no parenthesized list
    pub fn args(&self) -> Option<Vec<Value>> {
        child::<ArgList>(&self.0).map(|list| children(list.syntax()).collect())
    }
}

ast_node!(DirectiveName, DIRECTIVE_NAME);
ast_node!(ArgList, ARG_LIST);

// ============================================================================
// Codelists
// ============================================================================

ast_node!(Codelist, CODELIST);

impl Codelist {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn members(&self) -> impl Iterator<Item = CodelistMember> + use<> {
        children(&self.0)
    }
}

ast_node!(CodelistMember, CODELIST_MEMBER);

impl CodelistMember {
    pub fn value(&self) -> String {
        child_token(&self.0, SyntaxKind::STRING)
            .map(|t| unquote(t.text()))
            .unwrap_or_default()
    }

    pub fn directives(&self) -> impl Iterator<Item = Directive> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// Interfaces, datasets, columns
// ============================================================================

ast_node!(Interface, INTERFACE);

impl Interface {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + use<> {
        children(&self.0)
    }
}

ast_node!(Domain, DOMAIN);

impl Domain {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn directives(&self) -> impl Iterator<Item = Directive> + use<> {
        children(&self.0)
    }

    pub fn datasets(&self) -> impl Iterator<Item = Dataset> + use<> {
        children(&self.0)
    }
}

ast_node!(Dataset, DATASET);

impl Dataset {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn implements(&self) -> Vec<NameRef> {
        child::<ImplementsClause>(&self.0)
            .map(|clause| children(clause.syntax()).collect())
            .unwrap_or_default()
    }

    pub fn directives(&self) -> impl Iterator<Item = Directive> + use<> {
        children(&self.0)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + use<> {
        children(&self.0)
    }
}

ast_node!(ImplementsClause, IMPLEMENTS_CLAUSE);

ast_node!(Column, COLUMN);

impl Column {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    /// Members of the `A | B` type expression
    pub fn type_names(&self) -> Vec<NameRef> {
        child::<TypeExpr>(&self.0)
            .map(|expr| children(expr.syntax()).collect())
            .unwrap_or_default()
    }

    pub fn directives(&self) -> impl Iterator<Item = Directive> + use<> {
        children(&self.0)
    }
}

ast_node!(TypeExpr, TYPE_EXPR);

// ============================================================================
// Mappings
// ============================================================================

ast_node!(Mapping, MAPPING);

impl Mapping {
    pub fn target(&self) -> Option<NameRef> {
        child(&self.0)
    }

    pub fn variable(&self) -> Option<MappingVariable> {
        child(&self.0)
    }

    pub fn column_mappings(&self) -> impl Iterator<Item = ColumnMapping> + use<> {
        children(&self.0)
    }
}

ast_node!(MappingVariable, MAPPING_VARIABLE);

impl MappingVariable {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn values(&self) -> Vec<String> {
        child::<ValueList>(&self.0)
            .map(|list| {
                list.syntax()
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .filter(|t| t.kind() == SyntaxKind::STRING)
                    .map(|t| unquote(t.text()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

ast_node!(ValueList, VALUE_LIST);

ast_node!(ColumnMapping, COLUMN_MAPPING);

impl ColumnMapping {
    pub fn column(&self) -> Option<NameRef> {
        child(&self.0)
    }

    pub fn language(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }

    pub fn source(&self) -> Option<String> {
        let source = child::<MappingSource>(&self.0)?;
        child_token(source.syntax(), SyntaxKind::STRING).map(|t| unquote(t.text()))
    }

    /// Code body; raw strings are taken verbatim
    pub fn code(&self) -> Option<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find_map(|t| match t.kind() {
                SyntaxKind::STRING => Some(unquote(t.text())),
                SyntaxKind::RAW_STRING => t
                    .text()
                    .strip_prefix('`')
                    .and_then(|s| s.strip_suffix('`'))
                    .map(str::to_string),
                _ => None,
            })
    }
}

ast_node!(MappingSource, MAPPING_SOURCE);
