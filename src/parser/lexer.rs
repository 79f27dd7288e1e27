//! Logos-based lexer for study definition files
//!
//! Fast tokenization using the logos crate.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Consumes through the closing `*/`; an unterminated comment lexes as an error
fn block_comment(lex: &mut logos::Lexer<LogosToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"-?[0-9]+")]
    Integer,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"`[^`]*`")]
    RawString,

    #[regex(r#"t"([^"\\]|\\.)*""#)]
    Time,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("|")]
    Pipe,
    #[token(";")]
    Semicolon,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("study")]
    StudyKw,
    #[token("milestone")]
    MilestoneKw,
    #[token("codelist")]
    CodelistKw,
    #[token("interface")]
    InterfaceKw,
    #[token("domain")]
    DomainKw,
    #[token("dataset")]
    DatasetKw,
    #[token("implements")]
    ImplementsKw,
    #[token("map")]
    MapKw,
    #[token("with")]
    WithKw,
    #[token("as")]
    AsKw,
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Integer => SyntaxKind::INTEGER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::RawString => SyntaxKind::RAW_STRING,
            LogosToken::Time => SyntaxKind::TIME,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::At => SyntaxKind::AT,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::StudyKw => SyntaxKind::STUDY_KW,
            LogosToken::MilestoneKw => SyntaxKind::MILESTONE_KW,
            LogosToken::CodelistKw => SyntaxKind::CODELIST_KW,
            LogosToken::InterfaceKw => SyntaxKind::INTERFACE_KW,
            LogosToken::DomainKw => SyntaxKind::DOMAIN_KW,
            LogosToken::DatasetKw => SyntaxKind::DATASET_KW,
            LogosToken::ImplementsKw => SyntaxKind::IMPLEMENTS_KW,
            LogosToken::MapKw => SyntaxKind::MAP_KW,
            LogosToken::WithKw => SyntaxKind::WITH_KW,
            LogosToken::AsKw => SyntaxKind::AS_KW,
            LogosToken::TrueKw => SyntaxKind::TRUE_KW,
            LogosToken::FalseKw => SyntaxKind::FALSE_KW,
        }
    }
}
