//! Recursive descent parser for study definition files
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.

use super::ast::{AstNode, SourceFile};
use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Get the typed root of the tree
    pub fn tree(&self) -> SourceFile {
        SourceFile::cast(self.syntax()).expect("parser always produces a SOURCE_FILE root")
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// Text of the offending token (empty at end of input)
    pub token: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, token: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            token: token.into(),
            range,
        }
    }
}

/// Parse study definition source into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, TextSize::of(input));
    parser.parse_source_file();
    parser.finish()
}

/// Tokens that can start a top-level item; used as the recovery set.
const ITEM_START: &[SyntaxKind] = &[
    SyntaxKind::STUDY_KW,
    SyntaxKind::MILESTONE_KW,
    SyntaxKind::CODELIST_KW,
    SyntaxKind::INTERFACE_KW,
    SyntaxKind::DOMAIN_KW,
    SyntaxKind::MAP_KW,
];

const VALUE_START: &[SyntaxKind] = &[
    SyntaxKind::STRING,
    SyntaxKind::INTEGER,
    SyntaxKind::TIME,
    SyntaxKind::IDENT,
    SyntaxKind::TRUE_KW,
    SyntaxKind::FALSE_KW,
];

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    eof: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], eof: TextSize) -> Self {
        Self {
            tokens,
            pos: 0,
            eof,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection (trivia is invisible to lookahead)
    // =========================================================================

    fn significant(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.significant(n).map(|t| t.kind).unwrap_or(SyntaxKind::__LAST)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.significant(0).is_none()
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.skip_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {}", kind.display_name()));
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let (token, range) = match self.significant(0) {
            Some(t) => (t.text, TextRange::at(t.offset, TextSize::of(t.text))),
            None => ("", TextRange::empty(self.eof)),
        };
        let message = match token {
            "" => format!("{}, found end of input", message.into()),
            text => format!("{}, found '{}'", message.into(), text),
        };
        self.errors.push(SyntaxError::new(message, token, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.start_node(SyntaxKind::ERROR);
        // Always consume at least one token to make progress
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn token_node(&mut self, node: SyntaxKind, token: SyntaxKind) -> bool {
        if self.at(token) {
            self.start_node(node);
            self.bump();
            self.finish_node();
            true
        } else {
            self.error(format!("expected {}", token.display_name()));
            false
        }
    }

    // =========================================================================
    // Grammar rules
    // =========================================================================

    /// SourceFile = Item*
    fn parse_source_file(&mut self) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());
        while !self.at_eof() {
            match self.current_kind() {
                SyntaxKind::STUDY_KW => self.parse_study(),
                SyntaxKind::MILESTONE_KW => self.parse_milestone(),
                SyntaxKind::CODELIST_KW => self.parse_codelist(),
                SyntaxKind::INTERFACE_KW => self.parse_interface(),
                SyntaxKind::DOMAIN_KW => self.parse_domain(),
                SyntaxKind::MAP_KW => self.parse_mapping(),
                _ => self.error_recover("expected a top-level declaration", ITEM_START),
            }
        }
        self.skip_trivia();
        self.finish_node();
    }

    /// Study = 'study' AttributeBlock
    fn parse_study(&mut self) {
        self.start_node(SyntaxKind::STUDY);
        self.bump();
        self.parse_attribute_block();
        self.finish_node();
    }

    /// Milestone = 'milestone' Name AttributeBlock
    fn parse_milestone(&mut self) {
        self.start_node(SyntaxKind::MILESTONE);
        self.bump();
        self.token_node(SyntaxKind::NAME, SyntaxKind::IDENT);
        self.parse_attribute_block();
        self.finish_node();
    }

    /// AttributeBlock = '{' (Attribute ','?)* '}'
    fn parse_attribute_block(&mut self) {
        self.start_node(SyntaxKind::ATTRIBUTE_BLOCK);
        if self.expect(SyntaxKind::L_BRACE) {
            while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
                if self.at(SyntaxKind::IDENT) {
                    self.parse_attribute();
                    if !self.eat(SyntaxKind::COMMA) {
                        self.eat(SyntaxKind::SEMICOLON);
                    }
                } else if self.at_any(ITEM_START) {
                    break;
                } else {
                    self.error_recover(
                        "expected an attribute",
                        &[SyntaxKind::IDENT, SyntaxKind::R_BRACE],
                    );
                }
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// Attribute = Name ':' Value
    fn parse_attribute(&mut self) {
        self.start_node(SyntaxKind::ATTRIBUTE);
        self.token_node(SyntaxKind::NAME, SyntaxKind::IDENT);
        if self.expect(SyntaxKind::COLON) {
            self.parse_value();
        }
        self.finish_node();
    }

    /// Value = STRING | INTEGER | TIME | IDENT | 'true' | 'false'
    fn parse_value(&mut self) {
        if self.at_any(VALUE_START) {
            self.start_node(SyntaxKind::VALUE);
            self.bump();
            self.finish_node();
        } else {
            self.error("expected a value");
        }
    }

    /// Codelist = 'codelist' Name '{' Member* '}'
    fn parse_codelist(&mut self) {
        self.start_node(SyntaxKind::CODELIST);
        self.bump();
        self.token_node(SyntaxKind::NAME, SyntaxKind::IDENT);
        if self.expect(SyntaxKind::L_BRACE) {
            while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
                if self.at(SyntaxKind::STRING) {
                    self.start_node(SyntaxKind::CODELIST_MEMBER);
                    self.bump();
                    self.parse_directives();
                    self.finish_node();
                    self.eat(SyntaxKind::COMMA);
                } else if self.at_any(ITEM_START) {
                    break;
                } else {
                    self.error_recover(
                        "expected a codelist member",
                        &[SyntaxKind::STRING, SyntaxKind::R_BRACE],
                    );
                }
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// Interface = 'interface' Name '{' Column* '}'
    fn parse_interface(&mut self) {
        self.start_node(SyntaxKind::INTERFACE);
        self.bump();
        self.token_node(SyntaxKind::NAME, SyntaxKind::IDENT);
        self.parse_column_block();
        self.finish_node();
    }

    fn parse_column_block(&mut self) {
        if !self.expect(SyntaxKind::L_BRACE) {
            return;
        }
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            if self.at(SyntaxKind::IDENT) {
                self.parse_column();
            } else if self.at_any(ITEM_START) || self.at(SyntaxKind::DATASET_KW) {
                break;
            } else {
                self.error_recover(
                    "expected a column",
                    &[SyntaxKind::IDENT, SyntaxKind::R_BRACE],
                );
            }
        }
        self.expect(SyntaxKind::R_BRACE);
    }

    /// Column = Name ':' TypeExpr Directive*
    fn parse_column(&mut self) {
        self.start_node(SyntaxKind::COLUMN);
        self.token_node(SyntaxKind::NAME, SyntaxKind::IDENT);
        if self.expect(SyntaxKind::COLON) {
            self.start_node(SyntaxKind::TYPE_EXPR);
            if self.token_node(SyntaxKind::NAME_REF, SyntaxKind::IDENT) {
                while self.eat(SyntaxKind::PIPE) {
                    if !self.token_node(SyntaxKind::NAME_REF, SyntaxKind::IDENT) {
                        break;
                    }
                }
            }
            self.finish_node();
        }
        self.parse_directives();
        self.eat(SyntaxKind::COMMA);
        self.finish_node();
    }

    fn parse_directives(&mut self) {
        while self.at(SyntaxKind::AT) {
            self.parse_directive();
        }
    }

    /// Directive = '@' DirectiveName ArgList?
    fn parse_directive(&mut self) {
        self.start_node(SyntaxKind::DIRECTIVE);
        self.bump();
        self.start_node(SyntaxKind::DIRECTIVE_NAME);
        if self.at_directive_segment() {
            self.bump();
            while self.at(SyntaxKind::DOT) && self.nth_is_directive_segment(1) {
                self.bump();
                self.bump();
            }
        } else {
            self.error("expected a directive name");
        }
        self.finish_node();
        if self.at(SyntaxKind::L_PAREN) {
            self.start_node(SyntaxKind::ARG_LIST);
            self.bump();
            if !self.at(SyntaxKind::R_PAREN) {
                self.parse_value();
                while self.eat(SyntaxKind::COMMA) {
                    self.parse_value();
                }
            }
            self.expect(SyntaxKind::R_PAREN);
            self.finish_node();
        }
        self.finish_node();
    }

    fn at_directive_segment(&self) -> bool {
        self.nth_is_directive_segment(0)
    }

    /// Directive names may reuse keywords, as in `@milestone.name`.
    fn nth_is_directive_segment(&self, n: usize) -> bool {
        let kind = self.nth(n);
        kind == SyntaxKind::IDENT || kind.is_keyword()
    }

    /// Domain = 'domain' STRING Directive* '{' Dataset* '}'
    fn parse_domain(&mut self) {
        self.start_node(SyntaxKind::DOMAIN);
        self.bump();
        self.token_node(SyntaxKind::NAME, SyntaxKind::STRING);
        self.parse_directives();
        if self.expect(SyntaxKind::L_BRACE) {
            while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
                if self.at(SyntaxKind::DATASET_KW) {
                    self.parse_dataset();
                } else if self.at_any(ITEM_START) {
                    break;
                } else {
                    self.error_recover(
                        "expected a dataset",
                        &[SyntaxKind::DATASET_KW, SyntaxKind::R_BRACE],
                    );
                }
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// Dataset = 'dataset' Name ImplementsClause? Directive* '{' Column* '}'
    fn parse_dataset(&mut self) {
        self.start_node(SyntaxKind::DATASET);
        self.bump();
        self.token_node(SyntaxKind::NAME, SyntaxKind::IDENT);
        if self.at(SyntaxKind::IMPLEMENTS_KW) {
            self.start_node(SyntaxKind::IMPLEMENTS_CLAUSE);
            self.bump();
            if self.token_node(SyntaxKind::NAME_REF, SyntaxKind::IDENT) {
                while self.eat(SyntaxKind::COMMA) {
                    if !self.token_node(SyntaxKind::NAME_REF, SyntaxKind::IDENT) {
                        break;
                    }
                }
            }
            self.finish_node();
        }
        self.parse_directives();
        self.parse_column_block();
        self.finish_node();
    }

    /// Mapping = 'map' 'dataset' NameRef MappingVariable? '{' ColumnMapping* '}'
    fn parse_mapping(&mut self) {
        self.start_node(SyntaxKind::MAPPING);
        self.bump();
        self.expect(SyntaxKind::DATASET_KW);
        self.token_node(SyntaxKind::NAME_REF, SyntaxKind::IDENT);
        if self.at(SyntaxKind::WITH_KW) {
            self.parse_mapping_variable();
        }
        if self.expect(SyntaxKind::L_BRACE) {
            while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
                if self.at(SyntaxKind::IDENT) {
                    self.parse_column_mapping();
                } else if self.at_any(ITEM_START) {
                    break;
                } else {
                    self.error_recover(
                        "expected a column mapping",
                        &[SyntaxKind::IDENT, SyntaxKind::R_BRACE],
                    );
                }
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// MappingVariable = 'with' Name 'as' '(' STRING (',' STRING)* ')'
    fn parse_mapping_variable(&mut self) {
        self.start_node(SyntaxKind::MAPPING_VARIABLE);
        self.bump();
        self.token_node(SyntaxKind::NAME, SyntaxKind::IDENT);
        self.expect(SyntaxKind::AS_KW);
        self.start_node(SyntaxKind::VALUE_LIST);
        if self.expect(SyntaxKind::L_PAREN) {
            if self.expect(SyntaxKind::STRING) {
                while self.eat(SyntaxKind::COMMA) {
                    if !self.expect(SyntaxKind::STRING) {
                        break;
                    }
                }
            }
            self.expect(SyntaxKind::R_PAREN);
        }
        self.finish_node();
        self.finish_node();
    }

    /// ColumnMapping = NameRef ':' IDENT MappingSource? (STRING | RAW_STRING)
    fn parse_column_mapping(&mut self) {
        self.start_node(SyntaxKind::COLUMN_MAPPING);
        self.token_node(SyntaxKind::NAME_REF, SyntaxKind::IDENT);
        if self.expect(SyntaxKind::COLON) && self.expect(SyntaxKind::IDENT) {
            if self.at(SyntaxKind::L_PAREN) {
                self.start_node(SyntaxKind::MAPPING_SOURCE);
                self.bump();
                self.expect(SyntaxKind::STRING);
                self.expect(SyntaxKind::R_PAREN);
                self.finish_node();
            }
            if self.at_any(&[SyntaxKind::STRING, SyntaxKind::RAW_STRING]) {
                self.bump();
            } else {
                self.error("expected mapping code");
            }
        }
        self.eat(SyntaxKind::COMMA);
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_lossless() {
        let source = "study {\n  id: \"S1\" // trailing\n  name: \"Trial\"\n}\n";
        let parse = parse(source);
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(parse.syntax().text().to_string(), source);
    }

    #[test]
    fn test_parse_error_reports_offending_token() {
        let parse = parse("milestone { at: t\"d0\" }");
        assert!(!parse.ok());
        assert_eq!(parse.errors[0].token, "{");
        assert!(parse.errors[0].message.contains("expected identifier"));
    }

    #[test]
    fn test_parse_error_at_end_of_input() {
        let parse = parse("codelist SEX {");
        assert!(!parse.ok());
        let last = parse.errors.last().unwrap();
        assert_eq!(last.token, "");
        assert!(last.message.contains("end of input"));
    }

    #[test]
    fn test_garbage_between_items_recovers() {
        let parse = parse("study { id: \"A\" name: \"B\" } ### milestone M { at: t\"d1\" }");
        assert!(!parse.ok());
        assert_eq!(parse.tree().items().count(), 2);
    }
}
