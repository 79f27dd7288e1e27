//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree
//! of a study definition file.

/// All syntax kinds (tokens and nodes) of the study definition language
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (study blocks, datasets, columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,      // identifier
    INTEGER,    // 42, -14
    STRING,     // "hello"
    RAW_STRING, // `select ...`
    TIME,       // t"d0 +-2"

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,   // {
    R_BRACE,   // }
    L_PAREN,   // (
    R_PAREN,   // )
    COLON,     // :
    COMMA,     // ,
    DOT,       // .
    AT,        // @
    PIPE,      // |
    SEMICOLON, // ;

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    STUDY_KW,
    MILESTONE_KW,
    CODELIST_KW,
    INTERFACE_KW,
    DOMAIN_KW,
    DATASET_KW,
    IMPLEMENTS_KW,
    MAP_KW,
    WITH_KW,
    AS_KW,
    TRUE_KW,
    FALSE_KW,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    STUDY,
    MILESTONE,
    CODELIST,
    CODELIST_MEMBER,
    INTERFACE,
    DOMAIN,
    DATASET,
    IMPLEMENTS_CLAUSE,
    COLUMN,
    TYPE_EXPR,
    DIRECTIVE,
    DIRECTIVE_NAME,
    ARG_LIST,
    ATTRIBUTE_BLOCK,
    ATTRIBUTE,
    VALUE,
    MAPPING,
    MAPPING_VARIABLE,
    VALUE_LIST,
    COLUMN_MAPPING,
    MAPPING_SOURCE,
    NAME,
    NAME_REF,

    ERROR,

    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::STUDY_KW as u16) && (self as u16) <= (Self::FALSE_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::SEMICOLON as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IDENT | Self::INTEGER | Self::STRING | Self::RAW_STRING | Self::TIME
        )
    }

    /// Human-readable name used in "expected ..." messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::IDENT => "identifier",
            Self::INTEGER => "integer",
            Self::STRING => "string",
            Self::RAW_STRING => "raw string",
            Self::TIME => "time literal",
            Self::L_BRACE => "'{'",
            Self::R_BRACE => "'}'",
            Self::L_PAREN => "'('",
            Self::R_PAREN => "')'",
            Self::COLON => "':'",
            Self::COMMA => "','",
            Self::DOT => "'.'",
            Self::AT => "'@'",
            Self::PIPE => "'|'",
            Self::SEMICOLON => "';'",
            Self::STUDY_KW => "'study'",
            Self::MILESTONE_KW => "'milestone'",
            Self::CODELIST_KW => "'codelist'",
            Self::INTERFACE_KW => "'interface'",
            Self::DOMAIN_KW => "'domain'",
            Self::DATASET_KW => "'dataset'",
            Self::IMPLEMENTS_KW => "'implements'",
            Self::MAP_KW => "'map'",
            Self::WITH_KW => "'with'",
            Self::AS_KW => "'as'",
            Self::TRUE_KW => "'true'",
            Self::FALSE_KW => "'false'",
            _ => "token",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StudyLanguage {}

impl rowan::Language for StudyLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<StudyLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<StudyLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<StudyLanguage>;
