//! Parser for the time language inside `t"..."` literals.
//!
//! ```text
//! d0 +-2            study day 0 with a two day window
//! > BASELINE        after another milestone
//! SCREENING -> d7   every day between two points
//! d1 h4, d2 h4      a list of time points
//! ```

use logos::Logos;
use serde::Serialize;
use smol_str::SmolStr;
use thiserror::Error;

/// Error for a malformed time literal body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time expression: {message}")]
pub struct TimeSyntaxError {
    pub message: String,
    /// Byte offset into the literal body
    pub offset: usize,
}

/// Tolerance around a study day. `before` is never positive, `after` never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    pub before: i64,
    pub after: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyDay {
    pub day: i64,
    pub window: Window,
    pub hour: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeValue {
    StudyDay(StudyDay),
    Milestone { name: SmolStr, hour: Option<u32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativePosition {
    Before,
    After,
    BeforeOn,
    AfterOn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeExpr {
    Value(TimeValue),
    Relative {
        position: RelativePosition,
        target: TimeValue,
    },
    Range {
        start: TimeValue,
        end: TimeValue,
    },
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum TimeToken {
    #[regex(r"d-?[0-9]+", priority = 4)]
    Day,
    #[regex(r"h[0-9]+", priority = 4)]
    Hour,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Number,
    #[token("+-")]
    PlusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("->")]
    Arrow,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token(",")]
    Comma,
}

struct Cursor<'a> {
    tokens: Vec<(TimeToken, &'a str, usize)>,
    pos: usize,
    len: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<TimeToken> {
        self.tokens.get(self.pos).map(|t| t.0)
    }

    fn next(&mut self) -> Option<(TimeToken, &'a str, usize)> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|t| t.2).unwrap_or(self.len)
    }

    fn error(&self, message: impl Into<String>) -> TimeSyntaxError {
        TimeSyntaxError {
            message: message.into(),
            offset: self.offset(),
        }
    }
}

/// Parse the body of a `t"..."` literal into its comma separated expressions.
pub fn parse_time(body: &str) -> Result<Vec<TimeExpr>, TimeSyntaxError> {
    let mut tokens = Vec::new();
    let mut lexer = TimeToken::lexer(body);
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        match token {
            Ok(token) => tokens.push((token, lexer.slice(), span.start)),
            Err(()) => {
                return Err(TimeSyntaxError {
                    message: format!("unexpected character {:?}", lexer.slice()),
                    offset: span.start,
                });
            }
        }
    }
    let mut cursor = Cursor {
        tokens,
        pos: 0,
        len: body.len(),
    };

    let mut exprs = vec![parse_expr(&mut cursor)?];
    while cursor.peek() == Some(TimeToken::Comma) {
        cursor.next();
        exprs.push(parse_expr(&mut cursor)?);
    }
    if cursor.peek().is_some() {
        return Err(cursor.error("expected ',' or end of time expression"));
    }
    Ok(exprs)
}

fn parse_expr(cursor: &mut Cursor<'_>) -> Result<TimeExpr, TimeSyntaxError> {
    let position = match cursor.peek() {
        Some(TimeToken::Less) => Some(RelativePosition::Before),
        Some(TimeToken::Greater) => Some(RelativePosition::After),
        Some(TimeToken::LessEq) => Some(RelativePosition::BeforeOn),
        Some(TimeToken::GreaterEq) => Some(RelativePosition::AfterOn),
        _ => None,
    };
    if let Some(position) = position {
        cursor.next();
        let target = parse_value(cursor)?;
        return Ok(TimeExpr::Relative { position, target });
    }

    let start = parse_value(cursor)?;
    if cursor.peek() == Some(TimeToken::Arrow) {
        cursor.next();
        let end = parse_value(cursor)?;
        return Ok(TimeExpr::Range { start, end });
    }
    Ok(TimeExpr::Value(start))
}

fn parse_value(cursor: &mut Cursor<'_>) -> Result<TimeValue, TimeSyntaxError> {
    let offset = cursor.offset();
    match cursor.next() {
        Some((TimeToken::Day, text, _)) => {
            let day = parse_number::<i64>(&text[1..], offset)?;
            let window = parse_window(cursor)?;
            let hour = parse_hour(cursor)?;
            Ok(TimeValue::StudyDay(StudyDay { day, window, hour }))
        }
        Some((TimeToken::Ident, text, _)) => {
            let hour = parse_hour(cursor)?;
            Ok(TimeValue::Milestone {
                name: SmolStr::new(text),
                hour,
            })
        }
        Some((_, text, _)) => Err(TimeSyntaxError {
            message: format!("expected study day or milestone, found {text:?}"),
            offset,
        }),
        None => Err(TimeSyntaxError {
            message: "expected study day or milestone".to_string(),
            offset,
        }),
    }
}

fn parse_window(cursor: &mut Cursor<'_>) -> Result<Window, TimeSyntaxError> {
    let mut window = Window::default();
    loop {
        let sign = match cursor.peek() {
            Some(t @ (TimeToken::Plus | TimeToken::Minus | TimeToken::PlusMinus)) => t,
            _ => return Ok(window),
        };
        cursor.next();
        let offset = cursor.offset();
        let amount = match cursor.next() {
            Some((TimeToken::Number, text, _)) => parse_number::<i64>(text, offset)?,
            _ => {
                return Err(TimeSyntaxError {
                    message: "expected window size".to_string(),
                    offset,
                });
            }
        };
        match sign {
            TimeToken::Plus => window.after = amount,
            TimeToken::Minus => window.before = -amount,
            _ => {
                window.before = -amount;
                window.after = amount;
            }
        }
    }
}

fn parse_hour(cursor: &mut Cursor<'_>) -> Result<Option<u32>, TimeSyntaxError> {
    if cursor.peek() != Some(TimeToken::Hour) {
        return Ok(None);
    }
    let offset = cursor.offset();
    match cursor.next() {
        Some((_, text, _)) => parse_number::<u32>(&text[1..], offset).map(Some),
        None => Ok(None),
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, offset: usize) -> Result<T, TimeSyntaxError> {
    text.parse().map_err(|_| TimeSyntaxError {
        message: format!("number out of range: {text}"),
        offset,
    })
}
